use clap::Parser;
use dogsift::io::load_gray_image;
use dogsift::{
    Descriptor, Detector, ExtremaConfig, Keypoint, OrientationConfig, PyramidConfig, SiftConfig,
    ValidatorConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "DogSift CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PyramidConfigJson {
    octaves: usize,
    intervals: usize,
    initial_sigma: f32,
    sigma_step: f32,
    interpolation_sigma: f32,
}

impl Default for PyramidConfigJson {
    fn default() -> Self {
        let cfg = PyramidConfig::default();
        Self {
            octaves: cfg.octaves,
            intervals: cfg.intervals,
            initial_sigma: cfg.initial_sigma,
            sigma_step: cfg.sigma_step,
            interpolation_sigma: cfg.interpolation_sigma,
        }
    }
}

impl From<&PyramidConfigJson> for PyramidConfig {
    fn from(value: &PyramidConfigJson) -> Self {
        Self {
            octaves: value.octaves,
            intervals: value.intervals,
            initial_sigma: value.initial_sigma,
            sigma_step: value.sigma_step,
            interpolation_sigma: value.interpolation_sigma,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectorConfigJson {
    border: usize,
    contrast_threshold: f32,
    curvature_threshold: f32,
    determinant_floor: f32,
    half_window: usize,
    bin_width_deg: f32,
    parallel: bool,
}

impl Default for DetectorConfigJson {
    fn default() -> Self {
        let extrema = ExtremaConfig::default();
        let validator = ValidatorConfig::default();
        let orientation = OrientationConfig::default();
        Self {
            border: extrema.border,
            contrast_threshold: validator.contrast_threshold,
            curvature_threshold: validator.curvature_threshold,
            determinant_floor: validator.determinant_floor,
            half_window: orientation.half_window,
            bin_width_deg: orientation.bin_width_deg,
            parallel: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    output_path: Option<String>,
    descriptors: bool,
    pyramid: PyramidConfigJson,
    detector: DetectorConfigJson,
}

impl Config {
    fn sift_config(&self) -> SiftConfig {
        let d = &self.detector;
        SiftConfig {
            pyramid: PyramidConfig::from(&self.pyramid),
            extrema: ExtremaConfig { border: d.border },
            validator: ValidatorConfig {
                contrast_threshold: d.contrast_threshold,
                curvature_threshold: d.curvature_threshold,
                determinant_floor: d.determinant_floor,
            },
            orientation: OrientationConfig {
                half_window: d.half_window,
                bin_width_deg: d.bin_width_deg,
                ..OrientationConfig::default()
            },
            parallel: d.parallel,
        }
    }
}

#[derive(Debug, Serialize)]
struct KeypointRecord {
    x: usize,
    y: usize,
    octave: usize,
    interval: usize,
    /// Position in input-image pixels.
    image_x: f32,
    image_y: f32,
    orientation_deg: Option<f32>,
    response: f32,
}

impl From<&Keypoint> for KeypointRecord {
    fn from(value: &Keypoint) -> Self {
        let (image_x, image_y) = value.image_point();
        Self {
            x: value.x,
            y: value.y,
            octave: value.octave,
            interval: value.interval,
            image_x,
            image_y,
            orientation_deg: value.orientation,
            response: value.response,
        }
    }
}

#[derive(Debug, Serialize)]
struct DescriptorRecord {
    keypoint: usize,
    values: Vec<f64>,
}

impl From<Descriptor> for DescriptorRecord {
    fn from(value: Descriptor) -> Self {
        Self {
            keypoint: value.keypoint_index(),
            values: value.into_values(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    width: usize,
    height: usize,
    keypoints: Vec<KeypointRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    descriptors: Option<Vec<DescriptorRecord>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("dogsift=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let image = load_gray_image(&config.image_path)?;
    let detector = Detector::new(config.sift_config());
    let detection = detector.detect_image(&image)?;
    tracing::info!(
        keypoints = detection.keypoints.len(),
        with_patch = detection.patches.len(),
        "detection finished"
    );

    let descriptors: Option<Vec<DescriptorRecord>> = config.descriptors.then(|| {
        detector
            .build_descriptors(&detection.patches)
            .into_iter()
            .map(DescriptorRecord::from)
            .collect()
    });
    let output = Output {
        width: image.width(),
        height: image.height(),
        keypoints: detection.keypoints.iter().map(KeypointRecord::from).collect(),
        descriptors,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
