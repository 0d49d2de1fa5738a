//! End-to-end detection: pyramid, differences, extrema, orientation.
//!
//! `Detector` owns only its configuration. Everything a run produces (the
//! keypoints and the gradient patches needed for descriptors) is returned
//! in a [`Detection`], so one detector can serve many images, concurrently
//! if desired.

use crate::descriptor::{self, Descriptor};
use crate::detect::validate::ValidatorConfig;
use crate::detect::{self, DetectionStats, ExtremaConfig};
use crate::image::dog::DogPyramid;
use crate::image::pyramid::{GaussianPyramid, PyramidConfig};
use crate::image::{GrayImage, ImageView};
use crate::keypoint::Keypoint;
use crate::orient::{self, GradientPatch, OrientationConfig};
use crate::trace::{trace_event, trace_span};
use crate::util::{SiftError, SiftResult};

/// Complete detector configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SiftConfig {
    pub pyramid: PyramidConfig,
    pub extrema: ExtremaConfig,
    pub validator: ValidatorConfig,
    pub orientation: OrientationConfig,
    /// Run stages on the rayon pool (only honored with the `rayon` feature).
    pub parallel: bool,
}

impl SiftConfig {
    /// Default thresholds with the given octave and interval counts.
    pub fn with_scales(octaves: usize, intervals: usize) -> Self {
        Self {
            pyramid: PyramidConfig {
                octaves,
                intervals,
                ..PyramidConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SiftResult<()> {
        self.pyramid.validate()?;
        self.extrema.validate()?;
        self.validator.validate()?;
        self.orientation.validate()
    }
}

/// Result of one detection run.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Keypoints in octave, interval, row, column order.
    pub keypoints: Vec<Keypoint>,
    /// Patches of keypoints with an orientation, in keypoint order.
    pub patches: Vec<GradientPatch>,
    pub stats: DetectionStats,
}

impl Detection {
    /// Builds one descriptor per patch; see [`crate::build_descriptors`].
    pub fn descriptors(&self) -> Vec<Descriptor> {
        descriptor::build_descriptors(&self.patches)
    }

    /// Keypoints paired with their descriptors, skipping keypoints without a patch.
    pub fn described(&self) -> impl Iterator<Item = (&Keypoint, Descriptor)> + '_ {
        self.patches.iter().filter_map(|patch| {
            let kp = self.keypoints.get(patch.keypoint_index())?;
            Some((kp, descriptor::build_descriptor(patch)))
        })
    }
}

/// Scale-space keypoint detector.
#[derive(Clone, Debug, Default)]
pub struct Detector {
    cfg: SiftConfig,
}

impl Detector {
    pub fn new(cfg: SiftConfig) -> Self {
        Self { cfg }
    }

    pub fn with_config(mut self, cfg: SiftConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &SiftConfig {
        &self.cfg
    }

    /// Detects keypoints in a single-channel image normalized to `[0, 1]`.
    pub fn detect(&self, image: ImageView<'_, f32>) -> SiftResult<Detection> {
        let base = GrayImage::from_view(image)?;
        self.detect_image(&base)
    }

    /// Same as [`Detector::detect`] for an owned image.
    pub fn detect_image(&self, image: &GrayImage) -> SiftResult<Detection> {
        self.cfg.validate()?;
        check_finite(image)?;
        let parallel = self.cfg.parallel && cfg!(feature = "rayon");

        let _span = trace_span!(
            "detect",
            width = image.width(),
            height = image.height(),
            parallel = parallel
        )
        .entered();

        let pyramid = GaussianPyramid::build_with(image, &self.cfg.pyramid, parallel)?;
        let dog = DogPyramid::build(&pyramid)?;
        let (mut keypoints, mut stats) = detect::find_keypoints_with(
            &dog,
            &self.cfg.extrema,
            &self.cfg.validator,
            parallel,
        )?;
        let patches = orient::assign_orientations_with(
            &mut keypoints,
            &dog,
            &self.cfg.orientation,
            parallel,
        )?;
        stats.without_patch = keypoints.len() - patches.len();

        trace_event!(
            "detect_done",
            keypoints = keypoints.len(),
            with_patch = patches.len()
        );
        Ok(Detection {
            keypoints,
            patches,
            stats,
        })
    }

    /// Builds descriptors for `patches`, honoring the `parallel` setting.
    pub fn build_descriptors(&self, patches: &[GradientPatch]) -> Vec<Descriptor> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return descriptor::build_descriptors_par(patches);
        }
        descriptor::build_descriptors(patches)
    }
}

fn check_finite(image: &GrayImage) -> SiftResult<()> {
    for y in 0..image.height() {
        if let Some(x) = image.row(y).iter().position(|v| !v.is_finite()) {
            return Err(SiftError::NonFiniteInput { x, y });
        }
    }
    Ok(())
}

/// Runs the full pipeline with default thresholds.
///
/// `image` must be single-channel and normalized to `[0, 1]`. Keypoints near
/// the border may come back with `orientation == None` and no patch.
pub fn detect(
    image: ImageView<'_, f32>,
    octaves: usize,
    intervals: usize,
) -> SiftResult<Detection> {
    Detector::new(SiftConfig::with_scales(octaves, intervals)).detect(image)
}
