//! Gaussian scale-space pyramid.
//!
//! Every octave holds `intervals + 3` blurred copies of the octave base. Each
//! interval is blurred directly from the base with its absolute sigma
//! `initial_sigma * sigma_step^j`; the schedule restarts for every octave.
//! The next octave's base is the current base blurred with the interpolation
//! sigma and decimated: every second column is kept first, then every second
//! row, giving `floor(w / 2) x floor(h / 2)`.

use crate::image::blur::{gaussian_blur, MAX_BLUR_SIGMA};
use crate::image::GrayImage;
use crate::trace::{trace_event, trace_span};
use crate::util::{SiftError, SiftResult};

/// Smallest octave side that still leaves a 3x3 neighborhood.
pub const MIN_OCTAVE_SIZE: usize = 3;

/// Parameters controlling pyramid construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PyramidConfig {
    /// Number of octaves (resolution levels).
    pub octaves: usize,
    /// Number of intervals per octave; each octave stores `intervals + 3` images.
    pub intervals: usize,
    /// Blur of interval 0 in every octave.
    pub initial_sigma: f32,
    /// Multiplicative sigma increment between consecutive intervals.
    pub sigma_step: f32,
    /// Blur applied before decimating a base image to the next octave.
    pub interpolation_sigma: f32,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            intervals: 3,
            initial_sigma: 1.6,
            sigma_step: std::f32::consts::SQRT_2,
            interpolation_sigma: 0.5,
        }
    }
}

impl PyramidConfig {
    /// Validates counts and sigma parameters.
    pub fn validate(&self) -> SiftResult<()> {
        if self.octaves == 0 {
            return Err(SiftError::InvalidConfig {
                reason: "octaves must be >= 1",
            });
        }
        if self.intervals == 0 {
            return Err(SiftError::InvalidConfig {
                reason: "intervals must be >= 1",
            });
        }
        if !self.initial_sigma.is_finite() || self.initial_sigma <= 0.0 {
            return Err(SiftError::InvalidConfig {
                reason: "initial_sigma must be finite and > 0",
            });
        }
        if !self.sigma_step.is_finite() || self.sigma_step <= 1.0 {
            return Err(SiftError::InvalidConfig {
                reason: "sigma_step must be finite and > 1",
            });
        }
        if !self.interpolation_sigma.is_finite() || self.interpolation_sigma <= 0.0 {
            return Err(SiftError::InvalidConfig {
                reason: "interpolation_sigma must be finite and > 0",
            });
        }
        let largest = self.sigma_at(self.images_per_octave() - 1);
        if !largest.is_finite()
            || largest > MAX_BLUR_SIGMA
            || self.interpolation_sigma > MAX_BLUR_SIGMA
        {
            return Err(SiftError::InvalidConfig {
                reason: "interval sigmas exceed MAX_BLUR_SIGMA",
            });
        }
        Ok(())
    }

    /// Absolute blur of interval `j` within any octave.
    pub fn sigma_at(&self, interval: usize) -> f32 {
        self.initial_sigma * self.sigma_step.powi(interval as i32)
    }

    /// Number of blurred images stored per octave.
    pub fn images_per_octave(&self) -> usize {
        self.intervals + 3
    }
}

/// One resolution level: `intervals + 3` equally sized blurred images.
#[derive(Clone, Debug)]
pub struct Octave {
    images: Vec<GrayImage>,
}

impl Octave {
    pub(crate) fn from_images(images: Vec<GrayImage>) -> Self {
        Self { images }
    }

    /// All interval images, least blurred first.
    pub fn images(&self) -> &[GrayImage] {
        &self.images
    }

    pub fn image(&self, interval: usize) -> Option<&GrayImage> {
        self.images.get(interval)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// `(width, height)` shared by every interval of the octave.
    pub fn size(&self) -> (usize, usize) {
        self.images
            .first()
            .map(|img| (img.width(), img.height()))
            .unwrap_or((0, 0))
    }
}

/// Multi-octave, multi-interval Gaussian pyramid.
#[derive(Clone, Debug)]
pub struct GaussianPyramid {
    octaves: Vec<Octave>,
    intervals: usize,
}

impl GaussianPyramid {
    /// Builds the pyramid from a single-channel base image.
    ///
    /// Fails fast with `DegeneratePyramid` when any octave would shrink below
    /// `MIN_OCTAVE_SIZE` on either axis.
    pub fn build(base: &GrayImage, cfg: &PyramidConfig) -> SiftResult<Self> {
        Self::build_with(base, cfg, false)
    }

    /// Same as [`GaussianPyramid::build`], blurring the intervals of each
    /// octave in parallel.
    #[cfg(feature = "rayon")]
    pub fn build_par(base: &GrayImage, cfg: &PyramidConfig) -> SiftResult<Self> {
        Self::build_with(base, cfg, true)
    }

    pub(crate) fn build_with(
        base: &GrayImage,
        cfg: &PyramidConfig,
        parallel: bool,
    ) -> SiftResult<Self> {
        cfg.validate()?;
        check_octave_sizes(base.width(), base.height(), cfg.octaves)?;

        let _span = trace_span!(
            "build_pyramid",
            octaves = cfg.octaves,
            intervals = cfg.intervals,
            width = base.width(),
            height = base.height()
        )
        .entered();

        let mut octaves = Vec::with_capacity(cfg.octaves);
        let mut octave_base = base.clone();
        for octave in 0..cfg.octaves {
            let images = blur_intervals(&octave_base, cfg, parallel)?;
            trace_event!(
                "octave_built",
                octave = octave,
                width = octave_base.width(),
                height = octave_base.height()
            );
            octaves.push(Octave::from_images(images));
            if octave + 1 < cfg.octaves {
                octave_base = down_sample(&octave_base, cfg.interpolation_sigma)?;
            }
        }

        Ok(Self {
            octaves,
            intervals: cfg.intervals,
        })
    }

    pub fn octaves(&self) -> &[Octave] {
        &self.octaves
    }

    pub fn octave(&self, index: usize) -> Option<&Octave> {
        self.octaves.get(index)
    }

    /// Interval count the pyramid was built with (not the stored image count).
    pub fn intervals(&self) -> usize {
        self.intervals
    }
}

fn check_octave_sizes(width: usize, height: usize, octaves: usize) -> SiftResult<()> {
    let (mut w, mut h) = (width, height);
    for octave in 0..octaves {
        if w < MIN_OCTAVE_SIZE || h < MIN_OCTAVE_SIZE {
            return Err(SiftError::DegeneratePyramid {
                octave,
                width: w,
                height: h,
            });
        }
        w /= 2;
        h /= 2;
    }
    Ok(())
}

fn blur_intervals(
    base: &GrayImage,
    cfg: &PyramidConfig,
    parallel: bool,
) -> SiftResult<Vec<GrayImage>> {
    #[cfg(feature = "rayon")]
    if parallel {
        use rayon::prelude::*;
        return (0..cfg.images_per_octave())
            .into_par_iter()
            .map(|j| gaussian_blur(base, cfg.sigma_at(j)))
            .collect();
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    (0..cfg.images_per_octave())
        .map(|j| gaussian_blur(base, cfg.sigma_at(j)))
        .collect()
}

/// Halves resolution: blur, keep even columns, then keep even rows.
pub fn down_sample(image: &GrayImage, interpolation_sigma: f32) -> SiftResult<GrayImage> {
    let blurred = gaussian_blur(image, interpolation_sigma)?;
    let columns = keep_even_columns(&blurred);
    Ok(keep_even_rows(&columns))
}

fn keep_even_columns(image: &GrayImage) -> GrayImage {
    let width = image.width() / 2;
    GrayImage::from_fn(width, image.height(), |x, y| image.get(2 * x, y))
}

fn keep_even_rows(image: &GrayImage) -> GrayImage {
    let height = image.height() / 2;
    GrayImage::from_fn(image.width(), height, |x, y| image.get(x, 2 * y))
}
