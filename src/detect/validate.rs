//! Contrast and principal-curvature filtering of extremum candidates.

use crate::image::GrayImage;
use crate::util::{SiftError, SiftResult};

/// Thresholds for rejecting unstable candidates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatorConfig {
    /// Minimum `|D(x, y)|`; weaker responses are dropped as low contrast.
    pub contrast_threshold: f32,
    /// Maximum `trace^2 / det` of the 2x2 Hessian.
    pub curvature_threshold: f32,
    /// Determinants at or below this floor are rejected before the ratio.
    pub determinant_floor: f32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            contrast_threshold: 0.03,
            curvature_threshold: 10.0,
            determinant_floor: 0.0,
        }
    }
}

impl ValidatorConfig {
    pub fn validate(&self) -> SiftResult<()> {
        if !self.contrast_threshold.is_finite() || self.contrast_threshold < 0.0 {
            return Err(SiftError::InvalidConfig {
                reason: "contrast_threshold must be finite and >= 0",
            });
        }
        if !self.curvature_threshold.is_finite() || self.curvature_threshold <= 0.0 {
            return Err(SiftError::InvalidConfig {
                reason: "curvature_threshold must be finite and > 0",
            });
        }
        if !self.determinant_floor.is_finite() {
            return Err(SiftError::InvalidConfig {
                reason: "determinant_floor must be finite",
            });
        }
        Ok(())
    }
}

/// Outcome of validating one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// `|D| < contrast_threshold`.
    LowContrast,
    /// Hessian determinant at or below the floor.
    DegenerateHessian,
    /// Curvature ratio above the threshold (edge-like response).
    EdgeLike,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

/// True when `(x, y)` has a one-pixel margin on every side of `image`.
pub(crate) fn has_margin(image: &GrayImage, x: usize, y: usize) -> bool {
    x >= 1 && y >= 1 && x + 1 < image.width() && y + 1 < image.height()
}

/// Finite-difference Hessian `(fxx, fyy, fxy)` at column `x`, row `y`.
///
/// # Panics
///
/// Panics when `(x, y)` lacks a one-pixel margin on every side.
pub fn hessian_2x2(image: &GrayImage, x: usize, y: usize) -> (f32, f32, f32) {
    assert!(
        has_margin(image, x, y),
        "hessian at ({x}, {y}) needs a one-pixel margin in a {}x{} image",
        image.width(),
        image.height()
    );
    let center = image.get(x, y);
    let fxx = image.get(x - 1, y) + image.get(x + 1, y) - 2.0 * center;
    let fyy = image.get(x, y - 1) + image.get(x, y + 1) - 2.0 * center;
    let fxy = image.get(x - 1, y - 1) + image.get(x + 1, y + 1)
        - image.get(x - 1, y + 1)
        - image.get(x + 1, y - 1);
    (fxx, fyy, fxy)
}

/// Classifies the candidate at column `x`, row `y` of a difference image.
///
/// # Panics
///
/// Panics when `(x, y)` lacks a one-pixel margin on every side, even if the
/// candidate would be rejected for low contrast.
pub fn classify(image: &GrayImage, x: usize, y: usize, cfg: &ValidatorConfig) -> Verdict {
    assert!(
        has_margin(image, x, y),
        "candidate ({x}, {y}) needs a one-pixel margin in a {}x{} image",
        image.width(),
        image.height()
    );
    if image.get(x, y).abs() < cfg.contrast_threshold {
        return Verdict::LowContrast;
    }
    let (fxx, fyy, fxy) = hessian_2x2(image, x, y);
    let trace = fxx + fyy;
    let det = fxx * fyy - fxy * fxy;
    if det <= cfg.determinant_floor {
        return Verdict::DegenerateHessian;
    }
    if trace * trace / det > cfg.curvature_threshold {
        return Verdict::EdgeLike;
    }
    Verdict::Accepted
}
