//! Gradient patches and dominant-orientation assignment.
//!
//! For each keypoint a `2W x 2W` window centered on it is sampled from the
//! keypoint's own difference image. Central differences give `(dx, dy)` per
//! pixel; the resulting magnitude/angle grids form the [`GradientPatch`]. The
//! orientation is the center of the fullest bin of an unweighted angle
//! histogram. Keypoints whose window (plus the one-pixel difference reach)
//! leaves the image keep `orientation == None` and get no patch.

use crate::histogram::AngleHistogram;
use crate::image::dog::DogPyramid;
use crate::image::GrayImage;
use crate::keypoint::Keypoint;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{gradient_angle_deg, magnitude};
use crate::util::{SiftError, SiftResult};

/// Side of the square descriptor blocks; patch sides must be a multiple of it.
pub const PATCH_BLOCK: usize = 4;

/// Orientation window and histogram parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationConfig {
    /// Half side `W` of the sampled window; the patch is `2W x 2W`.
    pub half_window: usize,
    /// Histogram bin width in degrees.
    pub bin_width_deg: f32,
    /// Upper end of the angular domain in degrees.
    pub max_angle_deg: f32,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            half_window: 8,
            bin_width_deg: 10.0,
            max_angle_deg: 360.0,
        }
    }
}

impl OrientationConfig {
    pub fn validate(&self) -> SiftResult<()> {
        if self.half_window == 0 || (2 * self.half_window) % PATCH_BLOCK != 0 {
            return Err(SiftError::InvalidConfig {
                reason: "half_window must be a positive multiple of 2",
            });
        }
        // Gradient angles cover the full turn.
        if self.max_angle_deg < 360.0 {
            return Err(SiftError::InvalidConfig {
                reason: "max_angle_deg must cover the full turn (>= 360)",
            });
        }
        AngleHistogram::new(self.bin_width_deg, self.max_angle_deg).map(|_| ())
    }

    /// Side of the square gradient patch.
    pub fn patch_side(&self) -> usize {
        2 * self.half_window
    }
}

/// Gradient magnitudes and angles sampled around one keypoint.
///
/// Both grids are row-major, `side x side`; entry `(col, row)` was sampled at
/// `(x - W + col, y - W + row)` in the keypoint's difference image.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientPatch {
    keypoint_index: usize,
    side: usize,
    magnitudes: Vec<f32>,
    angles: Vec<f32>,
}

impl GradientPatch {
    /// Wraps precomputed grids. `side` must be a positive multiple of
    /// [`PATCH_BLOCK`] and angles must lie in `[0, 360)`.
    pub fn new(
        keypoint_index: usize,
        side: usize,
        magnitudes: Vec<f32>,
        angles: Vec<f32>,
    ) -> SiftResult<Self> {
        if side == 0 || side % PATCH_BLOCK != 0 {
            return Err(SiftError::InvalidConfig {
                reason: "patch side must be a positive multiple of 4",
            });
        }
        let needed = side * side;
        for got in [magnitudes.len(), angles.len()] {
            if got != needed {
                return Err(SiftError::BufferTooSmall { needed, got });
            }
        }
        if angles.iter().any(|a| !(0.0..360.0).contains(a)) {
            return Err(SiftError::InvalidConfig {
                reason: "patch angles must lie in [0, 360)",
            });
        }
        Ok(Self {
            keypoint_index,
            side,
            magnitudes,
            angles,
        })
    }

    /// Index of the owning keypoint in the detection's keypoint list.
    pub fn keypoint_index(&self) -> usize {
        self.keypoint_index
    }

    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn angle(&self, col: usize, row: usize) -> f32 {
        self.angles[row * self.side + col]
    }

    #[inline]
    pub fn magnitude(&self, col: usize, row: usize) -> f32 {
        self.magnitudes[row * self.side + col]
    }

    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }
}

/// Samples the gradient patch around column `x`, row `y`.
///
/// Returns `None` when the window plus its one-pixel difference reach does
/// not fit: requires `x >= W + 1` and `x + W + 1 <= width`, same for rows.
pub fn gradient_patch(
    image: &GrayImage,
    x: usize,
    y: usize,
    half_window: usize,
    keypoint_index: usize,
) -> Option<GradientPatch> {
    let w = half_window;
    if x < w + 1 || y < w + 1 || x + w + 1 > image.width() || y + w + 1 > image.height() {
        return None;
    }
    let side = 2 * w;
    let mut magnitudes = Vec::with_capacity(side * side);
    let mut angles = Vec::with_capacity(side * side);
    for row in 0..side {
        let py = y - w + row;
        for col in 0..side {
            let px = x - w + col;
            let dx = image.get(px + 1, py) - image.get(px - 1, py);
            let dy = image.get(px, py + 1) - image.get(px, py - 1);
            magnitudes.push(magnitude(dx, dy));
            angles.push(gradient_angle_deg(dx, dy));
        }
    }
    Some(GradientPatch {
        keypoint_index,
        side,
        magnitudes,
        angles,
    })
}

/// Center of the fullest unweighted angle bin of `patch`.
pub fn dominant_orientation(patch: &GradientPatch, cfg: &OrientationConfig) -> SiftResult<f32> {
    cfg.validate()?;
    let mut hist = AngleHistogram::new(cfg.bin_width_deg, cfg.max_angle_deg)?;
    hist.extend(patch.angles().iter().copied());
    let (bin, _) = hist.peak();
    Ok(hist.bin_center(bin))
}

/// Assigns orientations in place and returns the patches of keypoints that
/// received one, in keypoint order.
pub fn assign_orientations(
    keypoints: &mut [Keypoint],
    dog: &DogPyramid,
    cfg: &OrientationConfig,
) -> SiftResult<Vec<GradientPatch>> {
    assign_orientations_with(keypoints, dog, cfg, false)
}

/// Parallel variant of [`assign_orientations`] with identical output.
#[cfg(feature = "rayon")]
pub fn assign_orientations_par(
    keypoints: &mut [Keypoint],
    dog: &DogPyramid,
    cfg: &OrientationConfig,
) -> SiftResult<Vec<GradientPatch>> {
    assign_orientations_with(keypoints, dog, cfg, true)
}

type Oriented = Option<(f32, GradientPatch)>;

pub(crate) fn assign_orientations_with(
    keypoints: &mut [Keypoint],
    dog: &DogPyramid,
    cfg: &OrientationConfig,
    parallel: bool,
) -> SiftResult<Vec<GradientPatch>> {
    cfg.validate()?;
    let _span = trace_span!(
        "assign_orientations",
        keypoints = keypoints.len(),
        parallel = parallel
    )
    .entered();

    let results = orient_all(keypoints, dog, cfg, parallel)?;

    let mut patches = Vec::with_capacity(results.len());
    for (kp, result) in keypoints.iter_mut().zip(results) {
        if let Some((angle, patch)) = result {
            kp.orientation = Some(angle);
            patches.push(patch);
        }
    }

    trace_event!(
        "orientations_assigned",
        with_patch = patches.len(),
        without_patch = keypoints.len() - patches.len()
    );
    Ok(patches)
}

fn orient_all(
    keypoints: &[Keypoint],
    dog: &DogPyramid,
    cfg: &OrientationConfig,
    parallel: bool,
) -> SiftResult<Vec<Oriented>> {
    #[cfg(feature = "rayon")]
    if parallel {
        use rayon::prelude::*;
        return keypoints
            .par_iter()
            .enumerate()
            .map(|(idx, kp)| orient_one(idx, kp, dog, cfg))
            .collect();
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    keypoints
        .iter()
        .enumerate()
        .map(|(idx, kp)| orient_one(idx, kp, dog, cfg))
        .collect()
}

fn orient_one(
    index: usize,
    kp: &Keypoint,
    dog: &DogPyramid,
    cfg: &OrientationConfig,
) -> SiftResult<Oriented> {
    let image = dog
        .image(kp.octave, kp.interval)
        .ok_or(SiftError::KeypointOutOfRange {
            index,
            octave: kp.octave,
            interval: kp.interval,
        })?;
    let Some(patch) = gradient_patch(image, kp.x, kp.y, cfg.half_window, index) else {
        return Ok(None);
    };
    let angle = dominant_orientation(&patch, cfg)?;
    Ok(Some((angle, patch)))
}

#[cfg(test)]
mod tests {
    use super::{
        assign_orientations, dominant_orientation, gradient_patch, GradientPatch,
        OrientationConfig,
    };
    use crate::image::dog::DogPyramid;
    use crate::image::pyramid::{GaussianPyramid, PyramidConfig};
    use crate::image::GrayImage;
    use crate::keypoint::Keypoint;
    use crate::util::SiftError;

    #[test]
    fn window_must_fit_with_difference_reach() {
        let img = GrayImage::from_fn(20, 20, |x, _| x as f32);
        assert!(gradient_patch(&img, 9, 9, 8, 0).is_some());
        assert!(gradient_patch(&img, 8, 9, 8, 0).is_none());
        assert!(gradient_patch(&img, 11, 9, 8, 0).is_some());
        assert!(gradient_patch(&img, 12, 9, 8, 0).is_none());
        assert!(gradient_patch(&img, 9, 12, 8, 0).is_none());
    }

    #[test]
    fn horizontal_ramp_points_right() {
        let img = GrayImage::from_fn(20, 20, |x, _| 0.01 * x as f32);
        let patch = gradient_patch(&img, 10, 10, 4, 3).unwrap();
        assert_eq!(patch.side(), 8);
        assert_eq!(patch.keypoint_index(), 3);
        for &a in patch.angles() {
            assert!(a < 1e-3);
        }
        assert!((patch.magnitude(0, 0) - 0.02).abs() < 1e-5);
        let angle = dominant_orientation(&patch, &OrientationConfig::default()).unwrap();
        assert_eq!(angle, 5.0);
    }

    #[test]
    fn vertical_ramp_points_down() {
        let img = GrayImage::from_fn(20, 20, |_, y| 0.01 * y as f32);
        let patch = gradient_patch(&img, 10, 10, 4, 0).unwrap();
        assert!((patch.angle(2, 5) - 90.0).abs() < 1e-3);
        let angle = dominant_orientation(&patch, &OrientationConfig::default()).unwrap();
        assert_eq!(angle, 95.0);
    }

    #[test]
    fn patch_samples_offsets_from_keypoint() {
        // dx at (col, row) reflects the column x - W + col.
        let img = GrayImage::from_fn(24, 24, |x, _| (x * x) as f32 * 0.001);
        let patch = gradient_patch(&img, 12, 12, 4, 0).unwrap();
        let px = 12 - 4 + 3;
        let expected = ((px + 1) * (px + 1)) as f32 * 0.001 - ((px - 1) * (px - 1)) as f32 * 0.001;
        assert!((patch.magnitude(3, 6) - expected).abs() < 1e-5);
    }

    #[test]
    fn config_rejects_odd_half_window() {
        let cfg = OrientationConfig {
            half_window: 3,
            ..OrientationConfig::default()
        };
        assert_eq!(
            cfg.validate().unwrap_err(),
            SiftError::InvalidConfig {
                reason: "half_window must be a positive multiple of 2",
            }
        );
    }

    #[test]
    fn config_rejects_partial_angular_domain() {
        let cfg = OrientationConfig {
            max_angle_deg: 180.0,
            ..OrientationConfig::default()
        };
        let expected = SiftError::InvalidConfig {
            reason: "max_angle_deg must cover the full turn (>= 360)",
        };
        assert_eq!(cfg.validate().unwrap_err(), expected);

        // Every gradient points up (270 deg), outside a half-turn domain.
        let img = GrayImage::from_fn(20, 20, |_, y| 1.0 - 0.01 * y as f32);
        let patch = gradient_patch(&img, 10, 10, 4, 0).unwrap();
        assert!((patch.angle(0, 0) - 270.0).abs() < 1e-3);
        assert_eq!(dominant_orientation(&patch, &cfg).unwrap_err(), expected);
        let angle = dominant_orientation(&patch, &OrientationConfig::default()).unwrap();
        assert_eq!(angle, 275.0);
    }

    #[test]
    fn missing_difference_image_is_reported() {
        let img = GrayImage::from_fn(32, 32, |x, y| ((x * 5 + y * 3) % 7) as f32 / 7.0);
        let cfg = PyramidConfig {
            octaves: 1,
            intervals: 2,
            ..PyramidConfig::default()
        };
        let dog = DogPyramid::build(&GaussianPyramid::build(&img, &cfg).unwrap()).unwrap();

        // Octave 0 holds intervals 0..=3; interval 4 does not exist.
        let mut keypoints = vec![
            Keypoint::new(16, 16, 0, 1, 0.1),
            Keypoint::new(16, 16, 0, 4, 0.1),
        ];
        let err = assign_orientations(&mut keypoints, &dog, &OrientationConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            SiftError::KeypointOutOfRange {
                index: 1,
                octave: 0,
                interval: 4,
            }
        );

        let mut keypoints = vec![Keypoint::new(16, 16, 1, 1, 0.1)];
        let err = assign_orientations(&mut keypoints, &dog, &OrientationConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            SiftError::KeypointOutOfRange {
                index: 0,
                octave: 1,
                interval: 1,
            }
        );
    }

    #[test]
    fn patch_constructor_checks_geometry() {
        assert!(GradientPatch::new(0, 4, vec![0.0; 16], vec![0.0; 16]).is_ok());
        assert_eq!(
            GradientPatch::new(0, 4, vec![0.0; 16], vec![0.0; 15]).unwrap_err(),
            SiftError::BufferTooSmall { needed: 16, got: 15 }
        );
        assert!(GradientPatch::new(0, 6, vec![0.0; 36], vec![0.0; 36]).is_err());
        assert!(GradientPatch::new(0, 4, vec![0.0; 16], vec![360.0; 16]).is_err());
    }
}
