//! Keypoint record shared by every detection stage.

/// A scale-space extremum that survived the contrast and edge tests.
///
/// Positions are integer pixel coordinates inside the keypoint's own octave:
/// `x` is the column and `y` the row. Stages after detection update fields in
/// place; keypoints are never replaced or reordered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    /// Column within the octave image.
    pub x: usize,
    /// Row within the octave image.
    pub y: usize,
    /// Octave index (0 is full resolution).
    pub octave: usize,
    /// Difference-of-Gaussian interval the extremum was found in; doubles as
    /// the scale label.
    pub interval: usize,
    /// Dominant gradient direction in degrees, `[0, 360)`.
    ///
    /// `None` when the orientation window does not fit inside the image.
    pub orientation: Option<f32>,
    /// Difference-of-Gaussian value at the extremum.
    pub response: f32,
}

impl Keypoint {
    pub fn new(x: usize, y: usize, octave: usize, interval: usize, response: f32) -> Self {
        Self {
            x,
            y,
            octave,
            interval,
            orientation: None,
            response,
        }
    }

    /// Position in base-image pixels, scaled by `2^octave`.
    pub fn image_point(&self) -> (f32, f32) {
        let scale = (1u64 << self.octave.min(63)) as f32;
        (self.x as f32 * scale, self.y as f32 * scale)
    }

    /// Whether the orientation stage assigned a direction.
    pub fn has_orientation(&self) -> bool {
        self.orientation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::Keypoint;

    #[test]
    fn image_point_scales_by_octave() {
        let kp = Keypoint::new(5, 7, 2, 1, 0.1);
        assert_eq!(kp.image_point(), (20.0, 28.0));
        assert!(!kp.has_orientation());
    }
}
