//! Angle helpers shared by orientation voting and descriptor blocks.

use std::f32::consts::TAU;

/// Direction of the gradient `(dx, dy)` in degrees, in `[0, 360)`.
///
/// Negative `atan2` results are shifted by a full turn before scaling.
pub(crate) fn gradient_angle_deg(dx: f32, dy: f32) -> f32 {
    let mut rad = dy.atan2(dx);
    if rad < 0.0 {
        rad += TAU;
    }
    let deg = rad * (360.0 / TAU);
    // A tiny negative angle can round up to a full turn.
    if deg >= 360.0 {
        deg - 360.0
    } else {
        deg
    }
}

/// Gradient magnitude `sqrt(dx^2 + dy^2)`.
pub(crate) fn magnitude(dx: f32, dy: f32) -> f32 {
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::{gradient_angle_deg, magnitude};

    #[test]
    fn gradient_angle_covers_quadrants() {
        assert!(gradient_angle_deg(1.0, 0.0).abs() < 1e-5);
        assert!((gradient_angle_deg(0.0, 1.0) - 90.0).abs() < 1e-4);
        assert!((gradient_angle_deg(-1.0, 0.0) - 180.0).abs() < 1e-4);
        assert!((gradient_angle_deg(0.0, -1.0) - 270.0).abs() < 1e-4);
        assert!((gradient_angle_deg(1.0, -1.0) - 315.0).abs() < 1e-4);
    }

    #[test]
    fn gradient_angle_stays_below_full_turn() {
        let deg = gradient_angle_deg(1.0, -1e-9);
        assert!((0.0..360.0).contains(&deg));
    }

    #[test]
    fn zero_gradient_points_right() {
        assert_eq!(gradient_angle_deg(0.0, 0.0), 0.0);
        assert_eq!(magnitude(0.0, 0.0), 0.0);
        assert!((magnitude(3.0, 4.0) - 5.0).abs() < 1e-6);
    }
}
