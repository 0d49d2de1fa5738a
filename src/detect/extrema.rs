//! 3x3x3 scale-space extremum test.

use crate::detect::validate::has_margin;
use crate::image::GrayImage;

/// Returns true when `current(x, y)` is a strict extremum of its 26 neighbors.
///
/// Positive samples must exceed every neighbor and non-positive samples must
/// be below every neighbor; any tie disqualifies the pixel.
///
/// # Panics
///
/// Panics when the three layers differ in size or `(x, y)` lacks a
/// one-pixel margin on every side.
pub fn is_extremum(
    below: &GrayImage,
    current: &GrayImage,
    above: &GrayImage,
    x: usize,
    y: usize,
) -> bool {
    let size = (current.width(), current.height());
    assert!(
        (below.width(), below.height()) == size && (above.width(), above.height()) == size,
        "extremum layers must share one size"
    );
    assert!(
        has_margin(current, x, y),
        "extremum test at ({x}, {y}) needs a one-pixel margin"
    );
    let value = current.get(x, y);
    let layers = [below, current, above];
    if value > 0.0 {
        all_neighbors(&layers, x, y, |n| value > n)
    } else {
        all_neighbors(&layers, x, y, |n| value < n)
    }
}

#[inline]
fn all_neighbors(
    layers: &[&GrayImage; 3],
    x: usize,
    y: usize,
    mut beats: impl FnMut(f32) -> bool,
) -> bool {
    for (layer_idx, layer) in layers.iter().enumerate() {
        for ny in y - 1..=y + 1 {
            let row = layer.row(ny);
            for (nx, &n) in row.iter().enumerate().take(x + 2).skip(x - 1) {
                if layer_idx == 1 && nx == x && ny == y {
                    continue;
                }
                if !beats(n) {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::is_extremum;
    use crate::image::GrayImage;

    fn flat(value: f32) -> GrayImage {
        GrayImage::from_fn(3, 3, |_, _| value)
    }

    fn peak(center: f32, rest: f32) -> GrayImage {
        GrayImage::from_fn(3, 3, |x, y| if (x, y) == (1, 1) { center } else { rest })
    }

    #[test]
    fn strict_maximum_is_found() {
        assert!(is_extremum(&flat(0.1), &peak(0.5, 0.2), &flat(0.3), 1, 1));
    }

    #[test]
    fn strict_minimum_is_found() {
        assert!(is_extremum(&flat(-0.1), &peak(-0.5, -0.2), &flat(0.0), 1, 1));
    }

    #[test]
    fn tie_with_scale_neighbor_disqualifies() {
        // Same value directly below the center.
        let below = peak(0.5, 0.1);
        assert!(!is_extremum(&below, &peak(0.5, 0.2), &flat(0.3), 1, 1));
    }

    #[test]
    fn tie_with_spatial_neighbor_disqualifies() {
        let mut current = peak(0.5, 0.2);
        current.set(2, 0, 0.5);
        assert!(!is_extremum(&flat(0.1), &current, &flat(0.3), 1, 1));
    }

    #[test]
    fn zero_plane_is_never_an_extremum() {
        assert!(!is_extremum(&flat(0.0), &flat(0.0), &flat(0.0), 1, 1));
    }

    #[test]
    fn positive_value_below_a_neighbor_is_not_a_minimum() {
        // Positive center is only tested as a maximum.
        assert!(!is_extremum(&flat(0.9), &peak(0.1, 0.9), &flat(0.9), 1, 1));
    }

    #[test]
    #[should_panic(expected = "one-pixel margin")]
    fn edge_pixel_panics() {
        is_extremum(&flat(0.1), &peak(0.5, 0.2), &flat(0.3), 0, 1);
    }

    #[test]
    #[should_panic(expected = "share one size")]
    fn mismatched_layers_panic() {
        let wide = GrayImage::from_fn(4, 3, |_, _| 0.1);
        is_extremum(&wide, &peak(0.5, 0.2), &flat(0.3), 1, 1);
    }
}
