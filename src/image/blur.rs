//! Separable Gaussian blur over `GrayImage`.
//!
//! The kernel radius is `ceil(3 * sigma)` and taps are normalized to unit sum.
//! Samples outside the image are mirrored without repeating the edge sample
//! (reflect-101), so a constant image stays exactly constant.

use crate::image::GrayImage;
use crate::util::{SiftError, SiftResult};

/// Largest accepted blur sigma; the kernel then has `2 * 768 + 1` taps.
pub const MAX_BLUR_SIGMA: f32 = 256.0;

/// Builds a normalized 1D Gaussian kernel of length `2 * ceil(3 * sigma) + 1`.
pub fn gaussian_kernel(sigma: f32) -> SiftResult<Vec<f32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(SiftError::InvalidConfig {
            reason: "blur sigma must be finite and > 0",
        });
    }
    if sigma > MAX_BLUR_SIGMA {
        return Err(SiftError::InvalidConfig {
            reason: "blur sigma exceeds MAX_BLUR_SIGMA",
        });
    }
    let sigma = f64::from(sigma);
    let radius = (3.0 * sigma).ceil() as i64;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let taps: Vec<f64> = (-radius..=radius)
        .map(|i| {
            let x = i as f64;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();
    let sum: f64 = taps.iter().sum();
    Ok(taps.into_iter().map(|w| (w / sum) as f32).collect())
}

/// Blurs `image` with an isotropic Gaussian of standard deviation `sigma`.
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> SiftResult<GrayImage> {
    let kernel = gaussian_kernel(sigma)?;
    let horizontal = filter_rows(image, &kernel);
    Ok(filter_columns(&horizontal, &kernel))
}

/// Mirrors `i` into `0..n` without repeating the edge sample.
#[inline]
fn reflect_101(mut i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    // Kernels wider than the image need more than one bounce.
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * n - i - 2;
        }
    }
    i as usize
}

fn filter_rows(image: &GrayImage, kernel: &[f32]) -> GrayImage {
    let width = image.width();
    let height = image.height();
    let radius = (kernel.len() / 2) as isize;
    let mut out = GrayImage::zeros(width, height);
    for y in 0..height {
        let src = image.row(y);
        let dst = out.row_mut(y);
        for (x, value) in dst.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = reflect_101(x as isize + k as isize - radius, width);
                acc += src[sx] * w;
            }
            *value = acc;
        }
    }
    out
}

fn filter_columns(image: &GrayImage, kernel: &[f32]) -> GrayImage {
    let width = image.width();
    let height = image.height();
    let radius = (kernel.len() / 2) as isize;
    let mut out = GrayImage::zeros(width, height);
    for y in 0..height {
        let dst = out.row_mut(y);
        for (x, value) in dst.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = reflect_101(y as isize + k as isize - radius, height);
                acc += image.get(x, sy) * w;
            }
            *value = acc;
        }
    }
    out
}
