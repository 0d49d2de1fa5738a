//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Loaded images are
//! converted to luma and min-max normalized into `[0, 1]`, which is the input
//! contract of the detector.

use crate::image::GrayImage;
use crate::util::{SiftError, SiftResult};
use std::path::Path;

/// Converts a float luma buffer to a `GrayImage` without rescaling.
pub fn gray_from_luma32f(
    img: &image::ImageBuffer<image::Luma<f32>, Vec<f32>>,
) -> SiftResult<GrayImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    GrayImage::new(img.as_raw().clone(), width, height)
}

/// Converts any dynamic image to a normalized single-channel image.
pub fn gray_from_dynamic_image(img: &image::DynamicImage) -> SiftResult<GrayImage> {
    let luma = img.to_luma32f();
    Ok(gray_from_luma32f(&luma)?.normalize_min_max())
}

/// Loads an image from disk as a normalized single-channel image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> SiftResult<GrayImage> {
    let img = image::open(path).map_err(|err| SiftError::ImageIo {
        reason: err.to_string(),
    })?;
    gray_from_dynamic_image(&img)
}
