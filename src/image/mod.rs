//! Image views and owned single-channel float images.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. `GrayImage` is the
//! owned, contiguous `f32` buffer every pipeline stage produces.
//!
//! Coordinates are always `(x, y)` with `x` the column and `y` the row.

use crate::util::{SiftError, SiftResult};

pub mod blur;
pub mod dog;
#[cfg(feature = "image-io")]
pub mod io;
pub mod pyramid;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> SiftResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> SiftResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(SiftError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> SiftResult<usize> {
    if width == 0 || height == 0 {
        return Err(SiftError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(SiftError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(SiftError::InvalidDimensions { width, height })?;
    Ok(needed)
}

/// Owned contiguous single-channel `f32` image.
///
/// Pipeline stages never mutate an image they were handed; each produces a
/// new `GrayImage` instead.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl GrayImage {
    /// Wraps a row-major buffer of exactly `width * height` samples.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> SiftResult<Self> {
        if width == 0 || height == 0 {
            return Err(SiftError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(SiftError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(SiftError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(SiftError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copies a (possibly strided) view into a contiguous image.
    pub fn from_view(view: ImageView<'_, f32>) -> SiftResult<Self> {
        let width = view.width();
        let height = view.height();
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = view.row(y).ok_or(SiftError::BufferTooSmall {
                needed: y * view.stride() + width,
                got: view.data.len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    pub(crate) fn zeros(width: usize, height: usize) -> Self {
        Self {
            data: vec![0.0; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw row-major samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Sample at column `x`, row `y`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Row `y` as a slice of `width` samples.
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, f32> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Pixelwise `self - other`.
    pub fn sub(&self, other: &GrayImage) -> SiftResult<GrayImage> {
        if self.width != other.width || self.height != other.height {
            return Err(SiftError::InvalidDimensions {
                width: other.width,
                height: other.height,
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a - b)
            .collect();
        Ok(Self {
            data,
            width: self.width,
            height: self.height,
        })
    }

    /// Linearly rescales samples so the minimum maps to 0 and the maximum to 1.
    ///
    /// A constant image maps to all zeros.
    pub fn normalize_min_max(&self) -> GrayImage {
        let (min, max) = self
            .data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        let data = if range > 0.0 && range.is_finite() {
            self.data.iter().map(|&v| (v - min) / range).collect()
        } else {
            vec![0.0; self.data.len()]
        };
        Self {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GrayImage;
    use crate::util::SiftError;

    #[test]
    fn sub_is_pixelwise() {
        let a = GrayImage::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let b = GrayImage::new(vec![0.5, 0.5, 1.0, 5.0], 2, 2).unwrap();
        let d = a.sub(&b).unwrap();
        assert_eq!(d.data(), &[0.5, 1.5, 2.0, -1.0]);
    }

    #[test]
    fn sub_rejects_mismatched_sizes() {
        let a = GrayImage::zeros(2, 2);
        let b = GrayImage::zeros(3, 2);
        assert_eq!(
            a.sub(&b).unwrap_err(),
            SiftError::InvalidDimensions {
                width: 3,
                height: 2
            }
        );
    }

    #[test]
    fn normalize_min_max_spans_unit_range() {
        let img = GrayImage::new(vec![10.0, 20.0, 30.0, 50.0], 2, 2).unwrap();
        let norm = img.normalize_min_max();
        assert_eq!(norm.data(), &[0.0, 0.25, 0.5, 1.0]);

        let flat = GrayImage::new(vec![7.0; 4], 2, 2).unwrap();
        assert_eq!(flat.normalize_min_max().data(), &[0.0; 4]);
    }

    #[test]
    fn from_fn_is_row_major() {
        let img = GrayImage::from_fn(3, 2, |x, y| (y * 10 + x) as f32);
        assert_eq!(img.row(1), &[10.0, 11.0, 12.0]);
        assert_eq!(img.get(2, 0), 2.0);
    }
}
