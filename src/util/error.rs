//! Error types for dogsift.

use thiserror::Error;

/// Result alias for dogsift operations.
pub type SiftResult<T> = std::result::Result<T, SiftError>;

/// Errors that can occur when building scale spaces or detecting features.
///
/// Only caller precondition failures are reported here. Candidates rejected by
/// the contrast/edge tests and keypoints too close to the border are ordinary
/// outcomes and never surface as errors.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SiftError {
    /// Width or height is zero (or the product overflows).
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the declared geometry.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A configuration parameter is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// The input is too small to survive halving across all octaves.
    #[error("octave {octave} degenerates to {width}x{height}")]
    DegeneratePyramid {
        octave: usize,
        width: usize,
        height: usize,
    },
    /// A keypoint names an octave/interval the pyramid does not have.
    #[error("keypoint {index} refers to missing image (octave {octave}, interval {interval})")]
    KeypointOutOfRange {
        index: usize,
        octave: usize,
        interval: usize,
    },
    /// The input contains NaN or infinite samples.
    #[error("non-finite sample at ({x}, {y})")]
    NonFiniteInput { x: usize, y: usize },
    /// Image decoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
