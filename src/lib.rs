//! DogSift is a CPU-first scale-space keypoint detector and descriptor.
//!
//! The pipeline builds a Gaussian pyramid, takes per-octave differences of
//! consecutive intervals, finds strict 3x3x3 extrema, drops low-contrast and
//! edge-like candidates, assigns each keypoint the dominant direction of an
//! unweighted gradient-angle histogram, and summarizes its gradient patch as
//! a concatenation of 4x4 block histograms. Optional parallelism is available
//! via the `rayon` feature and span/event logging via `tracing`.
//!
//! ```
//! use dogsift::{detect, build_descriptors, ImageView};
//!
//! let (w, h) = (48, 48);
//! let data: Vec<f32> = (0..w * h)
//!     .map(|i| {
//!         let (x, y) = ((i % w) as f32 - 24.0, (i / w) as f32 - 24.0);
//!         0.1 + 0.8 * (-(x * x + y * y) / 12.5).exp()
//!     })
//!     .collect();
//! let view = ImageView::from_slice(&data, w, h).unwrap();
//! let detection = detect(view, 1, 3).unwrap();
//! let descriptors = build_descriptors(&detection.patches);
//! assert_eq!(descriptors.len(), detection.patches.len());
//! ```

pub mod descriptor;
pub mod detect;
pub mod histogram;
pub mod image;
pub mod keypoint;
pub mod orient;
pub mod pipeline;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use crate::image::dog::DogPyramid;
pub use crate::image::pyramid::{GaussianPyramid, Octave, PyramidConfig};
pub use crate::image::{GrayImage, ImageView};
pub use descriptor::{build_descriptor, build_descriptors, descriptor_len, Descriptor};
pub use detect::validate::{ValidatorConfig, Verdict};
pub use detect::{DetectionStats, ExtremaConfig};
pub use histogram::AngleHistogram;
pub use keypoint::Keypoint;
pub use orient::{GradientPatch, OrientationConfig};
pub use pipeline::{detect, Detection, Detector, SiftConfig};
pub use util::{SiftError, SiftResult};
