//! Block-histogram descriptors built from gradient patches.
//!
//! The angle grid of a patch is cut into 4x4 blocks visited column-major:
//! the outer loop walks block columns, the inner loop block rows. Each block
//! contributes an unweighted 8-bin histogram (45 degree bins) and the block
//! histograms are concatenated in visiting order. A 16x16 patch therefore
//! yields 4 * 4 * 8 = 128 values.

use crate::histogram::AngleHistogram;
use crate::orient::{GradientPatch, PATCH_BLOCK};
use crate::trace::{trace_event, trace_span};

/// Bin width of each block histogram.
pub const BLOCK_BIN_DEG: f32 = 45.0;
/// Bins per block histogram.
pub const BLOCK_BINS: usize = 8;

/// Fixed-length appearance vector of one keypoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor {
    keypoint_index: usize,
    values: Vec<f64>,
}

impl Descriptor {
    /// Index of the owning keypoint in the detection's keypoint list.
    pub fn keypoint_index(&self) -> usize {
        self.keypoint_index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Descriptor length for a square patch of side `side`.
pub fn descriptor_len(side: usize) -> usize {
    let blocks = side / PATCH_BLOCK;
    blocks * blocks * BLOCK_BINS
}

/// Builds the descriptor of a single patch. Pure function of the patch.
pub fn build_descriptor(patch: &GradientPatch) -> Descriptor {
    let side = patch.side();
    let mut values = Vec::with_capacity(descriptor_len(side));
    for block_col in (0..side).step_by(PATCH_BLOCK) {
        for block_row in (0..side).step_by(PATCH_BLOCK) {
            let mut hist = AngleHistogram::from_parts(BLOCK_BIN_DEG, BLOCK_BINS);
            for row in block_row..block_row + PATCH_BLOCK {
                for col in block_col..block_col + PATCH_BLOCK {
                    hist.add(patch.angle(col, row));
                }
            }
            values.extend(hist.counts().iter().map(|&c| f64::from(c)));
        }
    }
    Descriptor {
        keypoint_index: patch.keypoint_index(),
        values,
    }
}

/// One descriptor per patch, in patch order.
pub fn build_descriptors(patches: &[GradientPatch]) -> Vec<Descriptor> {
    let _span = trace_span!("build_descriptors", patches = patches.len()).entered();
    let out: Vec<Descriptor> = patches.iter().map(build_descriptor).collect();
    trace_event!("descriptors_built", count = out.len());
    out
}

/// Parallel variant of [`build_descriptors`] with identical output order.
#[cfg(feature = "rayon")]
pub fn build_descriptors_par(patches: &[GradientPatch]) -> Vec<Descriptor> {
    use rayon::prelude::*;
    let _span = trace_span!(
        "build_descriptors",
        patches = patches.len(),
        parallel = true
    )
    .entered();
    let out: Vec<Descriptor> = patches.par_iter().map(build_descriptor).collect();
    trace_event!("descriptors_built", count = out.len());
    out
}
