//! Unweighted angle histograms over a wraparound domain `[0, max)`.
//!
//! Both the orientation vote and every descriptor block count raw occurrences:
//! one vote per sample, no magnitude or spatial weighting.

use crate::util::{SiftError, SiftResult};

/// Fixed-width bins over `[0, max_deg)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AngleHistogram {
    bin_width_deg: f32,
    counts: Vec<u32>,
}

impl AngleHistogram {
    /// Creates an empty histogram with `max_deg / bin_width_deg` bins.
    ///
    /// The bin width must divide the domain evenly.
    pub fn new(bin_width_deg: f32, max_deg: f32) -> SiftResult<Self> {
        if !bin_width_deg.is_finite() || !max_deg.is_finite() {
            return Err(SiftError::InvalidConfig {
                reason: "non-finite histogram parameters",
            });
        }
        if bin_width_deg <= 0.0 {
            return Err(SiftError::InvalidConfig {
                reason: "histogram bin width must be > 0",
            });
        }
        if max_deg < bin_width_deg {
            return Err(SiftError::InvalidConfig {
                reason: "histogram domain must hold at least one bin",
            });
        }
        let bins = (max_deg / bin_width_deg) as usize;
        if (bins as f32 * bin_width_deg - max_deg).abs() > 1e-3 {
            return Err(SiftError::InvalidConfig {
                reason: "histogram bin width must divide the angular domain",
            });
        }
        Ok(Self::from_parts(bin_width_deg, bins))
    }

    pub(crate) fn from_parts(bin_width_deg: f32, bins: usize) -> Self {
        debug_assert!(bins > 0);
        Self {
            bin_width_deg,
            counts: vec![0; bins],
        }
    }

    /// Bin receiving `angle_deg`; `floor(angle / width)`, clamped to the last bin.
    #[inline]
    pub fn bin_index(&self, angle_deg: f32) -> usize {
        // `as usize` saturates negatives and NaN to 0.
        ((angle_deg / self.bin_width_deg) as usize).min(self.counts.len() - 1)
    }

    /// Counts one occurrence of `angle_deg`.
    #[inline]
    pub fn add(&mut self, angle_deg: f32) {
        let idx = self.bin_index(angle_deg);
        self.counts[idx] += 1;
    }

    /// Bin counts in index order.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn bin_width_deg(&self) -> f32 {
        self.bin_width_deg
    }

    /// Index and count of the fullest bin. Ties keep the lowest index.
    pub fn peak(&self) -> (usize, u32) {
        let mut best = (0usize, self.counts[0]);
        for (idx, &count) in self.counts.iter().enumerate().skip(1) {
            if count > best.1 {
                best = (idx, count);
            }
        }
        best
    }

    /// Center angle of bin `idx`.
    pub fn bin_center(&self, idx: usize) -> f32 {
        idx as f32 * self.bin_width_deg + self.bin_width_deg / 2.0
    }
}

impl Extend<f32> for AngleHistogram {
    fn extend<I: IntoIterator<Item = f32>>(&mut self, iter: I) {
        for angle in iter {
            self.add(angle);
        }
    }
}
