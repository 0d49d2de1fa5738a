//! Difference-of-Gaussian pyramid.

use crate::image::pyramid::GaussianPyramid;
use crate::image::GrayImage;
use crate::trace::{trace_event, trace_span};
use crate::util::SiftResult;

/// Per-octave differences of consecutive blurred intervals.
///
/// Octave `o` holds `intervals + 2` images; image `j` is Gaussian interval `j`
/// minus interval `j + 1`, so a bright blob yields a positive response.
#[derive(Clone, Debug)]
pub struct DogPyramid {
    octaves: Vec<Vec<GrayImage>>,
    intervals: usize,
}

impl DogPyramid {
    pub fn build(pyramid: &GaussianPyramid) -> SiftResult<Self> {
        let _span = trace_span!("build_dog", octaves = pyramid.octaves().len()).entered();
        let mut octaves = Vec::with_capacity(pyramid.octaves().len());
        for octave in pyramid.octaves() {
            let diffs = octave
                .images()
                .windows(2)
                .map(|pair| pair[0].sub(&pair[1]))
                .collect::<SiftResult<Vec<_>>>()?;
            octaves.push(diffs);
        }
        trace_event!("dog_built", octaves = octaves.len());
        Ok(Self {
            octaves,
            intervals: pyramid.intervals(),
        })
    }

    /// Number of octaves.
    pub fn len(&self) -> usize {
        self.octaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.octaves.is_empty()
    }

    /// Interval count of the source pyramid; each octave has `intervals + 2` images.
    pub fn intervals(&self) -> usize {
        self.intervals
    }

    /// All difference images of one octave.
    pub fn octave(&self, octave: usize) -> Option<&[GrayImage]> {
        self.octaves.get(octave).map(Vec::as_slice)
    }

    /// Difference image `interval` of `octave`.
    pub fn image(&self, octave: usize, interval: usize) -> Option<&GrayImage> {
        self.octaves.get(octave)?.get(interval)
    }
}
