//! Scale-space extremum search and candidate validation.
//!
//! Interior difference images `1..=intervals` of every octave are scanned
//! for strict 3x3x3 extrema, skipping a `border`-pixel frame. Each extremum
//! is classified by [`validate::classify`] and kept only when accepted.
//! Output order is octave, interval, row, column in both the sequential and
//! the parallel scan.

pub mod extrema;
pub mod validate;

use crate::image::dog::DogPyramid;
use crate::image::GrayImage;
use crate::keypoint::Keypoint;
use crate::trace::{trace_event, trace_span};
use crate::util::{SiftError, SiftResult};
use std::ops::AddAssign;

use self::extrema::is_extremum;
use self::validate::{classify, ValidatorConfig, Verdict};

/// Extremum scan parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtremaConfig {
    /// Pixels skipped along every image edge.
    pub border: usize,
}

impl Default for ExtremaConfig {
    fn default() -> Self {
        Self { border: 5 }
    }
}

impl ExtremaConfig {
    pub fn validate(&self) -> SiftResult<()> {
        if self.border == 0 {
            return Err(SiftError::InvalidConfig {
                reason: "border must be >= 1",
            });
        }
        Ok(())
    }
}

/// Counters collected while scanning for extrema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectionStats {
    /// Pixels that passed the 26-neighbor test.
    pub extrema: usize,
    pub low_contrast: usize,
    pub degenerate_hessian: usize,
    pub edge_like: usize,
    /// Keypoints whose orientation window did not fit in the image.
    pub without_patch: usize,
}

impl DetectionStats {
    fn record(&mut self, verdict: Verdict) {
        self.extrema += 1;
        match verdict {
            Verdict::Accepted => {}
            Verdict::LowContrast => self.low_contrast += 1,
            Verdict::DegenerateHessian => self.degenerate_hessian += 1,
            Verdict::EdgeLike => self.edge_like += 1,
        }
    }

    /// Extrema that survived validation.
    pub fn accepted(&self) -> usize {
        self.extrema - self.low_contrast - self.degenerate_hessian - self.edge_like
    }
}

impl AddAssign for DetectionStats {
    fn add_assign(&mut self, rhs: Self) {
        self.extrema += rhs.extrema;
        self.low_contrast += rhs.low_contrast;
        self.degenerate_hessian += rhs.degenerate_hessian;
        self.edge_like += rhs.edge_like;
        self.without_patch += rhs.without_patch;
    }
}

/// One row of one interior interval: the unit of (parallel) work.
#[derive(Clone, Copy, Debug)]
struct RowTask {
    octave: usize,
    interval: usize,
    y: usize,
}

/// Finds validated keypoints across every octave of `dog`.
pub fn find_keypoints(
    dog: &DogPyramid,
    extrema: &ExtremaConfig,
    validator: &ValidatorConfig,
) -> SiftResult<(Vec<Keypoint>, DetectionStats)> {
    find_keypoints_with(dog, extrema, validator, false)
}

/// Parallel variant of [`find_keypoints`]; rows are scanned concurrently and
/// merged back in sequential order.
#[cfg(feature = "rayon")]
pub fn find_keypoints_par(
    dog: &DogPyramid,
    extrema: &ExtremaConfig,
    validator: &ValidatorConfig,
) -> SiftResult<(Vec<Keypoint>, DetectionStats)> {
    find_keypoints_with(dog, extrema, validator, true)
}

pub(crate) fn find_keypoints_with(
    dog: &DogPyramid,
    extrema: &ExtremaConfig,
    validator: &ValidatorConfig,
    parallel: bool,
) -> SiftResult<(Vec<Keypoint>, DetectionStats)> {
    extrema.validate()?;
    validator.validate()?;

    let _span = trace_span!("find_extrema", octaves = dog.len(), parallel = parallel).entered();

    let tasks = row_tasks(dog, extrema.border);
    let rows = scan_rows(dog, &tasks, extrema.border, validator, parallel);

    let mut keypoints = Vec::new();
    let mut stats = DetectionStats::default();
    for (row_keypoints, row_stats) in rows {
        keypoints.extend(row_keypoints);
        stats += row_stats;
    }

    trace_event!(
        "extrema_found",
        extrema = stats.extrema,
        accepted = keypoints.len(),
        low_contrast = stats.low_contrast,
        degenerate_hessian = stats.degenerate_hessian,
        edge_like = stats.edge_like
    );
    Ok((keypoints, stats))
}

fn row_tasks(dog: &DogPyramid, border: usize) -> Vec<RowTask> {
    let mut tasks = Vec::new();
    for octave in 0..dog.len() {
        let Some(images) = dog.octave(octave) else {
            continue;
        };
        let Some(first) = images.first() else {
            continue;
        };
        let height = first.height();
        // Interior intervals only: both scale neighbors must exist.
        for interval in 1..images.len().saturating_sub(1) {
            for y in border..height.saturating_sub(border) {
                tasks.push(RowTask {
                    octave,
                    interval,
                    y,
                });
            }
        }
    }
    tasks
}

fn scan_rows(
    dog: &DogPyramid,
    tasks: &[RowTask],
    border: usize,
    validator: &ValidatorConfig,
    parallel: bool,
) -> Vec<(Vec<Keypoint>, DetectionStats)> {
    #[cfg(feature = "rayon")]
    if parallel {
        use rayon::prelude::*;
        return tasks
            .par_iter()
            .map(|task| scan_row(dog, *task, border, validator))
            .collect();
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    tasks
        .iter()
        .map(|task| scan_row(dog, *task, border, validator))
        .collect()
}

fn scan_row(
    dog: &DogPyramid,
    task: RowTask,
    border: usize,
    validator: &ValidatorConfig,
) -> (Vec<Keypoint>, DetectionStats) {
    let mut keypoints = Vec::new();
    let mut stats = DetectionStats::default();
    let Some(images) = dog.octave(task.octave) else {
        return (keypoints, stats);
    };
    let below: &GrayImage = &images[task.interval - 1];
    let current: &GrayImage = &images[task.interval];
    let above: &GrayImage = &images[task.interval + 1];

    for x in border..current.width().saturating_sub(border) {
        if !is_extremum(below, current, above, x, task.y) {
            continue;
        }
        let verdict = classify(current, x, task.y, validator);
        stats.record(verdict);
        if verdict.is_accepted() {
            keypoints.push(Keypoint::new(
                x,
                task.y,
                task.octave,
                task.interval,
                current.get(x, task.y),
            ));
        }
    }
    (keypoints, stats)
}
