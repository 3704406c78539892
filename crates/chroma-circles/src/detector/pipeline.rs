use chroma_circles_core::YuvFrameView;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{CircleDetectorParams, DetectError, DetectScratch};
use crate::mask::make_color_mask;
use crate::morphology::open_close_cross;
use crate::stats::{collect_candidates, compute_component_stats, CircleCandidate};

/// Counts from one detection call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Candidates written to the front of the output slice.
    pub candidates: usize,
    /// Label ids produced by the labeler, background bucket included.
    pub raw_labels: usize,
}

/// Chroma circle detector.
#[derive(Clone, Debug, Default)]
pub struct CircleDetector {
    params: CircleDetectorParams,
}

impl CircleDetector {
    pub fn new(params: CircleDetectorParams) -> Self {
        Self { params }
    }

    /// Detector parameters.
    #[inline]
    pub fn params(&self) -> &CircleDetectorParams {
        &self.params
    }

    /// Run the full pipeline on `frame`, writing candidates (largest first)
    /// to the front of `out`.
    pub fn detect_into(
        &self,
        frame: &YuvFrameView<'_>,
        scratch: &mut DetectScratch,
        out: &mut [CircleCandidate],
    ) -> Result<DetectionReport, DetectError> {
        run(&self.params, frame, scratch, out)
    }

    /// Like [`CircleDetector::detect_into`], returning up to `max_output`
    /// candidates in a fresh vector.
    pub fn detect(
        &self,
        frame: &YuvFrameView<'_>,
        scratch: &mut DetectScratch,
    ) -> Result<Vec<CircleCandidate>, DetectError> {
        let mut out = vec![CircleCandidate::default(); self.params.max_output.max(1)];
        let report = run(&self.params, frame, scratch, &mut out)?;
        out.truncate(report.candidates);
        Ok(out)
    }
}

/// Return-coded entry point: the number of candidates written to `out`.
///
/// Every failure is logged and reported as `0`, so "nothing found" and
/// "invalid call" look the same; use [`CircleDetector::detect_into`] to tell
/// them apart.
pub fn detect_circles(
    params: &CircleDetectorParams,
    frame: &YuvFrameView<'_>,
    scratch: &mut DetectScratch,
    out: &mut [CircleCandidate],
) -> usize {
    match run(params, frame, scratch, out) {
        Ok(report) => report.candidates,
        Err(err) => {
            warn!("circle detection rejected: {err}");
            0
        }
    }
}

fn validate(
    params: &CircleDetectorParams,
    frame: &YuvFrameView<'_>,
    scratch: &DetectScratch,
    out: &[CircleCandidate],
) -> Result<(), DetectError> {
    if out.is_empty() {
        return Err(DetectError::OutputCapacityZero);
    }
    params.validate()?;
    // The view's fields are public, so the 4:2:0 geometry is checked again.
    YuvFrameView::new(frame.y, frame.u, frame.v)?;
    if scratch.dims() != frame.dims() {
        return Err(DetectError::ScratchMismatch {
            frame: frame.dims(),
            scratch: scratch.dims(),
        });
    }
    Ok(())
}

#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip_all,
        fields(width = frame.width(), height = frame.height(), capacity = out.len())
    )
)]
fn run(
    params: &CircleDetectorParams,
    frame: &YuvFrameView<'_>,
    scratch: &mut DetectScratch,
    out: &mut [CircleCandidate],
) -> Result<DetectionReport, DetectError> {
    validate(params, frame, scratch, out)?;

    let DetectScratch {
        mask,
        tmp1,
        tmp2,
        labels,
        labeler,
    } = scratch;

    make_color_mask(frame, &params.color, &mut mask.view_mut());
    open_close_cross(
        &mut mask.view_mut(),
        &mut tmp1.view_mut(),
        &mut tmp2.view_mut(),
    );
    let raw_labels = labeler.label(&mask.view(), &mut labels.view_mut())?;
    if raw_labels <= 1 {
        debug!("no foreground components");
        return Ok(DetectionReport {
            candidates: 0,
            raw_labels,
        });
    }

    let stats = compute_component_stats(&labels.view(), raw_labels)?;
    let candidates = collect_candidates(&stats, &params.shape, out, params.max_output);
    debug!(
        "{} components, {} circle candidates",
        raw_labels - 1,
        candidates
    );
    Ok(DetectionReport {
        candidates,
        raw_labels,
    })
}
