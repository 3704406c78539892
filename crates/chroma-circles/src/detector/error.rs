use chroma_circles_ccl::LabelError;
use chroma_circles_core::FrameError;

use crate::stats::StatsError;

/// Errors returned by the circle detector.
///
/// Every variant is raised before anything is written to the caller's
/// output, and all but `Labeling`/`Stats` before any scratch is touched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("output buffer has zero capacity")]
    OutputCapacityZero,
    #[error("scratch sized {scratch:?} does not match frame {frame:?}")]
    ScratchMismatch {
        frame: (usize, usize),
        scratch: (usize, usize),
    },
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Labeling(#[from] LabelError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}
