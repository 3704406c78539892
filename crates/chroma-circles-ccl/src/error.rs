use std::collections::TryReserveError;

use chroma_circles_core::PlaneError;

/// Errors returned by the labeler.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("label buffer is {labels:?} but the mask is {mask:?}")]
    DimensionMismatch {
        mask: (usize, usize),
        labels: (usize, usize),
    },
    #[error("malformed {which} buffer: {source}")]
    Layout {
        which: &'static str,
        source: PlaneError,
    },
    #[error("{width}x{height} mask needs more provisional labels than an i32 label map holds")]
    TooLarge { width: usize, height: usize },
    #[error("failed to reserve labeling scratch: {0}")]
    Alloc(#[from] TryReserveError),
}
