//! Core buffer types for the chroma-circles detector.
//!
//! This crate holds the bounds-checked plane views that every pipeline stage
//! reads and writes, the planar YUV 4:2:0 frame wrapper, and a small logger.
//! It has no knowledge of thresholds, labels or circles.

mod frame;
mod logger;
mod plane;

pub use frame::{FrameError, PlaneKind, YuvFrame, YuvFrameView};
pub use plane::{
    LabelMap, LabelView, Mask, MaskView, Plane, PlaneError, PlaneView, PlaneViewMut,
};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, TraceFormat, DEFAULT_TRACE_FILTER};

pub use logger::init_with_level;

/// Mask value for foreground pixels.
pub const FOREGROUND: u8 = 255;
/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;
