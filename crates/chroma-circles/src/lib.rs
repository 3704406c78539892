//! Detect circular blobs of a target chroma in planar YUV 4:2:0 frames.
//!
//! The pipeline runs, per frame:
//! 1. a chroma threshold into a binary mask ([`mask`]),
//! 2. a 3x3 cross open-then-close to drop speckles and fill pinholes ([`morphology`]),
//! 3. 8-connectivity component labeling ([`ccl`]),
//! 4. per-component statistics and a shape filter producing ranked
//!    [`CircleCandidate`]s ([`stats`]).
//!
//! All working buffers live in a caller-owned [`DetectScratch`] that is sized
//! once per frame size.
//!
//! ## Quickstart
//!
//! ```
//! use chroma_circles::{CircleCandidate, CircleDetector, CircleDetectorParams, DetectScratch};
//! use chroma_circles::core::YuvFrame;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut frame = YuvFrame::new(64, 64);
//! for y in 20..40 {
//!     for x in 20..40 {
//!         frame.put(x, y, (150, 91, 240));
//!     }
//! }
//!
//! let detector = CircleDetector::new(CircleDetectorParams::default());
//! let mut scratch = DetectScratch::new(64, 64);
//! let mut out = [CircleCandidate::default(); 8];
//! let report = detector.detect_into(&frame.view()?, &mut scratch, &mut out)?;
//! assert_eq!(report.candidates, 1);
//! # Ok(())
//! # }
//! ```

pub use chroma_circles_ccl as ccl;
pub use chroma_circles_core as core;

pub mod detector;
pub mod mask;
pub mod morphology;
pub mod stats;

pub use detector::{
    detect_circles, CircleDetector, CircleDetectorParams, DetectError, DetectScratch,
    DetectionReport,
};
pub use mask::{make_color_mask, ColorThreshold};
pub use morphology::{dilate_cross, erode_cross, open_close_cross};
pub use stats::{
    collect_candidates, compute_component_stats, sort_by_area_desc, CircleCandidate,
    ComponentStats, Rejection, ShapeFilter, StatsError,
};

pub use chroma_circles_ccl::{label_components, LabelError, Labeler};
pub use chroma_circles_core::{YuvFrame, YuvFrameView};
