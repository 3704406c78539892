//! End-to-end circle detection.
//!
//! Wires the color mask, the open-close cleanup, component labeling and the
//! shape filter over one caller-owned [`DetectScratch`].

mod error;
mod params;
mod pipeline;
mod scratch;

pub use error::DetectError;
pub use params::CircleDetectorParams;
pub use pipeline::{detect_circles, CircleDetector, DetectionReport};
pub use scratch::DetectScratch;
