use serde::{Deserialize, Serialize};

use super::DetectError;
use crate::mask::ColorThreshold;
use crate::stats::ShapeFilter;

/// Configuration for the circle detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleDetectorParams {
    /// Target chroma and luma floor for the mask.
    pub color: ColorThreshold,
    /// Size and shape rules for accepted components.
    pub shape: ShapeFilter,
    /// Cap on reported candidates, on top of the output buffer's capacity.
    pub max_output: usize,
}

impl Default for CircleDetectorParams {
    fn default() -> Self {
        Self {
            color: ColorThreshold::default(),
            shape: ShapeFilter::default(),
            max_output: 32,
        }
    }
}

impl CircleDetectorParams {
    /// Reject shape bounds that cannot describe any circle.
    pub fn validate(&self) -> Result<(), DetectError> {
        let s = &self.shape;
        for (name, value) in [
            ("min_diameter", s.min_diameter),
            ("max_diameter", s.max_diameter),
            ("aspect_min", s.aspect_min),
            ("extent_min", s.extent_min),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DetectError::InvalidParams(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if s.min_diameter > s.max_diameter {
            return Err(DetectError::InvalidParams(format!(
                "min_diameter {} exceeds max_diameter {}",
                s.min_diameter, s.max_diameter
            )));
        }
        Ok(())
    }
}
