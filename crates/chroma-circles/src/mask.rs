//! Chroma threshold: YUV 4:2:0 frame to binary mask.

use chroma_circles_core::{PlaneViewMut, YuvFrameView, BACKGROUND, FOREGROUND};
use log::warn;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Columns handled per inner step; a lane spans eight chroma samples.
const LANE: usize = 16;

/// Target color and tolerances for the mask test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThreshold {
    pub target_u: u8,
    pub target_v: u8,
    /// Maximum absolute difference allowed on each of U and V.
    pub uv_tol: u8,
    /// Minimum luma; `0` disables the luma test.
    pub y_min: u8,
}

impl Default for ColorThreshold {
    fn default() -> Self {
        Self {
            target_u: 91,
            target_v: 240,
            uv_tol: 24,
            y_min: 0,
        }
    }
}

impl ColorThreshold {
    #[inline]
    pub fn chroma_matches(&self, u: u8, v: u8) -> bool {
        u.abs_diff(self.target_u) <= self.uv_tol && v.abs_diff(self.target_v) <= self.uv_tol
    }

    #[inline]
    pub fn luma_passes(&self, y: u8) -> bool {
        self.y_min == 0 || y >= self.y_min
    }

    /// Full per-pixel test.
    #[inline]
    pub fn matches(&self, y: u8, u: u8, v: u8) -> bool {
        self.chroma_matches(u, v) && self.luma_passes(y)
    }
}

#[inline]
fn mask_value(on: bool) -> u8 {
    if on {
        FOREGROUND
    } else {
        BACKGROUND
    }
}

fn mask_row(threshold: &ColorThreshold, luma: &[u8], u: &[u8], v: &[u8], dst: &mut [u8]) {
    let mut lanes = dst.chunks_exact_mut(LANE);
    let mut x0 = 0;
    for lane in &mut lanes {
        let cx0 = x0 >> 1;
        for (k, pair) in lane.chunks_exact_mut(2).enumerate() {
            let chroma_ok = threshold.chroma_matches(u[cx0 + k], v[cx0 + k]);
            let x = x0 + 2 * k;
            pair[0] = mask_value(chroma_ok && threshold.luma_passes(luma[x]));
            pair[1] = mask_value(chroma_ok && threshold.luma_passes(luma[x + 1]));
        }
        x0 += LANE;
    }
    for (i, out) in lanes.into_remainder().iter_mut().enumerate() {
        let x = x0 + i;
        *out = mask_value(threshold.matches(luma[x], u[x >> 1], v[x >> 1]));
    }
}

/// Write `255` where the pixel's co-located chroma is within `uv_tol` of the
/// target on both axes (and luma clears `y_min` when set), `0` elsewhere.
///
/// `mask` must have the frame's dimensions; otherwise nothing is written.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(width = frame.width(), height = frame.height()))
)]
pub fn make_color_mask(
    frame: &YuvFrameView<'_>,
    threshold: &ColorThreshold,
    mask: &mut PlaneViewMut<'_, u8>,
) {
    if frame.dims() != mask.dims() {
        warn!(
            "color mask skipped: frame {:?} vs mask {:?}",
            frame.dims(),
            mask.dims()
        );
        return;
    }
    for y in 0..frame.height() {
        let luma = frame.y.row(y);
        let u = frame.u.row(y >> 1);
        let v = frame.v.row(y >> 1);
        mask_row(threshold, luma, u, v, mask.row_mut(y));
    }
}
