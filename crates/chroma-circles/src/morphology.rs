//! 3x3 cross (4-neighbor) erosion and dilation, and the open-close cleanup.
//!
//! Erosion and dilation treat the border differently: every border pixel of
//! an eroded image is background, while dilation only takes the maximum over
//! neighbors that exist.

use chroma_circles_core::{PlaneView, PlaneViewMut, BACKGROUND};

#[cfg(feature = "tracing")]
use tracing::instrument;

fn same_shape(src: &PlaneView<'_, u8>, dst: &PlaneViewMut<'_, u8>) -> bool {
    src.dims() == dst.dims() && !src.is_empty()
}

/// Minimum over the pixel and its four cross neighbors; border pixels are
/// forced to background.
pub fn erode_cross(src: &PlaneView<'_, u8>, dst: &mut PlaneViewMut<'_, u8>) {
    if !same_shape(src, dst) {
        return;
    }
    let (w, h) = src.dims();
    for y in 0..h {
        let out = dst.row_mut(y);
        if y == 0 || y + 1 == h || w < 3 {
            out.fill(BACKGROUND);
            continue;
        }
        let up = src.row(y - 1);
        let cur = src.row(y);
        let down = src.row(y + 1);
        out[0] = BACKGROUND;
        out[w - 1] = BACKGROUND;
        for x in 1..w - 1 {
            out[x] = cur[x]
                .min(cur[x - 1])
                .min(cur[x + 1])
                .min(up[x])
                .min(down[x]);
        }
    }
}

/// Maximum over the pixel and its in-bounds cross neighbors.
pub fn dilate_cross(src: &PlaneView<'_, u8>, dst: &mut PlaneViewMut<'_, u8>) {
    if !same_shape(src, dst) {
        return;
    }
    let (w, h) = src.dims();
    for y in 0..h {
        let cur = src.row(y);
        let up = (y > 0).then(|| src.row(y - 1));
        let down = (y + 1 < h).then(|| src.row(y + 1));
        let out = dst.row_mut(y);
        for x in 0..w {
            let mut m = cur[x];
            if x > 0 {
                m = m.max(cur[x - 1]);
            }
            if x + 1 < w {
                m = m.max(cur[x + 1]);
            }
            if let Some(up) = up {
                m = m.max(up[x]);
            }
            if let Some(down) = down {
                m = m.max(down[x]);
            }
            out[x] = m;
        }
    }
}

/// `close(open(mask))` with the cross element, written back into `mask`.
///
/// Sequence: erode into `tmp1`, dilate into `tmp2`, dilate into `tmp1`,
/// erode into `mask`. All three buffers must share the mask's dimensions;
/// mismatched or empty inputs leave everything untouched.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn open_close_cross(
    mask: &mut PlaneViewMut<'_, u8>,
    tmp1: &mut PlaneViewMut<'_, u8>,
    tmp2: &mut PlaneViewMut<'_, u8>,
) {
    if mask.is_empty() || mask.dims() != tmp1.dims() || mask.dims() != tmp2.dims() {
        return;
    }
    erode_cross(&mask.as_view(), tmp1);
    dilate_cross(&tmp1.as_view(), tmp2);
    dilate_cross(&tmp2.as_view(), tmp1);
    erode_cross(&tmp1.as_view(), mask);
}
