#![allow(dead_code)]

use chroma_circles::core::{Mask, YuvFrame, FOREGROUND};
use chroma_circles::CircleDetectorParams;

/// Bright, saturated red: matches the default target chroma.
pub const TARGET: (u8, u8, u8) = (160, 91, 240);
/// Luma of the dark gray background.
pub const BACKGROUND_Y: u8 = 40;

/// Defaults plus a luma floor, so the mask follows painted pixels exactly
/// rather than whole chroma quads.
pub fn params() -> CircleDetectorParams {
    let mut p = CircleDetectorParams::default();
    p.color.y_min = 100;
    p
}

pub fn in_disk(x: usize, y: usize, cx: usize, cy: usize, r: usize) -> bool {
    let dx = x as isize - cx as isize;
    let dy = y as isize - cy as isize;
    dx * dx + dy * dy <= (r * r) as isize
}

pub fn blank_frame(width: usize, height: usize) -> YuvFrame {
    let mut frame = YuvFrame::new(width, height);
    frame.fill_y(BACKGROUND_Y);
    frame
}

pub fn paint_disk(frame: &mut YuvFrame, cx: usize, cy: usize, r: usize) {
    for y in cy.saturating_sub(r)..(cy + r + 1).min(frame.height()) {
        for x in cx.saturating_sub(r)..(cx + r + 1).min(frame.width()) {
            if in_disk(x, y, cx, cy, r) {
                frame.put(x, y, TARGET);
            }
        }
    }
}

pub fn paint_rect(frame: &mut YuvFrame, x0: usize, y0: usize, w: usize, h: usize) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            frame.put(x, y, TARGET);
        }
    }
}

pub fn disk_mask(width: usize, height: usize, cx: usize, cy: usize, r: usize) -> Mask {
    let mut mask = Mask::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if in_disk(x, y, cx, cy, r) {
                mask.set(x, y, FOREGROUND);
            }
        }
    }
    mask
}
