//! Block-based scan, flattening and label materialization.

use std::collections::TryReserveError;

use chroma_circles_core::{MaskView, PlaneViewMut};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::decision::{
    action, BlockAction, ColumnKind, Neighbor, RowKind, Window, PX_H, PX_I, PX_J, PX_K, PX_N,
    PX_O, PX_P, PX_R, PX_S, PX_T,
};
use crate::error::LabelError;
use crate::union_find::{DisjointSet, Label};

/// Background columns added on each side of the working mask.
const PAD: usize = 2;

fn resize_zeroed<T: Copy + Default>(buf: &mut Vec<T>, len: usize) -> Result<(), TryReserveError> {
    buf.clear();
    buf.try_reserve_exact(len)?;
    buf.resize(len, T::default());
    Ok(())
}

/// Binarized copy of the input mask with `PAD` background columns left and
/// right. No rows are added; the scan uses [`RowKind`] instead.
#[derive(Debug, Default)]
struct PaddedMask {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl PaddedMask {
    fn load(&mut self, mask: &MaskView<'_>) -> Result<(), TryReserveError> {
        self.width = mask.width;
        self.height = mask.height;
        self.stride = mask.width + 2 * PAD;
        resize_zeroed(&mut self.data, self.stride * self.height)?;
        for (y, src) in mask.rows().enumerate() {
            let start = y * self.stride + PAD;
            let dst = &mut self.data[start..start + self.width];
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = u8::from(s != 0);
            }
        }
        Ok(())
    }

    #[inline]
    fn index(&self, x: isize, y: usize) -> usize {
        debug_assert!(
            x >= -(PAD as isize) && x < (self.width + PAD) as isize && y < self.height,
            "padded mask read at ({x}, {y})"
        );
        y * self.stride + (x + PAD as isize) as usize
    }

    #[inline]
    fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[self.index(x as isize, y)] != 0
    }

    #[inline]
    fn bit(&self, x: isize, y: usize, flag: Window) -> Window {
        if self.data[self.index(x, y)] != 0 {
            flag
        } else {
            0
        }
    }

    /// Gather the decision window for the block at `(x, y)`, reading only the
    /// rows and columns the boundary variants say exist.
    #[inline]
    fn window(&self, x: usize, y: usize, row: RowKind, col: ColumnKind) -> Window {
        let x = x as isize;
        let full = col == ColumnKind::Full;

        let mut w = self.bit(x, y, PX_O) | self.bit(x - 1, y, PX_N);
        if full {
            w |= self.bit(x + 1, y, PX_P);
        }
        if row.has_below() {
            w |= self.bit(x, y + 1, PX_S) | self.bit(x - 1, y + 1, PX_R);
            if full {
                w |= self.bit(x + 1, y + 1, PX_T);
            }
        }
        if row.has_above() {
            w |= self.bit(x - 1, y - 1, PX_H) | self.bit(x, y - 1, PX_I);
            if full {
                w |= self.bit(x + 1, y - 1, PX_J) | self.bit(x + 2, y - 1, PX_K);
            }
        }
        w
    }
}

/// Anchor labels, one per 2x2 block, with a background block column on each
/// side.
#[derive(Debug, Default)]
struct BlockGrid {
    cols: usize,
    rows: usize,
    stride: usize,
    data: Vec<Label>,
}

impl BlockGrid {
    fn reset(&mut self, cols: usize, rows: usize) -> Result<(), TryReserveError> {
        self.cols = cols;
        self.rows = rows;
        self.stride = cols + 2;
        resize_zeroed(&mut self.data, self.stride * rows)
    }

    #[inline]
    fn index(&self, bx: isize, by: usize) -> usize {
        debug_assert!(
            bx >= -1 && bx <= self.cols as isize && by < self.rows,
            "block grid read at ({bx}, {by})"
        );
        by * self.stride + (bx + 1) as usize
    }

    #[inline]
    fn get(&self, bx: isize, by: usize) -> Label {
        self.data[self.index(bx, by)]
    }

    #[inline]
    fn set(&mut self, bx: usize, by: usize, label: Label) {
        let idx = self.index(bx as isize, by);
        self.data[idx] = label;
    }

    #[inline]
    fn neighbor(&self, bx: usize, by: usize, n: Neighbor) -> Label {
        let (dx, dy) = n.offset();
        let label = self.get(bx as isize + dx, (by as isize + dy) as usize);
        debug_assert!(label != 0, "{n:?} neighbor of block ({bx}, {by}) is unlabeled");
        label
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ScanCounts {
    merges: usize,
}

fn scan(mask: &PaddedMask, grid: &mut BlockGrid, forest: &mut DisjointSet) -> ScanCounts {
    let mut counts = ScanCounts::default();
    for by in 0..grid.rows {
        let y = 2 * by;
        let row = RowKind::for_row(y, mask.height);
        for bx in 0..grid.cols {
            let x = 2 * bx;
            let col = ColumnKind::for_column(x, mask.width);
            let label = match action(mask.window(x, y, row, col)) {
                BlockAction::Background => 0,
                BlockAction::NewLabel => forest.make_set(),
                BlockAction::Copy(n) => grid.neighbor(bx, by, n),
                BlockAction::Merge(set) => {
                    counts.merges += 1;
                    let mut root: Option<Label> = None;
                    for n in set.iter() {
                        let l = grid.neighbor(bx, by, n);
                        root = Some(match root {
                            None => l,
                            Some(r) => forest.union(r, l),
                        });
                    }
                    root.unwrap_or(0)
                }
            };
            grid.set(bx, by, label);
        }
    }
    counts
}

/// Write the final ids: every foreground pixel of a block takes the block's
/// flattened anchor label, background pixels stay `0`.
fn materialize(
    mask: &PaddedMask,
    grid: &BlockGrid,
    forest: &DisjointSet,
    labels: &mut PlaneViewMut<'_, i32>,
) {
    const QUAD: [(usize, usize); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];
    for by in 0..grid.rows {
        let y = 2 * by;
        for bx in 0..grid.cols {
            let x = 2 * bx;
            let anchor = grid.get(bx as isize, by);
            let id = if anchor == 0 {
                0
            } else {
                forest.final_label(anchor) as i32
            };
            for (dx, dy) in QUAD {
                let (px, py) = (x + dx, y + dy);
                if px < mask.width && py < mask.height {
                    let value = if mask.is_set(px, py) { id } else { 0 };
                    labels.set(px, py, value);
                }
            }
        }
    }
}

/// Reusable 8-connectivity labeler.
///
/// Keeps its working buffers between calls, so labeling frames of a fixed
/// size allocates only on the first call.
#[derive(Debug, Default)]
pub struct Labeler {
    mask: PaddedMask,
    grid: BlockGrid,
    forest: DisjointSet,
}

impl Labeler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the scratch for `width x height` masks.
    pub fn with_capacity(width: usize, height: usize) -> Self {
        let cols = width.div_ceil(2);
        let rows = height.div_ceil(2);
        let mut labeler = Self::default();
        labeler.mask.data = Vec::with_capacity((width + 2 * PAD) * height);
        labeler.grid.data = Vec::with_capacity((cols + 2) * rows);
        labeler.forest = DisjointSet::with_capacity(cols * rows + 1);
        labeler
    }

    /// Drop all scratch memory.
    pub fn release(&mut self) {
        self.mask = PaddedMask::default();
        self.grid = BlockGrid::default();
        self.forest.release();
    }

    /// Label the 8-connected foreground components of `mask` into `labels`.
    ///
    /// Any nonzero mask byte is foreground. Component ids are dense,
    /// `1..n`, numbered in scan order of each component's first 2x2 block;
    /// background pixels get `0`. Returns `n`, the number of ids including
    /// the background bucket. Odd widths and heights are supported.
    ///
    /// On error `labels` is left untouched.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(width = mask.width, height = mask.height))
    )]
    pub fn label(
        &mut self,
        mask: &MaskView<'_>,
        labels: &mut PlaneViewMut<'_, i32>,
    ) -> Result<usize, LabelError> {
        mask.validate().map_err(|source| LabelError::Layout { which: "mask", source })?;
        labels.validate().map_err(|source| LabelError::Layout { which: "label", source })?;
        if mask.dims() != labels.dims() {
            return Err(LabelError::DimensionMismatch {
                mask: mask.dims(),
                labels: labels.dims(),
            });
        }
        let (width, height) = mask.dims();
        if width == 0 || height == 0 {
            return Ok(1);
        }

        let cols = width.div_ceil(2);
        let rows = height.div_ceil(2);
        let max_labels = cols
            .checked_mul(rows)
            .filter(|&n| n < i32::MAX as usize)
            .ok_or(LabelError::TooLarge { width, height })?;

        if let Err(err) = self.prepare(mask, cols, rows, max_labels) {
            self.release();
            return Err(err.into());
        }

        let counts = scan(&self.mask, &mut self.grid, &mut self.forest);
        let num_labels = self.forest.flatten();
        materialize(&self.mask, &self.grid, &self.forest, labels);

        debug!(
            "labeled {}x{} mask: {} provisional labels, {} merges, {} components",
            width,
            height,
            self.forest.len(),
            counts.merges,
            num_labels - 1
        );
        Ok(num_labels)
    }

    fn prepare(
        &mut self,
        mask: &MaskView<'_>,
        cols: usize,
        rows: usize,
        max_labels: usize,
    ) -> Result<(), TryReserveError> {
        self.mask.load(mask)?;
        self.grid.reset(cols, rows)?;
        self.forest.reset(max_labels)
    }
}

/// One-shot labeling with freshly allocated scratch.
///
/// See [`Labeler::label`]; prefer a long-lived [`Labeler`] in frame loops.
pub fn label_components(
    mask: &MaskView<'_>,
    labels: &mut PlaneViewMut<'_, i32>,
) -> Result<usize, LabelError> {
    Labeler::new().label(mask, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_circles_core::{LabelMap, Mask, Plane};

    fn mask_from_rows(rows: &[&str]) -> Mask {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'#' { 255 } else { 0 }))
            .collect();
        Plane::from_vec(width, height, data).expect("mask")
    }

    fn run(mask: &Mask) -> (usize, LabelMap) {
        let mut labels = LabelMap::new(mask.width(), mask.height());
        let n = label_components(&mask.view(), &mut labels.view_mut()).expect("label");
        (n, labels)
    }

    fn rows_of(labels: &LabelMap) -> Vec<Vec<i32>> {
        labels.view().rows().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn empty_mask_has_only_background() {
        let mask = mask_from_rows(&["....", "...."]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 1);
        assert!(labels.as_slice().iter().all(|&l| l == 0));
    }

    #[test]
    fn short_buffers_are_rejected_before_labeling() {
        let short = [255u8; 5];
        let mask = MaskView {
            width: 4,
            height: 2,
            stride: 4,
            data: &short,
        };
        let mut labels = LabelMap::new(4, 2);
        let err = label_components(&mask, &mut labels.view_mut()).unwrap_err();
        assert!(matches!(err, LabelError::Layout { which: "mask", .. }));
        assert!(labels.as_slice().iter().all(|&l| l == 0));

        let mask = Mask::new(4, 2);
        let mut data = [0i32; 6];
        let mut labels = PlaneViewMut {
            width: 4,
            height: 2,
            stride: 4,
            data: &mut data,
        };
        let err = label_components(&mask.view(), &mut labels).unwrap_err();
        assert!(matches!(err, LabelError::Layout { which: "label", .. }));
    }

    #[test]
    fn zero_area_mask_returns_background_bucket() {
        let mask: Mask = Plane::new(0, 5);
        let (n, _) = run(&mask);
        assert_eq!(n, 1);
    }

    #[test]
    fn block_label_does_not_leak_to_background_pixels() {
        let mask = mask_from_rows(&["#.", ".."]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 2);
        assert_eq!(rows_of(&labels), vec![vec![1, 0], vec![0, 0]]);
    }

    #[test]
    fn diagonal_neighbors_are_connected() {
        let mask = mask_from_rows(&[
            "#...", //
            ".#..", //
            "..#.", //
            "...#",
        ]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 2);
        assert_eq!(labels.get(3, 3), 1);
        assert_eq!(labels.get(0, 0), 1);
    }

    #[test]
    fn anti_diagonal_bridge_across_blocks() {
        // (2,1) touches (1,2) only through a corner, across four blocks.
        let mask = mask_from_rows(&[
            "....", //
            "..#.", //
            ".#..", //
            "....",
        ]);
        let (n, _) = run(&mask);
        assert_eq!(n, 2);
    }

    #[test]
    fn u_shape_merges_into_one_component_with_smallest_id() {
        let mask = mask_from_rows(&[
            "#..#", //
            "#..#", //
            "#..#", //
            "####",
        ]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 2);
        for (x, y) in [(0, 0), (3, 0), (1, 3), (3, 3)] {
            assert_eq!(labels.get(x, y), 1);
        }
    }

    #[test]
    fn ids_follow_first_block_scan_order() {
        // Component at the right starts in the first block row, the one on
        // the left only in the second.
        let mask = mask_from_rows(&[
            "....##", //
            "....##", //
            "#.....", //
            "#.....",
        ]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 3);
        assert_eq!(labels.get(4, 0), 1);
        assert_eq!(labels.get(0, 3), 2);
    }

    #[test]
    fn single_row_image() {
        let mask = mask_from_rows(&["##.#..#"]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 4);
        assert_eq!(rows_of(&labels), vec![vec![1, 1, 0, 2, 0, 0, 3]]);
    }

    #[test]
    fn odd_height_trailing_row_joins_components_above() {
        let mask = mask_from_rows(&[
            "#...#", //
            "#...#", //
            "#####",
        ]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 2);
        assert!(labels.as_slice().iter().all(|&l| l == 0 || l == 1));
        assert_eq!(labels.get(4, 0), 1);
    }

    #[test]
    fn odd_height_trailing_row_diagonal_contact() {
        let mask = mask_from_rows(&[
            "....", //
            "...#", //
            "..#.",
        ]);
        let (n, _) = run(&mask);
        assert_eq!(n, 2);
    }

    #[test]
    fn odd_width_trailing_column_is_labeled() {
        let mask = mask_from_rows(&[
            "....#", //
            "....#", //
            "...#.", //
            "#....",
        ]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 3);
        assert_eq!(labels.get(4, 0), 1);
        assert_eq!(labels.get(3, 2), 1);
        assert_eq!(labels.get(0, 3), 2);
    }

    #[test]
    fn odd_width_trailing_column_isolated_pixels() {
        let mask = mask_from_rows(&[
            "..#", //
            "...", //
            "..#",
        ]);
        let (n, labels) = run(&mask);
        assert_eq!(n, 3);
        assert_eq!(labels.get(2, 0), 1);
        assert_eq!(labels.get(2, 2), 2);
    }

    #[test]
    fn single_pixel_image() {
        let (n, labels) = run(&mask_from_rows(&["#"]));
        assert_eq!(n, 2);
        assert_eq!(labels.get(0, 0), 1);
        let (n, _) = run(&mask_from_rows(&["."]));
        assert_eq!(n, 1);
    }

    #[test]
    fn dimension_mismatch_is_rejected_without_writes() {
        let mask = mask_from_rows(&["##", "##"]);
        let mut labels = LabelMap::new(3, 2);
        labels.set(0, 0, 77);
        let err = label_components(&mask.view(), &mut labels.view_mut()).unwrap_err();
        assert_eq!(
            err,
            LabelError::DimensionMismatch {
                mask: (2, 2),
                labels: (3, 2)
            }
        );
        assert_eq!(labels.get(0, 0), 77);
    }

    #[test]
    fn labeler_reuse_is_deterministic() {
        let mask = mask_from_rows(&[
            "#.#.#.", //
            ".#.#..", //
            "......", //
            "##..##",
        ]);
        let mut labeler = Labeler::with_capacity(6, 4);
        let mut first = LabelMap::new(6, 4);
        let mut second = LabelMap::new(6, 4);
        let n1 = labeler.label(&mask.view(), &mut first.view_mut()).expect("first");
        let n2 = labeler.label(&mask.view(), &mut second.view_mut()).expect("second");
        assert_eq!(n1, n2);
        assert_eq!(first, second);
        assert_eq!(n1, 4);
    }

    #[test]
    fn strided_label_buffer_keeps_padding() {
        let mask = mask_from_rows(&["#.", ".#"]);
        let mut data = vec![-5i32; 7];
        let mut labels = PlaneViewMut::with_stride(2, 2, 5, &mut data).expect("layout");
        let n = label_components(&mask.view(), &mut labels).expect("label");
        assert_eq!(n, 2);
        assert_eq!(data, vec![1, 0, -5, -5, -5, 0, 1]);
    }
}
