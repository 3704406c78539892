//! Bounds-checked 2D views over flat pixel storage.
//!
//! Every image-like buffer in the detector (luma/chroma planes, the binary
//! mask, the label map) is a row-major slice plus `width`, `height` and a row
//! `stride`. All pixel access funnels through [`PlaneView::index`] /
//! [`PlaneViewMut::index`], so offset arithmetic lives in exactly one place.

/// Errors produced when wrapping a raw buffer into a plane view.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaneError {
    #[error("plane buffer too small (expected at least {expected} elements, got {got})")]
    BufferTooSmall { expected: usize, got: usize },
    #[error("row stride {stride} is smaller than plane width {width}")]
    StrideTooSmall { stride: usize, width: usize },
}

/// Minimum buffer length for a `width x height` plane with the given stride.
#[inline]
fn required_len(width: usize, height: usize, stride: usize) -> usize {
    if width == 0 || height == 0 {
        0
    } else {
        stride * (height - 1) + width
    }
}

fn check_layout(width: usize, height: usize, stride: usize, len: usize) -> Result<(), PlaneError> {
    if stride < width {
        return Err(PlaneError::StrideTooSmall { stride, width });
    }
    let expected = required_len(width, height, stride);
    if len < expected {
        return Err(PlaneError::BufferTooSmall { expected, got: len });
    }
    Ok(())
}

/// Read-only view of a single image plane.
#[derive(Clone, Copy, Debug)]
pub struct PlaneView<'a, T> {
    pub width: usize,
    pub height: usize,
    /// Row pitch in elements (`>= width`).
    pub stride: usize,
    pub data: &'a [T],
}

impl<'a, T: Copy> PlaneView<'a, T> {
    /// Wrap a tightly packed buffer (`stride == width`).
    pub fn new(width: usize, height: usize, data: &'a [T]) -> Result<Self, PlaneError> {
        Self::with_stride(width, height, width, data)
    }

    /// Wrap a buffer whose rows are `stride` elements apart.
    pub fn with_stride(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, PlaneError> {
        check_layout(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Re-check the layout of a view assembled by hand from its public fields.
    pub fn validate(&self) -> Result<(), PlaneError> {
        check_layout(self.width, self.height, self.stride, self.data.len())
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Linear offset of pixel `(x, y)` in `data`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} plane",
            self.width,
            self.height
        );
        y * self.stride + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.index(x, y)]
    }

    /// Signed-coordinate access; `None` outside the plane.
    #[inline]
    pub fn try_get(&self, x: isize, y: isize) -> Option<T> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.get(x as usize, y as usize))
    }

    /// Row `y`, exactly `width` elements long.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [T] {
        debug_assert!(y < self.height, "row {y} outside {}-row plane", self.height);
        let start = y * self.stride;
        let data = self.data;
        &data[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }
}

/// Mutable view of a single image plane.
#[derive(Debug)]
pub struct PlaneViewMut<'a, T> {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub data: &'a mut [T],
}

impl<'a, T: Copy> PlaneViewMut<'a, T> {
    pub fn new(width: usize, height: usize, data: &'a mut [T]) -> Result<Self, PlaneError> {
        Self::with_stride(width, height, width, data)
    }

    pub fn with_stride(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a mut [T],
    ) -> Result<Self, PlaneError> {
        check_layout(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn validate(&self) -> Result<(), PlaneError> {
        check_layout(self.width, self.height, self.stride, self.data.len())
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} plane",
            self.width,
            self.height
        );
        y * self.stride + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        debug_assert!(y < self.height, "row {y} outside {}-row plane", self.height);
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        debug_assert!(y < self.height, "row {y} outside {}-row plane", self.height);
        let start = y * self.stride;
        let width = self.width;
        &mut self.data[start..start + width]
    }

    /// Set every pixel inside the plane (stride padding is left alone).
    pub fn fill(&mut self, value: T) {
        for y in 0..self.height {
            self.row_mut(y).fill(value);
        }
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> PlaneView<'_, T> {
        PlaneView {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: &*self.data,
        }
    }

    /// Reborrow mutably with a shorter lifetime.
    pub fn reborrow(&mut self) -> PlaneViewMut<'_, T> {
        PlaneViewMut {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: &mut *self.data,
        }
    }
}

/// Owned, tightly packed plane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Plane<T> {
    /// Allocate a `width x height` plane filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, PlaneError> {
        if data.len() != width * height {
            return Err(PlaneError::BufferTooSmall {
                expected: width * height,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.view().get(x, y)
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.view_mut().set(x, y, value);
    }

    pub fn view(&self) -> PlaneView<'_, T> {
        PlaneView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }

    pub fn view_mut(&mut self) -> PlaneViewMut<'_, T> {
        PlaneViewMut {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &mut self.data,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

/// Binary foreground mask: `0` background, `255` foreground.
pub type Mask = Plane<u8>;
pub type MaskView<'a> = PlaneView<'a, u8>;

/// Per-pixel component labels, `0` for background.
pub type LabelMap = Plane<i32>;
pub type LabelView<'a> = PlaneView<'a, i32>;
