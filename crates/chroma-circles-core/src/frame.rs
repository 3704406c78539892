//! Planar YUV 4:2:0 frames.

use crate::plane::{Plane, PlaneError, PlaneView};

/// Which plane of a YUV frame an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneKind {
    Y,
    U,
    V,
}

impl std::fmt::Display for PlaneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaneKind::Y => "Y",
            PlaneKind::U => "U",
            PlaneKind::V => "V",
        };
        f.write_str(name)
    }
}

/// Errors produced when assembling a [`YuvFrameView`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame is empty ({width}x{height})")]
    Empty { width: usize, height: usize },
    #[error("4:2:0 frames need even dimensions, got {width}x{height}")]
    OddDimensions { width: usize, height: usize },
    #[error("{plane} plane is {got:?}, expected at least {expected:?}")]
    ChromaTooSmall {
        plane: PlaneKind,
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error(transparent)]
    Plane(#[from] PlaneError),
}

/// Borrowed planar YUV 4:2:0 frame: full-resolution luma, half-resolution
/// chroma in both directions.
#[derive(Clone, Copy, Debug)]
pub struct YuvFrameView<'a> {
    pub y: PlaneView<'a, u8>,
    pub u: PlaneView<'a, u8>,
    pub v: PlaneView<'a, u8>,
}

impl<'a> YuvFrameView<'a> {
    /// Assemble a frame from three planes, checking the 4:2:0 geometry.
    pub fn new(
        y: PlaneView<'a, u8>,
        u: PlaneView<'a, u8>,
        v: PlaneView<'a, u8>,
    ) -> Result<Self, FrameError> {
        for view in [&y, &u, &v] {
            view.validate()?;
        }
        let (width, height) = y.dims();
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(FrameError::OddDimensions { width, height });
        }
        let expected = (width / 2, height / 2);
        for (plane, view) in [(PlaneKind::U, &u), (PlaneKind::V, &v)] {
            if view.width < expected.0 || view.height < expected.1 {
                return Err(FrameError::ChromaTooSmall {
                    plane,
                    expected,
                    got: view.dims(),
                });
            }
        }
        Ok(Self { y, u, v })
    }

    /// Split a tightly packed I420 buffer (`Y`, then `U`, then `V`).
    pub fn from_i420(width: usize, height: usize, buf: &'a [u8]) -> Result<Self, FrameError> {
        let luma_len = width * height;
        let chroma_len = (width / 2) * (height / 2);
        let total = luma_len + 2 * chroma_len;
        if buf.len() < total {
            return Err(PlaneError::BufferTooSmall {
                expected: total,
                got: buf.len(),
            }
            .into());
        }
        let (y, rest) = buf.split_at(luma_len);
        let (u, v) = rest.split_at(chroma_len);
        Self::new(
            PlaneView::new(width, height, y)?,
            PlaneView::new(width / 2, height / 2, u)?,
            PlaneView::new(width / 2, height / 2, &v[..chroma_len])?,
        )
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.y.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.y.height
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        self.y.dims()
    }

    #[inline]
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.y.get(x, y)
    }

    /// Chroma pair co-located with full-resolution pixel `(x, y)`.
    #[inline]
    pub fn chroma_at(&self, x: usize, y: usize) -> (u8, u8) {
        (self.u.get(x >> 1, y >> 1), self.v.get(x >> 1, y >> 1))
    }
}

/// Owned YUV 4:2:0 frame, mostly useful for synthesizing test input.
#[derive(Clone, Debug)]
pub struct YuvFrame {
    pub y: Plane<u8>,
    pub u: Plane<u8>,
    pub v: Plane<u8>,
}

impl YuvFrame {
    /// Zero luma, neutral (128) chroma.
    pub fn new(width: usize, height: usize) -> Self {
        let mut frame = Self {
            y: Plane::new(width, height),
            u: Plane::new(width / 2, height / 2),
            v: Plane::new(width / 2, height / 2),
        };
        frame.fill_uv(128, 128);
        frame
    }

    pub fn width(&self) -> usize {
        self.y.width()
    }

    pub fn height(&self) -> usize {
        self.y.height()
    }

    pub fn fill_y(&mut self, value: u8) {
        self.y.view_mut().fill(value);
    }

    pub fn fill_uv(&mut self, u: u8, v: u8) {
        self.u.view_mut().fill(u);
        self.v.view_mut().fill(v);
    }

    /// Write a full-resolution pixel; chroma is shared by each 2x2 quad.
    pub fn put(&mut self, x: usize, y: usize, yuv: (u8, u8, u8)) {
        self.y.set(x, y, yuv.0);
        self.u.set(x >> 1, y >> 1, yuv.1);
        self.v.set(x >> 1, y >> 1, yuv.2);
    }

    pub fn view(&self) -> Result<YuvFrameView<'_>, FrameError> {
        YuvFrameView::new(self.y.view(), self.u.view(), self.v.view())
    }

    /// Concatenate the planes into a packed I420 buffer.
    pub fn to_i420(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.y.as_slice().len() + self.u.as_slice().len() + self.v.as_slice().len(),
        );
        out.extend_from_slice(self.y.as_slice());
        out.extend_from_slice(self.u.as_slice());
        out.extend_from_slice(self.v.as_slice());
        out
    }
}
