use chroma_circles_ccl::Labeler;
use chroma_circles_core::{LabelMap, Mask};

/// Working buffers for one frame size.
///
/// Allocate once per stream and reuse it for every frame; after the first
/// frame the only per-call allocation left is the statistics table.
#[derive(Debug)]
pub struct DetectScratch {
    pub(crate) mask: Mask,
    pub(crate) tmp1: Mask,
    pub(crate) tmp2: Mask,
    pub(crate) labels: LabelMap,
    pub(crate) labeler: Labeler,
}

impl DetectScratch {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            mask: Mask::new(width, height),
            tmp1: Mask::new(width, height),
            tmp2: Mask::new(width, height),
            labels: LabelMap::new(width, height),
            labeler: Labeler::with_capacity(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.mask.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.mask.height()
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        self.mask.dims()
    }

    /// Cleaned mask from the last successful call.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Label map from the last successful call.
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }
}
