//! 8-connectivity connected-component labeling for binary masks.
//!
//! The labeler scans the mask in 2x2 blocks. For each block a ten-pixel
//! window (the block, the right column of the block to its left and the row
//! just above it) is packed into a bit pattern and looked up in a
//! compile-time decision table that says whether the block is background,
//! starts a new provisional label, copies one neighbor's label, or joins
//! several neighbor classes in a disjoint-set forest. Roots are always the
//! smallest label of their class, so a single renumbering pass yields dense,
//! deterministic ids; a final pass writes those ids to every foreground pixel.
//!
//! ```
//! use chroma_circles_ccl::label_components;
//! use chroma_circles_core::{LabelMap, Mask, Plane};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mask: Mask = Plane::from_vec(4, 2, vec![255, 0, 0, 255, 0, 255, 0, 255])?;
//! let mut labels = LabelMap::new(4, 2);
//! let n = label_components(&mask.view(), &mut labels.view_mut())?;
//! assert_eq!(n, 3); // background + two components
//! assert_eq!(labels.get(1, 1), 1);
//! assert_eq!(labels.get(3, 1), 2);
//! # Ok(())
//! # }
//! ```

mod decision;
mod error;
mod labeler;
mod union_find;

pub use error::LabelError;
pub use labeler::{label_components, Labeler};
