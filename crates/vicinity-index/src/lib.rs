//! Spatial indexing for the vicinity neighbor-query toolkit.
//!
//! A [`PointSet`] is an immutable snapshot of wrapped particle positions
//! paired with a [`vicinity_box::PeriodicBox`]; an [`AabbTree`] is the
//! bounding-volume hierarchy built over it. The tree never mutates after
//! construction; a changed point set means a new tree.

pub mod error;
pub mod point_set;
pub mod tree;

pub use error::{IndexError, Result};
pub use point_set::PointSet;
pub use tree::AabbTree;
