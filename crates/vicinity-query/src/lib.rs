//! Neighbor queries over periodic point sets.
//!
//! The [`QueryEngine`] answers two kinds of questions against an indexed
//! [`vicinity_index::PointSet`]:
//!
//! - ball queries: which points lie within `r_max` of each query point,
//! - k-NN queries: the k closest points to each query point,
//!
//! both under minimum-image / multi-image periodic boundary conditions, and
//! both producing a [`NeighborList`] — the compact neighbor relation every
//! downstream analysis (coordination counts, density kernels, order
//! parameters) consumes.
//!
//! # Example
//!
//! ```
//! use vicinity_box::PeriodicBox;
//! use vicinity_index::PointSet;
//! use vicinity_math::Vec3;
//! use vicinity_query::{QueryEngine, QueryMode};
//!
//! let cell = PeriodicBox::cube(10.0)?;
//! let points = PointSet::new(
//!     cell,
//!     &[
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(1.0, 0.0, 0.0),
//!         Vec3::new(0.0, 4.9, 0.0),
//!     ],
//! );
//! let engine = QueryEngine::new(&points);
//!
//! let list = engine.query_self(&QueryMode::ball(1.5).exclude_self(true))?;
//! assert_eq!(list.counts(), vec![1, 1, 0]);
//! # Ok::<(), vicinity_query::QueryError>(())
//! ```

pub mod concurrency;
pub mod engine;
pub mod error;
pub mod neighbor_list;
pub mod params;

pub use concurrency::{Concurrency, ScopedWorkers, set_workers, workers};
pub use engine::QueryEngine;
pub use error::{QueryError, Result};
pub use neighbor_list::{NeighborBond, NeighborList};
pub use params::QueryMode;
