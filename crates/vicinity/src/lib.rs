//! vicinity — periodic-box neighbor queries for particle analysis.
//!
//! This is the umbrella crate that re-exports the core types from the
//! sub-crates and provides a one-call convenience entry point.
//!
//! Data flow: positions + box → [`PointSet`] → [`QueryEngine`] (AABB tree)
//! → [`NeighborList`] → downstream analysis.

pub use vicinity_box::{self, BoxError, PeriodicBox};
pub use vicinity_index::{self, AabbTree, IndexError, PointSet};
pub use vicinity_math::{self, Aabb, IVec3, Mat3, Vec3};
pub use vicinity_query::{
    self, Concurrency, NeighborBond, NeighborList, QueryEngine, QueryError, QueryMode,
    ScopedWorkers,
};

/// One-shot self-query: wrap `positions` into `cell`, build the index, and
/// run `mode` with the points queried against themselves.
///
/// Building the index per call is wasteful when issuing many queries over
/// the same snapshot; hold a [`QueryEngine`] in that case.
pub fn neighbors(
    cell: PeriodicBox,
    positions: &[Vec3],
    mode: &QueryMode,
) -> Result<NeighborList, QueryError> {
    let points = PointSet::new(cell, positions);
    QueryEngine::new(&points).query_self(mode)
}
