//! Immutable particle-position snapshots.

use vicinity_box::PeriodicBox;
use vicinity_math::{Aabb, Vec3};

use crate::error::{IndexError, Result};

/// An immutable snapshot of particle positions inside a periodic box.
///
/// Positions are wrapped into the canonical cell on ingestion (periodic axes
/// only). For 2D boxes the z-coordinate is zeroed so it never participates
/// in indexing or distances.
#[derive(Debug, Clone)]
pub struct PointSet {
    cell: PeriodicBox,
    positions: Vec<Vec3>,
    radii: Option<Vec<f64>>,
}

impl PointSet {
    /// Wrap `positions` into `cell` and take the snapshot.
    pub fn new(cell: PeriodicBox, positions: &[Vec3]) -> Self {
        let positions = positions
            .iter()
            .map(|&p| {
                let mut w = cell.wrap(p);
                if cell.is_2d() {
                    w.z = 0.0;
                }
                w
            })
            .collect();
        Self {
            cell,
            positions,
            radii: None,
        }
    }

    /// Attach per-point query radii (one per point).
    ///
    /// These override an engine-level `r_max` for the point they belong to,
    /// enabling heterogeneous cutoffs in a single query.
    pub fn with_radii(mut self, radii: Vec<f64>) -> Result<Self> {
        if radii.len() != self.positions.len() {
            return Err(IndexError::DimensionMismatch {
                expected: self.positions.len(),
                actual: radii.len(),
            });
        }
        self.radii = Some(radii);
        Ok(self)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when the snapshot holds no points.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Wrapped positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-point query radii, if attached.
    pub fn radii(&self) -> Option<&[f64]> {
        self.radii.as_deref()
    }

    /// Largest per-point radius, if radii are attached.
    pub fn max_radius(&self) -> Option<f64> {
        self.radii
            .as_ref()
            .map(|r| r.iter().copied().fold(0.0, f64::max))
    }

    /// The box the snapshot lives in.
    pub fn cell(&self) -> &PeriodicBox {
        &self.cell
    }

    /// Tight bounding box around the wrapped positions.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}
