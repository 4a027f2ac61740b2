//! Periodic-aware neighbor-query engine.
//!
//! Executes ball and k-nearest-neighbor queries against an
//! [`AabbTree`](vicinity_index::AabbTree), replicating each query point
//! across adjacent periodic images whenever the search radius reaches a box
//! face. Every query is a pure function of (tree, box, query points,
//! parameters) and produces a fresh [`NeighborList`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::f64::consts::PI;

use rayon::prelude::*;
use vicinity_box::PeriodicBox;
use vicinity_index::{AabbTree, PointSet};
use vicinity_math::{Aabb, IVec3, Vec3};

use crate::concurrency::Concurrency;
use crate::error::{QueryError, Result};
use crate::neighbor_list::{NeighborBond, NeighborList};
use crate::params::QueryMode;

/// Growth factor for the iterative k-NN candidate radius.
const KNN_GROWTH: f64 = 1.3;

/// Neighbor-query engine over an immutable point set.
///
/// Construction builds the AABB tree; the tree is shared read-only by all
/// worker threads during a query and is never mutated afterwards.
pub struct QueryEngine<'a> {
    points: &'a PointSet,
    tree: AabbTree,
    concurrency: Option<Concurrency>,
}

impl<'a> QueryEngine<'a> {
    /// Build the spatial index over `points`.
    pub fn new(points: &'a PointSet) -> Self {
        Self {
            points,
            tree: AabbTree::build(points.positions()),
            concurrency: None,
        }
    }

    /// Carry an explicit worker-count configuration instead of reading the
    /// process-wide one at query time.
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// The indexed point set.
    pub fn point_set(&self) -> &PointSet {
        self.points
    }

    /// The underlying spatial index.
    pub fn tree(&self) -> &AabbTree {
        &self.tree
    }

    /// Run a query with raw query positions.
    ///
    /// Query points are wrapped into the index box before the search, so the
    /// reported displacement of a bond is
    /// `position[point_idx] + image · lattice - wrap(query_point)`.
    pub fn query(&self, query_points: &[Vec3], mode: &QueryMode) -> Result<NeighborList> {
        mode.validate()?;
        match *mode {
            QueryMode::Ball {
                r_max,
                exclude_self,
            } => self.ball(query_points, r_max, exclude_self),
            QueryMode::Nearest { k, exclude_self } => self.nearest(query_points, k, exclude_self),
        }
    }

    /// Run a query with the positions of another [`PointSet`].
    ///
    /// Fails with [`QueryError::BoxMismatch`] before any traversal when the
    /// two boxes differ.
    pub fn query_from(&self, other: &PointSet, mode: &QueryMode) -> Result<NeighborList> {
        if other.cell() != self.points.cell() {
            return Err(QueryError::BoxMismatch);
        }
        self.query(other.positions(), mode)
    }

    /// Self-query: the indexed points queried against themselves.
    pub fn query_self(&self, mode: &QueryMode) -> Result<NeighborList> {
        self.query(self.points.positions(), mode)
    }

    fn wrap_queries(&self, query_points: &[Vec3]) -> Vec<Vec3> {
        let cell = self.points.cell();
        query_points
            .iter()
            .map(|&p| {
                let mut w = cell.wrap(p);
                if cell.is_2d() {
                    w.z = 0.0;
                }
                w
            })
            .collect()
    }

    /// Fan the per-query-point closure out over the configured worker pool.
    /// Buckets come back in query order, so results are deterministic
    /// regardless of worker count.
    fn run_per_query<F>(&self, n_query: usize, per_point: F) -> Result<Vec<Vec<NeighborBond>>>
    where
        F: Fn(usize) -> Vec<NeighborBond> + Sync + Send,
    {
        let workers = self.concurrency.unwrap_or_default().effective_workers();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
        Ok(pool.install(|| (0..n_query).into_par_iter().map(per_point).collect()))
    }

    fn ball(&self, query_points: &[Vec3], r_max: f64, exclude_self: bool) -> Result<NeighborList> {
        let cell = self.points.cell();
        let positions = self.points.positions();
        let radii = self.points.radii();
        let r_search = self.points.max_radius().unwrap_or(r_max);

        let half_width = 0.5 * cell.min_periodic_width();
        if r_search > half_width {
            log::warn!(
                "search radius {r_search} exceeds half the minimum periodic box width \
                 ({half_width}); single-image minimum-image arithmetic is unreliable at \
                 this range, falling back to exhaustive image expansion"
            );
        }

        let shifts = image_shifts(cell, r_search);
        let qs = self.wrap_queries(query_points);

        let buckets = self.run_per_query(qs.len(), |qi| {
            let q = qs[qi];
            let mut bonds = Vec::new();
            for &(image, shift) in &shifts {
                let q_img = q - shift;
                let window = Aabb::around(q_img, r_search);
                self.tree.for_each_in(&window, |j| {
                    if exclude_self && j == qi {
                        return;
                    }
                    let cutoff = radii.map_or(r_max, |r| r[j]);
                    let d2 = (positions[j] - q_img).norm_squared();
                    if d2 <= cutoff * cutoff {
                        bonds.push(NeighborBond::new(qi, j, d2, image));
                    }
                });
            }
            bonds
        })?;

        Ok(NeighborList::from_bonds(qs.len(), buckets.concat()))
    }

    fn nearest(&self, query_points: &[Vec3], k: usize, exclude_self: bool) -> Result<NeighborList> {
        let cell = self.points.cell();
        let n = self.points.len();
        if k == 0 || n == 0 {
            return Ok(NeighborList::from_bonds(query_points.len(), Vec::new()));
        }

        let qs = self.wrap_queries(query_points);
        let bounds = self.points.bounds();
        let r_init = initial_radius(cell, n, k);

        let buckets = self.run_per_query(qs.len(), |qi| {
            let q = qs[qi];
            // Each indexed point contributes at most one record (its closest
            // image), so the candidate pool caps at n minus self-exclusion.
            let cap = n - usize::from(exclude_self && qi < n);
            let k_eff = k.min(cap);
            if k_eff == 0 {
                return Vec::new();
            }

            let mut r = r_init;
            let best = loop {
                let best = self.gather_nearest(qi, q, r, exclude_self);
                if best.len() >= k_eff {
                    break best;
                }
                if !cell.any_periodic() && r * r >= bounds.max_dist_sq(q) {
                    break best;
                }
                r *= KNN_GROWTH;
            };

            let mut bonds: Vec<NeighborBond> = best.into_values().collect();
            bonds.sort_unstable_by(NeighborBond::canonical_cmp);
            bonds.truncate(k_eff);
            bonds
        })?;

        Ok(NeighborList::from_bonds(qs.len(), buckets.concat()))
    }

    /// One candidate-collection pass at radius `r`: all images searched,
    /// deduplicated per point index keeping the closest image.
    fn gather_nearest(
        &self,
        qi: usize,
        q: Vec3,
        r: f64,
        exclude_self: bool,
    ) -> HashMap<usize, NeighborBond> {
        let positions = self.points.positions();
        let r_sq = r * r;
        let mut best: HashMap<usize, NeighborBond> = HashMap::new();

        for (image, shift) in image_shifts(self.points.cell(), r) {
            let q_img = q - shift;
            let window = Aabb::around(q_img, r);
            self.tree.for_each_in(&window, |j| {
                if exclude_self && j == qi {
                    return;
                }
                let d2 = (positions[j] - q_img).norm_squared();
                if d2 > r_sq {
                    return;
                }
                let bond = NeighborBond::new(qi, j, d2, image);
                match best.entry(j) {
                    Entry::Vacant(e) => {
                        e.insert(bond);
                    }
                    Entry::Occupied(mut e) => {
                        if bond.canonical_cmp(e.get()).is_lt() {
                            e.insert(bond);
                        }
                    }
                }
            });
        }
        best
    }
}

/// Integer image shifts a search of radius `r_search` has to visit, paired
/// with their Cartesian lattice offsets. Non-periodic axes contribute only
/// the zero shift; periodic axes extend `ceil(r_search / width)` cells in
/// both directions.
fn image_shifts(cell: &PeriodicBox, r_search: f64) -> Vec<(IVec3, Vec3)> {
    let widths = cell.nearest_plane_distances();
    let periodic = cell.periodic();
    let mut reach = [0i32; 3];
    for i in 0..3 {
        if periodic[i] {
            reach[i] = (r_search / widths[i]).ceil() as i32;
        }
    }

    let h = cell.to_matrix();
    let mut shifts =
        Vec::with_capacity(((2 * reach[0] + 1) * (2 * reach[1] + 1) * (2 * reach[2] + 1)) as usize);
    for sx in -reach[0]..=reach[0] {
        for sy in -reach[1]..=reach[1] {
            for sz in -reach[2]..=reach[2] {
                let image = IVec3::new(sx, sy, sz);
                shifts.push((image, h * image.map(f64::from)));
            }
        }
    }
    shifts
}

/// Density-based starting radius for the iterative k-NN search: the radius
/// of a ball expected to hold k points in a uniform system, padded slightly.
fn initial_radius(cell: &PeriodicBox, n: usize, k: usize) -> f64 {
    let per_point = cell.volume() / n as f64;
    let r = if cell.is_2d() {
        (k as f64 * per_point / PI).sqrt()
    } else {
        (3.0 * k as f64 * per_point / (4.0 * PI)).cbrt()
    };
    r * 1.1
}
