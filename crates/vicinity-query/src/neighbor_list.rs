//! Neighbor-list output of the query engine.

use vicinity_math::IVec3;

/// One neighbor record: a (query point, found point) pair with its squared
/// distance and the periodic image the found point was seen in.
///
/// `weight` defaults to 1.0 and exists as a hook for downstream analysis
/// (coordination counting, density kernels) to attach per-bond weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborBond {
    pub query_idx: usize,
    pub point_idx: usize,
    pub dist_sq: f64,
    pub image: IVec3,
    pub weight: f64,
}

impl NeighborBond {
    pub fn new(query_idx: usize, point_idx: usize, dist_sq: f64, image: IVec3) -> Self {
        Self {
            query_idx,
            point_idx,
            dist_sq,
            image,
            weight: 1.0,
        }
    }

    /// Euclidean distance of the bond.
    pub fn distance(&self) -> f64 {
        self.dist_sq.sqrt()
    }

    /// Canonical record order: query index, then distance, then found index,
    /// then image (lexicographic). Total and deterministic.
    pub(crate) fn canonical_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.query_idx
            .cmp(&other.query_idx)
            .then_with(|| self.dist_sq.total_cmp(&other.dist_sq))
            .then_with(|| self.point_idx.cmp(&other.point_idx))
            .then_with(|| {
                (self.image.x, self.image.y, self.image.z).cmp(&(
                    other.image.x,
                    other.image.y,
                    other.image.z,
                ))
            })
    }
}

/// Compact, immutable result of a neighbor query.
///
/// Records are contiguous per query point in ascending query order; a cached
/// offset table gives O(1) access to the slice of any query point's
/// neighbors. Each query call produces a fresh list that owns its storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList {
    bonds: Vec<NeighborBond>,
    /// `offsets[i]..offsets[i + 1]` is query point i's slice of `bonds`.
    offsets: Vec<usize>,
}

impl NeighborList {
    /// Sort `bonds` into canonical order and build the offset table.
    pub fn from_bonds(num_query_points: usize, mut bonds: Vec<NeighborBond>) -> Self {
        bonds.sort_unstable_by(NeighborBond::canonical_cmp);

        let mut offsets = Vec::with_capacity(num_query_points + 1);
        offsets.push(0);
        let mut cursor = 0;
        for q in 0..num_query_points {
            while cursor < bonds.len() && bonds[cursor].query_idx == q {
                cursor += 1;
            }
            offsets.push(cursor);
        }
        debug_assert_eq!(cursor, bonds.len());

        Self { bonds, offsets }
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    /// True when no query point found any neighbor.
    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    /// Number of query points the list was produced for.
    pub fn num_query_points(&self) -> usize {
        self.offsets.len() - 1
    }

    /// All records, contiguous per query point.
    pub fn bonds(&self) -> &[NeighborBond] {
        &self.bonds
    }

    /// Records of query point `i` — O(1) slice via the offset table.
    pub fn bonds_of(&self, i: usize) -> &[NeighborBond] {
        &self.bonds[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Offset table (`num_query_points + 1` entries).
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Neighbor count per query point.
    pub fn counts(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// `(query_idx, point_idx)` pairs in record order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.bonds.iter().map(|b| (b.query_idx, b.point_idx))
    }

    /// Euclidean distances in record order.
    pub fn distances(&self) -> Vec<f64> {
        self.bonds.iter().map(NeighborBond::distance).collect()
    }

    /// Periodic image vectors in record order.
    pub fn images(&self) -> Vec<IVec3> {
        self.bonds.iter().map(|b| b.image).collect()
    }

    /// Recompute every bond's weight from the bond itself.
    pub fn set_weights<F: Fn(&NeighborBond) -> f64>(&mut self, f: F) {
        for bond in &mut self.bonds {
            bond.weight = f(bond);
        }
    }

    /// Sum of weights over query point `i`'s records.
    pub fn total_weight_of(&self, i: usize) -> f64 {
        self.bonds_of(i).iter().map(|b| b.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bond(q: usize, p: usize, d2: f64) -> NeighborBond {
        NeighborBond::new(q, p, d2, IVec3::zeros())
    }

    #[test]
    fn test_contiguity_and_offsets() {
        // Out-of-order input, including a query point with no neighbors.
        let list = NeighborList::from_bonds(
            4,
            vec![bond(2, 0, 1.0), bond(0, 1, 4.0), bond(0, 2, 1.0), bond(3, 1, 9.0)],
        );
        assert_eq!(list.len(), 4);
        assert_eq!(list.num_query_points(), 4);
        assert_eq!(list.offsets(), &[0, 2, 2, 3, 4]);
        assert_eq!(list.counts(), vec![2, 0, 1, 1]);
        assert!(list.bonds_of(1).is_empty());
        // Within a query point, records are sorted by distance.
        assert_eq!(list.bonds_of(0)[0].point_idx, 2);
        assert_eq!(list.bonds_of(0)[1].point_idx, 1);
    }

    #[test]
    fn test_distance_tie_broken_by_index() {
        let list = NeighborList::from_bonds(1, vec![bond(0, 5, 1.0), bond(0, 3, 1.0)]);
        assert_eq!(list.bonds_of(0)[0].point_idx, 3);
        assert_eq!(list.bonds_of(0)[1].point_idx, 5);
    }

    #[test]
    fn test_weights() {
        let mut list = NeighborList::from_bonds(1, vec![bond(0, 1, 1.0), bond(0, 2, 4.0)]);
        assert_relative_eq!(list.total_weight_of(0), 2.0);
        list.set_weights(|b| 1.0 / b.distance());
        assert_relative_eq!(list.total_weight_of(0), 1.5);
    }

    #[test]
    fn test_pairs_and_distances() {
        let list = NeighborList::from_bonds(2, vec![bond(1, 0, 4.0), bond(0, 1, 1.0)]);
        let pairs: Vec<_> = list.pairs().collect();
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
        let d = list.distances();
        assert_relative_eq!(d[0], 1.0);
        assert_relative_eq!(d[1], 2.0);
    }
}
