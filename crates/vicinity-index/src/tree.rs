//! Bounding-volume hierarchy over a wrapped point set.

use vicinity_math::{Aabb, Vec3};

/// Recursion stops once a subtree holds this many points or fewer.
pub const LEAF_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
enum NodeKind {
    /// Range into the reordered index buffer.
    Leaf { start: usize, end: usize },
    Internal { left: usize, right: usize },
}

#[derive(Debug, Clone)]
struct Node {
    aabb: Aabb,
    kind: NodeKind,
}

/// A static AABB tree built once per point set.
///
/// Construction partitions the point indices recursively at the median along
/// the axis of greatest extent; each node stores the tight AABB of its
/// points. Queries never mutate the tree — rebuild it when the points
/// change.
#[derive(Debug, Clone)]
pub struct AabbTree {
    nodes: Vec<Node>,
    /// Point indices, reordered so each leaf owns a contiguous range.
    order: Vec<usize>,
}

impl AabbTree {
    /// Build the tree over `points`.
    pub fn build(points: &[Vec3]) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            order: (0..points.len()).collect(),
        };
        if !points.is_empty() {
            tree.build_range(points, 0, points.len());
        }
        tree
    }

    fn build_range(&mut self, points: &[Vec3], start: usize, end: usize) -> usize {
        let mut aabb = Aabb::empty();
        for &i in &self.order[start..end] {
            aabb.grow(points[i]);
        }

        let id = self.nodes.len();
        self.nodes.push(Node {
            aabb,
            kind: NodeKind::Leaf { start, end },
        });

        if end - start > LEAF_CAPACITY {
            let axis = aabb.longest_axis();
            let mid = (start + end) / 2;
            // Median partition, not a full sort.
            self.order[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
                points[a][axis].total_cmp(&points[b][axis])
            });
            let left = self.build_range(points, start, mid);
            let right = self.build_range(points, mid, end);
            self.nodes[id].kind = NodeKind::Internal { left, right };
        }
        id
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True for a tree over zero points.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of tree nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Root AABB, if the tree is non-empty.
    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|n| n.aabb)
    }

    /// Tree height (1 for a single leaf, 0 when empty).
    pub fn height(&self) -> usize {
        fn depth(nodes: &[Node], id: usize) -> usize {
            match nodes[id].kind {
                NodeKind::Leaf { .. } => 1,
                NodeKind::Internal { left, right } => {
                    1 + depth(nodes, left).max(depth(nodes, right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            depth(&self.nodes, 0)
        }
    }

    /// Visit every point index stored in a leaf whose AABB overlaps `query`.
    ///
    /// Standard top-down prune: subtrees whose AABB misses the query box are
    /// skipped whole. Visited candidates still need a distance check by the
    /// caller.
    pub fn for_each_in<F: FnMut(usize)>(&self, query: &Aabb, mut f: F) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.aabb.overlaps(query) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, end } => {
                    for &i in &self.order[start..end] {
                        f(i);
                    }
                }
                NodeKind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
}
