//! Axis-aligned bounding boxes.

use crate::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from min/max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An inverted (empty) box that any `grow` call will overwrite.
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f64::INFINITY),
            max: Vec3::repeat(f64::NEG_INFINITY),
        }
    }

    /// Degenerate box containing a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Tight box around a set of points. Empty input yields `Self::empty()`.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.grow(*p);
        }
        aabb
    }

    /// Ball of radius `r` around `center`.
    pub fn around(center: Vec3, r: f64) -> Self {
        let half = Vec3::repeat(r);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Expand to contain `p`.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    /// Expand to contain `other`.
    pub fn merge(&mut self, other: &Aabb) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Check if two AABBs overlap (closed intervals).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Check if `p` lies inside the box (closed intervals).
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Squared distance from `p` to the box (0 when inside).
    pub fn dist_sq(&self, p: Vec3) -> f64 {
        let mut d = 0.0;
        for i in 0..3 {
            let v = p[i].clamp(self.min[i], self.max[i]) - p[i];
            d += v * v;
        }
        d
    }

    /// Edge lengths.
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index of the longest edge (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let e = self.extents();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }

    /// Farthest squared distance from `p` to any corner of the box.
    pub fn max_dist_sq(&self, p: Vec3) -> f64 {
        let mut d = 0.0;
        for i in 0..3 {
            let v = (p[i] - self.min[i]).abs().max((p[i] - self.max[i]).abs());
            d += v * v;
        }
        d
    }
}
