//! Periodic simulation box for particle analysis.
//!
//! A [`PeriodicBox`] is a (possibly triclinic, possibly 2D) parallelepiped
//! with per-axis periodicity. It provides coordinate wrapping into the
//! canonical cell, unwrapping through integer image vectors, minimum-image
//! displacements, and fractional/Cartesian transforms. Tilt is folded into
//! the cached cell matrix, so the wrap logic itself is shape-agnostic.
//!
//! Lattice vectors follow the row-echelon convention
//! `a1 = (lx, 0, 0)`, `a2 = (xy*ly, ly, 0)`, `a3 = (xz*lz, yz*lz, lz)`.
//! Wrapped fractional coordinates lie in the half-open interval
//! `[-0.5, 0.5)` along each periodic axis.

pub mod error;

pub use error::{BoxError, Result};

use vicinity_math::{IVec3, Mat3, Vec3};

/// Immutable periodic simulation volume.
///
/// Construct via [`PeriodicBox::new`], [`PeriodicBox::cube`] or
/// [`PeriodicBox::new_2d`]; a changed box requires a new instance. The cell
/// matrix, its inverse, and the volume are computed once and cached.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicBox {
    lx: f64,
    ly: f64,
    lz: f64,
    xy: f64,
    xz: f64,
    yz: f64,
    periodic: [bool; 3],
    is_2d: bool,
    /// Cell matrix (lattice vectors as columns).
    h: Mat3,
    /// Cached inverse of `h` (zero third row for 2D boxes).
    h_inv: Mat3,
    /// Volume (area for 2D boxes).
    volume: f64,
}

impl PeriodicBox {
    /// Fully periodic 3D box with the given edge lengths and tilt factors.
    pub fn new(lx: f64, ly: f64, lz: f64, xy: f64, xz: f64, yz: f64) -> Result<Self> {
        Self::build(lx, ly, lz, xy, xz, yz, [true, true, true], false)
    }

    /// Fully periodic cubic box with edge length `l`.
    pub fn cube(l: f64) -> Result<Self> {
        Self::new(l, l, l, 0.0, 0.0, 0.0)
    }

    /// Periodic 2D box (`lz = 0`, z never periodic, z-tilts zero).
    pub fn new_2d(lx: f64, ly: f64, xy: f64) -> Result<Self> {
        Self::build(lx, ly, 0.0, xy, 0.0, 0.0, [true, true, false], true)
    }

    /// Replace the per-axis periodicity flags.
    ///
    /// Returns a new box; requesting a periodic z-axis on a 2D box is an
    /// error.
    pub fn with_periodic(self, x: bool, y: bool, z: bool) -> Result<Self> {
        Self::build(
            self.lx,
            self.ly,
            self.lz,
            self.xy,
            self.xz,
            self.yz,
            [x, y, z],
            self.is_2d,
        )
    }

    /// Reconstruct a box from its cell matrix (as produced by
    /// [`PeriodicBox::to_matrix`]). A zero `m[2][2]` yields a 2D box.
    pub fn from_matrix(m: &Mat3) -> Result<Self> {
        let (lx, ly, lz) = (m[(0, 0)], m[(1, 1)], m[(2, 2)]);
        if ly == 0.0 {
            return Err(BoxError::InvalidBox("zero ly in cell matrix".into()));
        }
        let xy = m[(0, 1)] / ly;
        if lz == 0.0 {
            Self::new_2d(lx, ly, xy)
        } else {
            Self::new(lx, ly, lz, xy, m[(0, 2)] / lz, m[(1, 2)] / lz)
        }
    }

    fn build(
        lx: f64,
        ly: f64,
        lz: f64,
        xy: f64,
        xz: f64,
        yz: f64,
        periodic: [bool; 3],
        is_2d: bool,
    ) -> Result<Self> {
        for (name, v) in [("lx", lx), ("ly", ly), ("lz", lz), ("xy", xy), ("xz", xz), ("yz", yz)] {
            if !v.is_finite() {
                return Err(BoxError::InvalidBox(format!("{name} is not finite")));
            }
        }
        if lx <= 0.0 || ly <= 0.0 {
            return Err(BoxError::InvalidBox(format!(
                "edge lengths must be positive, got lx={lx}, ly={ly}"
            )));
        }
        if is_2d {
            if lz != 0.0 || xz != 0.0 || yz != 0.0 {
                return Err(BoxError::InvalidBox(
                    "2D box requires lz = xz = yz = 0".into(),
                ));
            }
            if periodic[2] {
                return Err(BoxError::InvalidBox("2D box cannot be periodic in z".into()));
            }
        } else if lz <= 0.0 {
            return Err(BoxError::InvalidBox(format!(
                "3D box requires lz > 0, got lz={lz}"
            )));
        }

        let h = Mat3::new(
            lx,
            xy * ly,
            xz * lz,
            0.0,
            ly,
            yz * lz,
            0.0,
            0.0,
            lz,
        );
        // Closed-form inverse of the upper-triangular cell matrix; the third
        // row degenerates to zero for 2D boxes (z is never periodic there).
        let inv_lz = if is_2d { 0.0 } else { 1.0 / lz };
        let h_inv = Mat3::new(
            1.0 / lx,
            -xy / lx,
            (xy * yz - xz) / lx,
            0.0,
            1.0 / ly,
            -yz / ly,
            0.0,
            0.0,
            inv_lz,
        );
        let volume = if is_2d { lx * ly } else { lx * ly * lz };

        Ok(Self {
            lx,
            ly,
            lz,
            xy,
            xz,
            yz,
            periodic,
            is_2d,
            h,
            h_inv,
            volume,
        })
    }

    /// Edge length along x.
    pub fn lx(&self) -> f64 {
        self.lx
    }

    /// Edge length along y.
    pub fn ly(&self) -> f64 {
        self.ly
    }

    /// Edge length along z (0 for 2D boxes).
    pub fn lz(&self) -> f64 {
        self.lz
    }

    /// xy tilt factor.
    pub fn xy(&self) -> f64 {
        self.xy
    }

    /// xz tilt factor.
    pub fn xz(&self) -> f64 {
        self.xz
    }

    /// yz tilt factor.
    pub fn yz(&self) -> f64 {
        self.yz
    }

    /// Per-axis periodicity flags.
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// True if any axis is periodic.
    pub fn any_periodic(&self) -> bool {
        self.periodic.iter().any(|&p| p)
    }

    /// True for 2D boxes.
    pub fn is_2d(&self) -> bool {
        self.is_2d
    }

    /// Volume of the cell (area for 2D boxes).
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// The cell matrix with lattice vectors as columns.
    pub fn to_matrix(&self) -> Mat3 {
        self.h
    }

    /// The three lattice vectors `(a1, a2, a3)`.
    pub fn lattice_vectors(&self) -> (Vec3, Vec3, Vec3) {
        (
            self.h.column(0).into_owned(),
            self.h.column(1).into_owned(),
            self.h.column(2).into_owned(),
        )
    }

    /// Cartesian → fractional coordinates via the cached inverse matrix.
    ///
    /// For 2D boxes the fractional z is always 0.
    pub fn to_fractional(&self, p: Vec3) -> Vec3 {
        self.h_inv * p
    }

    /// Fractional → Cartesian coordinates via the cached cell matrix.
    pub fn to_cartesian(&self, f: Vec3) -> Vec3 {
        self.h * f
    }

    /// Integer lattice shift that maps `p` into the canonical cell, i.e.
    /// `wrap(p) == p - shift` in fractional space. Zero on non-periodic axes.
    fn canonical_shift(&self, p: Vec3) -> IVec3 {
        let f = self.to_fractional(p);
        let mut n = IVec3::zeros();
        for i in 0..3 {
            if self.periodic[i] {
                // Folds the fractional coordinate into [-0.5, 0.5).
                n[i] = (f[i] + 0.5).floor() as i32;
            }
        }
        n
    }

    /// Wrap a point into the canonical cell.
    ///
    /// Each periodic axis is shifted by an integer multiple of the lattice
    /// vectors so its fractional coordinate lies in `[-0.5, 0.5)`;
    /// non-periodic axes pass through unchanged.
    pub fn wrap(&self, p: Vec3) -> Vec3 {
        let n = self.canonical_shift(p);
        p - self.h * n.map(f64::from)
    }

    /// Wrap a slice of points (copies; the input is untouched).
    pub fn wrap_all(&self, points: &[Vec3]) -> Vec<Vec3> {
        points.iter().map(|&p| self.wrap(p)).collect()
    }

    /// The periodic image a point occupies relative to the canonical cell:
    /// `unwrap(wrap(p), image_of(p)) == p` up to floating error.
    pub fn image_of(&self, p: Vec3) -> IVec3 {
        self.canonical_shift(p)
    }

    /// Shift a wrapped point by an integer image vector.
    ///
    /// Adds `image.x * a1 + image.y * a2 + image.z * a3`; caller-supplied
    /// images are trusted, no range validation is performed.
    pub fn unwrap(&self, p: Vec3, image: IVec3) -> Vec3 {
        p + self.h * image.map(f64::from)
    }

    /// Unwrap a slice of points through per-point image vectors.
    pub fn unwrap_all(&self, points: &[Vec3], images: &[IVec3]) -> Vec<Vec3> {
        points
            .iter()
            .zip(images)
            .map(|(&p, &img)| self.unwrap(p, img))
            .collect()
    }

    /// Minimum-image displacement of a raw difference vector.
    ///
    /// Folds each periodic axis to the smallest-magnitude image; non-periodic
    /// axes are returned as-is. A single fold per axis is exact only when the
    /// displacement magnitude of interest stays below half the smallest
    /// periodic cell width (see [`PeriodicBox::nearest_plane_distances`]).
    pub fn min_image(&self, delta: Vec3) -> Vec3 {
        self.wrap(delta)
    }

    /// Minimum-image displacement from `a` to `b`.
    pub fn min_image_between(&self, a: Vec3, b: Vec3) -> Vec3 {
        self.min_image(b - a)
    }

    /// Perpendicular widths of the cell along each lattice direction.
    ///
    /// This is the quantity "half the box width" cutoffs are measured
    /// against for triclinic cells. Non-periodic 2D z reports infinity.
    pub fn nearest_plane_distances(&self) -> Vec3 {
        let (a1, a2, a3) = self.lattice_vectors();
        if self.is_2d {
            Vec3::new(self.volume / a2.norm(), self.volume / a1.norm(), f64::INFINITY)
        } else {
            Vec3::new(
                self.volume / a2.cross(&a3).norm(),
                self.volume / a3.cross(&a1).norm(),
                self.volume / a1.cross(&a2).norm(),
            )
        }
    }

    /// Smallest perpendicular width among the periodic axes; infinity when
    /// nothing is periodic.
    pub fn min_periodic_width(&self) -> f64 {
        let w = self.nearest_plane_distances();
        let mut min = f64::INFINITY;
        for i in 0..3 {
            if self.periodic[i] {
                min = min.min(w[i]);
            }
        }
        min
    }

    /// Approximate equality over the six geometric parameters; periodicity
    /// and dimensionality must match exactly.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self.lx - other.lx).abs() <= tol
            && (self.ly - other.ly).abs() <= tol
            && (self.lz - other.lz).abs() <= tol
            && (self.xy - other.xy).abs() <= tol
            && (self.xz - other.xz).abs() <= tol
            && (self.yz - other.yz).abs() <= tol
            && self.periodic == other.periodic
            && self.is_2d == other.is_2d
    }
}

impl PartialEq for PeriodicBox {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, 1e-12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lengths_and_tilts() {
        let b = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(b.lx(), 2.0);
        assert_relative_eq!(b.ly(), 2.0);
        assert_relative_eq!(b.lz(), 2.0);
        assert_relative_eq!(b.xy(), 1.0);
        assert_relative_eq!(b.xz(), 0.0);
        assert_relative_eq!(b.yz(), 0.0);
    }

    #[test]
    fn test_volume() {
        let b = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(b.volume(), 8.0);

        let b2 = PeriodicBox::new_2d(3.0, 4.0, 0.5).unwrap();
        assert_relative_eq!(b2.volume(), 12.0);
    }

    #[test]
    fn test_invalid_boxes() {
        assert!(PeriodicBox::new(0.0, 1.0, 1.0, 0.0, 0.0, 0.0).is_err());
        assert!(PeriodicBox::new(1.0, 1.0, -2.0, 0.0, 0.0, 0.0).is_err());
        assert!(PeriodicBox::new(1.0, 1.0, f64::NAN, 0.0, 0.0, 0.0).is_err());
        // 2D box cannot be made periodic in z
        let b = PeriodicBox::new_2d(1.0, 1.0, 0.0).unwrap();
        assert!(b.with_periodic(true, true, true).is_err());
    }

    #[test]
    fn test_wrap_tilted() {
        let b = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.0, 0.0).unwrap();
        let w = b.wrap(Vec3::new(0.0, -1.0, -1.0));
        assert_relative_eq!(w.x, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap_multiple_images() {
        let b = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.0, 0.0).unwrap();
        let w = b.wrap(Vec3::new(10.0, -5.0, -5.0));
        assert_relative_eq!(w.x, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap_boundary_half_open() {
        // Fractional -0.5 is inside the canonical cell, +0.5 is not.
        let b = PeriodicBox::cube(2.0).unwrap();
        let lo = b.wrap(Vec3::new(0.0, -1.0, -1.0));
        assert_relative_eq!(lo.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(lo.z, -1.0, epsilon = 1e-12);
        let hi = b.wrap(Vec3::new(0.0, 1.0, 1.0));
        assert_relative_eq!(hi.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(hi.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unwrap() {
        let b = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.0, 0.0).unwrap();
        let p = b.unwrap(Vec3::new(0.0, -1.0, -1.0), IVec3::new(1, 0, 0));
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap_unwrap_round_trip() {
        let b = PeriodicBox::new(3.0, 4.0, 5.0, 0.4, -0.2, 0.1).unwrap();
        for p in [
            Vec3::new(7.3, -11.0, 4.2),
            Vec3::new(-0.1, 0.0, 2.49),
            Vec3::new(100.0, -200.0, 300.0),
        ] {
            let w = b.wrap(p);
            let img = b.image_of(p);
            let back = b.unwrap(w, img);
            assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
            assert_relative_eq!(back.z, p.z, epsilon = 1e-9);
            // Wrapping is idempotent on wrapped coordinates
            let ww = b.wrap(w);
            assert_relative_eq!(ww.x, w.x, epsilon = 1e-9);
            assert_relative_eq!(ww.y, w.y, epsilon = 1e-9);
            assert_relative_eq!(ww.z, w.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_min_image() {
        let b = PeriodicBox::cube(10.0).unwrap();
        let dr = b.min_image(Vec3::new(6.0, 3.0, -7.0));
        assert_relative_eq!(dr.x, -4.0, epsilon = 1e-12);
        assert_relative_eq!(dr.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(dr.z, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_image_non_periodic_axis() {
        let b = PeriodicBox::cube(10.0)
            .unwrap()
            .with_periodic(true, true, false)
            .unwrap();
        let dr = b.min_image(Vec3::new(6.0, 3.0, -7.0));
        assert_relative_eq!(dr.x, -4.0, epsilon = 1e-12);
        assert_relative_eq!(dr.z, -7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fractional_round_trip() {
        let b = PeriodicBox::new(3.0, 4.0, 5.0, 0.4, -0.2, 0.1).unwrap();
        let p = Vec3::new(1.2, -0.7, 2.1);
        let f = b.to_fractional(p);
        let back = b.to_cartesian(f);
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-12);
    }

    #[test]
    fn test_equality() {
        let a = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.5, 0.1).unwrap();
        let b = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.5, 0.1).unwrap();
        let c = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        // Same geometry, different periodicity
        let d = a.with_periodic(true, true, false).unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn test_matrix_round_trip() {
        let a = PeriodicBox::new(2.0, 2.0, 2.0, 1.0, 0.5, 0.1).unwrap();
        let b = PeriodicBox::from_matrix(&a.to_matrix()).unwrap();
        assert!(a.approx_eq(&b, 1e-12));

        let a2 = PeriodicBox::new_2d(3.0, 4.0, 0.25).unwrap();
        let b2 = PeriodicBox::from_matrix(&a2.to_matrix()).unwrap();
        assert!(a2.approx_eq(&b2, 1e-12));
    }

    #[test]
    fn test_nearest_plane_distances() {
        let b = PeriodicBox::cube(4.0).unwrap();
        let w = b.nearest_plane_distances();
        assert_relative_eq!(w.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(w.y, 4.0, epsilon = 1e-12);
        assert_relative_eq!(w.z, 4.0, epsilon = 1e-12);
        assert_relative_eq!(b.min_periodic_width(), 4.0, epsilon = 1e-12);

        // A sheared box is narrower than its edge length along x
        let t = PeriodicBox::new(4.0, 4.0, 4.0, 1.0, 0.0, 0.0).unwrap();
        assert!(t.nearest_plane_distances().x < 4.0);
    }

    #[test]
    fn test_2d_wrap_leaves_z() {
        let b = PeriodicBox::new_2d(1.0, 1.0, 0.0).unwrap();
        let w = b.wrap(Vec3::new(0.6, 0.0, 0.3));
        assert_relative_eq!(w.x, -0.4, epsilon = 1e-12);
        assert_relative_eq!(w.z, 0.3, epsilon = 1e-12);
    }
}
