//! Math primitives for the vicinity neighbor-query toolkit.
//!
//! Provides thin `nalgebra` aliases used across the workspace and the
//! axis-aligned bounding box that the spatial index is built from.

pub mod aabb;

pub use aabb::Aabb;

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;
/// Integer triple (periodic image vectors, cell offsets).
pub type IVec3 = na::Vector3<i32>;
