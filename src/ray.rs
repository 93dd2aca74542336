use crate::core::types::{Number, Point3, Vector3};
use getset::CopyGetters;

/// A ray in 3D space: an origin point and a normalized direction.
///
/// Carries the per-axis reciprocal of the direction alongside it, so the slab test in
/// [`crate::aabb`] and the traversal engine's split-distance computation never need to divide
/// twice for the same ray.
#[derive(Copy, Clone, PartialEq, Debug, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Ray {
    pos: Point3,
    dir: Vector3,
    inv_dir: Vector3,
}

impl Ray {
    /// Creates a new ray, normalizing `dir`.
    ///
    /// # Panics
    /// Debug builds assert `dir` is non-zero; a zero direction is a contract violation (§7.1),
    /// not a recoverable error.
    pub fn new(pos: impl Into<Point3>, dir: impl Into<Vector3>) -> Self {
        let (pos, dir) = (pos.into(), dir.into());
        debug_assert!(dir.length_squared() > 0.0, "ray direction must be non-zero");
        let dir = dir.normalize();
        Self { pos, dir, inv_dir: reciprocal(dir) }
    }

    /// Creates a new ray without normalizing `dir`.
    ///
    /// # Safety
    /// The caller must guarantee `dir` is already a unit vector; this is assumed, not checked, in
    /// release builds.
    pub unsafe fn new_unchecked(pos: impl Into<Point3>, dir: impl Into<Vector3>) -> Self {
        let (pos, dir) = (pos.into(), dir.into());
        debug_assert!((dir.length_squared() - 1.0).abs() < 1e-9, "direction must be unit length");
        Self { pos, dir, inv_dir: reciprocal(dir) }
    }

    /// Position at distance `t` along the ray: `pos + t * dir`.
    pub fn at(&self, t: Number) -> Point3 { self.pos + (self.dir * t) }
}

fn reciprocal(v: Vector3) -> Vector3 { Vector3::new(v.x.recip(), v.y.recip(), v.z.recip()) }
