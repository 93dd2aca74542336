//! Axis-aligned bounding boxes and the ray–box slab test (§3, §4.2).

use crate::core::types::{Axis, Number, Point3, Vector3};
use crate::ray::Ray;

/// An axis-aligned bounding box: the closed region `[min, max]` componentwise.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Aabb {
    min: Point3,
    max: Point3,
}

impl Aabb {
    /// A box covering all of space; the starting interval for an accumulating `encompass` fold.
    pub fn infinite() -> Aabb {
        Aabb {
            min: Point3::new(Number::NEG_INFINITY, Number::NEG_INFINITY, Number::NEG_INFINITY),
            max: Point3::new(Number::INFINITY, Number::INFINITY, Number::INFINITY),
        }
    }

    /// Builds a box from two corners, without checking `min <= max`.
    ///
    /// Debug builds assert well-formedness (§7.1: malformed AABBs are a contract violation).
    pub fn new(min: Point3, max: Point3) -> Self {
        let b = Self { min, max };
        debug_assert!(b.well_formed(), "AABB is not well-formed: min={min:?} max={max:?}");
        b
    }

    pub fn min(&self) -> Point3 { self.min }
    pub fn max(&self) -> Point3 { self.max }

    /// Smallest box enclosing both `self` and `other`.
    pub fn encompass(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Point3::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y), self.min.z.min(other.min.z)),
            Point3::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y), self.max.z.max(other.max.z)),
        )
    }

    /// Intersection of `self` and `other`, or `None` if they don't overlap.
    pub fn intersect(&self, other: &Aabb) -> Option<Aabb> {
        let min = Point3::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y), self.min.z.max(other.min.z));
        let max = Point3::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y), self.max.z.min(other.max.z));
        if min.x <= max.x && min.y <= max.y && min.z <= max.z { Some(Aabb::new(min, max)) } else { None }
    }

    /// `min <= max` componentwise.
    pub fn well_formed(&self) -> bool { self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z }

    /// Flat boxes (zero width on some axis but nonempty on the others) do not count as empty.
    pub fn is_empty(&self) -> bool { !(self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z) }

    pub fn is_flat(&self, axis: Axis) -> bool { axis.of_point(self.min) == axis.of_point(self.max) }

    /// Number of axes on which this box is flat (0, 1, 2 or 3).
    pub fn flat_axis_count(&self) -> usize { Axis::ALL.into_iter().filter(|&a| self.is_flat(a)).count() }

    pub fn extent(&self, axis: Axis) -> Number { axis.of_point(self.max) - axis.of_point(self.min) }

    pub fn surface_area(&self) -> Number {
        let (sx, sy, sz) = (self.extent(Axis::X), self.extent(Axis::Y), self.extent(Axis::Z));
        2.0 * (sx * sy + sy * sz + sz * sx)
    }

    /// Decomposition of the surface area used by the split-cost engine (§4.4): the area of the
    /// two end-caps perpendicular to `axis`, and the "wrap" area of the four side faces.
    pub fn end_area_and_wrap(&self, axis: Axis) -> (Number, Number) {
        let (a0, a1) = other_two_axes(axis);
        let (s2, s3) = (self.extent(a0), self.extent(a1));
        let end_area = s2 * s3;
        let wrap = 2.0 * self.extent(axis) * (s2 + s3);
        (end_area, wrap)
    }

    /// Sets the minimum coordinate on one axis, used by the builder to tighten a child's box to
    /// the split value (§4.5 step 4/5).
    pub fn with_axis_min(&self, axis: Axis, value: Number) -> Aabb {
        let mut min = self.min;
        set_component(&mut min, axis, value);
        Aabb::new(min, self.max)
    }

    /// Sets the maximum coordinate on one axis.
    pub fn with_axis_max(&self, axis: Axis, value: Number) -> Aabb {
        let mut max = self.max;
        set_component(&mut max, axis, value);
        Aabb::new(self.min, max)
    }

    /// Ray–box slab test (§4.2), computing signs and reciprocal direction from `ray` itself.
    ///
    /// Returns the entry/exit distances and the axis of the entering/exiting face. Misses when
    /// the exit distance is less than the entry distance, or when the ray is parallel to a slab
    /// with its origin outside that slab.
    pub fn ray_entry_exit(&self, ray: &Ray) -> Option<RayHit> { ray_entry_exit_impl(self, ray.pos(), ray.dir(), ray.inv_dir()) }
}

/// Entry/exit distances and faces produced by [`Aabb::ray_entry_exit`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RayHit {
    pub entry: Number,
    pub exit: Number,
    pub entry_axis: Axis,
    pub exit_axis: Axis,
}

fn other_two_axes(axis: Axis) -> (Axis, Axis) {
    match axis {
        Axis::X => (Axis::Y, Axis::Z),
        Axis::Y => (Axis::Z, Axis::X),
        Axis::Z => (Axis::X, Axis::Y),
    }
}

fn set_component(p: &mut Point3, axis: Axis, value: Number) {
    match axis {
        Axis::X => p.x = value,
        Axis::Y => p.y = value,
        Axis::Z => p.z = value,
    }
}

/// Shared slab-test core: given an origin, direction and precomputed reciprocal direction, walk
/// each axis tracking the running-max near distance (entry) and running-min far distance (exit).
///
/// A zero direction component means the ray is parallel to that pair of slabs: if the origin
/// isn't between them the whole test is a miss regardless of the other axes; otherwise that axis
/// contributes no constraint and is skipped when tracking which axis produced entry/exit.
fn ray_entry_exit_impl(aabb: &Aabb, origin: Point3, dir: Vector3, inv_dir: Vector3) -> Option<RayHit> {
    let mut entry = Number::NEG_INFINITY;
    let mut exit = Number::INFINITY;
    let mut entry_axis = Axis::X;
    let mut exit_axis = Axis::X;

    for axis in Axis::ALL {
        let d = axis.of_vector(dir);
        let o = axis.of_point(origin);
        let (lo, hi) = (axis.of_point(aabb.min), axis.of_point(aabb.max));

        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv_d = axis.of_vector(inv_dir);
        let (near_face, far_face) = if d > 0.0 { (lo, hi) } else { (hi, lo) };
        let near = (near_face - o) * inv_d;
        let far = (far_face - o) * inv_d;

        if near > entry {
            entry = near;
            entry_axis = axis;
        }
        if far < exit {
            exit = far;
            exit_axis = axis;
        }
        if entry > exit {
            return None;
        }
    }

    if entry > exit { None } else { Some(RayHit { entry, exit, entry_axis, exit_axis }) }
}
