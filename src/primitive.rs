//! The external collaborator contract (§1, §3, §6): geometric primitives the tree is built over.
//!
//! The tree never interprets a primitive's geometry itself — only its box, a clipped-against-box
//! refinement of that box, and an optional scalar traversal cost.

use crate::aabb::Aabb;
use crate::core::types::Number;

/// One indexable geometric primitive (sphere, triangle, parallelogram, ...).
///
/// Implementations live outside this crate; the id a primitive is stored under (`[0, N)`) is
/// assigned by the caller of [`crate::builder::build`], not by this trait.
pub trait Primitive {
    /// This primitive's axis-aligned bounding box.
    fn aabb(&self) -> Aabb;

    /// The refined bounding box of this primitive clipped against `clip_box`, or `None` if the
    /// primitive does not actually intersect `clip_box` (an empty or two-or-more-axes-flat
    /// result, per §4.5 step 5 / §11).
    fn clipped_aabb(&self, clip_box: &Aabb) -> Option<Aabb>;

    /// Scalar cost of testing a ray against this primitive, used by the split-cost engine when
    /// `UseConstantCost` is false (§6). Defaults to `1.0`, matching `ObjectConstantCost`'s default.
    fn cost(&self) -> Number { 1.0 }
}
