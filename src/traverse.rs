//! Distance-ordered ray traversal (§4.6, §9).
//!
//! The traversal stack is owned per call (a `SmallVec` living on this function's stack frame), not
//! a process-global — the reference implementation this was distilled from keeps one traversal
//! stack per tree as a static; that's incompatible with "safe to traverse concurrently provided
//! each caller holds its own traversal stack" (§5), so it's re-architected here as described in the
//! Design Notes.

use crate::core::targets;
use crate::core::types::Number;
use crate::interval::Interval;
use crate::node::{KdNode, Tree};
use crate::ray::Ray;
use crate::stats::TraversalStats;
use smallvec::SmallVec;

/// The capability a caller provides to receive leaf contents during traversal (§9: the two
/// callback shapes collapsed into one polymorphic trait). Implement whichever of `visit_object` /
/// `visit_list` is natural; the other has a default built from it. Implementing neither causes
/// infinite recursion the first time a leaf is visited — always override at least one.
///
/// Either method may return `Some(new_stop)` to tighten the traversal's early-termination
/// distance; the engine takes the minimum of whatever's been returned so far.
pub trait LeafVisitor {
    fn visit_object(&mut self, object_id: usize) -> Option<Number> { self.visit_list(&[object_id]) }

    fn visit_list(&mut self, object_ids: &[usize]) -> Option<Number> {
        let mut best: Option<Number> = None;
        for &id in object_ids {
            if let Some(stop) = self.visit_object(id) {
                best = Some(best.map_or(stop, |b: Number| b.min(stop)));
            }
        }
        best
    }
}

#[derive(Copy, Clone, Debug)]
struct StackEntry {
    node: usize,
    interval: Interval,
}

/// Traverses `tree` along `ray`, invoking `visitor` on every leaf whose interval the ray might
/// still reach, in non-decreasing order of near entry distance except across parallel-plane spans
/// (§5 Ordering).
///
/// `seek_distance`, if given, is an initial early-termination distance (the `obeySeekDistance`
/// case of §6's `Traverse` — callers who don't want an initial seek simply pass `None`).
///
/// Returns `true` iff `visitor` ever returned a tightened stop distance — "an object has been
/// provisionally found"; what that means (nearest hit, any hit, shadow test) is up to the caller.
pub fn traverse(tree: &Tree, ray: &Ray, seek_distance: Option<Number>, visitor: &mut impl LeafVisitor) -> bool {
    traverse_inner(tree, ray, seek_distance, visitor, None)
}

/// As [`traverse`], additionally accumulating the four counters of §4.7.
pub fn traverse_with_stats(tree: &Tree, ray: &Ray, seek_distance: Option<Number>, visitor: &mut impl LeafVisitor, stats: &mut TraversalStats) -> bool {
    traverse_inner(tree, ray, seek_distance, visitor, Some(stats))
}

fn traverse_inner(tree: &Tree, ray: &Ray, seek_distance: Option<Number>, visitor: &mut impl LeafVisitor, mut stats: Option<&mut TraversalStats>) -> bool {
    let Some(root) = tree.root() else { return false };

    let Some(hit) = tree.bounds().ray_entry_exit(ray) else { return false };
    if hit.exit < 0.0 {
        // Box is entirely behind the ray origin.
        return false;
    }

    let mut active = Interval::new(hit.entry.max(0.0), hit.exit);
    let mut stop_distance = Number::INFINITY;

    if let Some(seek) = seek_distance {
        debug_assert!(seek >= 0.0, "seek distance must not be negative");
        active = active.clamped(Number::NEG_INFINITY, seek);
        stop_distance = seek;
    }
    if active.is_empty() {
        return false;
    }

    let mut stack: SmallVec<[StackEntry; 32]> = SmallVec::new();
    let mut current = root;
    let mut hit_parallel = false;
    let mut parallel_hit_max = Number::NEG_INFINITY;
    let mut found = false;

    loop {
        if let Some(s) = stats.as_deref_mut() {
            s.node();
        }

        let next = match tree.node(current) {
            KdNode::Leaf { object_ids, .. } => {
                if let Some(s) = stats.as_deref_mut() {
                    s.leaf(object_ids.len());
                }
                tracing::trace!(target: targets::TRAVERSAL, count = object_ids.len(), "leaf visit");
                if let Some(new_stop) = visitor.visit_list(object_ids) {
                    stop_distance = stop_distance.min(new_stop);
                    found = true;
                }
                None
            }
            KdNode::Internal { axis, split_value, left, right, .. } => {
                let (axis, split_value, left, right) = (*axis, *split_value, *left, *right);
                let d = axis.of_vector(ray.dir());

                if d != 0.0 {
                    let split_dist = (split_value - axis.of_point(ray.pos())) / d;
                    let (near, far) = if d > 0.0 { (left, right) } else { (right, left) };

                    if split_dist < active.min {
                        far.map(|n| (n, active))
                    } else if split_dist > active.max {
                        near.map(|n| (n, active))
                    } else {
                        match near {
                            Some(n) => {
                                if let Some(f) = far {
                                    stack.push(StackEntry { node: f, interval: Interval::new(split_dist, active.max) });
                                }
                                Some((n, Interval::new(active.min, split_dist)))
                            }
                            // Near side absent: the interval clips to [splitDist, maxDist] as it
                            // enters the far side (§4.5 step 4 / §4.6).
                            None => far.map(|n| (n, Interval::new(split_dist, active.max))),
                        }
                    }
                } else {
                    let o = axis.of_point(ray.pos());
                    if o < split_value {
                        left.map(|n| (n, active))
                    } else if o > split_value {
                        right.map(|n| (n, active))
                    } else {
                        match (left, right) {
                            (Some(l), Some(r)) => {
                                stack.push(StackEntry { node: r, interval: active });
                                hit_parallel = true;
                                parallel_hit_max = parallel_hit_max.max(active.max);
                                Some((l, active))
                            }
                            (Some(l), None) => Some((l, active)),
                            (None, Some(r)) => Some((r, active)),
                            (None, None) => None,
                        }
                    }
                }
            }
        };

        if let Some((node, interval)) = next {
            current = node;
            active = interval;
            continue;
        }

        // Dead end (leaf visited, or an absent half-space): pop the deferred stack, discarding
        // entries the stop distance has already ruled out, unless a parallel split is still
        // pending for a span this entry's min distance falls inside (§4.6).
        loop {
            match stack.pop() {
                None => return found,
                Some(entry) => {
                    if entry.interval.min > stop_distance && (!hit_parallel || entry.interval.min >= parallel_hit_max) {
                        continue;
                    }
                    current = entry.node;
                    active = entry.interval;
                    break;
                }
            }
        }
    }
}
