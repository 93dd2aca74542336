//! Top-down builder (§4.5): sweep each axis, pick the globally best split, partition, recurse.
//!
//! Extent streams here are plain per-recursion `Vec`-backed [`ExtentStream`]s rebuilt from the
//! primitives' clipped boxes at each level, rather than the reference implementation's single
//! preallocated `6·storageMultiplier·N`-triple region with manual tail-allocation for the smaller
//! child and in-place compaction for the larger one (§4.3). That manual buffer-splitting is a
//! C-style memory optimization with no counterpart need in safe Rust, where each recursion's
//! `Vec`s are owned, freed automatically, and cheap to reallocate at the scale this tree targets;
//! `extent_triple_storage_multiplier` is kept on [`BuildOptions`] for interface fidelity (§6) and
//! used only to pre-reserve capacity, with a failed reservation mapped to
//! [`BuildError::AllocationFailure`] — see `DESIGN.md`.

use crate::aabb::Aabb;
use crate::core::error::BuildError;
use crate::core::targets;
use crate::core::types::{Axis, Number, Point3};
use crate::cost::{self, CostModel, SplitGeometry};
use crate::extent::{ExtentKind, ExtentStream};
use crate::node::{KdNode, Tree};
use crate::primitive::Primitive;
use getset::CopyGetters;
use std::collections::HashMap;

/// Configuration recognized by [`build`] (§6).
#[derive(Copy, Clone, Debug, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct BuildOptions {
    cost_model: CostModel,
    stopping_cost_per_ray: Number,
    use_constant_cost: bool,
    object_constant_cost: Number,
    extent_triple_storage_multiplier: usize,
}

impl Default for BuildOptions {
    /// Matches the configuration the §8 test scenarios are specified against: MacDonald–Booth,
    /// `StoppingCostPerRay=1.0`, constant cost of `1.0`.
    fn default() -> Self {
        Self {
            cost_model: CostModel::MacdonaldBooth,
            stopping_cost_per_ray: 1.0,
            use_constant_cost: true,
            object_constant_cost: 1.0,
            extent_triple_storage_multiplier: 4,
        }
    }
}

impl BuildOptions {
    pub fn with_cost_model(mut self, model: CostModel) -> Self {
        self.cost_model = model;
        self
    }

    pub fn with_stopping_cost_per_ray(mut self, value: Number) -> Self {
        self.stopping_cost_per_ray = value;
        self
    }

    pub fn with_constant_cost(mut self, value: Number) -> Self {
        self.use_constant_cost = true;
        self.object_constant_cost = value;
        self
    }

    /// Use each primitive's own [`Primitive::cost`] instead of a constant.
    pub fn with_variable_cost(mut self) -> Self {
        self.use_constant_cost = false;
        self
    }

    pub fn with_extent_triple_storage_multiplier(mut self, multiplier: usize) -> Self {
        debug_assert!(multiplier >= 2, "storage multiplier must be at least 2");
        self.extent_triple_storage_multiplier = multiplier;
        self
    }
}

struct BuildCtx<'a, P: Primitive> {
    primitives: &'a [P],
    options: &'a BuildOptions,
    root_surface_area: Number,
    global_total_cost: Number,
}

impl<'a, P: Primitive> BuildCtx<'a, P> {
    fn cost_of(&self, id: usize) -> Number {
        if self.options.use_constant_cost() { self.options.object_constant_cost() } else { self.primitives[id].cost() }
    }
}

/// Builds a tree over `primitives`, consuming each one's [`Primitive::aabb`] and
/// [`Primitive::clipped_aabb`] (§6 `BuildTree`).
///
/// Returns the empty tree (§8 scenario 1) for `primitives.is_empty()`, without touching `options`.
pub fn build<P: Primitive>(primitives: &[P], options: &BuildOptions) -> Result<Tree, BuildError> {
    if primitives.is_empty() {
        let empty = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0));
        return Ok(Tree::new(Vec::new(), None, empty));
    }

    let mut bounds = primitives[0].aabb();
    for p in &primitives[1..] {
        bounds = bounds.encompass(&p.aabb());
    }
    let root_surface_area = bounds.surface_area();

    let reserve_each = options.extent_triple_storage_multiplier() * primitives.len() / 3 + 1;
    let mut streams = [ExtentStream::new(), ExtentStream::new(), ExtentStream::new()];
    for s in &mut streams {
        s.try_reserve(reserve_each)?;
    }

    let mut global_total_cost = 0.0;
    for id in 0..primitives.len() {
        if let Some(clipped) = primitives[id].clipped_aabb(&bounds) {
            if clipped.flat_axis_count() >= 2 {
                continue;
            }
            for axis in Axis::ALL {
                streams[axis.index()].push_extent(id, axis.of_point(clipped.min()), axis.of_point(clipped.max()));
            }
            let cost = if options.use_constant_cost() { options.object_constant_cost() } else { primitives[id].cost() };
            global_total_cost += cost;
        }
    }
    for s in &mut streams {
        s.sort();
    }

    let ctx = BuildCtx { primitives, options, root_surface_area, global_total_cost };
    let mut nodes = Vec::new();
    let mut exponent_to_beat = Number::INFINITY;
    let root = build_node(&ctx, &mut nodes, None, bounds, streams, global_total_cost, &mut exponent_to_beat)?;

    Ok(Tree::new(nodes, Some(root), bounds))
}

/// Object ids currently live at this node: every primitive contributes exactly one MIN-or-FLAT
/// triple per axis, so scanning any single axis's non-MAX triples recovers the full set (§11).
fn live_ids(stream: &ExtentStream) -> Vec<usize> { stream.iter().filter(|t| t.kind != ExtentKind::Max).map(|t| t.object_id).collect() }

fn build_node<P: Primitive>(
    ctx: &BuildCtx<P>,
    nodes: &mut Vec<KdNode>,
    parent: Option<usize>,
    bounds: Aabb,
    streams: [ExtentStream; 3],
    node_total_cost: Number,
    exponent_to_beat: &mut Number,
) -> Result<usize, BuildError> {
    let my_index = nodes.len();
    nodes.push(KdNode::Leaf { object_ids: Vec::new(), parent });

    let ids = live_ids(&streams[Axis::X.index()]);
    let mod_fade = node_total_cost / ctx.global_total_cost;
    let cost_of: HashMap<usize, Number> = ids.iter().map(|&id| (id, ctx.cost_of(id))).collect();

    let mut best: Option<(Axis, Number, Number)> = None;
    for axis in Axis::ALL {
        if let Some((split_value, cost)) =
            sweep_axis(&streams[axis.index()], axis, &bounds, &cost_of, node_total_cost, ctx.options.cost_model(), mod_fade, exponent_to_beat)
        {
            if best.map_or(true, |(_, _, b)| cost < b) {
                best = Some((axis, split_value, cost));
            }
        }
    }

    // A leaf's own cost carries the same `1 +` traversal-step constant an internal node's formula
    // does (§4.4): both a leaf and a split cost "one step to get here" plus whatever's tested
    // beyond it. Comparing a bare `node_total_cost` against a split's `1 + ...` would bias every
    // decision toward leaves regardless of geometry.
    let leaf_cost = 1.0 + node_total_cost;
    let min_improve = (ctx.root_surface_area / bounds.surface_area()) * ctx.options.stopping_cost_per_ray();
    let accept = best.is_some_and(|(_, _, cost)| leaf_cost - cost > min_improve);

    if !accept || ids.len() <= 1 {
        nodes[my_index] = KdNode::Leaf { object_ids: ids, parent };
        tracing::debug!(target: targets::BUILDER, count = nodes.len(), "leaf");
        return Ok(my_index);
    }

    let (axis, split_value, _) = best.unwrap();
    let (left_ids, right_ids) = classify(&streams[axis.index()], split_value);

    if right_ids.is_empty() {
        let child_bounds = bounds.with_axis_max(axis, split_value);
        let child = build_node(ctx, nodes, Some(my_index), child_bounds, streams, node_total_cost, exponent_to_beat)?;
        nodes[my_index] = KdNode::Internal { axis, split_value, left: Some(child), right: None, parent };
        return Ok(my_index);
    }
    if left_ids.is_empty() {
        let child_bounds = bounds.with_axis_min(axis, split_value);
        let child = build_node(ctx, nodes, Some(my_index), child_bounds, streams, node_total_cost, exponent_to_beat)?;
        nodes[my_index] = KdNode::Internal { axis, split_value, left: None, right: Some(child), parent };
        return Ok(my_index);
    }

    let left_bounds = bounds.with_axis_max(axis, split_value);
    let right_bounds = bounds.with_axis_min(axis, split_value);
    let (left_streams, left_cost) = rebuild_streams(ctx, &left_ids, &left_bounds)?;
    let (right_streams, right_cost) = rebuild_streams(ctx, &right_ids, &right_bounds)?;

    tracing::debug!(target: targets::BUILDER, axis = ?axis, split = split_value, left = left_ids.len(), right = right_ids.len(), "split");

    // Recursion order (smaller subtree first) is cosmetic here; a `Vec`-backed tree has no
    // storage-reuse reason to prefer one side, unlike the source this was distilled from.
    let (left_child, right_child) = if left_ids.len() <= right_ids.len() {
        let l = build_node(ctx, nodes, Some(my_index), left_bounds, left_streams, left_cost, exponent_to_beat)?;
        let r = build_node(ctx, nodes, Some(my_index), right_bounds, right_streams, right_cost, exponent_to_beat)?;
        (l, r)
    } else {
        let r = build_node(ctx, nodes, Some(my_index), right_bounds, right_streams, right_cost, exponent_to_beat)?;
        let l = build_node(ctx, nodes, Some(my_index), left_bounds, left_streams, left_cost, exponent_to_beat)?;
        (l, r)
    };

    nodes[my_index] = KdNode::Internal { axis, split_value, left: Some(left_child), right: Some(right_child), parent };
    Ok(my_index)
}

/// Assigns each primitive in `stream`'s node to the left set, right set, or both (straddling the
/// split), per the invariant in §3: left iff MIN (or FLAT) `<= split_value`, right iff MAX (or
/// FLAT) `>= split_value`.
fn classify(stream: &ExtentStream, split_value: Number) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for t in stream.iter() {
        match t.kind {
            ExtentKind::Min => {
                if t.value <= split_value {
                    left.push(t.object_id);
                }
            }
            ExtentKind::Max => {
                if t.value >= split_value {
                    right.push(t.object_id);
                }
            }
            ExtentKind::Flat => {
                if t.value <= split_value {
                    left.push(t.object_id);
                }
                if t.value >= split_value {
                    right.push(t.object_id);
                }
            }
        }
    }
    (left, right)
}

/// Recomputes refined clipped boxes for `ids` against `child_bounds`, dropping any primitive whose
/// clipped box is empty or flat on two or more axes (§4.5 step 5, §11), and builds the three fresh
/// per-axis extent streams for the child along with its total object cost.
fn rebuild_streams<P: Primitive>(ctx: &BuildCtx<P>, ids: &[usize], child_bounds: &Aabb) -> Result<([ExtentStream; 3], Number), BuildError> {
    let mut streams = [ExtentStream::new(), ExtentStream::new(), ExtentStream::new()];
    let mut total_cost = 0.0;

    for &id in ids {
        let Some(clipped) = ctx.primitives[id].clipped_aabb(child_bounds) else { continue };
        if clipped.flat_axis_count() >= 2 {
            continue;
        }
        for axis in Axis::ALL {
            streams[axis.index()].push_extent(id, axis.of_point(clipped.min()), axis.of_point(clipped.max()));
        }
        total_cost += ctx.cost_of(id);
    }
    for s in &mut streams {
        s.sort();
    }
    Ok((streams, total_cost))
}

/// Single-pass sweep over one axis's sorted stream, evaluating both the "just before" and "just
/// after" split position at every distinct coordinate (§4.5 step 1).
///
/// A FLAT event at a coordinate behaves like a simultaneous MIN+MAX at that one point: it always
/// ends up counted into the left running total by the time this coordinate's group is done, but
/// *when* (before or after the two evaluations at this coordinate) depends on which half of the
/// axis the coordinate falls in — folding flats toward the smaller subtree, per §4.5/§9.
#[allow(clippy::too_many_arguments)]
fn sweep_axis(
    stream: &ExtentStream,
    axis: Axis,
    bounds: &Aabb,
    cost_of: &HashMap<usize, Number>,
    node_total_cost: Number,
    model: CostModel,
    mod_fade: Number,
    exponent_to_beat: &mut Number,
) -> Option<(Number, Number)> {
    let (m0, m1) = (axis.of_point(bounds.min()), axis.of_point(bounds.max()));
    if !(m1 > m0) {
        return None;
    }
    let (end_area, wrap) = bounds.end_area_and_wrap(axis);
    let area = 2.0 * end_area + wrap;
    let mid = 0.5 * (m0 + m1);

    let triples = stream.as_slice();
    let mut cost_left = 0.0;
    let mut cost_right = node_total_cost;
    let mut best: Option<(Number, Number)> = None;

    let mut i = 0;
    while i < triples.len() {
        let v = triples[i].value;
        let mut j = i;
        let (mut end_cost, mut flat_cost, mut start_cost) = (0.0, 0.0, 0.0);
        while j < triples.len() && triples[j].value == v {
            let t = &triples[j];
            let c = *cost_of.get(&t.object_id).expect("triple references a live object's cost");
            match t.kind {
                ExtentKind::Max => end_cost += c,
                ExtentKind::Flat => flat_cost += c,
                ExtentKind::Min => start_cost += c,
            }
            j += 1;
        }

        let first_half = v < mid;
        let gamma = (v - m0) / (m1 - m0);
        let geometry = SplitGeometry { end_area, area, sa_left: 2.0 * end_area + gamma * wrap, sa_right: 2.0 * end_area + (1.0 - gamma) * wrap };

        // A straddling primitive's MAX/MIN events only ever retire it from the opposite side's
        // running total — they do not also add it to the near side. Leaving it double-counted
        // (charged to both sides) between its own MIN and MAX is deliberate: a ray landing on
        // either side of a split taken inside that span may still need to test it. Only FLAT
        // (a single coordinate, no interior span) touches both totals at once.
        cost_right -= end_cost;
        if first_half {
            cost_right -= flat_cost;
            cost_left += flat_cost;
        }

        if let Some(cost) = cost::evaluate_split(model, geometry, node_total_cost, cost_left, cost_right, mod_fade, exponent_to_beat) {
            if best.map_or(true, |(_, b)| cost < b) {
                best = Some((v, cost));
            }
        }

        if !first_half {
            cost_right -= flat_cost;
            cost_left += flat_cost;
        }
        cost_left += start_cost;

        if let Some(cost) = cost::evaluate_split(model, geometry, node_total_cost, cost_left, cost_right, mod_fade, exponent_to_beat) {
            if best.map_or(true, |(_, b)| cost < b) {
                best = Some((v, cost));
            }
        }

        i = j;
    }

    best
}
