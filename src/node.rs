//! Packed node storage (§3, §9): a tagged variant per node, stored in a flat `Vec` and addressed
//! by plain `usize` indices with `Option<usize>` standing in for the "absent child" sentinel.
//!
//! A plain `Vec<KdNode>` was chosen over reusing the teacher's `indextree::Arena`-backed
//! `GenericBvh`: this tree is immutable once built (§1 Non-goals: no dynamic updates), so the
//! parent-pointer/detach/reattach machinery `indextree` exists for has no caller here, and a flat
//! `Vec` matches §3's "packed node records" more directly (see `DESIGN.md`).

use crate::core::types::{Axis, Number};

/// One node in the tree: either an internal split node or a leaf owning its primitive ids.
#[derive(Clone, Debug)]
pub enum KdNode {
    Internal {
        axis: Axis,
        split_value: Number,
        left: Option<usize>,
        right: Option<usize>,
        parent: Option<usize>,
    },
    Leaf { object_ids: Vec<usize>, parent: Option<usize> },
}

impl KdNode {
    pub fn parent(&self) -> Option<usize> {
        match *self {
            KdNode::Internal { parent, .. } => parent,
            KdNode::Leaf { parent, .. } => parent,
        }
    }

    pub fn is_leaf(&self) -> bool { matches!(self, KdNode::Leaf { .. }) }
}

/// The built, immutable tree: a flat array of nodes plus the root's bounding box.
///
/// `root` is `None` only for the empty tree (`N=0`, §8 scenario 1), in which case `nodes` is also
/// empty and any traversal immediately reports "no hit".
#[derive(Clone, Debug)]
pub struct Tree {
    pub(crate) nodes: Vec<KdNode>,
    pub(crate) root: Option<usize>,
    pub(crate) bounds: crate::aabb::Aabb,
}

impl Tree {
    pub(crate) fn new(nodes: Vec<KdNode>, root: Option<usize>, bounds: crate::aabb::Aabb) -> Self { Self { nodes, root, bounds } }

    pub fn node_count(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.root.is_none() }

    pub fn root(&self) -> Option<usize> { self.root }

    pub fn node(&self, index: usize) -> &KdNode { &self.nodes[index] }

    pub fn bounds(&self) -> &crate::aabb::Aabb { &self.bounds }
}
