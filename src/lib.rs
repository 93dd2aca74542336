#![feature(error_generic_member_access)]

pub mod aabb;
pub mod builder;
pub mod core;
pub mod cost;
pub mod double_recurse;
pub mod extent;
pub mod interval;
pub mod node;
pub mod primitive;
pub mod ray;
pub mod stats;
pub mod traverse;

pub use aabb::{Aabb, RayHit};
pub use builder::{build, BuildOptions};
pub use core::error::BuildError;
pub use core::types::{Axis, Number, Point3, Vector3};
pub use cost::CostModel;
pub use node::{KdNode, Tree};
pub use primitive::Primitive;
pub use ray::Ray;
pub use stats::TraversalStats;
pub use traverse::{traverse, traverse_with_stats, LeafVisitor};
