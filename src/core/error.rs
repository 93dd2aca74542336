//! Error types surfaced by the builder (§7.2, §10.2 of the design notes).
//!
//! Contract violations (malformed AABBs, zero ray directions, inverted seek distances) are
//! programmer errors and are checked with `debug_assert!` at the relevant call sites instead of
//! being represented here — see [`crate::aabb`] and [`crate::ray`]. Only resource exhaustion during
//! construction is a recoverable-at-the-API-boundary error.

use thiserror::Error;

/// Fatal construction-time failure: the tree was not built.
///
/// Once a [`crate::node::Tree`] exists, it has no fallible operations of its own; traversal is
/// infallible and reports a missed ray as a normal result, not an error.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("allocation failed while building the tree")]
    AllocationFailure {
        #[from]
        #[backtrace]
        source: std::collections::TryReserveError,
    },
}
