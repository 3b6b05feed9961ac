//! Sprig Fiber - Fiber graph, reconciliation and commit
//!
//! This crate implements the reconciliation engine proper:
//! - Fiber arena per render cycle, with pre-order traversal
//! - Component evaluation and host node materialisation
//! - Position-based child reconciliation
//! - Attribute diff against the host-mutation interface
//! - The uninterruptible commit pass

pub mod commit;
pub mod diff;
pub mod evaluate;
pub mod fiber;
pub mod reconcile;
pub mod tree;

#[cfg(test)]
mod testing;

pub use commit::*;
pub use diff::*;
pub use evaluate::*;
pub use fiber::*;
pub use reconcile::*;
pub use tree::*;
