//! Sprig Test Harness - Host simulation and reconciliation validation
//!
//! This crate provides:
//! - An in-memory host tree with a mutation log and failure injection
//! - A simulated idle host with seeded budget jitter
//! - Random element-tree fuzzing with convergence checks
//! - End-to-end render scenarios

pub mod host;
pub mod idle_simulator;
pub mod scenario;
pub mod tree_fuzzer;

pub use host::*;
pub use idle_simulator::*;
pub use scenario::*;
pub use tree_fuzzer::*;
