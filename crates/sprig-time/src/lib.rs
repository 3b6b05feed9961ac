//! Sprig Time - Budgets and cooperative scheduling
//!
//! This crate implements the time side of the work loop:
//! - Deadlines reporting the remaining time budget of an idle period
//! - Budget configuration (yield threshold, idle period length)
//! - The idle-callback scheduling interface and a run queue driving it

pub mod budget;
pub mod deadline;
pub mod idle;

pub use budget::*;
pub use deadline::*;
pub use idle::*;
