//! Sprig Runtime - Render-cycle engine and idle-loop driver
//!
//! This crate implements the engine surface:
//! 1. `render` arms a cycle with a work-in-progress root
//! 2. `work_loop` processes fibers in pre-order until the budget runs out
//! 3. The finished tree is committed in one pass and becomes current
//!
//! [`SharedRenderer`] drives the loop from a host's idle callbacks, and
//! [`telemetry`] installs the tracing subscriber.

pub mod config;
pub mod driver;
pub mod renderer;
pub mod stats;
pub mod telemetry;

pub use config::*;
pub use driver::*;
pub use renderer::*;
pub use stats::*;
pub use telemetry::{init_tracing, LogFormat, TelemetryError};
