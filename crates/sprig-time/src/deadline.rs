//! Deadline implementations
//!
//! A deadline is handed to each work-loop slice by the host; the engine
//! polls it between fibers and never inside one.

use std::time::{Duration, Instant};

/// Remaining time budget of the current idle period
pub trait Deadline {
    fn time_remaining(&self) -> Duration;

    /// Has the budget run out?
    fn did_timeout(&self) -> bool {
        self.time_remaining().is_zero()
    }
}

/// Wall-clock deadline: a budget measured from a start instant
#[derive(Clone, Debug)]
pub struct IdleDeadline {
    started: Instant,
    budget: Duration,
}

impl IdleDeadline {
    /// Deadline starting now
    pub fn new(budget: Duration) -> Self {
        Self::starting_at(Instant::now(), budget)
    }

    pub fn starting_at(started: Instant, budget: Duration) -> Self {
        IdleDeadline { started, budget }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Deadline for IdleDeadline {
    fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }
}

/// Deadline that always reports the same remaining time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDeadline(pub Duration);

impl FixedDeadline {
    /// A deadline that is already over
    pub const EXPIRED: FixedDeadline = FixedDeadline(Duration::ZERO);
}

impl Deadline for FixedDeadline {
    fn time_remaining(&self) -> Duration {
        self.0
    }
}

/// Deadline that never expires; used to flush a cycle synchronously
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

impl<D: Deadline + ?Sized> Deadline for &D {
    fn time_remaining(&self) -> Duration {
        (**self).time_remaining()
    }
}
