//! Idle-callback scheduling
//!
//! The host owns the event loop. The engine asks it to run a callback
//! when idle; the host calls back with a deadline. A callback reports
//! whether it wants to be called again, so the work loop never needs a
//! handle to the scheduler to re-arm itself.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

use crate::{BudgetConfig, Deadline, IdleDeadline};

/// What a callback wants after running one slice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleStatus {
    /// More work remains; call again in the next idle period
    Pending,
    /// Nothing left to do
    Done,
}

/// Work-loop callback run by the host when idle
pub type IdleCallback = Box<dyn FnMut(&dyn Deadline) -> IdleStatus + Send>;

/// Host cooperative-yield primitive
pub trait IdleScheduler {
    fn request_idle_callback(&mut self, callback: IdleCallback);
}

/// Idle queue statistics
#[derive(Clone, Debug, Default)]
pub struct IdleStats {
    pub periods: u64,
    pub callbacks_run: u64,
    pub callbacks_completed: u64,
}

/// Run queue that grants each pending callback one wall-clock idle period
pub struct IdleQueue {
    pending: VecDeque<IdleCallback>,
    config: BudgetConfig,
    stats: IdleStats,
}

impl IdleQueue {
    pub fn new() -> Self {
        Self::with_config(BudgetConfig::default())
    }

    pub fn with_config(config: BudgetConfig) -> Self {
        IdleQueue {
            pending: VecDeque::new(),
            config,
            stats: IdleStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn stats(&self) -> &IdleStats {
        &self.stats
    }

    /// Run every queued callback once, each with a fresh deadline
    /// Returns the number of callbacks still pending
    pub fn run_idle_period(&mut self) -> usize {
        self.run_period_with(IdleDeadline::new)
    }

    /// Like `run_idle_period` with a caller-supplied deadline factory
    pub fn run_period_with<D, F>(&mut self, mut make_deadline: F) -> usize
    where
        D: Deadline,
        F: FnMut(Duration) -> D,
    {
        self.stats.periods += 1;
        let batch: Vec<IdleCallback> = self.pending.drain(..).collect();

        for mut callback in batch {
            let deadline = make_deadline(self.config.idle_period);
            self.stats.callbacks_run += 1;
            match callback(&deadline) {
                IdleStatus::Pending => self.pending.push_back(callback),
                IdleStatus::Done => self.stats.callbacks_completed += 1,
            }
        }

        trace!(
            period = self.stats.periods,
            pending = self.pending.len(),
            "idle period finished"
        );
        self.pending.len()
    }

    /// Run idle periods until nothing is pending or `max_periods` is hit
    /// Returns the number of periods run
    pub fn run_until_idle(&mut self, max_periods: usize) -> usize {
        let mut periods = 0;
        while !self.pending.is_empty() && periods < max_periods {
            self.run_idle_period();
            periods += 1;
        }
        periods
    }
}

impl Default for IdleQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleScheduler for IdleQueue {
    fn request_idle_callback(&mut self, callback: IdleCallback) {
        self.pending.push_back(callback);
    }
}
