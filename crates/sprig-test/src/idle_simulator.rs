//! Idle Host Simulator - deterministic cooperative scheduling
//!
//! Simulates:
//! - Idle periods of varying length (seeded jitter)
//! - Work that consumes the budget as the engine checks it
//! - Starved hosts that only ever allow one unit per period

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sprig_time::{Deadline, IdleCallback, IdleScheduler, IdleStatus};

/// Deadline whose budget drains by a fixed cost on every read
///
/// The engine reads the deadline once per processed fiber, so the cost
/// stands in for the time one unit of work takes.
#[derive(Debug)]
pub struct SimulatedDeadline {
    remaining: Cell<Duration>,
    cost_per_read: Duration,
    reads: Cell<u32>,
}

impl SimulatedDeadline {
    pub fn new(budget: Duration, cost_per_read: Duration) -> Self {
        SimulatedDeadline {
            remaining: Cell::new(budget),
            cost_per_read,
            reads: Cell::new(0),
        }
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl Deadline for SimulatedDeadline {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(self.cost_per_read);
        self.remaining.set(left);
        self.reads.set(self.reads.get() + 1);
        left
    }
}

/// Idle host configuration
#[derive(Clone, Debug)]
pub struct IdleSimConfig {
    /// Budget granted per idle period before jitter
    pub base_budget: Duration,
    /// Maximum deviation from the base budget, either way
    pub jitter: Duration,
    /// Simulated cost of one unit of work
    pub unit_cost: Duration,
    pub seed: u64,
}

impl Default for IdleSimConfig {
    fn default() -> Self {
        IdleSimConfig {
            base_budget: Duration::from_millis(8),
            jitter: Duration::from_millis(4),
            unit_cost: Duration::from_millis(1),
            seed: 42,
        }
    }
}

impl IdleSimConfig {
    /// Every period is already exhausted: one unit per period
    pub fn starved() -> Self {
        IdleSimConfig {
            base_budget: Duration::ZERO,
            jitter: Duration::ZERO,
            unit_cost: Duration::from_millis(1),
            seed: 42,
        }
    }

    /// Long quiet periods
    pub fn generous() -> Self {
        IdleSimConfig {
            base_budget: Duration::from_millis(50),
            jitter: Duration::from_millis(1),
            unit_cost: Duration::from_micros(100),
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct IdleSimStats {
    pub periods: u64,
    pub callbacks_run: u64,
    pub callbacks_completed: u64,
    pub budget_granted: Duration,
    pub deadline_reads: u64,
}

/// Simulated host owning the idle-callback queue
pub struct SimulatedIdleHost {
    config: IdleSimConfig,
    rng: StdRng,
    pending: VecDeque<IdleCallback>,
    stats: IdleSimStats,
}

impl SimulatedIdleHost {
    pub fn new(config: IdleSimConfig) -> Self {
        SimulatedIdleHost {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            pending: VecDeque::new(),
            stats: IdleSimStats::default(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> &IdleSimStats {
        &self.stats
    }

    /// Budget for the next period: base plus or minus jitter
    fn grant(&mut self) -> Duration {
        let jitter = self.config.jitter.as_micros() as i64;
        let offset = if jitter == 0 {
            0
        } else {
            self.rng.gen_range(-jitter..=jitter)
        };
        let micros = (self.config.base_budget.as_micros() as i64 + offset).max(0);
        Duration::from_micros(micros as u64)
    }

    /// Run every queued callback once; returns the number still pending
    pub fn run_period(&mut self) -> usize {
        self.stats.periods += 1;
        let batch: Vec<IdleCallback> = self.pending.drain(..).collect();

        for mut callback in batch {
            let budget = self.grant();
            let deadline = SimulatedDeadline::new(budget, self.config.unit_cost);
            self.stats.callbacks_run += 1;
            self.stats.budget_granted += budget;

            let status = callback(&deadline);
            self.stats.deadline_reads += u64::from(deadline.reads());
            match status {
                IdleStatus::Pending => self.pending.push_back(callback),
                IdleStatus::Done => self.stats.callbacks_completed += 1,
            }
        }
        self.pending.len()
    }

    /// Run periods until the queue drains or `max_periods` is reached
    pub fn run_until_idle(&mut self, max_periods: usize) -> usize {
        let mut periods = 0;
        while !self.pending.is_empty() && periods < max_periods {
            self.run_period();
            periods += 1;
        }
        periods
    }
}

impl IdleScheduler for SimulatedIdleHost {
    fn request_idle_callback(&mut self, callback: IdleCallback) {
        self.pending.push_back(callback);
    }
}
