//! Time budget configuration

use std::time::Duration;

use crate::Deadline;

/// Budget configuration for the work loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetConfig {
    /// Yield once the remaining time drops below this
    pub yield_threshold: Duration,
    /// Longest idle period a wall-clock idle host grants per callback
    pub idle_period: Duration,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        BudgetConfig {
            yield_threshold: Duration::from_millis(1),
            idle_period: Duration::from_millis(50),
        }
    }
}

impl BudgetConfig {
    /// Short slices, early yield: keeps input handling responsive
    pub fn interactive() -> Self {
        BudgetConfig {
            yield_threshold: Duration::from_millis(2),
            idle_period: Duration::from_millis(8),
        }
    }

    /// Long slices for offscreen or bulk rendering
    pub fn batch() -> Self {
        BudgetConfig {
            yield_threshold: Duration::from_micros(100),
            idle_period: Duration::from_millis(250),
        }
    }

    /// Should the work loop hand control back to the host?
    #[inline]
    pub fn should_yield(&self, deadline: &dyn Deadline) -> bool {
        deadline.time_remaining() < self.yield_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedDeadline, Unbounded};

    #[test]
    fn test_default_threshold() {
        let cfg = BudgetConfig::default();
        assert!(cfg.should_yield(&FixedDeadline(Duration::from_micros(999))));
        assert!(!cfg.should_yield(&FixedDeadline(Duration::from_millis(1))));
        assert!(!cfg.should_yield(&Unbounded));
    }

    #[test]
    fn test_presets_are_ordered() {
        let interactive = BudgetConfig::interactive();
        let batch = BudgetConfig::batch();
        assert!(interactive.idle_period < BudgetConfig::default().idle_period);
        assert!(batch.idle_period > BudgetConfig::default().idle_period);
        assert!(batch.yield_threshold < interactive.yield_threshold);
    }
}
