//! Renderer configuration

use sprig_time::BudgetConfig;

/// Renderer configuration
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Yield threshold and idle period
    pub budget: BudgetConfig,
    /// Hard cap on fibers processed per work-loop slice
    pub max_units_per_slice: Option<usize>,
    /// Keep the per-fiber effect log in each commit report
    pub record_effects: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig {
            budget: BudgetConfig::default(),
            max_units_per_slice: None,
            record_effects: false,
        }
    }
}

impl RendererConfig {
    /// One fiber per slice, with the effect log kept
    pub fn debug() -> Self {
        RendererConfig {
            budget: BudgetConfig::default(),
            max_units_per_slice: Some(1),
            record_effects: true,
        }
    }

    pub fn with_budget(mut self, budget: BudgetConfig) -> Self {
        self.budget = budget;
        self
    }
}
