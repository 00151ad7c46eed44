//! Fluent builder for engine configuration.

use super::{ChoiceOrder, EngineConfig};

/// Builder for [`EngineConfig`].
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of transitions fired per trigger. Zero is raised to one.
    pub fn max_cascade(mut self, steps: usize) -> Self {
        self.config.max_cascade = steps.max(1);
        self
    }

    pub fn choice_order(mut self, order: ChoiceOrder) -> Self {
        self.config.choice_order = order;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
