//! Engine configuration.
//!
//! # Example
//!
//! ```rust
//! use statechart::config::{ChoiceOrder, EngineConfig};
//!
//! let config = EngineConfig::builder()
//!     .max_cascade(64)
//!     .choice_order(ChoiceOrder::Random)
//!     .build();
//!
//! assert_eq!(config.max_cascade, 64);
//! ```

pub mod builder;

pub use builder::EngineConfigBuilder;

use serde::{Deserialize, Serialize};

/// Default bound on the transitions fired by a single trigger's cascade.
pub const DEFAULT_MAX_CASCADE: usize = 1024;

/// Order in which a Choice pseudo-state evaluates its guards.
///
/// Junctions always use declaration order; `else` is always last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChoiceOrder {
    #[default]
    Declaration,
    Random,
}

/// Tunables for a [`StateMachine`](crate::engine::StateMachine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of transitions fired for one trigger (or for
    /// `initialise`) before the dispatch is aborted.
    pub max_cascade: usize,

    pub choice_order: ChoiceOrder,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cascade: DEFAULT_MAX_CASCADE,
            choice_order: ChoiceOrder::Declaration,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }
}
