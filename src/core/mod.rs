//! Core vocabulary shared by the model and the engine.
//!
//! - Pseudo-state and transition kinds
//! - Guard predicates over triggers
//! - Behaviour hooks for entry, exit and transition effects

mod guard;
mod kind;

pub use guard::{Behavior, Guard};
pub use kind::{PseudoStateKind, TransitionKind};
