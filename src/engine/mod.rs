//! Run-time traversal of a built model.
//!
//! - [`StateMachine`]: initialise and evaluate against a transaction
//! - [`Transaction`]: the active configuration and history of one instance
//! - [`TransitionStrategy`]: exit/enter sets precomputed per transition

mod error;
mod machine;
mod strategy;
mod transaction;

pub use error::DispatchError;
pub use machine::{Outcome, StateMachine};
pub use strategy::TransitionStrategy;
pub use transaction::{MapTransaction, Transaction};
