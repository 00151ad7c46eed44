//! Run-time dispatch errors.

use thiserror::Error;

/// Errors that abort the processing of one trigger.
///
/// The transaction is left as it was at the point of failure; callers that
/// need atomicity should evaluate against a copy and keep it on success.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No viable transition out of pseudo-state '{pseudo_state}'")]
    NoViableTransition { pseudo_state: String },

    #[error("History pseudo-state '{pseudo_state}' has nothing to restore and no default")]
    NoHistoryDefault { pseudo_state: String },

    #[error("Region '{region}' has no initial pseudo-state and no recorded state")]
    NoInitial { region: String },

    #[error("Machine '{machine}' has not been initialised")]
    NotInitialised { machine: String },

    #[error("Cascade exceeded {limit} transitions; the model likely loops through pseudo-states")]
    CascadeLimit { limit: usize },
}
