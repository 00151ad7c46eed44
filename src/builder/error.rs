//! Modeling errors raised while building a model.

use thiserror::Error;

/// Errors that make a model ill-formed.
///
/// Most are returned by the builder call that introduces the problem; the
/// ones that can only be judged once the model is complete are collected by
/// `build()` into [`ModelError::Invalid`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Vertex #{index} does not belong to this model")]
    UnknownVertex { index: usize },

    #[error("Region #{index} does not belong to this model")]
    UnknownRegion { index: usize },

    #[error("'{name}' is already defined in '{scope}'")]
    DuplicateName { scope: String, name: String },

    #[error("'{vertex}' is not a state")]
    NotAState { vertex: String },

    #[error("Region '{region}' already has an initial pseudo-state '{existing}'")]
    DuplicateInitial { region: String, existing: String },

    #[error("'{vertex}' is not a child of region '{region}'")]
    InitialNotInRegion { region: String, vertex: String },

    #[error("'{vertex}' cannot start a region; only initial and history pseudo-states can")]
    NotStartingKind { vertex: String },

    #[error("Transition source not specified. Call .from(vertex)")]
    MissingSource,

    #[error("Transition target not specified. Call .to(vertex)")]
    MissingTarget,

    #[error("Pseudo-state '{pseudo_state}' already has an else transition")]
    DuplicateElse { pseudo_state: String },

    #[error("'{vertex}' is not a junction or choice and cannot have an else transition")]
    ElseOnNonBranch { vertex: String },

    #[error("Local transition source '{vertex}' is a pseudo-state")]
    LocalFromPseudoState { vertex: String },

    #[error("Local transition target '{to}' is not inside its source '{from}'")]
    LocalTargetNotDescendant { from: String, to: String },

    #[error("Internal transition on '{from}' must target its own source, not '{to}'")]
    InternalTargetMismatch { from: String, to: String },

    #[error("Internal transition source '{vertex}' is a pseudo-state")]
    InternalFromPseudoState { vertex: String },

    #[error("Completion transition source '{vertex}' is a pseudo-state")]
    CompletionFromPseudoState { vertex: String },

    #[error("Terminate pseudo-state '{pseudo_state}' cannot have outgoing transitions")]
    TerminateHasOutgoing { pseudo_state: String },

    #[error("Initial pseudo-state '{pseudo_state}' needs exactly one outgoing transition, found {count}")]
    InitialTransitionCount { pseudo_state: String, count: usize },

    #[error("Initial pseudo-state '{pseudo_state}' has a guarded transition")]
    GuardedInitialTransition { pseudo_state: String },

    #[error("History pseudo-state '{pseudo_state}' has {count} default transitions, at most one is allowed")]
    HistoryDefaultCount { pseudo_state: String, count: usize },

    #[error("Model is invalid ({} problems)", .errors.len())]
    Invalid { errors: Vec<ModelError> },
}
