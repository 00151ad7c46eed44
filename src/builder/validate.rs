//! Whole-model checks run by `build()`.
//!
//! These rules depend on the finished set of transitions, so they cannot be
//! judged by the builder call that adds a vertex. Every violation is
//! accumulated rather than stopping at the first.

use crate::builder::error::ModelError;
use crate::core::PseudoStateKind;
use crate::model::{Model, Vertex};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ModelError>>;

/// Validate every pseudo-state of the model.
pub(crate) fn validate<T>(model: &Model<T>) -> Check {
    let checks: Vec<Check> = model
        .vertex_ids()
        .map(|id| model.vertex(id))
        .filter_map(|vertex| match vertex.pseudo_kind() {
            Some(PseudoStateKind::Initial) => Some(check_initial(model, vertex)),
            Some(kind) if kind.is_history() => Some(check_history(vertex)),
            _ => None,
        })
        .collect();

    Validation::all_vec(checks).map(|_| ())
}

/// An initial pseudo-state has exactly one outgoing transition, unguarded.
fn check_initial<T>(model: &Model<T>, vertex: &Vertex<T>) -> Check {
    let outgoing = vertex.outgoing();
    if outgoing.len() != 1 {
        return Validation::fail(ModelError::InitialTransitionCount {
            pseudo_state: vertex.qualified_name().to_string(),
            count: outgoing.len(),
        });
    }
    if model.transition(outgoing[0]).is_guarded() {
        return Validation::fail(ModelError::GuardedInitialTransition {
            pseudo_state: vertex.qualified_name().to_string(),
        });
    }
    Validation::success(())
}

/// A history pseudo-state has at most one default transition.
fn check_history<T>(vertex: &Vertex<T>) -> Check {
    let count = vertex.outgoing().len();
    if count > 1 {
        Validation::fail(ModelError::HistoryDefaultCount {
            pseudo_state: vertex.qualified_name().to_string(),
            count,
        })
    } else {
        Validation::success(())
    }
}
