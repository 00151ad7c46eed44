//! Builder for constructing transitions.

use crate::builder::error::ModelError;
use crate::core::{Behavior, Guard, PseudoStateKind, TransitionKind};
use crate::engine::{Transaction, TransitionStrategy};
use crate::model::{Model, Transition, VertexId};

/// Builder for transitions with a fluent API.
///
/// The transition is checked against the model when it is handed to
/// [`ModelBuilder::transition`](crate::builder::ModelBuilder::transition).
pub struct TransitionBuilder<T> {
    from: Option<VertexId>,
    to: Option<VertexId>,
    kind: TransitionKind,
    guard: Option<Guard<T>>,
    effects: Vec<Behavior<T>>,
    completion: bool,
    is_else: bool,
}

impl<T> TransitionBuilder<T> {
    /// Create a new external transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            kind: TransitionKind::External,
            guard: None,
            effects: Vec::new(),
            completion: false,
            is_else: false,
        }
    }

    /// Set the source vertex (required).
    pub fn from(mut self, vertex: VertexId) -> Self {
        self.from = Some(vertex);
        self
    }

    /// Set the target vertex (required unless internal).
    pub fn to(mut self, vertex: VertexId) -> Self {
        self.to = Some(vertex);
        self
    }

    pub fn kind(mut self, kind: TransitionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Make this a local transition; the target must lie inside the source.
    pub fn local(self) -> Self {
        self.kind(TransitionKind::Local)
    }

    /// Make this an internal transition; the target defaults to the source.
    pub fn internal(self) -> Self {
        self.kind(TransitionKind::Internal)
    }

    /// Add a guard predicate (optional).
    pub fn guard(mut self, guard: Guard<T>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Add an effect, run between exit and entry. May be called repeatedly.
    pub fn effect<F>(mut self, action: F) -> Self
    where
        F: Fn(&dyn Transaction, Option<&T>) + Send + Sync + 'static,
    {
        self.effects.push(Behavior::new(action));
        self
    }

    /// Fire when the source state completes instead of on a trigger.
    pub fn completion(mut self) -> Self {
        self.completion = true;
        self
    }

    /// Make this the `else` of a junction or choice; its guard is never consulted.
    pub fn otherwise(mut self) -> Self {
        self.is_else = true;
        self
    }

    /// Check the transition against `model` and compute its strategy.
    pub(crate) fn build(self, model: &Model<T>) -> Result<Transition<T>, ModelError> {
        let source = self.from.ok_or(ModelError::MissingSource)?;
        let target = match (self.to, self.kind) {
            (Some(target), _) => target,
            (None, TransitionKind::Internal) => source,
            (None, _) => return Err(ModelError::MissingTarget),
        };
        for vertex in [source, target] {
            if !model.contains_vertex(vertex) {
                return Err(ModelError::UnknownVertex {
                    index: vertex.index(),
                });
            }
        }

        let source_vertex = model.vertex(source);
        let source_name = || source_vertex.qualified_name().to_string();

        if let Some(kind) = source_vertex.pseudo_kind() {
            if kind == PseudoStateKind::Terminate {
                return Err(ModelError::TerminateHasOutgoing {
                    pseudo_state: source_name(),
                });
            }
            if self.kind == TransitionKind::Internal {
                return Err(ModelError::InternalFromPseudoState {
                    vertex: source_name(),
                });
            }
            if self.completion {
                return Err(ModelError::CompletionFromPseudoState {
                    vertex: source_name(),
                });
            }
        }

        if self.is_else {
            match source_vertex.pseudo_kind() {
                Some(kind) if kind.is_branch() => {
                    if source_vertex.else_transition().is_some() {
                        return Err(ModelError::DuplicateElse {
                            pseudo_state: source_name(),
                        });
                    }
                }
                _ => {
                    return Err(ModelError::ElseOnNonBranch {
                        vertex: source_name(),
                    })
                }
            }
        }

        if self.kind == TransitionKind::Internal && target != source {
            return Err(ModelError::InternalTargetMismatch {
                from: source_name(),
                to: model.vertex(target).qualified_name().to_string(),
            });
        }

        let strategy = TransitionStrategy::new(model, source, target, self.kind)?;

        Ok(Transition {
            source,
            target,
            kind: self.kind,
            guard: self.guard,
            effects: self.effects,
            completion: self.completion,
            is_else: self.is_else,
            strategy,
        })
    }
}

impl<T> Default for TransitionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
