//! Exit and entry sets for each transition kind.

use crate::builder::ModelError;
use crate::core::TransitionKind;
use crate::model::{Element, Model, VertexId};

/// How one transition leaves and enters the containment tree.
///
/// Computed once when the transition is added to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionStrategy {
    /// Exit `exit` (and everything active inside it), then enter `enter`
    /// outermost-first, starting at the same level.
    External { exit: VertexId, enter: Vec<Element> },

    /// Containment path from the source's child region down to the target.
    /// Only the inactive tail of the path is exited and entered at run time.
    Local { path: Vec<Element> },

    /// No exit, no entry.
    Internal,
}

impl TransitionStrategy {
    pub(crate) fn new<T>(
        model: &Model<T>,
        source: VertexId,
        target: VertexId,
        kind: TransitionKind,
    ) -> Result<Self, ModelError> {
        match kind {
            TransitionKind::External => Ok(Self::external(model, source, target)),
            TransitionKind::Local => Self::local(model, source, target),
            TransitionKind::Internal => Ok(Self::Internal),
        }
    }

    fn external<T>(model: &Model<T>, source: VertexId, target: VertexId) -> Self {
        let source_path = model.ancestors(source);
        let target_path = model.ancestors(target);

        // Never go past either end so that self transitions and transitions
        // to an ancestor or descendant still exit and enter a vertex.
        let limit = source_path.len().min(target_path.len()) - 1;
        let mut i = 0;
        while i < limit && source_path[i] == target_path[i] {
            i += 1;
        }

        // Source and target sit in different regions of one state: that
        // state is the innermost vertex containing both, so it is exited
        // and re-entered as a whole.
        if matches!(source_path[i], Element::Region(_)) {
            i -= 1;
        }

        let exit = match source_path[i] {
            Element::Vertex(v) => v,
            Element::Region(_) => source,
        };

        Self::External {
            exit,
            enter: target_path[i..].to_vec(),
        }
    }

    fn local<T>(model: &Model<T>, source: VertexId, target: VertexId) -> Result<Self, ModelError> {
        if !model.vertex(source).is_state() {
            return Err(ModelError::LocalFromPseudoState {
                vertex: model.vertex(source).qualified_name().to_string(),
            });
        }
        if !model.is_descendant(source, target) {
            return Err(ModelError::LocalTargetNotDescendant {
                from: model.vertex(source).qualified_name().to_string(),
                to: model.vertex(target).qualified_name().to_string(),
            });
        }

        let target_path = model.ancestors(target);
        let depth = model.ancestors(source).len();

        Ok(Self::Local {
            path: target_path[depth..].to_vec(),
        })
    }
}
