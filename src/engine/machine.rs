//! State machine that dispatches triggers through the model.

use super::error::DispatchError;
use super::strategy::TransitionStrategy;
use super::transaction::Transaction;
use crate::config::{ChoiceOrder, EngineConfig};
use crate::core::PseudoStateKind;
use crate::model::{Element, Model, RegionId, TransitionId, Vertex, VertexId};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// What happened to a dispatched trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A transition fired and the configuration settled.
    Handled,

    /// No transition on the active ancestor chain accepted the trigger;
    /// the transaction was not touched.
    Ignored,
}

impl Outcome {
    /// True if a transition fired for the trigger.
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// One unit of cascade work.
#[derive(Clone, Copy, Debug)]
enum Work {
    Traverse {
        transition: TransitionId,
        history: bool,
    },
    Complete(VertexId),
}

/// An executable, read-only state machine.
///
/// The machine holds no run-time state; every operation takes the
/// [`Transaction`] describing one running instance, so any number of
/// instances can share one machine.
#[derive(Debug)]
pub struct StateMachine<T> {
    model: Model<T>,
    config: EngineConfig,
}

impl<T> StateMachine<T> {
    pub(crate) fn new(model: Model<T>, config: EngineConfig) -> Self {
        Self { model, config }
    }

    pub fn model(&self) -> &Model<T> {
        &self.model
    }

    pub fn into_model(self) -> Model<T> {
        self.model
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }

    /// Enter the root state by default entry. Runs any cascade to completion.
    pub fn initialise(&self, tx: &mut dyn Transaction) -> Result<(), DispatchError> {
        debug!(machine = self.name(), "initialise");
        let mut work = Vec::new();
        let result = match self.enter(tx, Element::Vertex(self.model.root()), false, None, &mut work) {
            Ok(()) => self.run(tx, work, None),
            Err(error) => Err(error),
        };
        if let Err(error) = &result {
            warn!(machine = self.name(), %error, "initialisation failed");
        }
        result
    }

    /// Dispatch one trigger and run every resulting cascade to completion.
    ///
    /// The trigger is offered to the deepest active states first; a state
    /// only considers its own transitions when none of its active
    /// descendants handled it.
    pub fn evaluate(&self, tx: &mut dyn Transaction, trigger: &T) -> Result<Outcome, DispatchError> {
        let root = self.model.root();
        if self
            .model
            .vertex(root)
            .regions()
            .iter()
            .any(|&r| tx.vertex(r).is_none())
        {
            return Err(DispatchError::NotInitialised {
                machine: self.name().to_string(),
            });
        }

        match self.delegate(tx, root, trigger) {
            Ok(true) => Ok(Outcome::Handled),
            Ok(false) => {
                debug!(machine = self.name(), "trigger ignored");
                Ok(Outcome::Ignored)
            }
            Err(error) => {
                warn!(machine = self.name(), %error, "dispatch failed");
                Err(error)
            }
        }
    }

    /// True if `vertex` and all of its ancestors are active.
    pub fn is_active(&self, tx: &dyn Transaction, vertex: VertexId) -> bool {
        let mut current = vertex;
        while let Some(region) = self.model.vertex(current).parent() {
            if tx.vertex(region) != Some(current) {
                return false;
            }
            current = self.model.region(region).parent();
        }
        true
    }

    /// True once every region of the root rests in a final state.
    pub fn is_complete(&self, tx: &dyn Transaction) -> bool {
        self.state_is_complete(tx, self.model.root())
    }

    /// True if any active region rests in a Terminate pseudo-state.
    pub fn is_terminated(&self, tx: &dyn Transaction) -> bool {
        self.active_leaves(tx).into_iter().any(|v| {
            self.model.vertex(v).pseudo_kind() == Some(PseudoStateKind::Terminate)
        })
    }

    /// The deepest active vertex of every active region, in tree order.
    pub fn active_leaves(&self, tx: &dyn Transaction) -> Vec<VertexId> {
        let mut leaves = Vec::new();
        let mut pending = vec![self.model.root()];
        while let Some(id) = pending.pop() {
            let active: Vec<VertexId> = self
                .model
                .vertex(id)
                .regions()
                .iter()
                .filter_map(|&r| tx.vertex(r))
                .collect();
            if active.is_empty() {
                leaves.push(id);
            }
            pending.extend(active.into_iter().rev());
        }
        leaves
    }

    fn delegate(
        &self,
        tx: &mut dyn Transaction,
        state: VertexId,
        trigger: &T,
    ) -> Result<bool, DispatchError> {
        let mut handled = false;
        for &region in self.model.vertex(state).regions() {
            // An earlier orthogonal region may have exited this state.
            if !self.is_active(&*tx, state) {
                break;
            }
            if let Some(active) = tx.vertex(region) {
                if self.model.vertex(active).is_state() {
                    handled |= self.delegate(tx, active, trigger)?;
                }
            }
        }
        if handled {
            return Ok(true);
        }

        let selected = self.model.vertex(state).outgoing().iter().copied().find(|&t| {
            let transition = self.model.transition(t);
            !transition.is_completion() && transition.accepts(Some(trigger))
        });

        match selected {
            Some(transition) => {
                let work = vec![Work::Traverse {
                    transition,
                    history: false,
                }];
                self.run(tx, work, Some(trigger))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drain the work stack depth-first, preserving declaration order.
    ///
    /// Only traversals count against `max_cascade`. A completion check
    /// already waiting on the stack is not queued a second time.
    fn run(
        &self,
        tx: &mut dyn Transaction,
        initial: Vec<Work>,
        trigger: Option<&T>,
    ) -> Result<(), DispatchError> {
        let mut stack = Vec::new();
        let mut pending = HashSet::new();
        push_work(&mut stack, &mut pending, initial);

        let mut steps = 0;
        while let Some(work) = stack.pop() {
            let mut produced = Vec::new();
            match work {
                Work::Traverse {
                    transition,
                    history,
                } => {
                    steps += 1;
                    if steps > self.config.max_cascade {
                        return Err(DispatchError::CascadeLimit {
                            limit: self.config.max_cascade,
                        });
                    }
                    self.traverse(tx, transition, history, trigger, &mut produced)?
                }
                Work::Complete(state) => {
                    pending.remove(&state);
                    self.complete(&*tx, state, trigger, &mut produced)
                }
            }
            push_work(&mut stack, &mut pending, produced);
        }
        Ok(())
    }

    fn traverse(
        &self,
        tx: &mut dyn Transaction,
        id: TransitionId,
        history: bool,
        trigger: Option<&T>,
        work: &mut Vec<Work>,
    ) -> Result<(), DispatchError> {
        let transition = self.model.transition(id);
        debug!(
            transition = %self.model.describe(id),
            kind = ?transition.kind(),
            "traverse"
        );

        let changed = match transition.strategy() {
            TransitionStrategy::External { exit, enter } => {
                self.exit(&*tx, *exit, trigger);
                self.run_effects(&*tx, id, trigger);
                self.enter_path(tx, enter, history, trigger, work)?;
                self.model.parent_state(*exit)
            }
            TransitionStrategy::Local { path } => match first_inactive(&*tx, path) {
                Some((index, region)) => {
                    if let Some(active) = tx.vertex(region) {
                        self.exit(&*tx, active, trigger);
                    }
                    self.run_effects(&*tx, id, trigger);
                    self.enter_path(tx, &path[index..], history, trigger, work)?;
                    Some(self.model.region(region).parent())
                }
                None => {
                    self.run_effects(&*tx, id, trigger);
                    None
                }
            },
            // Nothing was entered, so no state can have become complete.
            TransitionStrategy::Internal => {
                self.run_effects(&*tx, id, trigger);
                None
            }
        };

        // Re-check completion bottom-up from where the configuration changed.
        let mut current = changed;
        while let Some(state) = current {
            work.push(Work::Complete(state));
            current = self.model.parent_state(state);
        }
        Ok(())
    }

    fn run_effects(&self, tx: &dyn Transaction, id: TransitionId, trigger: Option<&T>) {
        for effect in &self.model.transition(id).effects {
            effect.run(tx, trigger);
        }
    }

    /// Exit a vertex and everything active inside it, innermost first.
    fn exit(&self, tx: &dyn Transaction, id: VertexId, trigger: Option<&T>) {
        let vertex = self.model.vertex(id);
        for &region in vertex.regions() {
            if let Some(active) = tx.vertex(region) {
                self.exit(tx, active, trigger);
            }
        }
        for behavior in vertex.exit_behaviors() {
            behavior.run(tx, trigger);
        }
        trace!(vertex = vertex.qualified_name(), "exit");
    }

    /// Enter every element of a path outermost first, then cascade from its end.
    fn enter_path(
        &self,
        tx: &mut dyn Transaction,
        path: &[Element],
        history: bool,
        trigger: Option<&T>,
        work: &mut Vec<Work>,
    ) -> Result<(), DispatchError> {
        let Some((&last, heads)) = path.split_last() else {
            return Ok(());
        };
        for (index, &element) in heads.iter().enumerate() {
            self.enter_head(tx, element, history, trigger, Some(path[index + 1]), work)?;
        }
        self.enter(tx, last, history, trigger, work)?;

        for &element in heads.iter().rev() {
            if let Element::Vertex(state) = element {
                work.push(Work::Complete(state));
            }
        }
        Ok(())
    }

    fn enter(
        &self,
        tx: &mut dyn Transaction,
        element: Element,
        history: bool,
        trigger: Option<&T>,
        work: &mut Vec<Work>,
    ) -> Result<(), DispatchError> {
        self.enter_head(tx, element, history, trigger, None, work)?;
        match element {
            Element::Region(region) => self.enter_region(tx, region, history, trigger, work),
            Element::Vertex(vertex) => self.enter_tail(tx, vertex, history, trigger, work),
        }
    }

    /// Mark a vertex active and run its entry behaviour. When the vertex is
    /// crossed on the way to `next`, its other regions get default entry.
    fn enter_head(
        &self,
        tx: &mut dyn Transaction,
        element: Element,
        history: bool,
        trigger: Option<&T>,
        next: Option<Element>,
        work: &mut Vec<Work>,
    ) -> Result<(), DispatchError> {
        let Element::Vertex(id) = element else {
            return Ok(());
        };
        let vertex = self.model.vertex(id);
        if let Some(region) = vertex.parent() {
            tx.set_vertex(region, id);
            if vertex.is_state() {
                tx.set_state(region, id);
            }
        }
        trace!(vertex = vertex.qualified_name(), "enter");
        for behavior in vertex.entry_behaviors() {
            behavior.run(&*tx, trigger);
        }

        if let Some(Element::Region(next)) = next {
            for &region in vertex.regions() {
                if region != next {
                    self.enter(tx, Element::Region(region), history, trigger, work)?;
                }
            }
        }
        Ok(())
    }

    /// Default entry of a region: history if requested and recorded,
    /// otherwise the initial pseudo-state.
    fn enter_region(
        &self,
        tx: &mut dyn Transaction,
        id: RegionId,
        history: bool,
        trigger: Option<&T>,
        work: &mut Vec<Work>,
    ) -> Result<(), DispatchError> {
        let region = self.model.region(id);
        let initial_kind = region
            .initial()
            .and_then(|v| self.model.vertex(v).pseudo_kind());
        let restore = history || initial_kind.is_some_and(PseudoStateKind::is_history);
        let deep = history || initial_kind == Some(PseudoStateKind::DeepHistory);

        let starting = match tx.state(id) {
            Some(state) if restore => state,
            _ => region.initial().ok_or_else(|| DispatchError::NoInitial {
                region: region.qualified_name().to_string(),
            })?,
        };
        self.enter(tx, Element::Vertex(starting), deep, trigger, work)
    }

    fn enter_tail(
        &self,
        tx: &mut dyn Transaction,
        id: VertexId,
        history: bool,
        trigger: Option<&T>,
        work: &mut Vec<Work>,
    ) -> Result<(), DispatchError> {
        let vertex = self.model.vertex(id);
        let Some(kind) = vertex.pseudo_kind() else {
            for &region in vertex.regions() {
                self.enter(tx, Element::Region(region), history, trigger, work)?;
            }
            work.push(Work::Complete(id));
            return Ok(());
        };

        match kind {
            PseudoStateKind::Initial => {
                let transition = vertex.outgoing().first().copied().ok_or_else(|| {
                    DispatchError::NoViableTransition {
                        pseudo_state: vertex.qualified_name().to_string(),
                    }
                })?;
                work.push(Work::Traverse {
                    transition,
                    history,
                });
            }
            PseudoStateKind::ShallowHistory | PseudoStateKind::DeepHistory => {
                self.enter_history(tx, id, kind, history, trigger, work)?;
            }
            PseudoStateKind::Terminate => {
                debug!(vertex = vertex.qualified_name(), "terminated");
            }
            PseudoStateKind::Junction
            | PseudoStateKind::Choice
            | PseudoStateKind::EntryPoint
            | PseudoStateKind::ExitPoint => {
                let transition = self.select(vertex, kind, trigger)?;
                work.push(Work::Traverse {
                    transition,
                    history,
                });
            }
        }
        Ok(())
    }

    /// A history pseudo-state targeted directly: restore the region's last
    /// state, else take its default transition, else the region's initial.
    fn enter_history(
        &self,
        tx: &mut dyn Transaction,
        id: VertexId,
        kind: PseudoStateKind,
        history: bool,
        trigger: Option<&T>,
        work: &mut Vec<Work>,
    ) -> Result<(), DispatchError> {
        let vertex = self.model.vertex(id);
        let deep = history || kind == PseudoStateKind::DeepHistory;
        let no_default = || DispatchError::NoHistoryDefault {
            pseudo_state: vertex.qualified_name().to_string(),
        };
        let region = vertex.parent().ok_or_else(no_default)?;

        if let Some(state) = tx.state(region) {
            return self.enter(tx, Element::Vertex(state), deep, trigger, work);
        }
        if let Some(&transition) = vertex.outgoing().first() {
            work.push(Work::Traverse {
                transition,
                history: deep,
            });
            return Ok(());
        }
        match self.model.region(region).initial() {
            Some(initial) if initial != id => {
                self.enter(tx, Element::Vertex(initial), deep, trigger, work)
            }
            _ => Err(no_default()),
        }
    }

    /// Pick the outgoing transition of a selecting pseudo-state.
    fn select(
        &self,
        vertex: &Vertex<T>,
        kind: PseudoStateKind,
        trigger: Option<&T>,
    ) -> Result<TransitionId, DispatchError> {
        let mut candidates = vertex.outgoing().to_vec();
        if kind == PseudoStateKind::Choice && self.config.choice_order == ChoiceOrder::Random {
            candidates.shuffle(&mut rand::rng());
        }

        candidates
            .into_iter()
            .find(|&t| self.model.transition(t).accepts(trigger))
            .or(vertex.else_transition())
            .ok_or_else(|| DispatchError::NoViableTransition {
                pseudo_state: vertex.qualified_name().to_string(),
            })
    }

    /// Fire the first eligible completion transition of a complete, active state.
    fn complete(
        &self,
        tx: &dyn Transaction,
        state: VertexId,
        trigger: Option<&T>,
        work: &mut Vec<Work>,
    ) {
        if !self.is_active(tx, state) || !self.state_is_complete(tx, state) {
            return;
        }
        let vertex = self.model.vertex(state);
        let selected = vertex.outgoing().iter().copied().find(|&t| {
            let transition = self.model.transition(t);
            transition.is_completion() && transition.accepts(trigger)
        });
        if let Some(transition) = selected {
            debug!(state = vertex.qualified_name(), "completed");
            work.push(Work::Traverse {
                transition,
                history: false,
            });
        }
    }

    fn state_is_complete(&self, tx: &dyn Transaction, state: VertexId) -> bool {
        self.model
            .vertex(state)
            .regions()
            .iter()
            .all(|&region| self.region_is_complete(tx, region))
    }

    /// A region is complete when it rests in a final state that is itself complete.
    fn region_is_complete(&self, tx: &dyn Transaction, region: RegionId) -> bool {
        tx.vertex(region).is_some_and(|active| {
            self.model.vertex(active).is_final() && self.state_is_complete(tx, active)
        })
    }
}

/// Push one step's output so that its first item runs next, skipping
/// completion checks already on the stack.
fn push_work(stack: &mut Vec<Work>, pending: &mut HashSet<VertexId>, produced: Vec<Work>) {
    for work in produced.into_iter().rev() {
        if let Work::Complete(state) = work {
            if !pending.insert(state) {
                continue;
            }
        }
        stack.push(work);
    }
}

/// The first vertex on a local path that is not active, as its index in the
/// path and the region holding it.
fn first_inactive(tx: &dyn Transaction, path: &[Element]) -> Option<(usize, RegionId)> {
    (1..path.len())
        .step_by(2)
        .find_map(|index| match (path[index - 1], path[index]) {
            (Element::Region(region), Element::Vertex(vertex))
                if tx.vertex(region) != Some(vertex) =>
            {
                Some((index, region))
            }
            _ => None,
        })
}
