//! Builder for constructing the model graph and the state machine.

use crate::builder::error::ModelError;
use crate::builder::transition::TransitionBuilder;
use crate::builder::validate::validate;
use crate::config::EngineConfig;
use crate::core::{Behavior, PseudoStateKind};
use crate::engine::{StateMachine, Transaction};
use crate::model::{Model, Region, RegionId, TransitionId, Vertex, VertexId, VertexKind, SEPARATOR};
use stillwater::validation::Validation;
use tracing::trace;

/// Name of the region created on demand by [`ModelBuilder::default_region`].
pub const DEFAULT_REGION: &str = "default";

/// Builds a [`Model`] one element at a time, wiring parent links and
/// qualified names as it goes.
///
/// Structural mistakes are reported by the call that makes them; checks
/// that need the finished model run in [`build`](Self::build).
pub struct ModelBuilder<T> {
    model: Model<T>,
}

impl<T> ModelBuilder<T> {
    /// Start a model whose root state is called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            model: Model::with_root(name),
        }
    }

    pub fn root(&self) -> VertexId {
        self.model.root()
    }

    /// The model built so far.
    pub fn model(&self) -> &Model<T> {
        &self.model
    }

    /// Add a region to a state.
    pub fn region(&mut self, name: &str, state: VertexId) -> Result<RegionId, ModelError> {
        let parent = self.state_ref(state)?;
        if parent
            .regions()
            .iter()
            .any(|&r| self.model.region(r).name() == name)
        {
            return Err(ModelError::DuplicateName {
                scope: parent.qualified_name().to_string(),
                name: name.to_string(),
            });
        }

        let id = RegionId(self.model.regions.len());
        let qualified_name = format!("{}{SEPARATOR}{name}", parent.qualified_name());
        trace!(region = %qualified_name, "region added");
        self.model.regions.push(Region {
            name: name.to_string(),
            qualified_name,
            parent: state,
            children: Vec::new(),
            initial: None,
        });
        if let VertexKind::State { regions, .. } = &mut self.model.vertices[state.0].kind {
            regions.push(id);
        }
        Ok(id)
    }

    /// The state's region named `default`, created if missing.
    pub fn default_region(&mut self, state: VertexId) -> Result<RegionId, ModelError> {
        let existing = self
            .state_ref(state)?
            .regions()
            .iter()
            .copied()
            .find(|&r| self.model.region(r).name() == DEFAULT_REGION);
        match existing {
            Some(region) => Ok(region),
            None => self.region(DEFAULT_REGION, state),
        }
    }

    /// Add a state to a region.
    pub fn state(&mut self, name: &str, region: RegionId) -> Result<VertexId, ModelError> {
        self.add_vertex(
            name,
            region,
            VertexKind::State {
                regions: Vec::new(),
                entry: Vec::new(),
                exit: Vec::new(),
            },
        )
    }

    /// Add a pseudo-state to a region.
    ///
    /// An `Initial` pseudo-state becomes the region's initial vertex; a
    /// history pseudo-state does so only while the region has no `Initial`.
    pub fn pseudo_state(
        &mut self,
        name: &str,
        region: RegionId,
        kind: PseudoStateKind,
    ) -> Result<VertexId, ModelError> {
        let current = self.region_ref(region)?.initial();
        let current_kind = current.and_then(|v| self.model.vertex(v).pseudo_kind());
        if kind == PseudoStateKind::Initial && current_kind == Some(PseudoStateKind::Initial) {
            return Err(ModelError::DuplicateInitial {
                region: self.model.region(region).qualified_name().to_string(),
                existing: current
                    .map(|v| self.model.vertex(v).qualified_name().to_string())
                    .unwrap_or_default(),
            });
        }

        let id = self.add_vertex(
            name,
            region,
            VertexKind::Pseudo {
                kind,
                else_transition: None,
            },
        )?;
        if kind == PseudoStateKind::Initial || (kind.is_history() && current.is_none()) {
            self.model.regions[region.0].initial = Some(id);
        }
        Ok(id)
    }

    /// Choose which starting pseudo-state of a region is used for default entry.
    pub fn set_initial(&mut self, region: RegionId, vertex: VertexId) -> Result<(), ModelError> {
        let region_ref = self.region_ref(region)?;
        if !region_ref.children().contains(&vertex) {
            return Err(ModelError::InitialNotInRegion {
                region: region_ref.qualified_name().to_string(),
                vertex: self.vertex_name(vertex),
            });
        }
        if !self
            .model
            .vertex(vertex)
            .pseudo_kind()
            .is_some_and(PseudoStateKind::is_starting)
        {
            return Err(ModelError::NotStartingKind {
                vertex: self.vertex_name(vertex),
            });
        }
        self.model.regions[region.0].initial = Some(vertex);
        Ok(())
    }

    /// Add an entry behaviour to a state.
    pub fn on_entry<F>(&mut self, state: VertexId, action: F) -> Result<(), ModelError>
    where
        F: Fn(&dyn Transaction, Option<&T>) + Send + Sync + 'static,
    {
        self.state_ref(state)?;
        if let VertexKind::State { entry, .. } = &mut self.model.vertices[state.0].kind {
            entry.push(Behavior::new(action));
        }
        Ok(())
    }

    /// Add an exit behaviour to a state.
    pub fn on_exit<F>(&mut self, state: VertexId, action: F) -> Result<(), ModelError>
    where
        F: Fn(&dyn Transaction, Option<&T>) + Send + Sync + 'static,
    {
        self.state_ref(state)?;
        if let VertexKind::State { exit, .. } = &mut self.model.vertices[state.0].kind {
            exit.push(Behavior::new(action));
        }
        Ok(())
    }

    /// Add a transition using a builder.
    /// Returns an error if the transition is ill-formed for this model.
    pub fn transition(&mut self, builder: TransitionBuilder<T>) -> Result<TransitionId, ModelError> {
        let transition = builder.build(&self.model)?;
        let id = TransitionId(self.model.transitions.len());
        let source = transition.source();
        let is_else = transition.is_else();
        self.model.transitions.push(transition);

        let vertex = &mut self.model.vertices[source.0];
        if is_else {
            if let VertexKind::Pseudo {
                else_transition, ..
            } = &mut vertex.kind
            {
                *else_transition = Some(id);
            }
        } else {
            vertex.outgoing.push(id);
        }
        trace!(transition = %self.model.describe(id), "transition added");
        Ok(id)
    }

    /// Build the state machine with the default engine configuration.
    pub fn build(self) -> Result<StateMachine<T>, ModelError> {
        self.build_with(EngineConfig::default())
    }

    /// Build the state machine.
    /// Returns every remaining modeling error at once.
    pub fn build_with(self, config: EngineConfig) -> Result<StateMachine<T>, ModelError> {
        match validate(&self.model) {
            Validation::Success(()) => Ok(StateMachine::new(self.model, config)),
            Validation::Failure(errors) => Err(ModelError::Invalid {
                errors: errors.iter().cloned().collect(),
            }),
        }
    }

    fn add_vertex(
        &mut self,
        name: &str,
        region: RegionId,
        kind: VertexKind<T>,
    ) -> Result<VertexId, ModelError> {
        let parent = self.region_ref(region)?;
        if parent
            .children()
            .iter()
            .any(|&v| self.model.vertex(v).name() == name)
        {
            return Err(ModelError::DuplicateName {
                scope: parent.qualified_name().to_string(),
                name: name.to_string(),
            });
        }

        let id = VertexId(self.model.vertices.len());
        let qualified_name = format!("{}{SEPARATOR}{name}", parent.qualified_name());
        trace!(vertex = %qualified_name, "vertex added");
        self.model.vertices.push(Vertex {
            name: name.to_string(),
            qualified_name,
            parent: Some(region),
            outgoing: Vec::new(),
            kind,
        });
        self.model.regions[region.0].children.push(id);
        Ok(id)
    }

    fn state_ref(&self, state: VertexId) -> Result<&Vertex<T>, ModelError> {
        if !self.model.contains_vertex(state) {
            return Err(ModelError::UnknownVertex {
                index: state.index(),
            });
        }
        let vertex = self.model.vertex(state);
        if !vertex.is_state() {
            return Err(ModelError::NotAState {
                vertex: vertex.qualified_name().to_string(),
            });
        }
        Ok(vertex)
    }

    fn region_ref(&self, region: RegionId) -> Result<&Region, ModelError> {
        if !self.model.contains_region(region) {
            return Err(ModelError::UnknownRegion {
                index: region.index(),
            });
        }
        Ok(self.model.region(region))
    }

    fn vertex_name(&self, vertex: VertexId) -> String {
        if self.model.contains_vertex(vertex) {
            self.model.vertex(vertex).qualified_name().to_string()
        } else {
            format!("#{}", vertex.index())
        }
    }
}
