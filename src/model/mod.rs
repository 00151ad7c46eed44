//! The state machine model graph.
//!
//! The containment tree (state → region → vertex → region ...) is held in an
//! arena. Every element is addressed by a small index newtype and every
//! parent/child link is one of those indices, so the graph has no ownership
//! cycles. A [`Model`] is built once by the
//! [`ModelBuilder`](crate::builder::ModelBuilder) and is read-only afterwards;
//! all run-time state lives in a [`Transaction`](crate::engine::Transaction).

mod visitor;

pub use visitor::Visitor;

use crate::core::{Behavior, Guard, PseudoStateKind, TransitionKind};
use crate::engine::TransitionStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the segments of a qualified name.
pub const SEPARATOR: &str = "/";

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the element in its arena.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Handle to a [`Vertex`] (state or pseudo-state).
    VertexId
);
arena_id!(
    /// Handle to a [`Region`].
    RegionId
);
arena_id!(
    /// Handle to a [`Transition`].
    TransitionId
);

/// A node of the containment tree, as it appears in an ancestry path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    Vertex(VertexId),
    Region(RegionId),
}

/// Ordered container of sibling vertices within a state.
#[derive(Debug)]
pub struct Region {
    pub(crate) name: String,
    pub(crate) qualified_name: String,
    pub(crate) parent: VertexId,
    pub(crate) children: Vec<VertexId>,
    pub(crate) initial: Option<VertexId>,
}

impl Region {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The state owning this region.
    pub fn parent(&self) -> VertexId {
        self.parent
    }

    pub fn children(&self) -> &[VertexId] {
        &self.children
    }

    /// The starting pseudo-state used for default entry, if any.
    pub fn initial(&self) -> Option<VertexId> {
        self.initial
    }
}

/// State- or pseudo-state-specific part of a vertex.
pub enum VertexKind<T> {
    State {
        regions: Vec<RegionId>,
        entry: Vec<Behavior<T>>,
        exit: Vec<Behavior<T>>,
    },
    Pseudo {
        kind: PseudoStateKind,
        else_transition: Option<TransitionId>,
    },
}

/// A state or pseudo-state.
pub struct Vertex<T> {
    pub(crate) name: String,
    pub(crate) qualified_name: String,
    pub(crate) parent: Option<RegionId>,
    pub(crate) outgoing: Vec<TransitionId>,
    pub(crate) kind: VertexKind<T>,
}

impl<T> Vertex<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The owning region; `None` only for the root state.
    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    /// Outgoing transitions in declaration order, excluding any `else`.
    pub fn outgoing(&self) -> &[TransitionId] {
        &self.outgoing
    }

    pub fn is_state(&self) -> bool {
        matches!(self.kind, VertexKind::State { .. })
    }

    pub fn pseudo_kind(&self) -> Option<PseudoStateKind> {
        match self.kind {
            VertexKind::Pseudo { kind, .. } => Some(kind),
            VertexKind::State { .. } => None,
        }
    }

    pub fn is_history(&self) -> bool {
        self.pseudo_kind().is_some_and(PseudoStateKind::is_history)
    }

    /// Child regions; empty for simple states and pseudo-states.
    pub fn regions(&self) -> &[RegionId] {
        match &self.kind {
            VertexKind::State { regions, .. } => regions,
            VertexKind::Pseudo { .. } => &[],
        }
    }

    pub fn else_transition(&self) -> Option<TransitionId> {
        match self.kind {
            VertexKind::Pseudo {
                else_transition, ..
            } => else_transition,
            VertexKind::State { .. } => None,
        }
    }

    /// A final state has no outgoing transitions at all.
    pub fn is_final(&self) -> bool {
        self.is_state() && self.outgoing.is_empty()
    }

    pub(crate) fn entry_behaviors(&self) -> &[Behavior<T>] {
        match &self.kind {
            VertexKind::State { entry, .. } => entry,
            VertexKind::Pseudo { .. } => &[],
        }
    }

    pub(crate) fn exit_behaviors(&self) -> &[Behavior<T>] {
        match &self.kind {
            VertexKind::State { exit, .. } => exit,
            VertexKind::Pseudo { .. } => &[],
        }
    }
}

impl<T> fmt::Debug for Vertex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vertex")
            .field("qualified_name", &self.qualified_name)
            .field("pseudo_kind", &self.pseudo_kind())
            .field("regions", &self.regions())
            .field("outgoing", &self.outgoing)
            .finish()
    }
}

/// A directed edge between two vertices.
pub struct Transition<T> {
    pub(crate) source: VertexId,
    pub(crate) target: VertexId,
    pub(crate) kind: TransitionKind,
    pub(crate) guard: Option<Guard<T>>,
    pub(crate) effects: Vec<Behavior<T>>,
    pub(crate) completion: bool,
    pub(crate) is_else: bool,
    pub(crate) strategy: TransitionStrategy,
}

impl<T> Transition<T> {
    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn target(&self) -> VertexId {
        self.target
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Completion transitions fire when their source state completes,
    /// never in response to a dispatched trigger.
    pub fn is_completion(&self) -> bool {
        self.completion
    }

    pub fn is_else(&self) -> bool {
        self.is_else
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }

    pub fn strategy(&self) -> &TransitionStrategy {
        &self.strategy
    }

    /// Unguarded transitions always accept; guarded ones need a trigger.
    pub(crate) fn accepts(&self, trigger: Option<&T>) -> bool {
        self.guard.as_ref().is_none_or(|g| g.accepts(trigger))
    }
}

impl<T> fmt::Debug for Transition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("completion", &self.completion)
            .field("is_else", &self.is_else)
            .finish()
    }
}

/// Read-only arena holding the whole containment tree.
#[derive(Debug)]
pub struct Model<T> {
    pub(crate) root: VertexId,
    pub(crate) vertices: Vec<Vertex<T>>,
    pub(crate) regions: Vec<Region>,
    pub(crate) transitions: Vec<Transition<T>>,
}

impl<T> Model<T> {
    pub(crate) fn with_root(name: &str) -> Self {
        let root = Vertex {
            name: name.to_string(),
            qualified_name: name.to_string(),
            parent: None,
            outgoing: Vec::new(),
            kind: VertexKind::State {
                regions: Vec::new(),
                entry: Vec::new(),
                exit: Vec::new(),
            },
        };
        Self {
            root: VertexId(0),
            vertices: vec![root],
            regions: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// The root state; the machine itself.
    pub fn root(&self) -> VertexId {
        self.root
    }

    pub fn name(&self) -> &str {
        self.vertex(self.root).name()
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex<T> {
        &self.vertices[id.0]
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.0]
    }

    pub fn transition(&self, id: TransitionId) -> &Transition<T> {
        &self.transitions[id.0]
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> {
        (0..self.regions.len()).map(RegionId)
    }

    pub(crate) fn contains_vertex(&self, id: VertexId) -> bool {
        id.0 < self.vertices.len()
    }

    pub(crate) fn contains_region(&self, id: RegionId) -> bool {
        id.0 < self.regions.len()
    }

    /// The state owning the region that contains `vertex`.
    pub fn parent_state(&self, vertex: VertexId) -> Option<VertexId> {
        self.vertex(vertex).parent.map(|r| self.region(r).parent)
    }

    /// Root-first chain of alternating vertices and regions ending at `vertex`.
    pub fn ancestors(&self, vertex: VertexId) -> Vec<Element> {
        let mut chain = vec![Element::Vertex(vertex)];
        let mut current = vertex;
        while let Some(region) = self.vertex(current).parent {
            chain.push(Element::Region(region));
            current = self.region(region).parent;
            chain.push(Element::Vertex(current));
        }
        chain.reverse();
        chain
    }

    /// True if `vertex` lies strictly inside `ancestor`.
    pub fn is_descendant(&self, ancestor: VertexId, vertex: VertexId) -> bool {
        let mut current = vertex;
        while let Some(parent) = self.parent_state(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    pub fn find_vertex(&self, qualified_name: &str) -> Option<VertexId> {
        self.vertices
            .iter()
            .position(|v| v.qualified_name == qualified_name)
            .map(VertexId)
    }

    pub fn find_region(&self, qualified_name: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.qualified_name == qualified_name)
            .map(RegionId)
    }

    /// Human readable `source -> target` label, used in logs and errors.
    pub fn describe(&self, transition: TransitionId) -> String {
        let t = self.transition(transition);
        format!(
            "{} -> {}",
            self.vertex(t.source).qualified_name,
            self.vertex(t.target).qualified_name
        )
    }

    /// Pre-order walk of the whole tree, starting at the root state.
    pub fn accept<V: Visitor<T> + ?Sized>(&self, visitor: &mut V) {
        self.accept_vertex(self.root, visitor);
    }

    fn accept_vertex<V: Visitor<T> + ?Sized>(&self, id: VertexId, visitor: &mut V) {
        let vertex = self.vertex(id);
        if vertex.is_state() {
            visitor.visit_state(id, vertex);
            for &region in vertex.regions() {
                self.accept_region(region, visitor);
            }
        } else {
            visitor.visit_pseudo_state(id, vertex);
        }

        for &t in vertex.outgoing.iter().chain(vertex.else_transition().iter()) {
            visitor.visit_transition(t, self.transition(t));
        }

        if vertex.is_state() {
            visitor.visit_state_tail(id, vertex);
        } else {
            visitor.visit_pseudo_state_tail(id, vertex);
        }
    }

    fn accept_region<V: Visitor<T> + ?Sized>(&self, id: RegionId, visitor: &mut V) {
        let region = self.region(id);
        visitor.visit_region(id, region);
        for &child in &region.children {
            self.accept_vertex(child, visitor);
        }
        visitor.visit_region_tail(id, region);
    }
}
