//! The mutable execution context consumed by the engine.

use crate::model::{RegionId, VertexId};
use std::collections::HashMap;

/// Live mapping from each region to its active vertex for one execution.
///
/// The engine reads and writes a transaction while it processes a trigger
/// and never keeps it beyond that call; callers own it and decide how it is
/// stored. One transaction corresponds to one running instance of a model.
///
/// Two slots are kept per region:
/// - the active vertex, which may briefly be a pseudo-state mid-cascade
/// - the most recently entered *state*, which is what history restores
///
/// Exiting a vertex never clears either slot, so the value held before an
/// exit is the value history sees on the next entry.
pub trait Transaction {
    /// The active vertex of `region`, if it has ever been entered.
    fn vertex(&self, region: RegionId) -> Option<VertexId>;

    fn set_vertex(&mut self, region: RegionId, vertex: VertexId);

    /// The last state entered in `region`.
    fn state(&self, region: RegionId) -> Option<VertexId>;

    fn set_state(&mut self, region: RegionId, state: VertexId);
}

/// `HashMap`-backed transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapTransaction {
    vertices: HashMap<RegionId, VertexId>,
    states: HashMap<RegionId, VertexId>,
}

impl MapTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active vertex per region.
    pub fn active(&self) -> &HashMap<RegionId, VertexId> {
        &self.vertices
    }

    /// Last entered state per region.
    pub fn history(&self) -> &HashMap<RegionId, VertexId> {
        &self.states
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Transaction for MapTransaction {
    fn vertex(&self, region: RegionId) -> Option<VertexId> {
        self.vertices.get(&region).copied()
    }

    fn set_vertex(&mut self, region: RegionId, vertex: VertexId) {
        self.vertices.insert(region, vertex);
    }

    fn state(&self, region: RegionId) -> Option<VertexId> {
        self.states.get(&region).copied()
    }

    fn set_state(&mut self, region: RegionId, state: VertexId) {
        self.states.insert(region, state);
    }
}
