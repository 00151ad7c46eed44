//! Read-only traversal hooks over the model tree.

use super::{Region, RegionId, Transition, TransitionId, Vertex, VertexId};

/// Callbacks for [`Model::accept`](super::Model::accept).
///
/// Each element gets a head visit before its children and a tail visit
/// after them. Transitions are visited from their source vertex, after the
/// source's children. All hooks default to doing nothing.
#[allow(unused_variables)]
pub trait Visitor<T> {
    fn visit_state(&mut self, id: VertexId, state: &Vertex<T>) {}

    fn visit_state_tail(&mut self, id: VertexId, state: &Vertex<T>) {}

    fn visit_pseudo_state(&mut self, id: VertexId, pseudo_state: &Vertex<T>) {}

    fn visit_pseudo_state_tail(&mut self, id: VertexId, pseudo_state: &Vertex<T>) {}

    fn visit_region(&mut self, id: RegionId, region: &Region) {}

    fn visit_region_tail(&mut self, id: RegionId, region: &Region) {}

    fn visit_transition(&mut self, id: TransitionId, transition: &Transition<T>) {}
}
