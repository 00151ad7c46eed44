//! Checkpoint and resume functionality for state machine instances.
//!
//! A [`Checkpoint`] records the active configuration and history of one
//! [`MapTransaction`] by qualified name, so an instance can be saved, the
//! process restarted, and the instance resumed against a freshly built
//! machine whose arena indices need not match the old ones.

use crate::engine::{MapTransaction, StateMachine, Transaction};
use crate::model::{Model, Region, RegionId, Vertex, VertexId, Visitor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of one running instance.
/// Does NOT include the model or its behaviours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the root state of the machine the snapshot was taken from
    pub machine: String,

    /// Region qualified name -> active vertex qualified name
    pub active: BTreeMap<String, String>,

    /// Region qualified name -> last entered state qualified name
    pub history: BTreeMap<String, String>,
}

impl Checkpoint {
    /// Snapshot `tx`, which must have been driven by `machine`.
    pub fn capture<T>(
        machine: &StateMachine<T>,
        tx: &MapTransaction,
    ) -> Result<Self, CheckpointError> {
        let model = machine.model();
        let checkpoint = Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            machine: machine.name().to_string(),
            active: named(model, tx.active())?,
            history: named(model, tx.history())?,
        };
        debug!(
            machine = %checkpoint.machine,
            id = %checkpoint.id,
            regions = checkpoint.active.len(),
            "checkpoint captured"
        );
        Ok(checkpoint)
    }

    /// Rebuild a transaction for `machine` from this snapshot.
    ///
    /// Fails if the snapshot names a region or vertex the machine does not
    /// have, or pairs a vertex with a region that does not contain it.
    pub fn restore<T>(
        &self,
        machine: &StateMachine<T>,
    ) -> Result<MapTransaction, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if self.machine != machine.name() {
            return Err(CheckpointError::MachineMismatch {
                expected: machine.name().to_string(),
                found: self.machine.clone(),
            });
        }

        let model = machine.model();
        let index = NameIndex::of(model);
        let mut tx = MapTransaction::new();
        for (region, vertex) in &self.active {
            let (region, vertex) = index.resolve(model, region, vertex)?;
            tx.set_vertex(region, vertex);
        }
        for (region, state) in &self.history {
            let (region, state) = index.resolve(model, region, state)?;
            if !model.vertex(state).is_state() {
                return Err(CheckpointError::ValidationFailed(format!(
                    "history of '{}' is not a state",
                    model.region(region).qualified_name()
                )));
            }
            tx.set_state(region, state);
        }
        debug!(machine = %self.machine, id = %self.id, "checkpoint restored");
        Ok(tx)
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }
}

fn named<T>(
    model: &Model<T>,
    slots: &HashMap<RegionId, VertexId>,
) -> Result<BTreeMap<String, String>, CheckpointError> {
    slots
        .iter()
        .map(|(&region, &vertex)| {
            if !model.contains_region(region) || !model.contains_vertex(vertex) {
                return Err(CheckpointError::ValidationFailed(format!(
                    "transaction refers to region #{} / vertex #{} outside the model",
                    region.index(),
                    vertex.index()
                )));
            }
            Ok((
                model.region(region).qualified_name().to_string(),
                model.vertex(vertex).qualified_name().to_string(),
            ))
        })
        .collect()
}

/// Qualified name lookup for every region and vertex of a model.
#[derive(Default)]
struct NameIndex {
    vertices: HashMap<String, VertexId>,
    regions: HashMap<String, RegionId>,
}

impl NameIndex {
    fn of<T>(model: &Model<T>) -> Self {
        let mut index = Self::default();
        model.accept(&mut index);
        index
    }

    fn resolve<T>(
        &self,
        model: &Model<T>,
        region: &str,
        vertex: &str,
    ) -> Result<(RegionId, VertexId), CheckpointError> {
        let region_id = self
            .regions
            .get(region)
            .copied()
            .ok_or_else(|| CheckpointError::ValidationFailed(format!("unknown region '{region}'")))?;
        let vertex_id = self
            .vertices
            .get(vertex)
            .copied()
            .ok_or_else(|| CheckpointError::ValidationFailed(format!("unknown vertex '{vertex}'")))?;
        if model.vertex(vertex_id).parent() != Some(region_id) {
            return Err(CheckpointError::ValidationFailed(format!(
                "'{vertex}' is not a child of '{region}'"
            )));
        }
        Ok((region_id, vertex_id))
    }
}

impl<T> Visitor<T> for NameIndex {
    fn visit_state(&mut self, id: VertexId, state: &Vertex<T>) {
        self.vertices.insert(state.qualified_name().to_string(), id);
    }

    fn visit_pseudo_state(&mut self, id: VertexId, pseudo_state: &Vertex<T>) {
        self.vertices
            .insert(pseudo_state.qualified_name().to_string(), id);
    }

    fn visit_region(&mut self, id: RegionId, region: &Region) {
        self.regions.insert(region.qualified_name().to_string(), id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ModelBuilder, TransitionBuilder};
    use crate::core::PseudoStateKind;

    fn machine() -> StateMachine<&'static str> {
        let mut builder = ModelBuilder::new("job");
        let region = builder.default_region(builder.root()).unwrap();
        let initial = builder
            .pseudo_state("initial", region, PseudoStateKind::Initial)
            .unwrap();
        let idle = builder.state("idle", region).unwrap();
        let busy = builder.state("busy", region).unwrap();
        builder
            .transition(TransitionBuilder::new().from(initial).to(idle))
            .unwrap();
        builder
            .transition(
                TransitionBuilder::new()
                    .from(idle)
                    .to(busy)
                    .when(|e: &&str| *e == "start"),
            )
            .unwrap();
        builder.build().unwrap()
    }

    fn running() -> (StateMachine<&'static str>, MapTransaction) {
        let machine = machine();
        let mut tx = MapTransaction::new();
        machine.initialise(&mut tx).unwrap();
        machine.evaluate(&mut tx, &"start").unwrap();
        (machine, tx)
    }

    #[test]
    fn capture_records_qualified_names() {
        let (machine, tx) = running();

        let checkpoint = Checkpoint::capture(&machine, &tx).unwrap();

        assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
        assert_eq!(checkpoint.machine, "job");
        assert_eq!(
            checkpoint.active.get("job/default").map(String::as_str),
            Some("job/default/busy")
        );
        assert_eq!(
            checkpoint.history.get("job/default").map(String::as_str),
            Some("job/default/busy")
        );
    }

    #[test]
    fn restore_into_rebuilt_machine() {
        let (machine, tx) = running();
        let checkpoint = Checkpoint::capture(&machine, &tx).unwrap();

        let rebuilt = self::machine();
        let restored = checkpoint.restore(&rebuilt).unwrap();

        assert_eq!(restored, tx);
    }

    #[test]
    fn json_and_binary_preserve_checkpoint() {
        let (machine, tx) = running();
        let checkpoint = Checkpoint::capture(&machine, &tx).unwrap();

        let json = checkpoint.to_json().unwrap();
        assert_eq!(Checkpoint::from_json(&json).unwrap(), checkpoint);

        let bytes = checkpoint.to_bytes().unwrap();
        assert_eq!(Checkpoint::from_bytes(&bytes).unwrap(), checkpoint);
    }

    #[test]
    fn restore_rejects_other_machine() {
        let (machine, tx) = running();
        let mut checkpoint = Checkpoint::capture(&machine, &tx).unwrap();
        checkpoint.machine = "other".to_string();

        let result = checkpoint.restore(&machine);

        assert!(matches!(result, Err(CheckpointError::MachineMismatch { .. })));
    }

    #[test]
    fn restore_rejects_unknown_version() {
        let (machine, tx) = running();
        let mut checkpoint = Checkpoint::capture(&machine, &tx).unwrap();
        checkpoint.version = 99;

        let result = checkpoint.restore(&machine);

        assert!(matches!(
            result,
            Err(CheckpointError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn restore_rejects_unknown_names() {
        let (machine, tx) = running();
        let mut checkpoint = Checkpoint::capture(&machine, &tx).unwrap();
        checkpoint
            .active
            .insert("job/default".to_string(), "job/default/gone".to_string());

        let result = checkpoint.restore(&machine);

        assert!(matches!(result, Err(CheckpointError::ValidationFailed(_))));
    }

    #[test]
    fn restore_rejects_pseudo_state_history() {
        let (machine, tx) = running();
        let mut checkpoint = Checkpoint::capture(&machine, &tx).unwrap();
        checkpoint
            .history
            .insert("job/default".to_string(), "job/default/initial".to_string());

        let result = checkpoint.restore(&machine);

        assert!(matches!(result, Err(CheckpointError::ValidationFailed(_))));
    }

    #[test]
    fn corrupt_input_is_a_deserialization_error() {
        assert!(matches!(
            Checkpoint::from_json("{"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
        assert!(matches!(
            Checkpoint::from_bytes(&[1, 2, 3]),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
