//! Statechart: hierarchical state machines with a read-only model and
//! caller-owned run-time state.
//!
//! A model is a tree of states, regions and pseudo-states joined by
//! transitions. Once built it never changes; the configuration of each
//! running instance lives in a [`Transaction`] that the caller passes into
//! every operation, so one [`StateMachine`] can drive any number of
//! instances.
//!
//! # Core Concepts
//!
//! - **Model**: Arena of states, regions, pseudo-states and transitions
//! - **Builder**: Fluent, validated construction of a model
//! - **Engine**: Trigger dispatch, cascades through pseudo-states, history
//!   and completion transitions
//! - **Checkpoint**: Save and restore an instance by qualified name
//!
//! # Example
//!
//! ```rust
//! use statechart::builder::{ModelBuilder, TransitionBuilder};
//! use statechart::core::PseudoStateKind;
//! use statechart::engine::{MapTransaction, Outcome};
//!
//! let mut builder = ModelBuilder::<&str>::new("light");
//! let region = builder.default_region(builder.root()).unwrap();
//! let initial = builder
//!     .pseudo_state("initial", region, PseudoStateKind::Initial)
//!     .unwrap();
//! let off = builder.state("off", region).unwrap();
//! let on = builder.state("on", region).unwrap();
//!
//! builder
//!     .transition(TransitionBuilder::new().from(initial).to(off))
//!     .unwrap();
//! builder
//!     .transition(TransitionBuilder::new().from(off).to(on).when(|e: &&str| *e == "flip"))
//!     .unwrap();
//! builder
//!     .transition(TransitionBuilder::new().from(on).to(off).when(|e: &&str| *e == "flip"))
//!     .unwrap();
//!
//! let machine = builder.build().unwrap();
//! let mut tx = MapTransaction::new();
//! machine.initialise(&mut tx).unwrap();
//! assert!(machine.is_active(&tx, off));
//!
//! assert_eq!(machine.evaluate(&mut tx, &"flip").unwrap(), Outcome::Handled);
//! assert!(machine.is_active(&tx, on));
//!
//! assert_eq!(machine.evaluate(&mut tx, &"noise").unwrap(), Outcome::Ignored);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod engine;
pub mod model;

// Re-export commonly used types
pub use builder::{ModelBuilder, ModelError, TransitionBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use config::{ChoiceOrder, EngineConfig};
pub use core::{Behavior, Guard, PseudoStateKind, TransitionKind};
pub use engine::{DispatchError, MapTransaction, Outcome, StateMachine, Transaction};
pub use model::{Element, Model, RegionId, TransitionId, VertexId, Visitor};
