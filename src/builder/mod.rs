//! Builder API for constructing state machine models.
//!
//! [`ModelBuilder`] grows the containment tree one region, vertex and
//! transition at a time and checks each addition against what already
//! exists. Calling `build()` runs the remaining whole-model checks and
//! returns an executable [`StateMachine`](crate::engine::StateMachine).
//!
//! # Example
//!
//! ```
//! use statechart::builder::{ModelBuilder, TransitionBuilder};
//! use statechart::core::PseudoStateKind;
//!
//! let mut builder = ModelBuilder::<String>::new("door");
//! let region = builder.default_region(builder.root()).unwrap();
//! let initial = builder
//!     .pseudo_state("initial", region, PseudoStateKind::Initial)
//!     .unwrap();
//! let closed = builder.state("closed", region).unwrap();
//! let open = builder.state("open", region).unwrap();
//!
//! builder
//!     .transition(TransitionBuilder::new().from(initial).to(closed))
//!     .unwrap();
//! builder
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(closed)
//!             .to(open)
//!             .when(|e: &String| e == "open"),
//!     )
//!     .unwrap();
//!
//! let machine = builder.build().unwrap();
//! assert_eq!(machine.model().vertex(open).qualified_name(), "door/default/open");
//! ```

pub mod error;
pub mod machine;
pub mod transition;
mod validate;

pub use error::ModelError;
pub use machine::{ModelBuilder, DEFAULT_REGION};
pub use transition::TransitionBuilder;
