//! Statechart: a hierarchical, parallel state machine engine
//!
//! A chart is a tree of states declared once and then driven by events.
//! Compound states keep one active child, parallel states keep every region
//! active at once, and transitions move between states by statepath with
//! exit actions always running before entry actions.
//!
//! # Core Concepts
//!
//! - **StateTree**: arena of atomic, compound, parallel and final states
//! - **Statepaths**: bare names, dotted paths from the root, or paths with
//!   leading dots relative to the current state
//! - **Active configuration**: the active states, every parallel region
//!   included, innermost first
//! - **Transitions**: event-triggered or eventless moves with ordered
//!   guards and an optional action
//! - **DataModel**: key/value store shared by guards and actions
//!
//! # Example
//!
//! ```rust
//! use statechart::{Chart, ChartError, Guard, StateSpec, Transition};
//! use statechart::datamodel::MemoryDataModel;
//! use statechart::builder::ChartBuilder;
//! use serde_json::json;
//!
//! let mut chart = ChartBuilder::new()
//!     .spec(
//!         StateSpec::compound("job")
//!             .initial("idle")
//!             .state(
//!                 StateSpec::atomic("idle").transition(
//!                     Transition::new("start", "running").guard(Guard::equals("ready", true)),
//!                 ),
//!             )
//!             .state(StateSpec::atomic("running")),
//!     )
//!     .datamodel(MemoryDataModel::new().with_item("ready", json!(false)))
//!     .build()
//!     .unwrap();
//!
//! assert!(matches!(
//!     chart.trigger("start", &[]),
//!     Err(ChartError::ConditionNotSatisfied { .. })
//! ));
//!
//! chart.datamodel_mut().set("ready", json!(true));
//! chart.trigger("start", &[]).unwrap();
//! assert_eq!(chart.current_state().name(), "running");
//! assert_eq!(chart.history().get_path(), vec!["job.idle", "job.running"]);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod datamodel;
pub mod runtime;

// Re-export commonly used types
pub use builder::{ChartBuilder, StateSpec};
pub use config::{Binding, ChartConfig};
pub use crate::core::{Guard, RelPath, State, StateId, StateType};
pub use runtime::{Action, Chart, ChartError, Result, Transition};
