//! State tree model and the pure queries over it.
//!
//! This module contains the parts of the engine that never run user code:
//! - The arena-backed state tree and its node types
//! - Statepath addressing and exit/enter route computation
//! - Active-configuration computation, honoring parallel regions
//! - Guard predicates and the transition history

mod active;
mod guard;
mod history;
mod path;
mod state;
mod tree;

pub use guard::Guard;
pub use history::{StateHistory, TransitionRecord};
pub use path::{RelPath, Step};
pub use state::{State, StateId, StateKind, StateType};
pub use tree::{DepthFirst, StateTree};
