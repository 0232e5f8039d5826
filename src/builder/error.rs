//! Violations found while validating a declarative state tree.

use thiserror::Error;

/// A single problem with a declared state tree.
///
/// Validation collects every violation in one pass; they surface together
/// inside [`ChartError::InvalidConfig`](crate::ChartError::InvalidConfig).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("No root state specified. Call .spec(state) before .build()")]
    MissingRoot,

    #[error("State under '{parent}' has an empty name")]
    EmptyName { parent: String },

    #[error("State name '{name}' must not contain '.'")]
    DottedName { name: String },

    #[error("Duplicate state '{name}' under '{parent}'")]
    DuplicateState { parent: String, name: String },

    #[error("Initial state '{initial}' of '{state}' is not one of its children")]
    UnknownInitial { state: String, initial: String },

    #[error("Parallel state '{state}' must not declare an initial state")]
    ParallelInitial { state: String },

    #[error("Atomic state '{state}' must not contain substates")]
    AtomicWithChildren { state: String },

    #[error("Final state '{state}' must not contain substates")]
    FinalWithChildren { state: String },

    #[error("Chart rooted at '{root}' has no state to start in")]
    NoStartingState { root: String },
}
