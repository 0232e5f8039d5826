//! Errors raised by the chart runtime.

use crate::builder::ConfigViolation;
use thiserror::Error;

/// Errors that can occur while building or driving a chart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChartError {
    /// The declared tree cannot be built or has no state to start in.
    #[error("Invalid chart configuration: {}", join_violations(.0))]
    InvalidConfig(Vec<ConfigViolation>),

    /// A name or statepath did not resolve to a state.
    #[error("State could not be found: '{path}'")]
    InvalidState { path: String },

    /// No route exists between two states, or a step descended into a
    /// state that cannot hold substates.
    #[error("Invalid path: {reason}")]
    InvalidPath { reason: String },

    /// No active state declares the event.
    #[error("No active state handles event '{event}'")]
    InvalidTransition { event: String },

    /// The innermost state declaring the event rejected every candidate.
    #[error("Conditions not satisfied for event '{event}' on '{state}'")]
    ConditionNotSatisfied { event: String, state: String },

    /// An authored action reported a failure.
    #[error("Action failed: {0}")]
    ActionFailed(String),

    /// A transition would exit a final state.
    #[error("Final state '{state}' cannot transition once entered")]
    FinalStateExit { state: String },

    /// Eventless transitions kept firing past the configured limit.
    #[error("Transient transitions from '{state}' exceeded the limit of {limit}")]
    TransientLoop { state: String, limit: usize },
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_lists_every_violation() {
        let error = ChartError::InvalidConfig(vec![
            ConfigViolation::EmptyName {
                parent: "root".to_string(),
            },
            ConfigViolation::ParallelInitial {
                state: "root.p".to_string(),
            },
        ]);

        let message = error.to_string();
        assert!(message.contains("empty name"));
        assert!(message.contains("root.p"));
        assert!(message.contains("; "));
    }

    #[test]
    fn unknown_event_and_blocked_event_are_distinct() {
        let unknown = ChartError::InvalidTransition {
            event: "go".to_string(),
        };
        let blocked = ChartError::ConditionNotSatisfied {
            event: "go".to_string(),
            state: "root.idle".to_string(),
        };

        assert_ne!(unknown, blocked);
        assert_eq!(unknown.to_string(), "No active state handles event 'go'");
    }
}
