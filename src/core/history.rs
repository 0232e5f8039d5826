//! Transition history tracking.
//!
//! Every transition a chart fires is recorded with the event that caused it,
//! the statepath it fired from and the statepath the chart settled in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single fired transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Event that fired the transition; empty for eventless transitions
    pub event: String,
    /// Statepath of the current state when the transition fired
    pub source: String,
    /// Statepath of the current state once the transition completed
    pub target: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of fired transitions, oldest first.
///
/// With a limit set, recording past the limit drops the oldest record.
///
/// # Example
///
/// ```rust
/// use statechart::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = StateHistory::new();
/// history.record(TransitionRecord {
///     event: "start".to_string(),
///     source: "root.idle".to_string(),
///     target: "root.running".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec!["root.idle", "root.running"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: VecDeque<TransitionRecord>,
    limit: Option<usize>,
}

impl StateHistory {
    /// Create a new empty, unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history keeping at most `limit` records.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: Some(limit),
        }
    }

    /// Append a record, evicting the oldest when over the limit.
    pub fn record(&mut self, transition: TransitionRecord) {
        self.transitions.push_back(transition);
        if let Some(limit) = self.limit {
            while self.transitions.len() > limit {
                self.transitions.pop_front();
            }
        }
    }

    /// Statepaths visited: the first source, then each target.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(first.source.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.target.as_str());
        }
        path
    }

    /// Time between the first and last recorded transitions.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// All records in order.
    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(event: &str, source: &str, target: &str) -> TransitionRecord {
        TransitionRecord {
            event: event.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn get_path_returns_statepath_sequence() {
        let mut history = StateHistory::new();
        history.record(record("start", "root.idle", "root.running"));
        history.record(record("stop", "root.running", "root.done"));

        assert_eq!(
            history.get_path(),
            vec!["root.idle", "root.running", "root.done"]
        );
        assert_eq!(history.last().map(|r| r.event.as_str()), Some("stop"));
    }

    #[test]
    fn limit_drops_oldest_records() {
        let mut history = StateHistory::with_limit(2);
        history.record(record("a", "root.s0", "root.s1"));
        history.record(record("b", "root.s1", "root.s2"));
        history.record(record("c", "root.s2", "root.s3"));

        let events: Vec<&str> = history.transitions().map(|r| r.event.as_str()).collect();
        assert_eq!(events, vec!["b", "c"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let mut history = StateHistory::new();
        history.record(record("a", "root.s0", "root.s1"));

        std::thread::sleep(std::time::Duration::from_millis(10));

        history.record(record("b", "root.s1", "root.s2"));

        let duration = history.duration();
        assert!(duration.is_some());
        assert!(duration.unwrap() >= std::time::Duration::from_millis(10));
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let mut history = StateHistory::new();
        history.record(record("a", "root.s0", "root.s1"));
        assert_eq!(history.duration(), Some(std::time::Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = StateHistory::new();
        history.record(record("a", "root.s0", "root.s1"));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(history.len(), deserialized.len());
        assert_eq!(history.last(), deserialized.last());
    }
}
