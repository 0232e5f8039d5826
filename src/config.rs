//! Per-chart configuration.
//!
//! Every setting lives on the chart it was built with, so charts in the
//! same process never share mode switches.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// When states' declared data items are bound into the datamodel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    /// Every state's items are bound at construction.
    #[default]
    Early,
    /// A state's items are bound the first time it is entered.
    Late,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartConfig {
    #[serde(default)]
    pub binding: Binding,

    /// Deepest chain of eventless transitions fired before giving up.
    #[serde(default = "default_transient_limit")]
    pub transient_limit: usize,

    #[serde(default = "default_record_history")]
    pub record_history: bool,

    /// Keep at most this many history records.
    #[serde(default)]
    pub history_limit: Option<usize>,

    /// Fixed session identifier; a random one is generated when unset.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

fn default_transient_limit() -> usize {
    64
}

fn default_record_history() -> bool {
    true
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            binding: Binding::default(),
            transient_limit: default_transient_limit(),
            record_history: default_record_history(),
            history_limit: None,
            session_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ChartConfig = serde_json::from_str(r#"{ "binding": "late" }"#).unwrap();
        assert_eq!(config.binding, Binding::Late);
        assert_eq!(config.transient_limit, 64);
        assert!(config.record_history);
        assert_eq!(config.history_limit, None);
        assert_eq!(config.session_id, None);
    }

    #[test]
    fn empty_object_matches_default() {
        let config: ChartConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ChartConfig::default());
    }

    #[test]
    fn session_id_round_trips() {
        let id = Uuid::new_v4();
        let config = ChartConfig {
            session_id: Some(id),
            ..ChartConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ChartConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.session_id, Some(id));
    }
}
