//! Variable store consulted by guards and actions.
//!
//! The engine only calls [`DataModel::populate`] once at construction and
//! binds each state's declared data items through [`DataModel::set`]; how
//! values are kept is up to the implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key/value store owned by a chart.
pub trait DataModel: Send + Sync {
    /// Load declared items into the live store. Called once per chart.
    fn populate(&mut self);

    fn get(&self, key: &str) -> Option<&Value>;

    fn set(&mut self, key: &str, value: Value);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory datamodel backed by ordered maps.
///
/// # Example
///
/// ```rust
/// use statechart::datamodel::{DataModel, MemoryDataModel};
/// use serde_json::json;
///
/// let mut model = MemoryDataModel::new().with_item("retries", json!(3));
/// assert!(model.get("retries").is_none());
///
/// model.populate();
/// assert_eq!(model.get("retries"), Some(&json!(3)));
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryDataModel {
    #[serde(default)]
    declared: BTreeMap<String, Value>,
    #[serde(skip)]
    values: BTreeMap<String, Value>,
    #[serde(skip)]
    populated: bool,
}

impl MemoryDataModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an item loaded by `populate`.
    pub fn with_item(mut self, key: impl Into<String>, value: Value) -> Self {
        self.declared.insert(key.into(), value);
        self
    }

    /// Live values.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

impl DataModel for MemoryDataModel {
    fn populate(&mut self) {
        if self.populated {
            return;
        }
        self.populated = true;
        for (key, value) in &self.declared {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn populate_loads_declared_items_once() {
        let mut model = MemoryDataModel::new().with_item("count", json!(0));
        model.populate();
        model.set("count", json!(5));
        model.populate();

        assert_eq!(model.get("count"), Some(&json!(5)));
    }

    #[test]
    fn populate_keeps_values_set_before_it() {
        let mut model = MemoryDataModel::new().with_item("mode", json!("auto"));
        model.set("mode", json!("manual"));
        model.populate();

        assert_eq!(model.get("mode"), Some(&json!("manual")));
    }

    #[test]
    fn contains_reports_live_keys() {
        let mut model = MemoryDataModel::new();
        assert!(!model.contains("x"));
        model.set("x", Value::Null);
        assert!(model.contains("x"));
        assert_eq!(model.values().len(), 1);
    }

    #[test]
    fn declared_items_deserialize() {
        let mut model: MemoryDataModel =
            serde_json::from_str(r#"{ "declared": { "limit": 10 } }"#).unwrap();
        model.populate();
        assert_eq!(model.get("limit"), Some(&json!(10)));
    }
}
