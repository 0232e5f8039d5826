//! Builder for constructing charts.

use crate::builder::error::ConfigViolation;
use crate::builder::spec::StateSpec;
use crate::builder::tree::build_tree;
use crate::config::{Binding, ChartConfig};
use crate::datamodel::{DataModel, MemoryDataModel};
use crate::runtime::{Chart, ChartError, Result};
use uuid::Uuid;

/// Builder for constructing charts with a fluent API.
///
/// # Example
///
/// ```rust
/// use statechart::builder::{ChartBuilder, StateSpec};
/// use statechart::config::Binding;
/// use statechart::datamodel::MemoryDataModel;
/// use serde_json::json;
///
/// let chart = ChartBuilder::new()
///     .spec(
///         StateSpec::compound("door")
///             .state(StateSpec::atomic("closed"))
///             .state(StateSpec::atomic("open")),
///     )
///     .binding(Binding::Late)
///     .datamodel(MemoryDataModel::new().with_item("locked", json!(false)))
///     .build()
///     .unwrap();
///
/// assert_eq!(chart.current_state().name(), "closed");
/// assert_eq!(chart.datamodel().get("locked"), Some(&json!(false)));
/// ```
pub struct ChartBuilder {
    spec: Option<StateSpec>,
    config: ChartConfig,
    datamodel: Option<Box<dyn DataModel>>,
}

impl ChartBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            spec: None,
            config: ChartConfig::default(),
            datamodel: None,
        }
    }

    /// Set the root state declaration (required).
    pub fn spec(mut self, spec: StateSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ChartConfig) -> Self {
        self.config = config;
        self
    }

    pub fn binding(mut self, binding: Binding) -> Self {
        self.config.binding = binding;
        self
    }

    pub fn session_id(mut self, session_id: Uuid) -> Self {
        self.config.session_id = Some(session_id);
        self
    }

    /// Use `datamodel` instead of an empty [`MemoryDataModel`].
    pub fn datamodel(mut self, datamodel: impl DataModel + 'static) -> Self {
        self.datamodel = Some(Box::new(datamodel));
        self
    }

    /// Build the chart and enter its starting configuration.
    /// Returns an error if the declaration is missing or invalid.
    pub fn build(self) -> Result<Chart> {
        let spec = self
            .spec
            .ok_or_else(|| ChartError::InvalidConfig(vec![ConfigViolation::MissingRoot]))?;
        let tree = build_tree(spec)?;
        let datamodel = self
            .datamodel
            .unwrap_or_else(|| Box::new(MemoryDataModel::new()));
        Chart::start(tree, self.config, datamodel)
    }
}

impl Default for ChartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Transition;
    use serde_json::json;

    fn spec() -> StateSpec {
        StateSpec::compound("root")
            .state(StateSpec::atomic("idle").transition(Transition::new("start", "running")))
            .state(StateSpec::atomic("running"))
    }

    #[test]
    fn builder_requires_a_spec() {
        let result = ChartBuilder::new().build();
        assert_eq!(
            result.err(),
            Some(ChartError::InvalidConfig(vec![ConfigViolation::MissingRoot]))
        );
    }

    #[test]
    fn builder_reports_invalid_trees() {
        let result = ChartBuilder::new()
            .spec(StateSpec::compound("root").initial("ghost").state(StateSpec::atomic("a")))
            .build();
        assert!(matches!(result, Err(ChartError::InvalidConfig(_))));
    }

    #[test]
    fn fluent_api_builds_chart() {
        let mut chart = ChartBuilder::new()
            .spec(spec())
            .datamodel(MemoryDataModel::new().with_item("speed", json!(1)))
            .build()
            .unwrap();

        assert_eq!(chart.current_state().name(), "idle");
        assert_eq!(chart.datamodel().get("speed"), Some(&json!(1)));
        chart.trigger("start", &[]).unwrap();
        assert_eq!(chart.current_state().name(), "running");
    }

    #[test]
    fn config_settings_reach_the_chart() {
        let chart = ChartBuilder::default()
            .spec(spec())
            .config(ChartConfig {
                record_history: false,
                ..ChartConfig::default()
            })
            .binding(Binding::Late)
            .build()
            .unwrap();

        assert_eq!(chart.config().binding, Binding::Late);
        assert!(!chart.config().record_history);
    }

    #[test]
    fn history_limit_caps_records() {
        let mut chart = ChartBuilder::new()
            .spec(
                StateSpec::compound("root")
                    .state(StateSpec::atomic("a").transition(Transition::new("flip", "b")))
                    .state(StateSpec::atomic("b").transition(Transition::new("flip", "a"))),
            )
            .config(ChartConfig {
                history_limit: Some(2),
                ..ChartConfig::default()
            })
            .build()
            .unwrap();

        for _ in 0..5 {
            chart.trigger("flip", &[]).unwrap();
        }
        assert_eq!(chart.history().len(), 2);
    }
}
