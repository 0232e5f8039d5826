//! Guard predicates for controlling transitions.
//!
//! Guards decide whether a transition may fire. They see the chart (and
//! through it the datamodel) plus the arguments passed to `trigger`, and must
//! be side-effect free.

use crate::runtime::Chart;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&Chart, &[Value]) -> bool + Send + Sync;

/// Pure predicate that determines if a transition can fire.
///
/// # Example
///
/// ```rust
/// use statechart::core::Guard;
/// use statechart::builder::StateSpec;
/// use statechart::runtime::{Chart, Transition};
/// use serde_json::json;
///
/// let positive = Guard::new(|_chart, args| {
///     args.first().and_then(|v| v.as_i64()).is_some_and(|n| n > 0)
/// });
///
/// let chart = Chart::new(
///     StateSpec::compound("root")
///         .state(StateSpec::atomic("idle"))
///         .state(StateSpec::atomic("busy")),
/// )
/// .unwrap();
///
/// assert!(positive.check(&chart, &[json!(3)]));
/// assert!(!positive.check(&chart, &[json!(-1)]));
/// assert!(!positive.check(&chart, &[]));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<Predicate>,
}

impl Guard {
    /// Create a guard from a predicate over the chart and call arguments.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Chart, &[Value]) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that passes when the datamodel holds `value` under `key`.
    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        Self::new(move |chart, _| chart.datamodel().get(&key) == Some(&value))
    }

    /// Evaluate the guard.
    pub fn check(&self, chart: &Chart, args: &[Value]) -> bool {
        (self.predicate)(chart, args)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ChartBuilder, StateSpec};
    use crate::datamodel::MemoryDataModel;
    use serde_json::json;

    fn chart() -> Chart {
        ChartBuilder::new()
            .spec(
                StateSpec::compound("root")
                    .state(StateSpec::atomic("idle"))
                    .state(StateSpec::atomic("busy")),
            )
            .datamodel(MemoryDataModel::new().with_item("mode", json!("auto")))
            .build()
            .unwrap()
    }

    #[test]
    fn guard_sees_call_arguments() {
        let chart = chart();
        let guard = Guard::new(|_, args| args.len() == 2);

        assert!(guard.check(&chart, &[json!(1), json!(2)]));
        assert!(!guard.check(&chart, &[json!(1)]));
    }

    #[test]
    fn guard_reads_the_datamodel() {
        let chart = chart();

        assert!(Guard::equals("mode", "auto").check(&chart, &[]));
        assert!(!Guard::equals("mode", "manual").check(&chart, &[]));
        assert!(!Guard::equals("missing", 1).check(&chart, &[]));
    }

    #[test]
    fn guard_sees_chart_position() {
        let chart = chart();
        let guard = Guard::new(|chart, _| chart.current_state().name() == "idle");
        assert!(guard.check(&chart, &[]));
    }

    #[test]
    fn guard_is_deterministic() {
        let chart = chart();
        let guard = Guard::new(|chart, _| chart.datamodel().contains("mode"));

        let result1 = guard.check(&chart, &[]);
        let result2 = guard.check(&chart, &[]);
        assert_eq!(result1, result2);
    }

    #[test]
    fn cloned_guards_share_the_predicate() {
        let chart = chart();
        let guard = Guard::new(|_, args| args.is_empty());
        let cloned = guard.clone();
        assert_eq!(guard.check(&chart, &[]), cloned.check(&chart, &[]));
    }
}
