//! Transitions and the action bodies they run.

use crate::core::Guard;
use crate::runtime::{Chart, ChartError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ActionFn = dyn Fn(&mut Chart, &[Value]) -> Result<Value> + Send + Sync;

/// Executable content attached to transitions and to state entry/exit.
///
/// Actions receive the chart mutably, so they may update the datamodel or
/// trigger further events on the same chart.
#[derive(Clone)]
pub struct Action(Arc<ActionFn>);

impl Action {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut Chart, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(body))
    }

    /// Action that stores `value` under `key` in the datamodel.
    pub fn assign(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        Self::new(move |chart, _| {
            chart.datamodel_mut().set(&key, value.clone());
            Ok(Value::Null)
        })
    }

    /// Action that always fails with `message`.
    pub fn fail(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_, _| Err(ChartError::ActionFailed(message.clone())))
    }

    pub fn run(&self, chart: &mut Chart, args: &[Value]) -> Result<Value> {
        (self.0)(chart, args)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action")
    }
}

/// A guarded, event-triggered move to a target statepath.
///
/// The target is resolved only when the transition fires, relative to the
/// state that owns it. An empty event makes the transition eventless; an
/// empty target makes it internal (the action runs, no state changes).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default)]
    event: String,
    #[serde(default)]
    target: String,
    #[serde(skip)]
    guards: Vec<Guard>,
    #[serde(skip)]
    action: Option<Action>,
}

impl Transition {
    pub fn new(event: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            target: target.into(),
            guards: Vec::new(),
            action: None,
        }
    }

    /// Transition fired automatically on entry when its guards pass.
    pub fn eventless(target: impl Into<String>) -> Self {
        Self::new("", target)
    }

    /// Append a guard; guards are checked in the order added.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Append a guard built from a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Chart, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Set the action body.
    pub fn action<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Chart, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.action = Some(Action::new(body));
        self
    }

    /// Set a prebuilt action body.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    pub fn is_eventless(&self) -> bool {
        self.event.is_empty()
    }

    /// Whether every guard passes (pure).
    pub fn evaluate(&self, chart: &Chart, args: &[Value]) -> bool {
        self.guards.iter().all(|g| g.check(chart, args))
    }

    /// Fire the transition: run the action, then move to the target.
    ///
    /// Returns the action's result, or `Null` when there is no action.
    pub fn invoke(&self, chart: &mut Chart, args: &[Value]) -> Result<Value> {
        let result = match &self.action {
            Some(action) => action.run(chart, args)?,
            None => Value::Null,
        };
        if !self.target.is_empty() {
            chart.change_state(&self.target)?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateSpec;
    use serde_json::json;

    fn chart() -> Chart {
        Chart::new(
            StateSpec::compound("root")
                .state(StateSpec::atomic("idle"))
                .state(StateSpec::atomic("running")),
        )
        .unwrap()
    }

    #[test]
    fn transition_without_guards_always_passes() {
        let chart = chart();
        let transition = Transition::new("start", "running");
        assert!(transition.evaluate(&chart, &[]));
        assert!(!transition.is_eventless());
    }

    #[test]
    fn every_guard_must_pass() {
        let chart = chart();
        let transition = Transition::new("start", "running")
            .when(|_, _| true)
            .when(|_, args| !args.is_empty());

        assert!(!transition.evaluate(&chart, &[]));
        assert!(transition.evaluate(&chart, &[json!(1)]));
        assert_eq!(transition.guards().len(), 2);
    }

    #[test]
    fn invoke_runs_action_then_changes_state() {
        let mut chart = chart();
        let transition = Transition::new("start", "running").action(|chart, args| {
            assert_eq!(chart.current_state().name(), "idle");
            Ok(json!({ "args": args.len() }))
        });

        let result = transition.invoke(&mut chart, &[json!("a")]).unwrap();
        assert_eq!(result, json!({ "args": 1 }));
        assert_eq!(chart.current_state().name(), "running");
    }

    #[test]
    fn internal_transition_keeps_state() {
        let mut chart = chart();
        let transition = Transition::new("tick", "").with_action(Action::assign("ticks", 1));

        transition.invoke(&mut chart, &[]).unwrap();
        assert_eq!(chart.current_state().name(), "idle");
        assert_eq!(chart.datamodel().get("ticks"), Some(&json!(1)));
    }

    #[test]
    fn failing_action_stops_the_transition() {
        let mut chart = chart();
        let transition = Transition::new("start", "running").with_action(Action::fail("boom"));

        let result = transition.invoke(&mut chart, &[]);
        assert_eq!(result, Err(ChartError::ActionFailed("boom".to_string())));
        assert_eq!(chart.current_state().name(), "idle");
    }

    #[test]
    fn transition_declares_event_and_target_in_json() {
        let transition: Transition =
            serde_json::from_str(r#"{ "event": "start", "target": "running" }"#).unwrap();
        assert_eq!(transition.event(), "start");
        assert_eq!(transition.target(), "running");
        assert!(transition.guards().is_empty());

        let eventless: Transition = serde_json::from_str(r#"{ "target": "done" }"#).unwrap();
        assert!(eventless.is_eventless());
    }
}
