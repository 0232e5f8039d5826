//! Declarative description of a state tree.

use crate::core::StateType;
use crate::runtime::{Action, Chart, Result, Transition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declarative record for one state and its substates.
///
/// When `kind` is unset the shape is inferred: substates with an `initial`
/// make a compound state, substates without one make a parallel state, and
/// no substates make an atomic state. Entry/exit actions and transition
/// guards are closures and only exist on specs built in code.
///
/// # Example
///
/// ```rust
/// use statechart::builder::StateSpec;
/// use statechart::core::StateType;
/// use statechart::runtime::Transition;
///
/// let spec = StateSpec::compound("player")
///     .initial("stopped")
///     .state(StateSpec::atomic("stopped").transition(Transition::new("play", "playing")))
///     .state(StateSpec::atomic("playing").transition(Transition::new("stop", "stopped")));
///
/// assert_eq!(spec.state_type(), StateType::Compound);
/// assert_eq!(spec.states.len(), 2);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateSpec {
    pub name: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<StateType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,

    #[serde(default)]
    pub states: Vec<StateSpec>,

    #[serde(default)]
    pub transitions: Vec<Transition>,

    /// Data items bound into the datamodel.
    #[serde(default)]
    pub data: BTreeMap<String, Value>,

    #[serde(skip)]
    pub on_entry: Vec<Action>,

    #[serde(skip)]
    pub on_exit: Vec<Action>,
}

impl StateSpec {
    /// State whose shape is inferred from its contents.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn atomic(name: impl Into<String>) -> Self {
        Self::new(name).kind(StateType::Atomic)
    }

    pub fn compound(name: impl Into<String>) -> Self {
        Self::new(name).kind(StateType::Compound)
    }

    pub fn parallel(name: impl Into<String>) -> Self {
        Self::new(name).kind(StateType::Parallel)
    }

    /// Leaf that cannot be left once entered.
    pub fn final_state(name: impl Into<String>) -> Self {
        Self::new(name).kind(StateType::Final)
    }

    pub fn kind(mut self, kind: StateType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Name the child entered by default.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Append a substate.
    pub fn state(mut self, state: StateSpec) -> Self {
        self.states.push(state);
        self
    }

    /// Append several substates.
    pub fn states(mut self, states: impl IntoIterator<Item = StateSpec>) -> Self {
        self.states.extend(states);
        self
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn on_entry<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Chart, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.on_entry.push(Action::new(body));
        self
    }

    pub fn on_exit<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Chart, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.on_exit.push(Action::new(body));
        self
    }

    /// Declare a data item.
    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Declared shape, or the inferred one.
    pub fn state_type(&self) -> StateType {
        match self.kind {
            Some(kind) => kind,
            None if self.states.is_empty() => StateType::Atomic,
            None if self.initial.is_some() => StateType::Compound,
            None => StateType::Parallel,
        }
    }
}
