//! State nodes stored in a chart's arena.
//!
//! A state is identified by its name among its siblings and addressed
//! inside its tree by a [`StateId`]. Children are owned by index; the parent
//! link is a plain index used for upward queries only.

use crate::runtime::{Action, Transition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Index of a state within its [`StateTree`](super::StateTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) usize);

impl StateId {
    /// Position of the state in arena order (root is 0).
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The shapes a state can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    Atomic,
    Compound,
    Parallel,
    Final,
}

/// Structural payload of a state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateKind {
    /// Leaf state.
    Atomic,

    /// Exactly one child is active at a time.
    Compound {
        children: Vec<StateId>,
        initial: Option<String>,
        active: Option<StateId>,
    },

    /// Every child is an independent region, all active together.
    Parallel { children: Vec<StateId> },

    /// Leaf that can never be exited once entered.
    Final,
}

impl StateKind {
    pub fn state_type(&self) -> StateType {
        match self {
            Self::Atomic => StateType::Atomic,
            Self::Compound { .. } => StateType::Compound,
            Self::Parallel { .. } => StateType::Parallel,
            Self::Final => StateType::Final,
        }
    }

    /// Children in declaration order; empty for atomic and final states.
    pub fn children(&self) -> &[StateId] {
        match self {
            Self::Atomic | Self::Final => &[],
            Self::Compound { children, .. } | Self::Parallel { children } => children,
        }
    }
}

/// A node of the state tree.
#[derive(Clone, Debug)]
pub struct State {
    pub(crate) id: StateId,
    pub(crate) name: String,
    pub(crate) parent: Option<StateId>,
    pub(crate) kind: StateKind,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) on_entry: Vec<Action>,
    pub(crate) on_exit: Vec<Action>,
    pub(crate) data: BTreeMap<String, Value>,
    pub(crate) bound: bool,
}

impl State {
    pub(crate) fn new(id: StateId, name: String, parent: Option<StateId>, kind: StateKind) -> Self {
        Self {
            id,
            name,
            parent,
            kind,
            transitions: Vec::new(),
            on_entry: Vec::new(),
            on_exit: Vec::new(),
            data: BTreeMap::new(),
            bound: false,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent state, `None` for the root.
    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    pub fn state_type(&self) -> StateType {
        self.kind.state_type()
    }

    pub fn children(&self) -> &[StateId] {
        self.kind.children()
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.kind, StateKind::Atomic)
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, StateKind::Compound { .. })
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self.kind, StateKind::Parallel { .. })
    }

    pub fn is_final(&self) -> bool {
        matches!(self.kind, StateKind::Final)
    }

    /// Whether the state can hold substates.
    pub fn is_composite(&self) -> bool {
        self.is_compound() || self.is_parallel()
    }

    /// Currently selected child of a compound state.
    pub fn active_child(&self) -> Option<StateId> {
        match self.kind {
            StateKind::Compound { active, .. } => active,
            _ => None,
        }
    }

    /// Transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transitions declared for `event`, in declaration order.
    pub fn transitions_for<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a Transition> {
        self.transitions.iter().filter(move |t| t.event() == event)
    }

    pub fn on_entry(&self) -> &[Action] {
        &self.on_entry
    }

    pub fn on_exit(&self) -> &[Action] {
        &self.on_exit
    }

    /// Data items this state contributes to the datamodel.
    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }
}

impl PartialEq<str> for State {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for State {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.state_type(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(children: Vec<StateId>) -> State {
        State::new(
            StateId(0),
            "root".to_string(),
            None,
            StateKind::Compound {
                children,
                initial: None,
                active: None,
            },
        )
    }

    #[test]
    fn kind_reports_children_in_declaration_order() {
        let state = compound(vec![StateId(2), StateId(1)]);
        assert_eq!(state.children(), &[StateId(2), StateId(1)]);
        assert_eq!(state.state_type(), StateType::Compound);
        assert!(state.is_compound());
        assert!(!state.is_atomic());
    }

    #[test]
    fn atomic_state_has_no_children() {
        let state = State::new(StateId(3), "idle".to_string(), Some(StateId(0)), StateKind::Atomic);
        assert!(state.children().is_empty());
        assert_eq!(state.parent(), Some(StateId(0)));
        assert_eq!(state.active_child(), None);
    }

    #[test]
    fn final_state_is_a_leaf() {
        let state = State::new(StateId(4), "done".to_string(), Some(StateId(0)), StateKind::Final);
        assert!(state.is_final());
        assert!(!state.is_composite());
        assert!(state.children().is_empty());
        assert_eq!(state.state_type(), StateType::Final);
        assert_eq!(serde_json::to_string(&StateType::Final).unwrap(), "\"final\"");
    }

    #[test]
    fn transitions_for_filters_by_event() {
        let mut state = State::new(StateId(1), "idle".to_string(), None, StateKind::Atomic);
        state.transitions.push(Transition::new("start", "running"));
        state.transitions.push(Transition::new("stop", "stopped"));
        state.transitions.push(Transition::new("start", "paused"));

        let targets: Vec<&str> = state.transitions_for("start").map(|t| t.target()).collect();
        assert_eq!(targets, vec!["running", "paused"]);
        assert_eq!(state.transitions_for("missing").count(), 0);
    }

    #[test]
    fn state_compares_equal_to_its_name() {
        let state = State::new(StateId(1), "idle".to_string(), None, StateKind::Atomic);
        assert!(state == "idle");
        assert_eq!(state.to_string(), "Atomic(idle)");
    }

    #[test]
    fn state_type_serializes_lowercase() {
        let json = serde_json::to_string(&StateType::Parallel).unwrap();
        assert_eq!(json, "\"parallel\"");
        let parsed: StateType = serde_json::from_str("\"compound\"").unwrap();
        assert_eq!(parsed, StateType::Compound);
    }
}
