//! Arena that owns every state of a chart.
//!
//! States live in a flat vector and refer to each other by [`StateId`].
//! Parents own their children through the index lists stored in
//! [`StateKind`]; each child keeps a non-owning parent index. The only
//! structural mutation is appending a new state under an existing composite,
//! which keeps the two directions consistent.

use super::state::{State, StateId, StateKind, StateType};
use crate::runtime::{ChartError, Result};
use std::ops::{Index, IndexMut};

/// Owned tree of states.
#[derive(Clone, Debug)]
pub struct StateTree {
    states: Vec<State>,
}

impl StateTree {
    pub(crate) fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// The root state. The first state inserted becomes the root.
    pub fn root(&self) -> StateId {
        StateId(0)
    }

    pub fn get(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Append a state under `parent`.
    ///
    /// Fails with `InvalidPath` when `parent` is atomic or unknown.
    pub(crate) fn insert(
        &mut self,
        parent: Option<StateId>,
        name: String,
        state_type: StateType,
        initial: Option<String>,
    ) -> Result<StateId> {
        if let Some(parent) = parent {
            match self.get(parent).map(State::kind) {
                Some(StateKind::Compound { .. } | StateKind::Parallel { .. }) => {}
                Some(StateKind::Atomic | StateKind::Final) => {
                    return Err(ChartError::InvalidPath {
                        reason: format!(
                            "leaf state '{}' cannot contain substates",
                            self.path(parent)
                        ),
                    })
                }
                None => {
                    return Err(ChartError::InvalidPath {
                        reason: format!("unknown parent state {parent}"),
                    })
                }
            }
        }

        let id = StateId(self.states.len());
        let kind = match state_type {
            StateType::Atomic => StateKind::Atomic,
            StateType::Compound => StateKind::Compound {
                children: Vec::new(),
                initial,
                active: None,
            },
            StateType::Parallel => StateKind::Parallel {
                children: Vec::new(),
            },
            StateType::Final => StateKind::Final,
        };
        self.states.push(State::new(id, name, parent, kind));

        if let Some(parent) = parent {
            match &mut self.states[parent.0].kind {
                StateKind::Compound { children, .. } | StateKind::Parallel { children } => {
                    children.push(id)
                }
                StateKind::Atomic | StateKind::Final => {}
            }
        }
        Ok(id)
    }

    /// Record which child of a compound state is active.
    pub(crate) fn select(&mut self, parent: StateId, child: Option<StateId>) {
        if let Some(StateKind::Compound { active, .. }) =
            self.states.get_mut(parent.0).map(|s| &mut s.kind)
        {
            *active = child;
        }
    }

    /// Child of `parent` named `name`.
    pub fn child(&self, parent: StateId, name: &str) -> Option<StateId> {
        self.get(parent)?
            .children()
            .iter()
            .copied()
            .find(|&id| self[id].name() == name)
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: StateId) -> Vec<StateId> {
        let mut chain = Vec::new();
        let mut next = self.get(id).map(State::id);
        while let Some(current) = next {
            chain.push(current);
            next = self[current].parent();
        }
        chain
    }

    /// Root first, ending at `id`.
    pub fn lineage(&self, id: StateId) -> Vec<StateId> {
        let mut chain = self.ancestors(id);
        chain.reverse();
        chain
    }

    /// Dot-joined names from the root down to `id`.
    pub fn path(&self, id: StateId) -> String {
        self.lineage(id)
            .into_iter()
            .map(|s| self[s].name())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether `id` is `ancestor` or lies below it.
    pub fn is_descendant(&self, id: StateId, ancestor: StateId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Starting child of a state.
    ///
    /// A compound state resolves its explicit initial child, then its first
    /// declared child, then itself when it has no children. Every other
    /// kind resolves to itself.
    pub fn initial_of(&self, id: StateId) -> StateId {
        match &self[id].kind {
            StateKind::Compound {
                children, initial, ..
            } => initial
                .as_deref()
                .and_then(|name| self.child(id, name))
                .or_else(|| children.first().copied())
                .unwrap_or(id),
            _ => id,
        }
    }

    /// Depth-first walk over the whole tree in declaration order.
    pub fn iter(&self) -> DepthFirst<'_> {
        self.descendants(self.root())
    }

    /// Depth-first walk starting at (and including) `id`.
    pub fn descendants(&self, id: StateId) -> DepthFirst<'_> {
        let stack = if self.get(id).is_some() { vec![id] } else { Vec::new() };
        DepthFirst { tree: self, stack }
    }

    /// First state named `name` in depth-first order.
    pub fn find(&self, name: &str) -> Option<StateId> {
        self.iter().find(|&id| self[id].name() == name)
    }
}

impl Index<StateId> for StateTree {
    type Output = State;

    fn index(&self, id: StateId) -> &State {
        &self.states[id.0]
    }
}

impl IndexMut<StateId> for StateTree {
    fn index_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.0]
    }
}

/// Pre-order iterator over state ids.
pub struct DepthFirst<'a> {
    tree: &'a StateTree,
    stack: Vec<StateId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree[id].children().iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // root(compound) -> { idle, work(compound) -> { step, idle } }
    fn sample() -> StateTree {
        let mut tree = StateTree::new();
        let root = tree
            .insert(None, "root".into(), StateType::Compound, None)
            .unwrap();
        tree.insert(Some(root), "idle".into(), StateType::Atomic, None)
            .unwrap();
        let work = tree
            .insert(Some(root), "work".into(), StateType::Compound, Some("step".into()))
            .unwrap();
        tree.insert(Some(work), "step".into(), StateType::Atomic, None)
            .unwrap();
        tree.insert(Some(work), "idle".into(), StateType::Atomic, None)
            .unwrap();
        tree
    }

    #[test]
    fn parent_and_child_links_agree() {
        let tree = sample();
        for id in tree.iter() {
            for &child in tree[id].children() {
                assert_eq!(tree[child].parent(), Some(id));
            }
            if let Some(parent) = tree[id].parent() {
                assert!(tree[parent].children().contains(&id));
            }
        }
    }

    #[test]
    fn insert_under_atomic_fails() {
        let mut tree = sample();
        let idle = tree.child(tree.root(), "idle").unwrap();
        let result = tree.insert(Some(idle), "nested".into(), StateType::Atomic, None);
        assert!(matches!(result, Err(ChartError::InvalidPath { .. })));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn path_joins_ancestor_names() {
        let tree = sample();
        let work = tree.child(tree.root(), "work").unwrap();
        let step = tree.child(work, "step").unwrap();
        assert_eq!(tree.path(step), "root.work.step");
        assert_eq!(tree.lineage(step), vec![tree.root(), work, step]);
        assert_eq!(tree.ancestors(step), vec![step, work, tree.root()]);
    }

    #[test]
    fn initial_of_prefers_explicit_then_first_then_self() {
        let mut tree = sample();
        let root = tree.root();
        let work = tree.child(root, "work").unwrap();
        assert_eq!(tree.initial_of(work), tree.child(work, "step").unwrap());
        assert_eq!(tree.initial_of(root), tree.child(root, "idle").unwrap());

        let empty = tree
            .insert(Some(root), "empty".into(), StateType::Compound, None)
            .unwrap();
        assert_eq!(tree.initial_of(empty), empty);
    }

    #[test]
    fn find_returns_first_depth_first_match() {
        let tree = sample();
        let found = tree.find("idle").unwrap();
        assert_eq!(tree.path(found), "root.idle");
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn iteration_is_preorder_in_declaration_order() {
        let tree = sample();
        let names: Vec<&str> = tree.iter().map(|id| tree[id].name()).collect();
        assert_eq!(names, vec!["root", "idle", "work", "step", "idle"]);
    }

    #[test]
    fn select_only_affects_compound_states() {
        let mut tree = sample();
        let root = tree.root();
        let work = tree.child(root, "work").unwrap();
        tree.select(root, Some(work));
        assert_eq!(tree[root].active_child(), Some(work));

        let idle = tree.child(root, "idle").unwrap();
        tree.select(idle, Some(work));
        assert_eq!(tree[idle].active_child(), None);
    }
}
