//! Active configuration.
//!
//! Ordinary composites report only their one active branch; a parallel
//! state reports every region at once, each region contributing its own
//! active subtree. The result is recomputed on every call because sibling
//! regions advance independently.

use super::state::{StateId, StateKind};
use super::tree::StateTree;

impl StateTree {
    /// States active while `position` is the focal leaf, innermost first.
    ///
    /// Walks from `position` up to the root. Where the next state up is a
    /// parallel state, every region of that parallel state is reported in
    /// declaration order instead of the single region on the walk.
    pub fn active(&self, position: StateId) -> Vec<StateId> {
        let chain = self.ancestors(position);
        let mut active = Vec::with_capacity(chain.len());

        for (i, &state) in chain.iter().enumerate() {
            match chain.get(i + 1).map(|&parent| &self[parent].kind) {
                Some(StateKind::Parallel { children }) => {
                    for &region in children {
                        if region == state {
                            active.push(state);
                        } else {
                            self.collect_active(region, &mut active);
                        }
                    }
                }
                _ => active.push(state),
            }
        }
        active
    }

    /// Active leaves reachable from `position`: one per active region.
    pub fn active_leaves(&self, position: StateId) -> Vec<StateId> {
        self.active(position)
            .into_iter()
            .filter(|&id| self.is_active_leaf(id))
            .collect()
    }

    /// Leaf reached from `id` by following active selections, taking the
    /// first region of each parallel state.
    pub fn focal_leaf(&self, id: StateId) -> StateId {
        let mut state = id;
        loop {
            match &self[state].kind {
                StateKind::Compound {
                    active: Some(child),
                    ..
                } => state = *child,
                StateKind::Parallel { children } => match children.first() {
                    Some(&first) => state = first,
                    None => return state,
                },
                _ => return state,
            }
        }
    }

    fn is_active_leaf(&self, id: StateId) -> bool {
        match &self[id].kind {
            StateKind::Atomic | StateKind::Final => true,
            StateKind::Compound { active, .. } => active.is_none(),
            StateKind::Parallel { children } => children.is_empty(),
        }
    }

    fn collect_active(&self, id: StateId, out: &mut Vec<StateId>) {
        match &self[id].kind {
            StateKind::Atomic | StateKind::Final => {}
            StateKind::Compound { active, .. } => {
                if let Some(child) = *active {
                    self.collect_active(child, out);
                }
            }
            StateKind::Parallel { children } => {
                for &child in children {
                    self.collect_active(child, out);
                }
            }
        }
        out.push(id);
    }
}
