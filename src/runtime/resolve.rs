//! Choosing which transition an event fires.
//!
//! The active configuration is walked innermost first. The first state with
//! any transition declared for the event decides alone: its first passing
//! candidate fires, and if every guard fails the event is rejected without
//! consulting outer states.

use crate::core::StateId;
use crate::runtime::{Chart, ChartError, Result, Transition};
use serde_json::Value;
use tracing::debug;

impl Chart {
    /// Transition to fire for `event`, paired with the state that owns it.
    pub(crate) fn select_transition(
        &self,
        event: &str,
        args: &[Value],
    ) -> Result<(StateId, Transition)> {
        let tree = self.tree();
        let position = self.current_state().id();

        for state in tree.active(position) {
            let candidates = self.candidates(state, event);
            if candidates.is_empty() {
                continue;
            }

            return candidates
                .into_iter()
                .find(|(_, transition)| transition.evaluate(self, args))
                .map(|(owner, transition)| (owner, transition.clone()))
                .ok_or_else(|| {
                    let state = tree.path(state);
                    debug!(event, state = %state, "guards blocked event");
                    ChartError::ConditionNotSatisfied {
                        event: event.to_string(),
                        state,
                    }
                });
        }

        Err(ChartError::InvalidTransition {
            event: event.to_string(),
        })
    }

    /// Transitions for `event` declared on `state`. A parallel state offers
    /// its regions' transitions first, then its own.
    fn candidates(&self, state: StateId, event: &str) -> Vec<(StateId, &Transition)> {
        let tree = self.tree();
        let own = &tree[state];
        let regions: &[StateId] = if own.is_parallel() {
            own.children()
        } else {
            &[]
        };

        regions
            .iter()
            .chain(std::iter::once(&state))
            .flat_map(|&owner| {
                tree[owner]
                    .transitions()
                    .iter()
                    .filter(move |transition| transition.event() == event)
                    .map(move |transition| (owner, transition))
            })
            .collect()
    }
}
