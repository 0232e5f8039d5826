//! The chart: owns the state tree, tracks the current position and drives
//! entry/exit actions as transitions fire.

use crate::builder::error::ConfigViolation;
use crate::builder::tree::{graft, into_result, validate};
use crate::builder::{ChartBuilder, StateSpec};
use crate::config::{Binding, ChartConfig};
use crate::core::{RelPath, State, StateHistory, StateId, StateKind, StateTree, Step, TransitionRecord};
use crate::datamodel::DataModel;
use crate::runtime::{ChartError, Result, Transition};
use chrono::Utc;
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace};
use uuid::Uuid;

/// A running statechart.
///
/// The position is a focal leaf plus the active child remembered by every
/// compound state, so each region of a parallel state advances on its own.
///
/// # Example
///
/// ```rust
/// use statechart::builder::StateSpec;
/// use statechart::runtime::{Chart, Transition};
/// use serde_json::Value;
///
/// let mut chart = Chart::new(
///     StateSpec::compound("root")
///         .initial("idle")
///         .state(StateSpec::atomic("idle").transition(Transition::new("start", "running")))
///         .state(StateSpec::atomic("running").transition(Transition::new("stop", "idle"))),
/// )
/// .unwrap();
///
/// assert_eq!(chart.current_state().name(), "idle");
/// assert_eq!(chart.trigger("start", &[]).unwrap(), Value::Null);
/// assert_eq!(chart.current_state().name(), "running");
/// assert!(chart.trigger("start", &[]).is_err());
/// ```
pub struct Chart {
    session_id: Uuid,
    config: ChartConfig,
    tree: StateTree,
    current: StateId,
    datamodel: Box<dyn DataModel>,
    history: StateHistory,
    /// State owning the transition being fired; relative targets resolve here.
    source: Option<StateId>,
    transient_depth: usize,
    /// Bumped by every structural change. A change that sees it move while
    /// its own actions run has been superseded by a nested transition.
    moves: u64,
    /// Leaves entered by the structural change in progress.
    entered: Vec<StateId>,
}

impl Chart {
    /// Build a chart from `spec` with the default configuration and an
    /// in-memory datamodel.
    pub fn new(spec: StateSpec) -> Result<Self> {
        ChartBuilder::new().spec(spec).build()
    }

    pub(crate) fn start(
        tree: StateTree,
        config: ChartConfig,
        datamodel: Box<dyn DataModel>,
    ) -> Result<Self> {
        let root = tree.root();
        if tree.initial_of(root) == root && !tree[root].is_parallel() {
            return Err(ChartError::InvalidConfig(vec![
                ConfigViolation::NoStartingState {
                    root: tree[root].name().to_string(),
                },
            ]));
        }

        let history = match config.history_limit {
            Some(limit) => StateHistory::with_limit(limit),
            None => StateHistory::new(),
        };
        let mut chart = Self {
            session_id: config.session_id.unwrap_or_else(Uuid::new_v4),
            config,
            tree,
            current: root,
            datamodel,
            history,
            source: None,
            transient_depth: 0,
            moves: 0,
            entered: Vec::new(),
        };

        chart.datamodel.populate();
        if chart.config.binding == Binding::Early {
            let ids: Vec<StateId> = chart.tree.iter().collect();
            for id in ids {
                chart.bind(id);
            }
        }

        debug!(session = %chart.session_id, root = chart.tree[root].name(), "starting chart");
        let mark = chart.moves;
        chart.enter(root, mark)?;
        let entered = std::mem::take(&mut chart.entered);
        if !chart.moved(mark) {
            chart.current = chart.tree.focal_leaf(root);
        }
        chart.process_transient(entered)?;
        Ok(chart)
    }

    /// Identifier of this chart instance, fixed for its lifetime.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Configuration the chart was built with.
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// The state tree, including states added at runtime.
    pub fn tree(&self) -> &StateTree {
        &self.tree
    }

    pub fn root(&self) -> &State {
        &self.tree[self.tree.root()]
    }

    /// The focal leaf.
    pub fn current_state(&self) -> &State {
        &self.tree[self.current]
    }

    /// Every active leaf, focal leaf first.
    pub fn current_states(&self) -> Vec<&State> {
        self.tree
            .active_leaves(self.current)
            .into_iter()
            .map(|id| &self.tree[id])
            .collect()
    }

    /// Active configuration, innermost first.
    pub fn active(&self) -> Vec<&State> {
        self.tree
            .active(self.current)
            .into_iter()
            .map(|id| &self.tree[id])
            .collect()
    }

    /// Siblings of the current state, itself included.
    pub fn states(&self) -> Vec<&State> {
        let parent = self.tree[self.current]
            .parent()
            .unwrap_or_else(|| self.tree.root());
        self.tree[parent]
            .children()
            .iter()
            .map(|&id| &self.tree[id])
            .collect()
    }

    /// Transitions declared on the current state.
    pub fn transitions(&self) -> &[Transition] {
        self.tree[self.current].transitions()
    }

    /// Look up a state by name, dotted path or relative path.
    pub fn get_state(&self, path: &str) -> Result<&State> {
        let id = self.tree.resolve(self.current, path)?;
        Ok(&self.tree[id])
    }

    /// Route from the current state to `path`.
    pub fn get_relpath(&self, path: &str) -> Result<RelPath> {
        let target = self.tree.resolve(self.current, path)?;
        self.tree.get_relpath(self.current, target)
    }

    /// Absolute dotted path of a state.
    pub fn path_of(&self, id: StateId) -> String {
        self.tree.path(id)
    }

    /// Whether the state at `path` is part of the active configuration.
    pub fn is_active(&self, path: &str) -> Result<bool> {
        let id = self.tree.resolve(self.current, path)?;
        Ok(self.tree.active(self.current).contains(&id))
    }

    /// Read access to the datamodel.
    pub fn datamodel(&self) -> &dyn DataModel {
        self.datamodel.as_ref()
    }

    /// Write access to the datamodel, for actions and callers alike.
    pub fn datamodel_mut(&mut self) -> &mut dyn DataModel {
        self.datamodel.as_mut()
    }

    /// Transitions fired so far, oldest first.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Fire the transition selected for `event` and return its result.
    ///
    /// Fails with `InvalidTransition` when no active state declares the
    /// event and with `ConditionNotSatisfied` when the innermost declaring
    /// state has no passing guard.
    pub fn trigger(&mut self, event: &str, args: &[Value]) -> Result<Value> {
        let (source, transition) = self.select_transition(event, args)?;
        if !self.tree.is_descendant(self.current, source) {
            self.current = self.tree.focal_leaf(source);
        }
        debug!(
            event,
            source = %self.tree.path(source),
            target = transition.target(),
            "firing transition"
        );
        self.fire(source, event, transition, args)
    }

    /// Move to the state at `path`, running exits before entries.
    ///
    /// Relative paths resolve against the state whose transition is firing,
    /// or against the current state when called directly. A move that would
    /// leave a final state fails before any action runs. When an action run
    /// by the move fires a transition of its own, that nested transition
    /// takes over and the remaining steps are dropped.
    pub fn change_state(&mut self, path: &str) -> Result<()> {
        let anchor = self.source.unwrap_or(self.current);
        let target = self.tree.resolve(anchor, path)?;
        let relpath = self.tree.get_relpath(self.current, target)?;
        if let Some(state) = self.exited_final(&relpath) {
            return Err(ChartError::FinalStateExit {
                state: self.tree.path(state),
            });
        }
        debug!(
            from = %self.tree.path(self.current),
            to = %self.tree.path(target),
            relpath = %relpath,
            "changing state"
        );

        self.moves += 1;
        let mark = self.moves;
        let outer = std::mem::take(&mut self.entered);
        let applied = match relpath {
            RelPath::SelfTransition => self.reenter(mark),
            RelPath::Steps(steps) => self.apply(&steps, mark),
        };
        let entered = std::mem::replace(&mut self.entered, outer);
        applied?;

        if self.moved(mark) {
            debug!(to = %self.tree.path(target), "superseded by a nested transition");
            return Ok(());
        }
        self.process_transient(entered)
    }

    /// Append a state declared by `spec` under the composite at `parent`,
    /// or beside the current state when `parent` is `None`.
    ///
    /// A new region of an active parallel state is entered at once, as is
    /// the first child of an active compound state that had none.
    pub fn add_state(&mut self, spec: StateSpec, parent: Option<&str>) -> Result<StateId> {
        let parent = match parent {
            Some(path) => self.tree.resolve(self.current, path)?,
            None => self.tree[self.current]
                .parent()
                .unwrap_or_else(|| self.tree.root()),
        };
        if !self.tree[parent].is_composite() {
            return Err(ChartError::InvalidPath {
                reason: format!(
                    "leaf state '{}' cannot contain substates",
                    self.tree.path(parent)
                ),
            });
        }

        let parent_path = self.tree.path(parent);
        into_result(validate(&spec, &parent_path))?;
        if self.tree.child(parent, &spec.name).is_some() {
            return Err(ChartError::InvalidConfig(vec![
                ConfigViolation::DuplicateState {
                    parent: parent_path,
                    name: spec.name,
                },
            ]));
        }

        let id = graft(&mut self.tree, Some(parent), spec)?;
        debug!(state = %self.tree.path(id), "added state");

        if self.config.binding == Binding::Early {
            let ids: Vec<StateId> = self.tree.descendants(id).collect();
            for added in ids {
                self.bind(added);
            }
        }

        let vacant = self.tree[parent].is_parallel() || self.tree[parent].active_child().is_none();
        if vacant && self.tree.active(self.current).contains(&parent) {
            self.moves += 1;
            let mark = self.moves;
            let outer = std::mem::take(&mut self.entered);
            let applied = self.enter(id, mark);
            let entered = std::mem::replace(&mut self.entered, outer);
            applied?;

            if !self.moved(mark) {
                if parent == self.current {
                    self.current = self.tree.focal_leaf(parent);
                }
                self.process_transient(entered)?;
            }
        }
        Ok(id)
    }

    /// Attach `transition` to the state at `path`, or to the current state.
    pub fn add_transition(&mut self, transition: Transition, path: Option<&str>) -> Result<()> {
        let state = match path {
            Some(path) => self.tree.resolve(self.current, path)?,
            None => self.current,
        };
        debug!(
            state = %self.tree.path(state),
            event = transition.event(),
            "added transition"
        );
        self.tree[state].transitions.push(transition);
        Ok(())
    }

    fn fire(
        &mut self,
        source: StateId,
        event: &str,
        transition: Transition,
        args: &[Value],
    ) -> Result<Value> {
        let from = self.tree.path(self.current);
        let previous = self.source.replace(source);
        let result = transition.invoke(self, args);
        self.source = previous;
        let value = result?;

        if self.config.record_history {
            self.history.record(TransitionRecord {
                event: event.to_string(),
                source: from,
                target: self.tree.path(self.current),
                timestamp: Utc::now(),
            });
        }
        Ok(value)
    }

    fn moved(&self, mark: u64) -> bool {
        self.moves != mark
    }

    /// First final state `relpath` would exit from the current position.
    fn exited_final(&self, relpath: &RelPath) -> Option<StateId> {
        let exited = match relpath {
            RelPath::SelfTransition => vec![self.current],
            RelPath::Steps(_) if relpath.exits() == 0 => Vec::new(),
            RelPath::Steps(_) => match self.tree.ancestors(self.current).get(relpath.exits()) {
                // Everything active below the state where the exits stop.
                Some(&stop) => self
                    .tree
                    .active(self.current)
                    .into_iter()
                    .filter(|&id| id != stop && self.tree.is_descendant(id, stop))
                    .collect(),
                None => Vec::new(),
            },
        };
        exited.into_iter().find(|&id| self.tree[id].is_final())
    }

    fn reenter(&mut self, mark: u64) -> Result<()> {
        let state = self.current;
        self.run_exit(state)?;
        if self.moved(mark) {
            return Ok(());
        }
        self.run_entry(state)
    }

    fn apply(&mut self, steps: &[Step], mark: u64) -> Result<()> {
        let mut came_from = None;
        for _ in steps.iter().filter(|step| **step == Step::Exit) {
            let state = self.current;
            let parent = self.tree[state]
                .parent()
                .ok_or_else(|| ChartError::InvalidPath {
                    reason: "cannot exit the root state".to_string(),
                })?;
            self.exit_below(state, came_from, mark)?;
            if self.moved(mark) {
                return Ok(());
            }
            self.run_exit(state)?;
            if self.moved(mark) {
                return Ok(());
            }
            came_from = Some(state);
            self.current = parent;
        }
        if came_from.is_some() && self.tree[self.current].is_parallel() {
            self.exit_below(self.current, came_from, mark)?;
            if self.moved(mark) {
                return Ok(());
            }
        }

        let mut regions = Vec::new();
        for step in steps {
            let Step::Enter(name) = step else { continue };
            let state = self.current;
            let child = if self.tree[state].is_composite() {
                self.tree.child(state, name)
            } else {
                None
            }
            .ok_or_else(|| ChartError::InvalidPath {
                reason: format!("'{}' has no substate '{name}'", self.tree.path(state)),
            })?;
            if self.tree[state].is_parallel() {
                regions.push((state, child));
            }
            self.current = child;
            self.run_entry(child)?;
            if self.moved(mark) {
                return Ok(());
            }
        }

        let target = self.current;
        self.descend(target, mark)?;
        for (parallel, entered) in regions {
            let siblings: Vec<StateId> = self.tree[parallel].children().to_vec();
            for region in siblings.into_iter().filter(|&r| r != entered) {
                if self.moved(mark) {
                    return Ok(());
                }
                self.enter(region, mark)?;
            }
        }
        if !self.moved(mark) {
            self.current = self.tree.focal_leaf(target);
        }
        Ok(())
    }

    /// Enter `id` and its default descendants.
    fn enter(&mut self, id: StateId, mark: u64) -> Result<()> {
        self.run_entry(id)?;
        if self.moved(mark) {
            return Ok(());
        }
        self.descend(id, mark)
    }

    /// Enter the default descendants of an already-entered state. Every
    /// region of a parallel state is entered in declaration order.
    fn descend(&mut self, id: StateId, mark: u64) -> Result<()> {
        let next: Vec<StateId> = match self.tree[id].kind() {
            StateKind::Compound { .. } => {
                let initial = self.tree.initial_of(id);
                if initial == id {
                    Vec::new()
                } else {
                    vec![initial]
                }
            }
            StateKind::Parallel { children } => children.clone(),
            StateKind::Atomic | StateKind::Final => Vec::new(),
        };
        for child in next {
            if self.moved(mark) {
                break;
            }
            self.enter(child, mark)?;
        }
        Ok(())
    }

    /// Exit the active states below `id`, innermost first, skipping the
    /// already exited child `skip`. Regions exit in reverse order.
    fn exit_below(&mut self, id: StateId, skip: Option<StateId>, mark: u64) -> Result<()> {
        let below: Vec<StateId> = match self.tree[id].kind() {
            StateKind::Compound { active, .. } => active.iter().copied().collect(),
            StateKind::Parallel { children } => children.iter().rev().copied().collect(),
            StateKind::Atomic | StateKind::Final => Vec::new(),
        };
        for child in below.into_iter().filter(|&c| Some(c) != skip) {
            self.exit_below(child, None, mark)?;
            if self.moved(mark) {
                break;
            }
            self.run_exit(child)?;
            if self.moved(mark) {
                break;
            }
        }
        Ok(())
    }

    fn run_entry(&mut self, id: StateId) -> Result<()> {
        if let Some(parent) = self.tree[id].parent() {
            self.tree.select(parent, Some(id));
        }
        if self.tree[id].children().is_empty() {
            self.entered.push(id);
        }
        self.bind(id);
        trace!(state = %self.tree.path(id), "entering state");
        let actions = self.tree[id].on_entry().to_vec();
        for action in &actions {
            action.run(self, &[])?;
        }
        Ok(())
    }

    fn run_exit(&mut self, id: StateId) -> Result<()> {
        trace!(state = %self.tree.path(id), "exiting state");
        let actions = self.tree[id].on_exit().to_vec();
        for action in &actions {
            action.run(self, &[])?;
        }
        if let Some(parent) = self.tree[id].parent() {
            self.tree.select(parent, None);
        }
        Ok(())
    }

    /// Fire the first passing eventless transition of each leaf in
    /// `entered` that is still active, in entry order. The leaf holds the
    /// focus while its transition fires; afterwards the focus returns to the
    /// previous focal leaf if that one survived.
    fn process_transient(&mut self, entered: Vec<StateId>) -> Result<()> {
        let focus = self.current;
        for leaf in entered {
            if self.tree[leaf].is_final() || !self.tree.active_leaves(self.current).contains(&leaf) {
                continue;
            }
            let Some(transition) = self.tree[leaf]
                .transitions_for("")
                .find(|t| t.evaluate(self, &[]))
                .cloned()
            else {
                continue;
            };

            if self.transient_depth >= self.config.transient_limit {
                return Err(ChartError::TransientLoop {
                    state: self.tree.path(leaf),
                    limit: self.config.transient_limit,
                });
            }
            debug!(
                state = %self.tree.path(leaf),
                target = transition.target(),
                "leaving transient state"
            );
            self.current = leaf;
            self.transient_depth += 1;
            let result = self.fire(leaf, "", transition, &[]);
            self.transient_depth -= 1;
            result?;
        }

        if self.tree.active_leaves(self.current).contains(&focus) {
            self.current = focus;
        }
        Ok(())
    }

    /// Copy a state's declared data items into the datamodel once.
    fn bind(&mut self, id: StateId) {
        let state = &mut self.tree[id];
        if state.bound {
            return;
        }
        state.bound = true;
        for (key, value) in &state.data {
            self.datamodel.set(key, value.clone());
        }
    }
}

impl fmt::Debug for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("session_id", &self.session_id)
            .field("current", &self.tree.path(self.current))
            .field("states", &self.tree.len())
            .field("history", &self.history.len())
            .finish()
    }
}
