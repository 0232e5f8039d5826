//! Materialising a [`StateSpec`] into a [`StateTree`].
//!
//! Validation accumulates every problem instead of stopping at the first
//! one, so a malformed declaration is reported in a single pass.

use crate::builder::error::ConfigViolation;
use crate::builder::spec::StateSpec;
use crate::core::{StateId, StateTree, StateType};
use crate::runtime::{ChartError, Result};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

/// Validate `spec` and build the tree it declares.
///
/// # Example
///
/// ```rust
/// use statechart::builder::{build_tree, StateSpec};
///
/// let tree = build_tree(
///     StateSpec::compound("root")
///         .state(StateSpec::atomic("idle"))
///         .state(StateSpec::atomic("running")),
/// )
/// .unwrap();
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.path(tree.initial_of(tree.root())), "root.idle");
/// ```
pub fn build_tree(spec: StateSpec) -> Result<StateTree> {
    into_result(validate(&spec, ""))?;
    let mut tree = StateTree::new();
    graft(&mut tree, None, spec)?;
    Ok(tree)
}

/// Check a spec and all of its substates. `parent` is the statepath the
/// spec will be placed under, empty for a root.
pub(crate) fn validate(spec: &StateSpec, parent: &str) -> Check {
    let mut checks = Vec::new();
    collect_checks(spec, parent, &mut checks);
    Validation::all_vec(checks).map(|_| ())
}

pub(crate) fn into_result(validation: Check) -> Result<()> {
    match validation {
        Validation::Success(_) => Ok(()),
        Validation::Failure(violations) => Err(ChartError::InvalidConfig(
            violations.iter().cloned().collect(),
        )),
    }
}

fn collect_checks(spec: &StateSpec, parent: &str, checks: &mut Vec<Check>) {
    let path = if parent.is_empty() {
        spec.name.clone()
    } else {
        format!("{parent}.{}", spec.name)
    };

    checks.push(check_name(spec, parent));
    checks.push(check_shape(spec, &path));
    checks.push(check_initial(spec, &path));
    checks.push(check_unique_children(spec, &path));

    for child in &spec.states {
        collect_checks(child, &path, checks);
    }
}

fn check_name(spec: &StateSpec, parent: &str) -> Check {
    if spec.name.is_empty() {
        Validation::fail(ConfigViolation::EmptyName {
            parent: parent.to_string(),
        })
    } else if spec.name.contains('.') {
        Validation::fail(ConfigViolation::DottedName {
            name: spec.name.clone(),
        })
    } else {
        Validation::success(())
    }
}

fn check_shape(spec: &StateSpec, path: &str) -> Check {
    match spec.state_type() {
        StateType::Atomic if !spec.states.is_empty() => {
            Validation::fail(ConfigViolation::AtomicWithChildren {
                state: path.to_string(),
            })
        }
        StateType::Final if !spec.states.is_empty() => {
            Validation::fail(ConfigViolation::FinalWithChildren {
                state: path.to_string(),
            })
        }
        StateType::Parallel if spec.initial.is_some() => {
            Validation::fail(ConfigViolation::ParallelInitial {
                state: path.to_string(),
            })
        }
        _ => Validation::success(()),
    }
}

fn check_initial(spec: &StateSpec, path: &str) -> Check {
    match (&spec.initial, spec.state_type()) {
        (Some(initial), StateType::Compound)
            if !spec.states.iter().any(|s| &s.name == initial) =>
        {
            Validation::fail(ConfigViolation::UnknownInitial {
                state: path.to_string(),
                initial: initial.clone(),
            })
        }
        _ => Validation::success(()),
    }
}

fn check_unique_children(spec: &StateSpec, path: &str) -> Check {
    let mut seen = HashSet::new();
    let duplicates: Vec<Check> = spec
        .states
        .iter()
        .filter(|child| !seen.insert(child.name.as_str()))
        .map(|child| {
            Validation::fail(ConfigViolation::DuplicateState {
                parent: path.to_string(),
                name: child.name.clone(),
            })
        })
        .collect();
    Validation::all_vec(duplicates).map(|_| ())
}

/// Insert `spec` and its substates under `parent`, returning the new id.
pub(crate) fn graft(tree: &mut StateTree, parent: Option<StateId>, spec: StateSpec) -> Result<StateId> {
    let state_type = spec.state_type();
    let StateSpec {
        name,
        initial,
        states,
        transitions,
        data,
        on_entry,
        on_exit,
        ..
    } = spec;

    let id = tree.insert(parent, name, state_type, initial)?;
    let state = &mut tree[id];
    state.transitions = transitions;
    state.on_entry = on_entry;
    state.on_exit = on_exit;
    state.data = data;

    for child in states {
        graft(tree, Some(id), child)?;
    }
    Ok(id)
}
