//! Statepath addressing.
//!
//! Three address forms resolve to a state:
//!
//! - a bare name (`"idle"`) is the first depth-first match in the tree;
//! - a dotted path (`"root.work.step"`) walks from the root, each segment a
//!   child of the previous one (a leading segment naming the root is the
//!   root itself);
//! - a path with N leading dots (`".sibling"`, `"..uncle.child"`) anchors N
//!   levels above the current state and walks the remaining segments;
//! - a bare `"."` is the current state itself, the same spelling a
//!   [`RelPath::SelfTransition`] renders to.
//!
//! A [`RelPath`] is the exit/enter route between two states.

use super::state::StateId;
use super::tree::StateTree;
use crate::runtime::{ChartError, Result};
use std::fmt;

/// One step of a relative path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Leave the current state for its parent.
    Exit,
    /// Enter the named child of the current state.
    Enter(String),
}

/// Route between two states: every exit comes before every entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelPath {
    /// Source and target are the same state: exit and re-enter it.
    SelfTransition,
    Steps(Vec<Step>),
}

impl RelPath {
    /// Number of states exited.
    pub fn exits(&self) -> usize {
        match self {
            Self::SelfTransition => 1,
            Self::Steps(steps) => steps.iter().filter(|s| **s == Step::Exit).count(),
        }
    }

    /// Names entered, outermost first.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::SelfTransition => Vec::new(),
            Self::Steps(steps) => steps
                .iter()
                .filter_map(|s| match s {
                    Step::Enter(name) => Some(name.as_str()),
                    Step::Exit => None,
                })
                .collect(),
        }
    }
}

/// Dotted encoding: `.` for a self-transition, otherwise one empty segment
/// per exit followed by the entered names.
impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfTransition => f.write_str("."),
            Self::Steps(steps) => {
                let segments: Vec<&str> = steps
                    .iter()
                    .map(|s| match s {
                        Step::Exit => "",
                        Step::Enter(name) => name.as_str(),
                    })
                    .collect();
                f.write_str(&segments.join("."))
            }
        }
    }
}

impl StateTree {
    /// Resolve `path` to a state, anchoring relative paths at `current`.
    pub fn resolve(&self, current: StateId, path: &str) -> Result<StateId> {
        let invalid = || ChartError::InvalidState {
            path: path.to_string(),
        };

        let up = path.chars().take_while(|&c| c == '.').count();
        let rest = &path[up..];
        let segments: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('.').collect()
        };
        if path.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }
        if path == "." {
            return self.get(current).map(|_| current).ok_or_else(invalid);
        }

        if up > 0 {
            let lineage = self.lineage(current);
            let keep = lineage
                .len()
                .checked_sub(up)
                .filter(|&keep| keep > 0)
                .ok_or_else(invalid)?;
            return self.walk(lineage[keep - 1], &segments).ok_or_else(invalid);
        }

        let root = self.root();
        match segments.as_slice() {
            [name] => self.find(name).ok_or_else(invalid),
            [first, rest @ ..] if *first == self[root].name() => {
                self.walk(root, rest).ok_or_else(invalid)
            }
            _ => self.walk(root, &segments).ok_or_else(invalid),
        }
    }

    fn walk(&self, anchor: StateId, segments: &[&str]) -> Option<StateId> {
        segments
            .iter()
            .try_fold(anchor, |state, name| self.child(state, name))
    }

    /// Exit/enter route from `current` to `target` through their deepest
    /// common ancestor.
    pub fn get_relpath(&self, current: StateId, target: StateId) -> Result<RelPath> {
        if self.get(current).is_none() || self.get(target).is_none() {
            return Err(ChartError::InvalidPath {
                reason: format!("no route from {current} to {target}"),
            });
        }
        if current == target {
            return Ok(RelPath::SelfTransition);
        }

        let source = self.lineage(current);
        let dest = self.lineage(target);
        let common = source
            .iter()
            .zip(&dest)
            .take_while(|(a, b)| a == b)
            .count();
        if common == 0 {
            return Err(ChartError::InvalidPath {
                reason: format!(
                    "'{}' and '{}' share no ancestor",
                    self.path(current),
                    self.path(target)
                ),
            });
        }

        let mut steps = vec![Step::Exit; source.len() - common];
        steps.extend(
            dest[common..]
                .iter()
                .map(|&id| Step::Enter(self[id].name().to_string())),
        );
        Ok(RelPath::Steps(steps))
    }
}
