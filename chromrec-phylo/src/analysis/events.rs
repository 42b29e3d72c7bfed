//! Detection of large state changes on the branches of an annotated tree.

use chromrec_core::{ChromrecError, Result};

use crate::result::AnalysisResult;
use crate::trait_table::State;
use crate::tree::NodeId;

/// Settings for [`detect_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventConfig {
    /// Smallest change magnitude reported.
    pub change_threshold: u64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            change_threshold: 5,
        }
    }
}

/// A branch on which the resolved state changed by at least the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChangeEvent {
    /// Child end of the branch.
    pub node: NodeId,
    pub name: Option<String>,
    pub branch_length: Option<f64>,
    pub parent_state: State,
    pub child_state: State,
    /// See [`State::distance`].
    pub change: u64,
}

/// Scan every branch of `result`'s annotated tree in pre-order.
///
/// A branch is reported when its change is non-zero and at least
/// `config.change_threshold`.
///
/// # Errors
///
/// Returns [`ChromrecError::InvalidInput`] if `result` carries no annotated
/// tree or a node has no resolved state.
pub fn detect_events(result: &AnalysisResult, config: &EventConfig) -> Result<Vec<StateChangeEvent>> {
    let annotated = result.annotated_tree().ok_or_else(|| {
        ChromrecError::InvalidInput("result has no annotated tree to scan for events".into())
    })?;
    let tree = annotated.tree();
    let state = |id: NodeId| {
        annotated.state(id).ok_or_else(|| {
            ChromrecError::InvalidInput(format!("node {} has no resolved state", id))
        })
    };

    let mut events = Vec::new();
    for id in tree.iter_preorder() {
        let node = &tree[id];
        let Some(parent) = node.parent else {
            continue;
        };
        let (from, to) = (state(parent)?, state(id)?);
        let change = from.distance(to);
        if change > 0 && change >= config.change_threshold {
            events.push(StateChangeEvent {
                node: id,
                name: node.name.clone(),
                branch_length: node.branch_length,
                parent_state: from.clone(),
                child_state: to.clone(),
                change,
            });
        }
    }
    Ok(events)
}
