//! Ancestral state reconstruction via small parsimony.
//!
//! - **Fitch parsimony**: unweighted maximum parsimony. A post-order pass
//!   builds a candidate state set per node (intersection of the children's
//!   sets, or their union at the cost of one change when the intersection is
//!   empty); a pre-order pass then resolves one state per node, inheriting
//!   the parent's state whenever it is a candidate.
//! - **Sankoff parsimony**: weighted parsimony over a [`CostMatrix`]. Only
//!   the cost matrix contract exists so far; the method layer rejects the
//!   variant as unimplemented once its configuration checks out.
//!
//! Candidate sets and resolved states live in side tables indexed by
//! [`NodeId`] and are allocated fresh for every run. The input tree is never
//! written to.
//!
//! Whenever a state has to be chosen from a set with several members, the
//! minimum under [`State`]'s total order is taken.

use std::collections::BTreeSet;

use chromrec_core::{ChromrecError, Result};
use tracing::debug;

use crate::result::AnnotatedTree;
use crate::trait_table::State;
use crate::tree::NodeId;
use crate::validate::PhyloData;

/// Outcome of a Fitch reconstruction for one character.
#[derive(Debug, Clone, PartialEq)]
pub struct FitchReconstruction {
    /// Candidate set per node (index = NodeId), as left by the down-pass.
    pub candidate_sets: Vec<BTreeSet<State>>,
    /// Resolved state per node (index = NodeId). Leaves keep their observed state.
    pub states: Vec<State>,
    /// Minimum number of state changes on the tree.
    pub score: usize,
    /// Nodes whose children's candidate sets had an empty intersection, in
    /// post-order. Each contributed exactly one to `score`.
    pub change_nodes: Vec<NodeId>,
}

impl FitchReconstruction {
    /// Attach the side tables to a copy of the validated tree.
    pub fn into_annotated(self, data: &PhyloData) -> AnnotatedTree {
        AnnotatedTree::new(data.tree().clone(), self.states, self.candidate_sets)
    }
}

/// Fitch parsimony reconstruction for the single trait column of `data`.
///
/// Unary nodes pass their child's candidate set through unchanged and never
/// add to the score.
///
/// # Errors
///
/// Returns [`ChromrecError::InvalidTreeStructure`] if a childless node has no
/// name or no observed state. [`PhyloData`] validation rules this out, so
/// hitting it means the pairing was broken.
pub fn fitch(data: &PhyloData) -> Result<FitchReconstruction> {
    let tree = data.tree();
    let n = tree.node_count();
    let mut candidate_sets: Vec<BTreeSet<State>> = vec![BTreeSet::new(); n];
    let mut score = 0;
    let mut change_nodes = Vec::new();

    // Down-pass (post-order)
    for id in tree.iter_postorder() {
        let set = match tree[id].children.as_slice() {
            [] => BTreeSet::from([observed(data, id)?.clone()]),
            [only] => candidate_sets[*only].clone(),
            [first, rest @ ..] => {
                let mut intersection = candidate_sets[*first].clone();
                for &child in rest {
                    intersection.retain(|s| candidate_sets[child].contains(s));
                }
                if intersection.is_empty() {
                    score += 1;
                    change_nodes.push(id);
                    tree[id]
                        .children
                        .iter()
                        .flat_map(|&c| candidate_sets[c].iter().cloned())
                        .collect()
                } else {
                    intersection
                }
            }
        };
        candidate_sets[id] = set;
    }

    // Up-pass (pre-order)
    let mut resolved: Vec<Option<State>> = vec![None; n];
    for id in tree.iter_preorder() {
        let node = &tree[id];
        let state = if node.is_leaf() {
            observed(data, id)?.clone()
        } else {
            let candidates = &candidate_sets[id];
            let inherited = node
                .parent
                .and_then(|p| resolved[p].as_ref())
                .filter(|s| candidates.contains(*s));
            match inherited {
                Some(s) => s.clone(),
                None => candidates.first().cloned().ok_or_else(|| {
                    ChromrecError::InvalidTreeStructure(format!(
                        "node {} has an empty candidate set",
                        id
                    ))
                })?,
            }
        };
        resolved[id] = Some(state);
    }
    let states = resolved
        .into_iter()
        .enumerate()
        .map(|(id, s)| {
            s.ok_or_else(|| {
                ChromrecError::InvalidTreeStructure(format!(
                    "node {} is not reachable from the root",
                    id
                ))
            })
        })
        .collect::<Result<Vec<State>>>()?;

    debug!(nodes = n, score, "fitch reconstruction complete");

    Ok(FitchReconstruction {
        candidate_sets,
        states,
        score,
        change_nodes,
    })
}

fn observed(data: &PhyloData, id: NodeId) -> Result<&State> {
    let name = data.tree()[id].name.as_deref().ok_or_else(|| {
        ChromrecError::InvalidTreeStructure(format!("leaf node {} has no name", id))
    })?;
    data.traits().get(name).ok_or_else(|| {
        ChromrecError::InvalidTreeStructure(format!("no observed state for leaf '{}'", name))
    })
}

/// Cost matrix for Sankoff parsimony.
///
/// A square matrix giving the non-negative cost of changing from one state
/// to another. Row and column `i` stand for the `i`-th smallest observed
/// state.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    /// Flattened n_states × n_states cost matrix.
    costs: Vec<f64>,
    n_states: usize,
}

impl CostMatrix {
    /// Build from rows.
    ///
    /// # Errors
    ///
    /// Returns [`ChromrecError::Configuration`] if the matrix is empty, not
    /// square, or holds a negative or non-finite cost.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_states = rows.len();
        if n_states == 0 {
            return Err(ChromrecError::Configuration("cost matrix is empty".into()));
        }
        let mut costs = Vec::with_capacity(n_states * n_states);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_states {
                return Err(ChromrecError::Configuration(format!(
                    "cost matrix is not square: row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n_states
                )));
            }
            for (j, &c) in row.iter().enumerate() {
                if !c.is_finite() || c < 0.0 {
                    return Err(ChromrecError::Configuration(format!(
                        "cost matrix entry ({}, {}) = {} must be finite and non-negative",
                        i, j, c
                    )));
                }
            }
            costs.extend_from_slice(row);
        }
        Ok(Self { costs, n_states })
    }

    /// Cost of changing from state index `from` to state index `to`.
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from * self.n_states + to]
    }

    /// Number of states.
    pub fn n_states(&self) -> usize {
        self.n_states
    }
}
