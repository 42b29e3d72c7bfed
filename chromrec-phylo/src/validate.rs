//! Pairing of a tree with its trait table.
//!
//! [`PhyloData`] can only be built through [`PhyloData::new`], which checks
//! that the tree's leaf names and the trait table's keys are the same set.
//! Every reconstruction method takes `&PhyloData`, so unvalidated input never
//! reaches an algorithm.

use std::collections::BTreeSet;

use chromrec_core::{ChromrecError, EmptyInput, LeafSetMismatch, Result, Summarizable};

use crate::trait_table::{State, TraitTable};
use crate::tree::{NodeId, PhyloTree};

/// A tree and a single trait column whose key set matches the tree's leaves.
#[derive(Debug, Clone)]
pub struct PhyloData {
    tree: PhyloTree,
    traits: TraitTable,
}

impl PhyloData {
    /// Validate and pair `tree` with `traits`.
    ///
    /// # Errors
    ///
    /// - [`ChromrecError::EmptyInput`] if the tree has no named leaves or the
    ///   trait table is empty.
    /// - [`ChromrecError::InvalidTreeStructure`] if a leaf is unnamed or two
    ///   leaves share a name.
    /// - [`ChromrecError::DataMismatch`] if the leaf names and trait keys
    ///   differ; both directions of the difference are reported.
    pub fn new(tree: PhyloTree, traits: TraitTable) -> Result<Self> {
        let leaves = tree.leaves();
        if leaves.iter().all(|&id| tree[id].name.is_none()) {
            return Err(ChromrecError::EmptyInput(EmptyInput::Tree));
        }
        if traits.is_empty() {
            return Err(ChromrecError::EmptyInput(EmptyInput::TraitTable));
        }

        let mut leaf_names = BTreeSet::new();
        for &id in &leaves {
            let name = tree[id].name.as_deref().ok_or_else(|| {
                ChromrecError::InvalidTreeStructure(format!("leaf node {} has no name", id))
            })?;
            if !leaf_names.insert(name) {
                return Err(ChromrecError::InvalidTreeStructure(format!(
                    "leaf name '{}' appears more than once",
                    name
                )));
            }
        }

        let trait_names: BTreeSet<&str> = traits.names().collect();
        if leaf_names != trait_names {
            return Err(ChromrecError::DataMismatch(LeafSetMismatch {
                missing_in_tree: trait_names
                    .difference(&leaf_names)
                    .map(|s| s.to_string())
                    .collect(),
                missing_in_traits: leaf_names
                    .difference(&trait_names)
                    .map(|s| s.to_string())
                    .collect(),
            }));
        }

        Ok(Self { tree, traits })
    }

    pub fn tree(&self) -> &PhyloTree {
        &self.tree
    }

    pub fn traits(&self) -> &TraitTable {
        &self.traits
    }

    /// Observed state of the leaf `id`, or `None` for internal or unknown nodes.
    pub fn observed_state(&self, id: NodeId) -> Option<&State> {
        let node = self.tree.get_node(id)?;
        if !node.is_leaf() {
            return None;
        }
        self.traits.get(node.name.as_deref()?)
    }

    /// Pair without any checks, for exercising the engines' own guards.
    #[cfg(test)]
    pub(crate) fn new_unchecked(tree: PhyloTree, traits: TraitTable) -> Self {
        Self { tree, traits }
    }

    /// Give back the tree and trait table.
    pub fn into_parts(self) -> (PhyloTree, TraitTable) {
        (self.tree, self.traits)
    }
}

impl Summarizable for PhyloData {
    fn summary(&self) -> String {
        format!(
            "PhyloData: {} taxa on a {}-node tree",
            self.traits.len(),
            self.tree.node_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traits(pairs: &[(&str, i64)]) -> TraitTable {
        pairs.iter().map(|&(n, s)| (n, s)).collect()
    }

    #[test]
    fn accepts_matching_sets() {
        let tree = PhyloTree::from_newick("((A:1,B:1):1,C:2);").unwrap();
        let data = PhyloData::new(tree, traits(&[("A", 2), ("B", 2), ("C", 4)])).unwrap();
        let c = data.tree().find_leaf("C").unwrap();
        assert_eq!(data.observed_state(c), Some(&State::Count(4)));
        assert_eq!(data.observed_state(data.tree().root()), None);
        assert_eq!(data.summary(), "PhyloData: 3 taxa on a 5-node tree");
    }

    #[test]
    fn reports_both_directions_of_mismatch() {
        let tree = PhyloTree::from_newick("(A,B,C);").unwrap();
        let err = PhyloData::new(tree, traits(&[("A", 1), ("B", 1), ("D", 1)])).unwrap_err();
        match err {
            ChromrecError::DataMismatch(m) => {
                assert_eq!(m.missing_in_tree, vec!["D"]);
                assert_eq!(m.missing_in_traits, vec!["C"]);
            }
            other => panic!("expected DataMismatch, got {:?}", other),
        }
    }

    #[test]
    fn subset_is_a_mismatch() {
        let tree = PhyloTree::from_newick("(A,B,C);").unwrap();
        let err = PhyloData::new(tree, traits(&[("A", 1), ("B", 1)])).unwrap_err();
        match err {
            ChromrecError::DataMismatch(m) => {
                assert!(m.missing_in_tree.is_empty());
                assert_eq!(m.missing_in_traits, vec!["C"]);
            }
            other => panic!("expected DataMismatch, got {:?}", other),
        }
    }

    #[test]
    fn empty_tree() {
        let err = PhyloData::new(PhyloTree::new(), traits(&[("A", 1)])).unwrap_err();
        assert!(matches!(err, ChromrecError::EmptyInput(EmptyInput::Tree)));
    }

    #[test]
    fn empty_trait_table() {
        let tree = PhyloTree::from_newick("(A,B);").unwrap();
        let err = PhyloData::new(tree, TraitTable::new()).unwrap_err();
        assert!(matches!(err, ChromrecError::EmptyInput(EmptyInput::TraitTable)));
    }

    #[test]
    fn unnamed_leaf_is_structural_error() {
        let tree = PhyloTree::from_newick("(A,);").unwrap();
        let err = PhyloData::new(tree, traits(&[("A", 1)])).unwrap_err();
        assert!(matches!(err, ChromrecError::InvalidTreeStructure(_)));
    }

    #[test]
    fn duplicate_leaf_name() {
        let tree = PhyloTree::from_newick("(A,A);").unwrap();
        let err = PhyloData::new(tree, traits(&[("A", 1)])).unwrap_err();
        assert!(matches!(err, ChromrecError::InvalidTreeStructure(_)));
    }

    #[test]
    fn into_parts_returns_inputs() {
        let tree = PhyloTree::from_newick("(A,B);").unwrap();
        let table = traits(&[("A", 1), ("B", 2)]);
        let data = PhyloData::new(tree.clone(), table.clone()).unwrap();
        assert_eq!(data.into_parts(), (tree, table));
    }
}
