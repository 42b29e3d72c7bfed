//! Rooted phylogenetic tree.
//!
//! Uses arena-style storage: nodes live in a flat `Vec<Node>` and are
//! referenced by `NodeId` (a `usize` index). Children are kept in insertion
//! order, so every traversal is reproducible across runs.

use std::ops::Index;

use chromrec_core::{ChromrecError, Result, Summarizable};

/// Index into the tree's node arena.
pub type NodeId = usize;

/// A single node in a phylogenetic tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Index of this node in the arena.
    pub id: NodeId,
    /// Parent node (None for root).
    pub parent: Option<NodeId>,
    /// Child nodes, in a stable order.
    pub children: Vec<NodeId>,
    /// Branch length from this node to its parent.
    pub branch_length: Option<f64>,
    /// Taxon or clade label. Leaves carry the taxon name used as trait key.
    pub name: Option<String>,
}

impl Node {
    /// True if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True if this node has exactly one child.
    pub fn is_unary(&self) -> bool {
        self.children.len() == 1
    }
}

/// A rooted, ordered, multifurcating tree stored as an arena of nodes.
///
/// Deserialized trees go through [`PhyloTree::from_nodes`] and are checked
/// like any other.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawTree")
)]
pub struct PhyloTree {
    nodes: Vec<Node>,
    root: NodeId,
}

/// Unchecked wire form of [`PhyloTree`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTree {
    nodes: Vec<Node>,
    root: NodeId,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTree> for PhyloTree {
    type Error = ChromrecError;

    fn try_from(raw: RawTree) -> Result<Self> {
        Self::from_nodes(raw.nodes, raw.root)
    }
}

impl PhyloTree {
    /// Create a new tree with a single unnamed root node.
    pub fn new() -> Self {
        let root = Node {
            id: 0,
            parent: None,
            children: Vec::new(),
            branch_length: None,
            name: None,
        };
        Self {
            nodes: vec![root],
            root: 0,
        }
    }

    /// Create a tree from pre-built nodes and a root index.
    ///
    /// The node graph is checked before the tree is accepted: ids match arena
    /// positions, parent and child links agree, the root is the only
    /// parentless node, every node is reachable from the root exactly once
    /// and branch lengths are finite and non-negative.
    pub fn from_nodes(nodes: Vec<Node>, root: NodeId) -> Result<Self> {
        if nodes.is_empty() {
            return Err(ChromrecError::InvalidInput("empty node list".into()));
        }
        if root >= nodes.len() {
            return Err(ChromrecError::InvalidInput(format!(
                "root index {} out of range ({})",
                root,
                nodes.len()
            )));
        }
        let tree = Self { nodes, root };
        tree.check_structure()?;
        Ok(tree)
    }

    fn check_structure(&self) -> Result<()> {
        let n = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.id != idx {
                return Err(ChromrecError::InvalidTreeStructure(format!(
                    "node at position {} carries id {}",
                    idx, node.id
                )));
            }
            check_branch_length(idx, node.branch_length)?;
            match node.parent {
                None if idx != self.root => {
                    return Err(ChromrecError::InvalidTreeStructure(format!(
                        "node {} has no parent but is not the root",
                        idx
                    )));
                }
                Some(_) if idx == self.root => {
                    return Err(ChromrecError::InvalidTreeStructure(format!(
                        "root node {} has a parent",
                        idx
                    )));
                }
                Some(p) if p >= n || !self.nodes[p].children.contains(&idx) => {
                    return Err(ChromrecError::InvalidTreeStructure(format!(
                        "node {} names {} as parent, which does not list it as a child",
                        idx, p
                    )));
                }
                _ => {}
            }
            for &child in &node.children {
                if child >= n || self.nodes[child].parent != Some(idx) {
                    return Err(ChromrecError::InvalidTreeStructure(format!(
                        "node {} lists child {} whose parent link disagrees",
                        idx, child
                    )));
                }
            }
        }

        // Every node reachable from the root exactly once: no cycles, no
        // detached components, no node listed twice.
        let mut seen = vec![false; n];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if seen[id] {
                return Err(ChromrecError::InvalidTreeStructure(format!(
                    "node {} is reachable along more than one path",
                    id
                )));
            }
            seen[id] = true;
            stack.extend(self.nodes[id].children.iter().copied());
        }
        if let Some(orphan) = seen.iter().position(|&s| !s) {
            return Err(ChromrecError::InvalidTreeStructure(format!(
                "node {} is not reachable from the root",
                orphan
            )));
        }
        Ok(())
    }

    /// Add a child to `parent` and return its `NodeId`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: Option<String>,
        branch_length: Option<f64>,
    ) -> Result<NodeId> {
        if parent >= self.nodes.len() {
            return Err(ChromrecError::InvalidInput(format!(
                "parent index {} out of range ({})",
                parent,
                self.nodes.len()
            )));
        }
        let id = self.nodes.len();
        check_branch_length(id, branch_length)?;
        self.nodes.push(Node {
            id,
            parent: Some(parent),
            children: Vec::new(),
            branch_length,
            name,
        });
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Access a node by id.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Rename a node. Structure and branch lengths cannot be edited in place.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or_else(|| {
            ChromrecError::InvalidInput(format!("node id {} out of range", id))
        })?;
        node.name = Some(name.into());
        Ok(())
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// All leaf node ids, in arena order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.id)
            .collect()
    }

    /// Sorted list of leaf names (leaves without names are excluded).
    pub fn leaf_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.is_leaf())
            .filter_map(|n| n.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Id of the leaf called `name`, if any.
    pub fn find_leaf(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.is_leaf() && n.name.as_deref() == Some(name))
            .map(|n| n.id)
    }

    /// Pre-order (parent before children) traversal yielding node ids.
    pub fn iter_preorder(&self) -> PreorderIter<'_> {
        PreorderIter {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Post-order (children before parent) traversal yielding node ids.
    pub fn iter_postorder(&self) -> PostorderIter {
        // Build postorder sequence by reversing a modified preorder
        // (visit right children first, then reverse the whole thing).
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            result.push(id);
            for &child in &self.nodes[id].children {
                stack.push(child);
            }
        }
        result.reverse();
        PostorderIter {
            sequence: result,
            pos: 0,
        }
    }

    /// Parse a Newick format string into a tree.
    pub fn from_newick(input: &str) -> Result<Self> {
        crate::newick::parse(input)
    }

    /// Serialize the tree to a Newick format string.
    pub fn to_newick(&self) -> String {
        crate::newick::write(self)
    }
}

fn check_branch_length(id: NodeId, length: Option<f64>) -> Result<()> {
    match length {
        Some(len) if !len.is_finite() || len < 0.0 => Err(ChromrecError::InvalidInput(format!(
            "branch length {} of node {} must be finite and non-negative",
            len, id
        ))),
        _ => Ok(()),
    }
}

impl Default for PhyloTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for PhyloTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl Summarizable for PhyloTree {
    fn summary(&self) -> String {
        let leaves = self.leaf_count();
        let internal = self.node_count() - leaves;
        format!(
            "PhyloTree: {} nodes ({} leaves, {} internal)",
            self.node_count(),
            leaves,
            internal
        )
    }
}

/// Pre-order iterator over node ids.
pub struct PreorderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreorderIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Push children in reverse order so leftmost is visited first.
        for &child in self.tree.nodes[id].children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

/// Post-order iterator over node ids.
pub struct PostorderIter {
    sequence: Vec<NodeId>,
    pos: usize,
}

impl Iterator for PostorderIter {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.sequence.get(self.pos)?;
        self.pos += 1;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> PhyloTree {
        // ((A:0.1,B:0.2)AB:0.3,(C:0.4,D:0.5)CD:0.6)root;
        let mut tree = PhyloTree::new();
        tree.set_name(0, "root").unwrap();
        let ab = tree.add_child(0, Some("AB".into()), Some(0.3)).unwrap();
        let cd = tree.add_child(0, Some("CD".into()), Some(0.6)).unwrap();
        tree.add_child(ab, Some("A".into()), Some(0.1)).unwrap();
        tree.add_child(ab, Some("B".into()), Some(0.2)).unwrap();
        tree.add_child(cd, Some("C".into()), Some(0.4)).unwrap();
        tree.add_child(cd, Some("D".into()), Some(0.5)).unwrap();
        tree
    }

    fn leaf(id: NodeId, parent: NodeId, name: &str) -> Node {
        Node {
            id,
            parent: Some(parent),
            children: vec![],
            branch_length: None,
            name: Some(name.into()),
        }
    }

    #[test]
    fn new_tree_has_single_root() {
        let tree = PhyloTree::new();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);
        assert!(tree[0].is_root());
    }

    #[test]
    fn add_child_works() {
        let mut tree = PhyloTree::new();
        let c1 = tree.add_child(0, Some("A".into()), Some(1.0)).unwrap();
        assert_eq!(c1, 1);
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree[c1].parent, Some(0));
        assert_eq!(tree[0].children, vec![1]);
        assert!(tree[0].is_unary());
    }

    #[test]
    fn add_child_invalid_parent() {
        let mut tree = PhyloTree::new();
        assert!(tree.add_child(99, None, None).is_err());
    }

    #[test]
    fn add_child_rejects_negative_length() {
        let mut tree = PhyloTree::new();
        assert!(tree.add_child(0, Some("A".into()), Some(-1.0)).is_err());
        assert!(tree.add_child(0, Some("A".into()), Some(f64::NAN)).is_err());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn leaf_counts() {
        let tree = sample_tree();
        assert_eq!(tree.node_count(), 7);
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.leaves(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn preorder_traversal() {
        let tree = sample_tree();
        let order: Vec<NodeId> = tree.iter_preorder().collect();
        // root(0), AB(1), A(3), B(4), CD(2), C(5), D(6)
        assert_eq!(order, vec![0, 1, 3, 4, 2, 5, 6]);
    }

    #[test]
    fn postorder_traversal() {
        let tree = sample_tree();
        let order: Vec<NodeId> = tree.iter_postorder().collect();
        // A(3), B(4), AB(1), C(5), D(6), CD(2), root(0)
        assert_eq!(order, vec![3, 4, 1, 5, 6, 2, 0]);
    }

    #[test]
    fn traversal_is_reproducible() {
        let tree = sample_tree();
        let first: Vec<NodeId> = tree.iter_postorder().collect();
        let second: Vec<NodeId> = tree.iter_postorder().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn leaf_names_sorted() {
        let tree = sample_tree();
        assert_eq!(tree.leaf_names(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn find_leaf_by_name() {
        let tree = sample_tree();
        assert_eq!(tree.find_leaf("C"), Some(5));
        // Internal nodes are not leaves even when named.
        assert_eq!(tree.find_leaf("AB"), None);
        assert_eq!(tree.find_leaf("Z"), None);
    }

    #[test]
    fn from_nodes_accepts_consistent_graph() {
        let root = Node {
            id: 0,
            parent: None,
            children: vec![1, 2],
            branch_length: None,
            name: None,
        };
        let tree = PhyloTree::from_nodes(vec![root, leaf(1, 0, "A"), leaf(2, 0, "B")], 0).unwrap();
        assert_eq!(tree.leaf_names(), vec!["A", "B"]);
    }

    #[test]
    fn from_nodes_rejects_disagreeing_links() {
        let root = Node {
            id: 0,
            parent: None,
            children: vec![1],
            branch_length: None,
            name: None,
        };
        // Node 2 claims node 0 as parent, but node 0 does not list it.
        let err = PhyloTree::from_nodes(vec![root, leaf(1, 0, "A"), leaf(2, 0, "B")], 0);
        assert!(matches!(err, Err(ChromrecError::InvalidTreeStructure(_))));
    }

    #[test]
    fn from_nodes_rejects_cycle() {
        let root = Node {
            id: 0,
            parent: None,
            children: vec![1],
            branch_length: None,
            name: None,
        };
        let a = Node {
            id: 1,
            parent: Some(2),
            children: vec![2],
            branch_length: None,
            name: None,
        };
        let b = Node {
            id: 2,
            parent: Some(1),
            children: vec![1],
            branch_length: None,
            name: None,
        };
        assert!(PhyloTree::from_nodes(vec![root, a, b], 0).is_err());
    }

    #[test]
    fn from_nodes_rejects_second_root() {
        let root = Node {
            id: 0,
            parent: None,
            children: vec![],
            branch_length: None,
            name: Some("A".into()),
        };
        let other = Node {
            id: 1,
            parent: None,
            children: vec![],
            branch_length: None,
            name: Some("B".into()),
        };
        assert!(PhyloTree::from_nodes(vec![root, other], 0).is_err());
    }

    #[test]
    fn from_nodes_empty() {
        assert!(PhyloTree::from_nodes(vec![], 0).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_tree_is_validated() {
        let valid = r#"
            root = 0

            [[nodes]]
            id = 0
            children = [1, 2]

            [[nodes]]
            id = 1
            parent = 0
            children = []
            name = "A"

            [[nodes]]
            id = 2
            parent = 0
            children = []
            name = "B"
        "#;
        let tree: PhyloTree = toml::from_str(valid).unwrap();
        assert_eq!(tree.leaf_names(), vec!["A", "B"]);

        // Child 7 does not exist.
        let dangling = r#"
            root = 0

            [[nodes]]
            id = 0
            children = [1, 7]

            [[nodes]]
            id = 1
            parent = 0
            children = []
            name = "A"
        "#;
        let err = toml::from_str::<PhyloTree>(dangling).unwrap_err();
        assert!(err.to_string().contains("child 7"), "{}", err);

        let two_roots = r#"
            root = 0

            [[nodes]]
            id = 0
            children = []
            name = "A"

            [[nodes]]
            id = 1
            children = []
            name = "B"
        "#;
        assert!(toml::from_str::<PhyloTree>(two_roots).is_err());
    }

    #[test]
    fn summary_format() {
        let tree = sample_tree();
        assert_eq!(tree.summary(), "PhyloTree: 7 nodes (4 leaves, 3 internal)");
    }
}
