//! Newick format parser and writer.
//!
//! Supports the standard Newick grammar with multifurcations and unary
//! nodes:
//! ```text
//! tree     = subtree ';'
//! subtree  = '(' children ')' label | label
//! children = subtree (',' subtree)*
//! label    = name? comment? (':' length)?
//! comment  = '[' any* ']'
//! ```
//! Bracketed comments are skipped on input. On output they carry per-node
//! annotations such as reconstructed states (`[&state=4]`).

use crate::tree::{Node, NodeId, PhyloTree};
use chromrec_core::{ChromrecError, Result};

/// Parse a Newick format string into a `PhyloTree`.
pub fn parse(input: &str) -> Result<PhyloTree> {
    let bytes = input.as_bytes();
    let mut parser = Parser::new(bytes);
    let (nodes, root) = parser.parse_tree()?;
    PhyloTree::from_nodes(nodes, root)
}

/// Serialize a `PhyloTree` to a Newick format string.
pub fn write(tree: &PhyloTree) -> String {
    write_with(tree, |_| None)
}

/// Serialize a tree, appending `annotate(id)` as a bracketed comment after
/// each node's name.
pub(crate) fn write_with<F>(tree: &PhyloTree, annotate: F) -> String
where
    F: Fn(NodeId) -> Option<String>,
{
    let mut buf = String::new();
    write_subtree(tree, tree.root(), &annotate, &mut buf);
    buf.push(';');
    buf
}

/// One step of the iterative writer.
enum Emit {
    Open(NodeId),
    Comma,
    Close(NodeId),
}

fn write_subtree<F>(tree: &PhyloTree, root: NodeId, annotate: &F, buf: &mut String)
where
    F: Fn(NodeId) -> Option<String>,
{
    let mut stack = vec![Emit::Open(root)];
    while let Some(step) = stack.pop() {
        match step {
            Emit::Open(id) => {
                let children = &tree[id].children;
                if children.is_empty() {
                    write_label(tree, id, annotate, buf);
                    continue;
                }
                buf.push('(');
                stack.push(Emit::Close(id));
                for (i, &child) in children.iter().enumerate().rev() {
                    stack.push(Emit::Open(child));
                    if i > 0 {
                        stack.push(Emit::Comma);
                    }
                }
            }
            Emit::Comma => buf.push(','),
            Emit::Close(id) => {
                buf.push(')');
                write_label(tree, id, annotate, buf);
            }
        }
    }
}

fn write_label<F>(tree: &PhyloTree, id: NodeId, annotate: &F, buf: &mut String)
where
    F: Fn(NodeId) -> Option<String>,
{
    let node = &tree[id];
    if let Some(ref name) = node.name {
        buf.push_str(name);
    }
    if let Some(comment) = annotate(id) {
        buf.push('[');
        buf.push_str(&comment);
        buf.push(']');
    }
    if let Some(len) = node.branch_length {
        buf.push(':');
        // Use enough precision but strip trailing zeros
        let s = format!("{:.10}", len);
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        buf.push_str(s);
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    nodes: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            nodes: Vec::new(),
        }
    }

    /// Parse with an explicit stack of open internal nodes, so nesting depth
    /// is bounded by memory rather than by the call stack.
    fn parse_tree(&mut self) -> Result<(Vec<Node>, NodeId)> {
        let root = self.alloc_node(None);
        let mut open: Vec<NodeId> = Vec::new();
        let mut current = root;

        'subtree: loop {
            self.skip_whitespace()?;
            while self.peek() == Some(b'(') {
                self.pos += 1;
                open.push(current);
                current = self.alloc_child(current);
                self.skip_whitespace()?;
            }

            // `current` has all its children; label it and move up.
            loop {
                self.parse_label(current)?;
                self.skip_whitespace()?;
                let Some(&parent) = open.last() else {
                    break 'subtree;
                };
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                        current = self.alloc_child(parent);
                        continue 'subtree;
                    }
                    Some(b')') => {
                        self.pos += 1;
                        open.pop();
                        current = parent;
                    }
                    _ => {
                        return Err(ChromrecError::Parse(
                            "expected ')' in Newick string".into(),
                        ))
                    }
                }
            }
        }

        if self.peek() != Some(b';') {
            return Err(ChromrecError::Parse(
                "expected ';' at end of Newick string".into(),
            ));
        }
        self.pos += 1;
        self.skip_whitespace()?;
        if self.pos < self.input.len() {
            return Err(ChromrecError::Parse(format!(
                "unexpected trailing input at byte {}",
                self.pos
            )));
        }
        Ok((std::mem::take(&mut self.nodes), root))
    }

    fn parse_label(&mut self, id: NodeId) -> Result<()> {
        self.skip_whitespace()?;
        let name = self.parse_name();
        if !name.is_empty() {
            self.nodes[id].name = Some(name);
        }
        self.skip_whitespace()?;
        if self.peek() == Some(b':') {
            self.pos += 1;
            self.skip_whitespace()?;
            let len_str = self.parse_float_str();
            if len_str.is_empty() {
                return Err(ChromrecError::Parse("expected number after ':'".into()));
            }
            let len: f64 = len_str.parse().map_err(|_| {
                ChromrecError::Parse(format!("invalid branch length: '{}'", len_str))
            })?;
            self.nodes[id].branch_length = Some(len);
        }
        Ok(())
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b':' | b',' | b')' | b'(' | b';' | b'[' => break,
                b' ' | b'\t' | b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn parse_float_str(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'0'..=b'9' | b'.' | b'-' | b'+' | b'e' | b'E' => self.pos += 1,
                _ => break,
            }
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn alloc_node(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            parent,
            children: Vec::new(),
            branch_length: None,
            name: None,
        });
        id
    }

    fn alloc_child(&mut self, parent: NodeId) -> NodeId {
        let id = self.alloc_node(Some(parent));
        self.nodes[parent].children.push(id);
        id
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Skip whitespace and bracketed comments.
    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                b'[' => {
                    let close = self.input[self.pos..]
                        .iter()
                        .position(|&c| c == b']')
                        .ok_or_else(|| {
                            ChromrecError::Parse("unterminated '[' comment".into())
                        })?;
                    self.pos += close + 1;
                }
                _ => break,
            }
        }
        Ok(())
    }
}
