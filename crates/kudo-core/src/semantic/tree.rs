//! Per-file context tree: resolved semantic paths merged with structural dedup.
//!
//! Node identity is the structural [`NodeKey`], never a tree-sitter node
//! handle, so paths resolved at different times merge onto the same nodes.

use std::cmp::Ordering;
use std::ops::Range;

use indexmap::IndexMap;

use crate::errors::{KudoError, KudoResult};

/// Structural identity of a syntax node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub kind: &'static str,
    /// 0-indexed first row.
    pub start_line: usize,
    /// 0-indexed last row, inclusive.
    pub end_line: usize,
    pub byte_span: Range<usize>,
}

impl NodeKey {
    pub fn of(node: &tree_sitter::Node<'_>) -> Self {
        Self {
            kind: node.kind(),
            start_line: node.start_position().row,
            end_line: node.end_position().row,
            byte_span: node.byte_range(),
        }
    }
}

// Siblings never overlap, so byte order is document order.
impl Ord for NodeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.byte_span
            .start
            .cmp(&other.byte_span.start)
            .then(self.byte_span.end.cmp(&other.byte_span.end))
            .then(self.start_line.cmp(&other.start_line))
            .then(self.end_line.cmp(&other.end_line))
            .then(self.kind.cmp(other.kind))
    }
}

impl PartialOrd for NodeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextNode {
    pub key: NodeKey,
    /// Terminal point of some resolved path: renders its full source text.
    pub is_fully_included: bool,
    /// Kept sorted by key.
    pub children: IndexMap<NodeKey, NodeId>,
}

impl ContextNode {
    fn new(key: NodeKey) -> Self {
        Self {
            key,
            is_fully_included: false,
            children: IndexMap::new(),
        }
    }
}

/// One deduplicated tree per analysed file. Index 0 is the module root.
#[derive(Clone, Debug)]
pub struct ContextTree<'s> {
    source: &'s str,
    root_kind: &'static str,
    containers: &'static [&'static str],
    nodes: Vec<ContextNode>,
}

impl<'s> ContextTree<'s> {
    pub fn new(source: &'s str, root_kind: &'static str) -> Self {
        Self {
            source,
            root_kind,
            containers: &[],
            nodes: Vec::new(),
        }
    }

    /// Node types rendered without a header line of their own.
    pub fn with_containers(mut self, containers: &'static [&'static str]) -> Self {
        self.containers = containers;
        self
    }

    pub fn is_container(&self, id: NodeId) -> bool {
        id != 0 && self.containers.contains(&self.nodes[id].key.kind)
    }

    pub fn root(&self) -> Option<&ContextNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: NodeId) -> &ContextNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Merge a root-to-boundary path into the tree.
    ///
    /// Existing nodes are reused by key; the remainder of the path is created.
    /// Only the last node is flagged as fully included, and flags are never
    /// cleared, so merging the same path again changes nothing.
    pub fn merge(&mut self, path: &[NodeKey]) -> KudoResult<&mut Self> {
        let Some(first) = path.first() else {
            return Ok(self);
        };
        if first.kind != self.root_kind {
            return Err(KudoError::StructuralInvariant {
                expected: self.root_kind.to_string(),
                found: first.kind.to_string(),
            });
        }

        match self.nodes.first() {
            None => self.nodes.push(ContextNode::new(first.clone())),
            Some(root) if root.key != *first => {
                return Err(KudoError::StructuralInvariant {
                    expected: format!("{:?}", root.key),
                    found: format!("{first:?}"),
                });
            }
            Some(_) => {}
        }

        let mut current: NodeId = 0;
        for key in &path[1..] {
            current = match self.nodes[current].children.get(key) {
                Some(&id) => id,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(ContextNode::new(key.clone()));
                    let children = &mut self.nodes[current].children;
                    children.insert(key.clone(), id);
                    children.sort_keys();
                    id
                }
            };
        }
        self.nodes[current].is_fully_included = true;
        Ok(self)
    }

    /// Source slice of a node.
    pub fn text(&self, id: NodeId) -> &'s str {
        let span = &self.nodes[id].key.byte_span;
        self.source.get(span.clone()).unwrap_or_default()
    }

    /// Fully included nodes in document order.
    pub fn included(&self) -> Vec<&ContextNode> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = if self.nodes.is_empty() { vec![] } else { vec![0] };
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_fully_included {
                out.push(node);
            }
            stack.extend(node.children.values().rev().copied());
        }
        out
    }

    /// Pre-order `(depth, key, included)` listing, used to compare trees.
    pub fn structure(&self) -> Vec<(usize, NodeKey, bool)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, NodeId)> = if self.nodes.is_empty() {
            vec![]
        } else {
            vec![(0, 0)]
        };
        while let Some((depth, id)) = stack.pop() {
            let node = &self.nodes[id];
            out.push((depth, node.key.clone(), node.is_fully_included));
            stack.extend(node.children.values().rev().map(|&child| (depth + 1, child)));
        }
        out
    }
}
