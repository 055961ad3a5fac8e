//! Structural addressing of document nodes.
//!
//! A [`NodePath`] is the ordered list of sibling indices from the tracked
//! root down to a node. Unlike a raw node handle it survives re-renders and
//! serialization, and it fails closed: once the tree changes underneath it,
//! decoding yields `None` rather than resolving to the wrong node.

use serde::{Deserialize, Serialize};

use crate::doc::{DocumentModel, NodeId};

/// Ordered sibling indices, root to node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

/// Address of a character offset inside a specific text leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentPosition {
    pub path: NodePath,
    pub offset: usize,
}

impl DocumentPosition {
    pub fn new(path: NodePath, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// Encode `node` as a path relative to the document's root.
///
/// Walks upward accumulating each level's preceding-sibling count. Returns
/// `None` when the walk never reaches the root: the node is foreign,
/// detached, or the root itself (the root addresses no character).
pub fn encode<D: DocumentModel>(doc: &D, node: NodeId) -> Option<NodePath> {
    let root = doc.root();
    if node == root {
        return None;
    }

    let mut indices = Vec::new();
    let mut current = node;
    while current != root {
        let parent = doc.parent(current)?;
        indices.push(sibling_index(doc, parent, current)?);
        current = parent;
    }
    indices.reverse();
    Some(NodePath(indices))
}

/// Decode a path back to a live node.
///
/// Walks downward from the root, indexing into each level's children.
/// Returns `None` as soon as an index is out of range, which is how a stale
/// path captured before a tree mutation fails.
pub fn decode<D: DocumentModel>(doc: &D, path: &NodePath) -> Option<NodeId> {
    let mut current = doc.root();
    for &index in path.indices() {
        current = doc.child(current, index)?;
    }
    Some(current)
}

fn sibling_index<D: DocumentModel>(doc: &D, parent: NodeId, node: NodeId) -> Option<usize> {
    (0..doc.child_count(parent)).find(|&index| doc.child(parent, index) == Some(node))
}
