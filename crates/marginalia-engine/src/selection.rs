//! Explicit snapshots of the platform selection.
//!
//! The platform's "current selection" is globally mutable state the engine
//! never reads implicitly. Hosts capture it into a [`SelectionSnapshot`] and
//! pass that into every operation that needs it, which keeps the core
//! testable without a live platform and pins down exactly which selection
//! state an operation observed.

use crate::doc::{DocumentModel, NodeId};

/// One selection range, `(startNode, startOffset, endNode, endOffset)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSnapshot {
    pub start_node: NodeId,
    pub start_offset: usize,
    pub end_node: NodeId,
    pub end_offset: usize,
}

impl RangeSnapshot {
    /// A range whose endpoints coincide selects nothing.
    pub fn is_collapsed(&self) -> bool {
        self.start_node == self.end_node && self.start_offset == self.end_offset
    }
}

/// Captured selection state: zero or more ranges plus the selected text.
///
/// Only range 0 is ever consulted, matching platform behavior.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSnapshot {
    pub ranges: Vec<RangeSnapshot>,
    pub collapsed: bool,
    /// Concatenated text of the selection; its character count becomes the
    /// span's cached `length`.
    pub text: String,
}

impl SelectionSnapshot {
    /// The first range, if any.
    pub fn primary_range(&self) -> Option<&RangeSnapshot> {
        self.ranges.first()
    }

    /// True when the snapshot cannot produce a span.
    pub fn is_empty(&self) -> bool {
        self.collapsed
            || self
                .primary_range()
                .is_none_or(|range| range.is_collapsed())
    }

    /// Build a snapshot over `[start_offset, end_offset)` across two leaves
    /// of `doc`, deriving the selected text the way a platform selection
    /// would report it.
    ///
    /// Hosts with a live platform capture snapshots from real selection
    /// events instead; this constructor is the shared path for headless
    /// hosts and tests.
    pub fn over<D: DocumentModel>(
        doc: &D,
        start_node: NodeId,
        start_offset: usize,
        end_node: NodeId,
        end_offset: usize,
    ) -> Self {
        let range = RangeSnapshot {
            start_node,
            start_offset,
            end_node,
            end_offset,
        };
        let text = selected_text(doc, &range);
        Self {
            collapsed: range.is_collapsed(),
            ranges: vec![range],
            text,
        }
    }
}

/// Concatenate the selected text of a range in document order.
fn selected_text<D: DocumentModel>(doc: &D, range: &RangeSnapshot) -> String {
    let slice = |node: NodeId, from: usize, to: usize| -> String {
        doc.text(node)
            .map(|text| text.chars().skip(from).take(to.saturating_sub(from)).collect())
            .unwrap_or_default()
    };

    if range.start_node == range.end_node {
        return slice(range.start_node, range.start_offset, range.end_offset);
    }

    let mut text = slice(
        range.start_node,
        range.start_offset,
        doc.text_len(range.start_node),
    );
    for leaf in leaves_between(doc, range.start_node, range.end_node) {
        text.push_str(&slice(leaf, 0, doc.text_len(leaf)));
    }
    text.push_str(&slice(range.end_node, 0, range.end_offset));
    text
}

/// Text leaves strictly between `start` and `end` in document order.
fn leaves_between<D: DocumentModel>(doc: &D, start: NodeId, end: NodeId) -> Vec<NodeId> {
    let mut stack = vec![doc.root()];
    let mut within = false;
    let mut leaves = Vec::new();
    while let Some(node) = stack.pop() {
        for index in (0..doc.child_count(node)).rev() {
            if let Some(child) = doc.child(node, index) {
                stack.push(child);
            }
        }
        if node == start {
            within = true;
        } else if node == end {
            break;
        } else if within && doc.is_text(node) {
            leaves.push(node);
        }
    }
    leaves
}
