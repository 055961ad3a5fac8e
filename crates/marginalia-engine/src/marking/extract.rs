//! Geometry extraction: structural span to ordered screen rects.

use crate::doc::{DocumentModel, NodeId};
use crate::geom::Rect;
use crate::marking::position::{DocumentPosition, decode};

/// Vertical padding added to every rect so underlines don't clip at line
/// baselines.
const BASELINE_PADDING: f64 = 1.0;

/// Compute the ordered stage-local rects covering `[start, end)`.
///
/// Returns an empty list when either endpoint no longer resolves or the
/// resolved extent measures to nothing (for example a whitespace-only span);
/// callers treat that as "cannot render" without raising.
pub fn span_rects<D: DocumentModel>(
    doc: &D,
    start: &DocumentPosition,
    end: &DocumentPosition,
) -> Vec<Rect> {
    let Some(start_node) = decode(doc, &start.path) else {
        return Vec::new();
    };
    let Some(end_node) = decode(doc, &end.path) else {
        return Vec::new();
    };

    let mut rects = Vec::new();
    if start_node == end_node {
        rects.extend(doc.range_rects(start_node, start.offset, end.offset));
    } else {
        let interior = interior_text_leaves(doc, start_node, end_node);
        rects.extend(doc.range_rects(start_node, start.offset, doc.text_len(start_node)));
        for leaf in interior {
            let leaf_rects = doc.range_rects(leaf, 0, doc.text_len(leaf));
            if is_collapsed_whitespace(&leaf_rects) {
                continue;
            }
            rects.extend(leaf_rects);
        }
        rects.extend(doc.range_rects(end_node, 0, end.offset));
    }

    let origin = doc.container_origin();
    let scroll = doc.scroll_offset();
    rects
        .into_iter()
        .filter(|rect| !rect.is_degenerate())
        .map(|rect| {
            let mut rect = rect.translated(scroll.x - origin.x, scroll.y - origin.y);
            rect.height += BASELINE_PADDING;
            rect
        })
        .collect()
}

/// Text leaves strictly between `start` and `end` in document order.
///
/// Bounded iterative pre-order over the tree rooted at the container, so
/// arbitrarily deep documents cannot overflow the call stack.
///
/// # Panics
///
/// Both endpoints must be inside the tracked root. A caller handing in
/// foreign nodes has violated the API contract, which is distinct from the
/// soft failures (stale paths, degenerate selections) that degrade to empty
/// results.
pub(crate) fn interior_text_leaves<D: DocumentModel>(
    doc: &D,
    start: NodeId,
    end: NodeId,
) -> Vec<NodeId> {
    assert!(
        doc.contains(start) && doc.contains(end),
        "span endpoints must be inside the tracked root"
    );

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

/// A single zero-area rect is what collapsed inter-element whitespace
/// measures to; such leaves contribute nothing visible.
fn is_collapsed_whitespace(rects: &[Rect]) -> bool {
    rects.len() == 1 && rects[0].is_degenerate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Display, LayoutMetrics, MemoryDocument};
    use crate::geom::Point;
    use crate::marking::position::{NodePath, encode};
    use pretty_assertions::assert_eq;

    fn metrics() -> LayoutMetrics {
        LayoutMetrics {
            container_width: 160.0,
            glyph_advance: 8.0,
            line_height: 16.0,
        }
    }

    fn position<D: DocumentModel>(doc: &D, node: NodeId, offset: usize) -> DocumentPosition {
        DocumentPosition::new(encode(doc, node).unwrap(), offset)
    }

    #[test]
    fn test_same_leaf_sub_range() {
        let mut doc = MemoryDocument::new(metrics());
        let leaf = doc.push_text(doc.root(), "Hello world").unwrap();

        let rects = span_rects(&doc, &position(&doc, leaf, 6), &position(&doc, leaf, 11));
        assert_eq!(rects, vec![Rect::new(48.0, 0.0, 40.0, 17.0)]);
    }

    #[test]
    fn test_same_leaf_wrapped_range_yields_multiple_rects() {
        let mut doc = MemoryDocument::new(metrics());
        // 30 chars in a 20-char-wide container: wraps after char 20
        let leaf = doc.push_text(doc.root(), &"a".repeat(30)).unwrap();

        let rects = span_rects(&doc, &position(&doc, leaf, 15), &position(&doc, leaf, 25));
        assert_eq!(
            rects,
            vec![
                Rect::new(120.0, 0.0, 40.0, 17.0),
                Rect::new(0.0, 16.0, 40.0, 17.0),
            ]
        );
    }

    #[test]
    fn test_cross_leaf_rects_follow_document_order() {
        let mut doc = MemoryDocument::new(metrics());
        let first_para = doc.push_element(doc.root(), Display::Block).unwrap();
        let second_para = doc.push_element(doc.root(), Display::Block).unwrap();
        let third_para = doc.push_element(doc.root(), Display::Block).unwrap();
        let start_leaf = doc.push_text(first_para, "start text").unwrap();
        doc.push_text(second_para, "interior").unwrap();
        let end_leaf = doc.push_text(third_para, "end text").unwrap();

        let rects = span_rects(&doc, &position(&doc, start_leaf, 6), &position(&doc, end_leaf, 3));
        assert_eq!(
            rects,
            vec![
                // "text" tail of the start leaf
                Rect::new(48.0, 0.0, 32.0, 17.0),
                // full interior leaf
                Rect::new(0.0, 16.0, 64.0, 17.0),
                // "end" head of the end leaf
                Rect::new(0.0, 32.0, 24.0, 17.0),
            ]
        );
    }

    #[test]
    fn test_whitespace_only_interior_leaves_are_skipped() {
        let mut doc = MemoryDocument::new(metrics());
        let first_para = doc.push_element(doc.root(), Display::Block).unwrap();
        let start_leaf = doc.push_text(first_para, "ab").unwrap();
        doc.push_text(doc.root(), "\n  ").unwrap();
        let second_para = doc.push_element(doc.root(), Display::Block).unwrap();
        let end_leaf = doc.push_text(second_para, "cd").unwrap();

        let rects = span_rects(&doc, &position(&doc, start_leaf, 0), &position(&doc, end_leaf, 2));
        assert_eq!(rects.len(), 2, "whitespace leaf must not contribute a rect");
    }

    #[test]
    fn test_stale_positions_yield_empty_geometry() {
        let mut doc = MemoryDocument::new(metrics());
        let para = doc.push_element(doc.root(), Display::Block).unwrap();
        let leaf = doc.push_text(para, "volatile").unwrap();
        let start = position(&doc, leaf, 0);
        let end = position(&doc, leaf, 8);

        doc.detach(para).unwrap();
        assert!(span_rects(&doc, &start, &end).is_empty());
    }

    #[test]
    fn test_whitespace_only_span_yields_empty_geometry() {
        let mut doc = MemoryDocument::new(metrics());
        let ws = doc.push_text(doc.root(), "   ").unwrap();

        let rects = span_rects(&doc, &position(&doc, ws, 0), &position(&doc, ws, 3));
        assert!(rects.is_empty());
    }

    #[test]
    fn test_normalization_subtracts_origin_and_adds_scroll() {
        let mut doc = MemoryDocument::new(metrics());
        let leaf = doc.push_text(doc.root(), "shifted").unwrap();
        doc.set_origin(Point::new(40.0, 10.0));
        doc.set_scroll(Point::new(0.0, 96.0));

        // Viewport rect: x = 0 + 40, y = 0 + 10 - 96; normalized back to
        // content space: subtract origin, add scroll.
        let rects = span_rects(&doc, &position(&doc, leaf, 0), &position(&doc, leaf, 7));
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 56.0, 17.0)]);
    }

    #[test]
    #[should_panic(expected = "span endpoints must be inside the tracked root")]
    fn test_foreign_endpoints_violate_the_contract() {
        let mut doc = MemoryDocument::new(metrics());
        let para = doc.push_element(doc.root(), Display::Block).unwrap();
        let inside = doc.push_text(para, "inside").unwrap();
        let outside = doc.push_text(doc.root(), "outside").unwrap();
        doc.detach(outside).unwrap();

        interior_text_leaves(&doc, inside, outside);
    }

    #[test]
    fn test_decode_failure_on_either_endpoint_is_soft() {
        let doc = MemoryDocument::new(metrics());
        let bogus = DocumentPosition::new(NodePath(vec![9, 9]), 0);
        assert!(span_rects(&doc, &bogus, &bogus).is_empty());
    }
}
