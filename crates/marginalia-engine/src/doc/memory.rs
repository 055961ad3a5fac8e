//! Arena-backed document tree with a deterministic monospace layout.
//!
//! `MemoryDocument` is the shipped [`DocumentModel`] provider. It exists so
//! the whole highlight pipeline can run headless: elements flow as blocks or
//! inlines, text wraps greedily at the container width, and every glyph
//! advances by a fixed amount. The numbers it produces are stable across
//! calls, which is what the resize path and the test suites lean on.

use std::collections::HashMap;

use crate::doc::{DocumentError, DocumentModel, NodeId, PositionMode};
use crate::geom::{Point, Rect, Size};

/// Flow behavior of an element node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Starts on a fresh line and forces a break after its subtree.
    Block,
    /// Continues the current line.
    Inline,
}

/// Fixed metrics driving the monospace layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Content-box width text wraps at.
    pub container_width: f64,
    /// Horizontal advance per character.
    pub glyph_advance: f64,
    /// Height of one visual line.
    pub line_height: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            container_width: 400.0,
            glyph_advance: 8.0,
            line_height: 16.0,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element { display: Display },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// One wrapped segment of a text leaf, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineRun {
    start: usize,
    end: usize,
    x: f64,
    y: f64,
}

#[derive(Debug, Default)]
struct Flow {
    runs: HashMap<usize, Vec<LineRun>>,
    content_height: f64,
}

/// In-memory document tree plus layout state.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    metrics: LayoutMetrics,
    origin: Point,
    scroll: Point,
    position_mode: PositionMode,
}

impl MemoryDocument {
    /// Create a document holding only the root container element.
    pub fn new(metrics: LayoutMetrics) -> Self {
        let root_data = NodeData {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element {
                display: Display::Block,
            },
        };
        Self {
            nodes: vec![root_data],
            root: NodeId(0),
            metrics,
            origin: Point::default(),
            scroll: Point::default(),
            position_mode: PositionMode::Relative,
        }
    }

    /// Append an element child under `parent`.
    pub fn push_element(
        &mut self,
        parent: NodeId,
        display: Display,
    ) -> Result<NodeId, DocumentError> {
        self.push_node(parent, NodeKind::Element { display })
    }

    /// Append a text leaf under `parent`.
    pub fn push_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DocumentError> {
        self.push_node(parent, NodeKind::Text(text.to_string()))
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, DocumentError> {
        let parent_data = self
            .nodes
            .get(parent.0)
            .ok_or(DocumentError::UnknownNode(parent.0))?;
        if matches!(parent_data.kind, NodeKind::Text(_)) {
            return Err(DocumentError::TextChild);
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Detach `node` (and its subtree) from the tree.
    ///
    /// The node data stays allocated but is no longer reachable from the
    /// root, which is exactly what a platform-side removal looks like to a
    /// previously captured path.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DocumentError> {
        let data = self
            .nodes
            .get(node.0)
            .ok_or(DocumentError::UnknownNode(node.0))?;
        let Some(parent) = data.parent else {
            return Ok(());
        };
        self.nodes[parent.0].children.retain(|child| *child != node);
        self.nodes[node.0].parent = None;
        Ok(())
    }

    /// Change the wrap width, simulating a container resize.
    pub fn set_container_width(&mut self, width: f64) {
        self.metrics.container_width = width;
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    pub fn set_position_mode(&mut self, mode: PositionMode) {
        self.position_mode = mode;
    }

    fn is_whitespace_leaf(text: &str) -> bool {
        text.chars().all(char::is_whitespace)
    }

    /// Lay out the whole tree from scratch.
    ///
    /// Cheap enough to rerun per query; callers always observe the current
    /// metrics, so a width change reflows on the next measurement.
    fn flow(&self) -> Flow {
        let mut flow = Flow::default();
        let mut cursor = FlowCursor::new(&self.metrics);
        self.flow_node(self.root, &mut cursor, &mut flow);
        flow.content_height = cursor.used_height;
        flow
    }

    fn flow_node(&self, node: NodeId, cursor: &mut FlowCursor, flow: &mut Flow) {
        match &self.nodes[node.0].kind {
            NodeKind::Element { display } => {
                if *display == Display::Block {
                    cursor.break_line();
                }
                for child in &self.nodes[node.0].children {
                    self.flow_node(*child, cursor, flow);
                }
                if *display == Display::Block {
                    cursor.break_line();
                }
            }
            NodeKind::Text(text) => {
                let runs = if Self::is_whitespace_leaf(text) {
                    // Collapsed whitespace holds its flow position but takes
                    // no room; it measures to a single zero-area rect.
                    vec![LineRun {
                        start: 0,
                        end: 0,
                        x: cursor.x,
                        y: cursor.y,
                    }]
                } else {
                    cursor.place(text.chars().count())
                };
                flow.runs.insert(node.0, runs);
            }
        }
    }
}

/// Greedy line-filling cursor shared across one flow pass.
struct FlowCursor<'a> {
    metrics: &'a LayoutMetrics,
    x: f64,
    y: f64,
    used_height: f64,
}

impl<'a> FlowCursor<'a> {
    fn new(metrics: &'a LayoutMetrics) -> Self {
        Self {
            metrics,
            x: 0.0,
            y: 0.0,
            used_height: 0.0,
        }
    }

    fn break_line(&mut self) {
        if self.x > 0.0 {
            self.x = 0.0;
            self.y += self.metrics.line_height;
        }
    }

    fn place(&mut self, char_count: usize) -> Vec<LineRun> {
        let mut runs = Vec::new();
        let mut placed = 0;
        while placed < char_count {
            let available = self.metrics.container_width - self.x;
            let mut fit = (available / self.metrics.glyph_advance).floor() as usize;
            if fit == 0 {
                if self.x > 0.0 {
                    self.x = 0.0;
                    self.y += self.metrics.line_height;
                    continue;
                }
                // A container narrower than one glyph still places one per line
                fit = 1;
            }
            let take = fit.min(char_count - placed);
            runs.push(LineRun {
                start: placed,
                end: placed + take,
                x: self.x,
                y: self.y,
            });
            self.x += take as f64 * self.metrics.glyph_advance;
            self.used_height = self.used_height.max(self.y + self.metrics.line_height);
            placed += take;
            if placed < char_count {
                self.x = 0.0;
                self.y += self.metrics.line_height;
            }
        }
        runs
    }
}

impl DocumentModel for MemoryDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.nodes.get(node.0).map_or(0, |data| data.children.len())
    }

    fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.get(node.0)?.children.get(index).copied()
    }

    fn is_text(&self, node: NodeId) -> bool {
        matches!(
            self.nodes.get(node.0).map(|data| &data.kind),
            Some(NodeKind::Text(_))
        )
    }

    fn text_len(&self, node: NodeId) -> usize {
        self.text(node).map_or(0, |text| text.chars().count())
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    fn range_rects(&self, node: NodeId, start: usize, end: usize) -> Vec<Rect> {
        let Some(text) = self.text(node) else {
            return Vec::new();
        };
        let len = text.chars().count();
        let end = end.min(len);
        if start > end {
            return Vec::new();
        }

        let flow = self.flow();
        let Some(runs) = flow.runs.get(&node.0) else {
            return Vec::new();
        };

        let to_viewport = |rect: Rect| {
            rect.translated(self.origin.x - self.scroll.x, self.origin.y - self.scroll.y)
        };

        if Self::is_whitespace_leaf(text) {
            return runs
                .iter()
                .map(|run| to_viewport(Rect::new(run.x, run.y, 0.0, 0.0)))
                .collect();
        }

        let mut rects = Vec::new();
        for run in runs {
            let seg_start = start.max(run.start);
            let seg_end = end.min(run.end);
            if seg_start >= seg_end {
                continue;
            }
            let x = run.x + (seg_start - run.start) as f64 * self.metrics.glyph_advance;
            let width = (seg_end - seg_start) as f64 * self.metrics.glyph_advance;
            rects.push(to_viewport(Rect::new(
                x,
                run.y,
                width,
                self.metrics.line_height,
            )));
        }
        rects
    }

    fn container_origin(&self) -> Point {
        self.origin
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn content_size(&self) -> Size {
        let flow = self.flow();
        Size::new(self.metrics.container_width, flow.content_height)
    }

    fn position_mode(&self) -> PositionMode {
        self.position_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics() -> LayoutMetrics {
        LayoutMetrics {
            container_width: 80.0,
            glyph_advance: 8.0,
            line_height: 16.0,
        }
    }

    #[test]
    fn test_single_line_text_measures_one_rect() {
        let mut doc = MemoryDocument::new(metrics());
        let leaf = doc.push_text(doc.root(), "Hello").unwrap();

        let rects = doc.range_rects(leaf, 0, 5);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 40.0, 16.0)]);
    }

    #[test]
    fn test_sub_range_offsets_by_glyph_advance() {
        let mut doc = MemoryDocument::new(metrics());
        let leaf = doc.push_text(doc.root(), "Hello worl").unwrap();

        let rects = doc.range_rects(leaf, 6, 10);
        assert_eq!(rects, vec![Rect::new(48.0, 0.0, 32.0, 16.0)]);
    }

    #[test]
    fn test_long_text_wraps_into_multiple_rects() {
        let mut doc = MemoryDocument::new(metrics());
        // 25 chars at 8px in an 80px container: 10 + 10 + 5
        let leaf = doc.push_text(doc.root(), &"x".repeat(25)).unwrap();

        let rects = doc.range_rects(leaf, 0, 25);
        assert_eq!(
            rects,
            vec![
                Rect::new(0.0, 0.0, 80.0, 16.0),
                Rect::new(0.0, 16.0, 80.0, 16.0),
                Rect::new(0.0, 32.0, 40.0, 16.0),
            ]
        );
    }

    #[test]
    fn test_block_elements_break_lines() {
        let mut doc = MemoryDocument::new(metrics());
        let first = doc.push_element(doc.root(), Display::Block).unwrap();
        let second = doc.push_element(doc.root(), Display::Block).unwrap();
        let first_leaf = doc.push_text(first, "ab").unwrap();
        let second_leaf = doc.push_text(second, "cd").unwrap();

        assert_eq!(
            doc.range_rects(first_leaf, 0, 2),
            vec![Rect::new(0.0, 0.0, 16.0, 16.0)]
        );
        assert_eq!(
            doc.range_rects(second_leaf, 0, 2),
            vec![Rect::new(0.0, 16.0, 16.0, 16.0)]
        );
    }

    #[test]
    fn test_inline_elements_share_a_line() {
        let mut doc = MemoryDocument::new(metrics());
        let first = doc.push_element(doc.root(), Display::Inline).unwrap();
        let second = doc.push_element(doc.root(), Display::Inline).unwrap();
        let first_leaf = doc.push_text(first, "ab").unwrap();
        let second_leaf = doc.push_text(second, "cd").unwrap();

        assert_eq!(
            doc.range_rects(first_leaf, 0, 2),
            vec![Rect::new(0.0, 0.0, 16.0, 16.0)]
        );
        assert_eq!(
            doc.range_rects(second_leaf, 0, 2),
            vec![Rect::new(16.0, 0.0, 16.0, 16.0)]
        );
    }

    #[test]
    fn test_whitespace_leaf_measures_degenerate_rect() {
        let mut doc = MemoryDocument::new(metrics());
        let ws = doc.push_text(doc.root(), "  \n ").unwrap();

        let rects = doc.range_rects(ws, 0, doc.text_len(ws));
        assert_eq!(rects.len(), 1);
        assert!(rects[0].is_degenerate());
    }

    #[test]
    fn test_origin_and_scroll_shift_viewport_rects() {
        let mut doc = MemoryDocument::new(metrics());
        let leaf = doc.push_text(doc.root(), "Hi").unwrap();
        doc.set_origin(Point::new(100.0, 50.0));
        doc.set_scroll(Point::new(0.0, 30.0));

        let rects = doc.range_rects(leaf, 0, 2);
        assert_eq!(rects, vec![Rect::new(100.0, 20.0, 16.0, 16.0)]);
    }

    #[test]
    fn test_text_nodes_reject_children() {
        let mut doc = MemoryDocument::new(metrics());
        let leaf = doc.push_text(doc.root(), "leaf").unwrap();

        assert!(matches!(
            doc.push_text(leaf, "nested"),
            Err(DocumentError::TextChild)
        ));
    }

    #[test]
    fn test_detach_makes_node_unreachable() {
        let mut doc = MemoryDocument::new(metrics());
        let para = doc.push_element(doc.root(), Display::Block).unwrap();
        let leaf = doc.push_text(para, "gone").unwrap();

        assert!(doc.contains(leaf));
        doc.detach(para).unwrap();
        assert!(!doc.contains(leaf));
        assert_eq!(doc.child_count(doc.root()), 0);
    }

    #[test]
    fn test_content_size_tracks_wrapped_height() {
        let mut doc = MemoryDocument::new(metrics());
        doc.push_text(doc.root(), &"y".repeat(25)).unwrap();

        assert_eq!(doc.content_size(), Size::new(80.0, 48.0));
    }

    #[test]
    fn test_narrowing_container_reflows() {
        let mut doc = MemoryDocument::new(metrics());
        let leaf = doc.push_text(doc.root(), "abcdefgh").unwrap();

        assert_eq!(doc.range_rects(leaf, 0, 8).len(), 1);
        doc.set_container_width(32.0);
        assert_eq!(doc.range_rects(leaf, 0, 8).len(), 2);
    }
}
