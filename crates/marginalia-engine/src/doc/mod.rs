//! Document-model contract.
//!
//! The document tree and its layout are owned by the embedding platform and
//! may change between any two calls into the engine. Everything the engine
//! needs from them is expressed through [`DocumentModel`]: parent/child
//! navigation, leaf text access, measured rects for character sub-ranges, and
//! the container metrics used to normalize coordinates. The codec and the
//! geometry extractor depend only on this contract.

pub mod memory;

pub use memory::{Display, LayoutMetrics, MemoryDocument};

use crate::geom::{Point, Rect, Size};

/// Opaque handle to a node in the provider's tree.
///
/// Handles are only meaningful against the provider that issued them and only
/// for as long as the tree is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Layout positioning mode of the container element.
///
/// Overlay coordinates stay anchored to the container only for the first
/// three; [`PositionMode::Static`] triggers a non-fatal warning at
/// coordinator construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMode {
    Absolute,
    Fixed,
    Relative,
    Static,
}

/// Errors raised while building an in-memory document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("unknown node id {0}")]
    UnknownNode(usize),
    #[error("text nodes cannot have children")]
    TextChild,
}

/// Read-only view of a laid-out document tree.
pub trait DocumentModel {
    /// The tracked container node; paths are relative to it.
    fn root(&self) -> NodeId;

    /// Parent of `node`, `None` for the root or detached nodes.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Number of children under `node`.
    fn child_count(&self, node: NodeId) -> usize;

    /// The `index`-th child of `node`, in document order.
    fn child(&self, node: NodeId, index: usize) -> Option<NodeId>;

    /// True if `node` is a text-bearing leaf.
    fn is_text(&self, node: NodeId) -> bool;

    /// Character count of a text leaf; 0 for elements.
    fn text_len(&self, node: NodeId) -> usize;

    /// Text content of a leaf, `None` for elements.
    fn text(&self, node: NodeId) -> Option<&str>;

    /// Measured viewport-space rects covering characters `[start, end)` of a
    /// text leaf, one or more per wrapped visual line. Whitespace-only leaves
    /// measure to a single zero-area rect, mirroring how platform ranges
    /// behave for inter-element whitespace.
    fn range_rects(&self, node: NodeId, start: usize, end: usize) -> Vec<Rect>;

    /// Viewport-space origin of the container's bounding box.
    fn container_origin(&self) -> Point;

    /// Current scroll offsets of the container.
    fn scroll_offset(&self) -> Point;

    /// Content-box width by full scrollable height, used to size the stage.
    fn content_size(&self) -> Size;

    /// The container's layout positioning mode.
    fn position_mode(&self) -> PositionMode;

    /// Whether `node` is the root or reachable from it by parent links.
    fn contains(&self, node: NodeId) -> bool {
        let root = self.root();
        let mut current = node;
        loop {
            if current == root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}
