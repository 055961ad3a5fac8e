pub mod doc;
pub mod event;
pub mod geom;
pub mod marking;
pub mod schedule;
pub mod selection;
pub mod style;

// Re-export key types for easier usage
pub use doc::{Display, DocumentError, DocumentModel, LayoutMetrics, MemoryDocument, NodeId, PositionMode};
pub use event::MarkerEvent;
pub use geom::{Point, Rect, Size};
pub use marking::{
    DocumentPosition, Group, Marker, NodePath, OutlineShape, QuadSegment, Span, SpanId, Stage,
    Surface, SurfaceGroup, decode, encode, span_rects,
};
pub use selection::{RangeSnapshot, SelectionSnapshot};
pub use style::{LineShape, MarkerStyle};
