/*!
 * Highlight pipeline core.
 *
 * Data flows one direction for creation:
 *
 * ```text
 * SelectionSnapshot -> position::encode -> Span -> extract::span_rects -> Stage::add_group
 * ```
 *
 * and back for recognition: a pointer or a fresh selection is answered by the
 * stage's spatial queries ([`Stage::hit_test`], [`Stage::overlaps_above`]) and
 * mapped to the coordinator's stored spans.
 *
 * Only [`DocumentPosition`]s are ever persisted. Every rendered group is
 * derived state: destroyed and rebuilt wholesale on resize, rebuilt singly on
 * a highlight toggle, and gone for good once its span is deleted.
 */

pub mod extract;
pub mod marker;
pub mod position;
pub mod span;
pub mod stage;

pub use extract::span_rects;
pub use marker::Marker;
pub use position::{DocumentPosition, NodePath, decode, encode};
pub use span::{Span, SpanId};
pub use stage::{Group, OutlineShape, QuadSegment, Stage, Surface, SurfaceGroup};
