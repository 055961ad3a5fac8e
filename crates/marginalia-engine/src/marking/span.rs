//! Persistent span records.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::marking::position::DocumentPosition;
use crate::style::MarkerStyle;

/// Unique identifier of a span and of its rendered group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(pub Uuid);

impl SpanId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A recorded highlighted text range.
///
/// Only the structural positions are persisted; geometry is derived state
/// rebuilt from them on every render. `length` is the character count at
/// creation time and serves as a coarse equality signal during re-selection
/// matching, it is never re-derived from live text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub id: SpanId,
    pub start: DocumentPosition,
    pub end: DocumentPosition,
    pub length: usize,
    pub style: MarkerStyle,
    /// Underline sublayer visibility; on after creation.
    pub line_visible: bool,
    /// Fill sublayer visibility; off until the highlight toggle.
    pub rect_visible: bool,
    /// Creation wall-clock time in milliseconds since the Unix epoch.
    pub created_at_ms: Option<u64>,
    /// Identifier of whoever made the mark, when the host tracks one.
    pub operator: Option<String>,
    /// Free-form host data carried alongside the core record.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl Span {
    /// Create a fresh span in its post-creation state.
    pub fn new(
        start: DocumentPosition,
        end: DocumentPosition,
        length: usize,
        style: MarkerStyle,
    ) -> Self {
        Self {
            id: SpanId::generate(),
            start,
            end,
            length,
            style,
            line_visible: true,
            rect_visible: false,
            created_at_ms: unix_millis(),
            operator: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Whether `other` addresses the same text: identical endpoints and an
    /// equal cached length. Purely structural; see the stale-path caveat on
    /// the matcher.
    pub fn same_range(&self, other: &Span) -> bool {
        self.start == other.start && self.end == other.end && self.length == other.length
    }
}

fn unix_millis() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|elapsed| elapsed.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marking::position::NodePath;

    fn position(indices: Vec<usize>, offset: usize) -> DocumentPosition {
        DocumentPosition::new(NodePath(indices), offset)
    }

    #[test]
    fn test_new_span_starts_with_line_only() {
        let span = Span::new(
            position(vec![0], 0),
            position(vec![0], 5),
            5,
            MarkerStyle::default(),
        );
        assert!(span.line_visible);
        assert!(!span.rect_visible);
        assert!(span.created_at_ms.is_some());
    }

    #[test]
    fn test_same_range_compares_positions_and_length() {
        let a = Span::new(
            position(vec![0, 1], 2),
            position(vec![0, 1], 7),
            5,
            MarkerStyle::default(),
        );
        let mut b = a.clone();
        b.id = SpanId::generate();
        assert!(a.same_range(&b), "ids must not participate in range equality");

        b.length = 4;
        assert!(!a.same_range(&b), "length is part of the equality signal");
    }

    #[test]
    fn test_span_serialization_roundtrip() {
        let mut span = Span::new(
            position(vec![1, 0], 3),
            position(vec![1, 2], 4),
            12,
            MarkerStyle::default(),
        );
        span.operator = Some("reviewer-7".to_string());
        span.extensions
            .insert("note".to_string(), serde_json::json!("check this claim"));

        let json = serde_json::to_string(&span).unwrap();
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(span, back);
    }

    #[test]
    fn test_extension_map_is_omitted_when_empty() {
        let span = Span::new(
            position(vec![0], 0),
            position(vec![0], 1),
            1,
            MarkerStyle::default(),
        );
        let json = serde_json::to_string(&span).unwrap();
        assert!(!json.contains("extensions"));
    }
}
