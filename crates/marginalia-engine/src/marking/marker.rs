//! Marker coordinator: selection → span → render, matching, and lifecycle.

use std::time::Instant;

use crate::doc::{DocumentModel, PositionMode};
use crate::event::{EventBus, MarkerEvent};
use crate::geom::Rect;
use crate::marking::extract::span_rects;
use crate::marking::position::{DocumentPosition, encode};
use crate::marking::span::{Span, SpanId};
use crate::marking::stage::{Stage, Surface};
use crate::schedule::{Debounce, Deferred, RESIZE_DEBOUNCE};
use crate::selection::SelectionSnapshot;
use crate::style::MarkerStyle;

/// Orchestrates the highlight pipeline over one container.
///
/// Owns the span store and the stage; the document tree and the platform
/// selection stay outside and are passed into each operation, since both may
/// change between calls. Geometry is never persisted: every group is derived
/// state rebuilt from the stored positions, and the resize path is the sole
/// mechanism keeping it correct after layout changes.
pub struct Marker {
    stage: Stage,
    spans: Vec<Span>,
    style: MarkerStyle,
    events: EventBus,
    match_task: Deferred,
    resize_debounce: Debounce,
}

impl Marker {
    /// Create a coordinator over `doc`, painting through `surface`.
    ///
    /// An unsupported container positioning mode is a warning, not a
    /// failure; everything else keeps working, the overlay may just drift.
    pub fn new<D: DocumentModel>(doc: &D, surface: Box<dyn Surface>) -> Self {
        if doc.position_mode() == PositionMode::Static {
            log::warn!(
                "container position mode must be one of absolute, fixed or relative; \
                 overlay coordinates may not stay anchored"
            );
        }
        Self {
            stage: Stage::new(surface, doc),
            spans: Vec::new(),
            style: MarkerStyle::default(),
            events: EventBus::new(),
            match_task: Deferred::new(),
            resize_debounce: Debounce::new(RESIZE_DEBOUNCE),
        }
    }

    /// Register a listener for every [`MarkerEvent`].
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&MarkerEvent) + 'static,
    {
        self.events.subscribe(listener);
    }

    /// Replace the brush used for subsequently created spans.
    pub fn set_style(&mut self, style: MarkerStyle) {
        self.style = style;
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    /// Stored spans, in creation order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Look up a stored span by id.
    pub fn search(&self, id: &SpanId) -> Option<&Span> {
        self.spans.iter().find(|span| span.id == *id)
    }

    /// Stage-local rects of a rendered span.
    pub fn group_rects(&self, id: &SpanId) -> Option<&[Rect]> {
        self.stage.group_rects(id)
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Destroy every rendered group. The span store is untouched; a
    /// subsequent resize or restore paints everything again.
    pub fn clear_stage(&mut self) {
        self.stage.clear();
    }

    /// Tear the rendering surface down entirely.
    pub fn destroy_stage(&mut self) {
        self.stage.destroy();
    }

    /// Build a span from a selection snapshot.
    ///
    /// `None` for collapsed or empty selections, and when either endpoint
    /// sits outside the tracked root.
    pub fn span_from_selection<D: DocumentModel>(
        &self,
        doc: &D,
        selection: &SelectionSnapshot,
    ) -> Option<Span> {
        let (start, end) = selection_positions(doc, selection)?;
        let length = selection.text.chars().count();
        Some(Span::new(start, end, length, self.style.clone()))
    }

    /// Resolve a span's geometry and render it.
    ///
    /// Returns `false` without storing when the span yields zero rects (the
    /// positions no longer resolve, or the extent is invisible). On success
    /// the span is stored, its group added to the stage, and a creation
    /// notification emitted carrying the persistence payload;
    /// `clear_selection` is forwarded so the host can collapse the platform
    /// selection. Re-rendering an already stored span (restore, resize) only
    /// rebuilds its group.
    pub fn render<D: DocumentModel>(&mut self, doc: &D, span: Span, clear_selection: bool) -> bool {
        let rects = span_rects(doc, &span.start, &span.end);
        if rects.is_empty() {
            log::debug!("span {} resolved to empty geometry, not rendered", span.id);
            return false;
        }

        // Rebuild, never duplicate, the group of a span rendered before
        self.stage.remove_group(&span.id);
        self.stage.add_group(
            span.id,
            rects,
            &span.style,
            span.line_visible,
            span.rect_visible,
        );
        let known = self.spans.iter().any(|stored| stored.id == span.id);
        if !known {
            self.spans.push(span.clone());
            self.events.emit(&MarkerEvent::Created {
                span,
                clear_selection,
            });
        }
        true
    }

    /// Re-ingest previously persisted spans through the render path.
    ///
    /// Restored spans enter the store first, so no creation notification is
    /// re-emitted back at the persistence collaborator. Spans whose
    /// positions no longer resolve are kept in the store but stay invisible.
    pub fn restore<D: DocumentModel>(&mut self, doc: &D, spans: Vec<Span>) {
        for span in spans {
            if self.search(&span.id).is_none() {
                self.spans.push(span.clone());
            }
            self.render(doc, span, false);
        }
    }

    /// Delete a span and its group. `false` if the id is unknown.
    pub fn delete(&mut self, id: &SpanId) -> bool {
        let Some(index) = self.spans.iter().position(|span| span.id == *id) else {
            return false;
        };
        self.spans.remove(index);
        self.stage.remove_group(id);
        self.events.emit(&MarkerEvent::Removed { id: *id });
        true
    }

    /// Swap a span between underline and filled-highlight rendering.
    ///
    /// Flips the visibility flags and rebuilds only that span's group;
    /// `false` if the id is unknown.
    pub fn toggle_highlight(&mut self, highlighted: bool, id: &SpanId) -> bool {
        let Some(span) = self.spans.iter_mut().find(|span| span.id == *id) else {
            return false;
        };
        span.rect_visible = highlighted;
        span.line_visible = !highlighted;
        let style = span.style.clone();
        let (line_visible, rect_visible) = (span.line_visible, span.rect_visible);

        if let Some(rects) = self.stage.group_rects(id).map(|rects| rects.to_vec()) {
            self.stage.remove_group(id);
            self.stage.add_group(*id, rects, &style, line_visible, rect_visible);
        }
        true
    }

    /// Viewport hit-test mapped back to stored spans; also notifies click
    /// listeners. Multiple spans come back for overlapping regions.
    pub fn hit_test_click<D: DocumentModel>(&mut self, doc: &D, x: f64, y: f64) -> Vec<&Span> {
        let ids = self.stage.hit_test(doc, x, y);
        self.events.emit(&MarkerEvent::Clicked {
            ids: ids.clone(),
            x,
            y,
        });
        self.spans
            .iter()
            .filter(|span| ids.contains(&span.id))
            .collect()
    }

    /// First and last boundary rects of the selection, in stage-local space.
    pub fn selection_bounds<D: DocumentModel>(
        &self,
        doc: &D,
        selection: &SelectionSnapshot,
    ) -> Option<[Rect; 2]> {
        let (start, end) = selection_positions(doc, selection)?;
        let rects = span_rects(doc, &start, &end);
        Some([*rects.first()?, *rects.last()?])
    }

    /// Defer match evaluation to the next scheduling tick.
    ///
    /// Called from the pointer-release/tap handler. Reading the selection
    /// synchronously inside that event turn observes stale state, so the
    /// evaluation waits for the snapshot handed to the next [`Marker::tick`].
    pub fn queue_match(&mut self) {
        self.match_task.arm();
    }

    /// Record a container size-change notification at `now`.
    ///
    /// Rapid repeats collapse through a trailing-edge debounce into a single
    /// full re-render on a later tick.
    pub fn resize_signal(&mut self, now: Instant) {
        self.resize_debounce.signal(now);
    }

    /// Run due deferred work: the pending match evaluation, then the
    /// debounced resize. Hosts call this once per event-loop turn with the
    /// current (settled) selection snapshot.
    pub fn tick<D: DocumentModel>(
        &mut self,
        doc: &D,
        selection: &SelectionSnapshot,
        now: Instant,
    ) {
        if self.match_task.take() {
            self.evaluate_match(doc, selection);
        }
        if self.resize_debounce.fire(now) {
            self.handle_resize(doc);
        }
    }

    /// Rebuild every group from persisted positions against the current
    /// layout. Geometry is pure derived state, so the whole stage is cleared
    /// and re-rendered wholesale.
    pub fn handle_resize<D: DocumentModel>(&mut self, doc: &D) {
        log::debug!("re-rendering {} spans after resize", self.spans.len());
        self.stage.clear();
        self.stage.resize(doc);
        let Self { spans, stage, .. } = self;
        for span in spans.iter() {
            let rects = span_rects(doc, &span.start, &span.end);
            if rects.is_empty() {
                continue;
            }
            stage.add_group(
                span.id,
                rects,
                &span.style,
                span.line_visible,
                span.rect_visible,
            );
        }
    }

    fn evaluate_match<D: DocumentModel>(&mut self, doc: &D, selection: &SelectionSnapshot) {
        let Some(span) = self.span_from_selection(doc, selection) else {
            self.events.emit(&MarkerEvent::MatchDismissed);
            return;
        };

        let exact: Vec<SpanId> = self
            .spans
            .iter()
            .filter(|stored| stored.same_range(&span))
            .map(|stored| stored.id)
            .collect();
        let bounds = self.selection_bounds(doc, selection);
        let matches = if exact.is_empty() {
            match &bounds {
                Some([first, last]) => self.stage.overlaps_above(first, last),
                None => Vec::new(),
            }
        } else {
            exact
        };

        self.events.emit(&MarkerEvent::Matched {
            span,
            matches,
            bounds,
        });
    }
}

/// Encode both endpoints of the snapshot's primary range.
fn selection_positions<D: DocumentModel>(
    doc: &D,
    selection: &SelectionSnapshot,
) -> Option<(DocumentPosition, DocumentPosition)> {
    if selection.is_empty() {
        return None;
    }
    let range = selection.primary_range()?;
    let start_path = encode(doc, range.start_node)?;
    let end_path = if range.end_node == range.start_node {
        start_path.clone()
    } else {
        encode(doc, range.end_node)?
    };
    Some((
        DocumentPosition::new(start_path, range.start_offset),
        DocumentPosition::new(end_path, range.end_offset),
    ))
}
