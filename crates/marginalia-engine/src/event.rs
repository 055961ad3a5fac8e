//! Synchronous notification fan-out for coordinator events.

use crate::geom::Rect;
use crate::marking::span::{Span, SpanId};

/// Notifications emitted by the marker coordinator.
///
/// Every emission is synchronous and in call order; listeners run on the
/// sole processing thread.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEvent {
    /// A span was created and rendered. This is the persistence payload.
    /// `clear_selection` asks the host to collapse the platform selection,
    /// which the engine cannot touch itself.
    Created { span: Span, clear_selection: bool },
    /// A span and its group were deleted.
    Removed { id: SpanId },
    /// A pointer click resolved against the stage.
    Clicked { ids: Vec<SpanId>, x: f64, y: f64 },
    /// A settled selection was evaluated: the candidate span, the stored
    /// spans recognized as the same region (possibly empty), and the
    /// selection's boundary rects when geometry was available.
    Matched {
        span: Span,
        matches: Vec<SpanId>,
        bounds: Option<[Rect; 2]>,
    },
    /// A settled selection produced no span to match.
    MatchDismissed,
}

type Listener = Box<dyn FnMut(&MarkerEvent)>;

/// Subscriber list; not `Debug`/`Clone` since listeners are opaque closures.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&MarkerEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Deliver `event` to every listener, in subscription order.
    pub fn emit(&mut self, event: &MarkerEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_receive_events_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = seen.clone();
        bus.subscribe(move |_| first.borrow_mut().push("first"));
        let second = seen.clone();
        bus.subscribe(move |_| second.borrow_mut().push("second"));

        bus.emit(&MarkerEvent::MatchDismissed);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_emit_without_listeners_is_a_noop() {
        let mut bus = EventBus::new();
        bus.emit(&MarkerEvent::MatchDismissed);
    }
}
