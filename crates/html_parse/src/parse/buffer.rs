//! Deferred event queue used while event buffering is on.

use crate::event::Event;
use std::collections::VecDeque;

/// FIFO of events waiting to be committed.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub(crate) fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub(crate) fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every queued event; returns how many were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::EventQueue;
    use crate::event::Event;

    #[test]
    fn preserves_arrival_order() {
        let mut queue = EventQueue::default();
        queue.push(Event::characters("a"));
        queue.push(Event::comment("b"));
        queue.push(Event::end_of_document());
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(Event::characters("a")));
        assert_eq!(queue.pop(), Some(Event::comment("b")));
        assert_eq!(queue.clear(), 1);
        assert!(queue.is_empty());
    }
}
