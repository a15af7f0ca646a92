//! Single-type event channel

use std::collections::VecDeque;

use parking_lot::Mutex;

/// FIFO channel for one event type.
///
/// Producers push from loader callbacks; the frame loop drains. Events come
/// out in exactly the order they were sent.
pub struct EventChannel<E> {
    queue: Mutex<VecDeque<E>>,
}

impl<E> EventChannel<E> {
    /// Create a new channel
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Send an event
    pub fn send(&self, event: E) {
        self.queue.lock().push_back(event);
    }

    /// Receive the oldest event
    pub fn receive(&self) -> Option<E> {
        self.queue.lock().pop_front()
    }

    /// Drain all events
    pub fn drain(&self) -> Vec<E> {
        self.queue.lock().drain(..).collect()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Get pending count
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_channel_order() {
        let channel: EventChannel<u32> = EventChannel::new();

        channel.send(1);
        channel.send(2);
        channel.send(3);

        assert_eq!(channel.len(), 3);
        assert_eq!(channel.receive(), Some(1));
        assert_eq!(channel.drain(), vec![2, 3]);
        assert!(channel.is_empty());
    }
}
