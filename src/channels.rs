//! Inter-task communication channels
//!
//! The button pipeline has exactly one hand-off: falling edges seen in
//! interrupt context are queued here and drained by the button task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::config::EVENT_QUEUE_DEPTH;
use crate::types::EdgeEvent;

/// Bounded FIFO between the edge listener and the button task
///
/// The producer never waits: when the queue is full the newest event is
/// dropped. The consumer waits without timeout.
pub struct EventChannel<const N: usize = EVENT_QUEUE_DEPTH> {
    inner: Channel<CriticalSectionRawMutex, EdgeEvent, N>,
}

impl<const N: usize> EventChannel<N> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Queue an event without blocking. Returns `false` if it was dropped.
    pub fn push(&self, event: EdgeEvent) -> bool {
        self.inner.try_send(event).is_ok()
    }

    /// Wait for the next event
    pub async fn pop(&self) -> EdgeEvent {
        self.inner.receive().await
    }

    pub fn try_pop(&self) -> Option<EdgeEvent> {
        self.inner.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for EventChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Falling edges from the button, edge listener -> button task
/// Buffer size: 8 (absorbs a burst of bounces within one debounce window)
pub static BUTTON_EVENTS: EventChannel = EventChannel::new();
