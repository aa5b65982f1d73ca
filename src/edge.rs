//! Falling-edge interrupt handling
//!
//! On the RP2040 the GPIO interrupt vector belongs to `embassy-rp`, which
//! wakes whichever future awaits the edge. The listener below runs on the
//! highest-priority interrupt executor, so the code after the await executes
//! in interrupt context and must stay short: build a token, try to queue it,
//! go back to waiting. Queuing wakes the button task, which pends its own
//! executor interrupt; the NVIC switches to it as soon as this one returns.

use embedded_hal_async::digital::Wait;

use crate::channels::EventChannel;
use crate::types::{EdgeEvent, PinId};

/// Hand one falling edge to the button task. Never blocks.
///
/// Returns `false` when the channel was full and the event was lost.
pub fn on_falling_edge<const N: usize>(events: &EventChannel<N>, pin: PinId) -> bool {
    events.push(EdgeEvent::new(pin))
}

/// Waits for falling edges on one input and forwards them as tokens
pub struct EdgeListener<W> {
    pin: W,
    id: PinId,
}

impl<W: Wait> EdgeListener<W> {
    pub fn new(pin: W, id: PinId) -> Self {
        Self { pin, id }
    }

    /// Wait for the next edge and forward it. Returns whether it was queued.
    pub async fn forward_next<const N: usize>(&mut self, events: &EventChannel<N>) -> bool {
        match self.pin.wait_for_falling_edge().await {
            Ok(()) => on_falling_edge(events, self.id),
            Err(_e) => {
                warn!("Edge wait failed on GPIO{}", self.id);
                false
            }
        }
    }

    pub async fn run<const N: usize>(mut self, events: &EventChannel<N>) -> ! {
        info!("Edge listener started on GPIO{}", self.id);

        loop {
            // A full queue drops the edge; the button task is already busy
            // with the press that produced it.
            let _ = self.forward_next(events).await;
        }
    }
}
