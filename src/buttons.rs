//! Debounced button → LED toggle
//!
//! This module drains the edge tokens queued by the interrupt handler,
//! confirms each press after a settle delay, toggles the LED once per
//! press and waits for the release before accepting the next token.
//!
//! Per token the task walks through:
//!
//! ```text
//! WaitingForEvent -> DebounceDelay -> Confirm -+-> Toggled -> WaitingForHeld -+-> WaitingForEvent
//!                                              +-> Ignored -------------------+
//! ```

use embassy_time::Duration;
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;
use portable_atomic::{AtomicU32, Ordering};

use crate::channels::EventChannel;
use crate::config;
use crate::error::Error;
use crate::supervisor;
use crate::types::{ActiveLevel, EdgeEvent};

// ===================================================================
// Debounce Timing
// ===================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceTiming {
    /// Time for contact bounce to die out before the level is re-read
    pub settle: Duration,
    /// Poll interval while waiting for the release
    pub poll: Duration,
    /// Level that means "pressed"
    pub active: ActiveLevel,
}

/// Result of handling one edge token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Debounce {
    /// Press confirmed; LED now at `led_on`, button has been released
    Toggled { led_on: bool },
    /// Button was no longer pressed after the settle delay
    Ignored,
}

// ===================================================================
// Button Task Implementation
// ===================================================================

/// Sole owner of the toggled LED and its logical state
pub struct ToggleTask<I, O, D> {
    button: I,
    led: O,
    delay: D,
    timing: DebounceTiming,
    led_on: bool,
    toggles: &'static AtomicU32,
}

impl<I, O, D> ToggleTask<I, O, D>
where
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the pins and drive the LED off so it never floats
    pub fn new(button: I, mut led: O, delay: D, timing: DebounceTiming) -> Result<Self, Error> {
        led.set_low().map_err(Error::pin)?;
        Ok(Self {
            button,
            led,
            delay,
            timing,
            led_on: false,
            toggles: &supervisor::TOGGLE_COUNT,
        })
    }

    /// Count confirmed toggles into `counter` instead of the supervisor's
    pub fn with_counter(mut self, counter: &'static AtomicU32) -> Self {
        self.toggles = counter;
        self
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    fn is_pressed(&mut self) -> Result<bool, Error> {
        match self.timing.active {
            ActiveLevel::Low => self.button.is_low(),
            ActiveLevel::High => self.button.is_high(),
        }
        .map_err(Error::pin)
    }

    /// Run one token from `DebounceDelay` back to `WaitingForEvent`
    pub async fn handle(&mut self, event: EdgeEvent) -> Result<Debounce, Error> {
        // DebounceDelay
        self.delay.delay_ms(config::delay_ms(self.timing.settle)).await;

        // Confirm
        if !self.is_pressed()? {
            debug!("Edge on GPIO{} ignored (not pressed after settle)", event.pin);
            return Ok(Debounce::Ignored);
        }

        // Toggled: the logical state follows the pin only once the write landed
        let next = !self.led_on;
        self.led.set_state(PinState::from(next)).map_err(Error::pin)?;
        self.led_on = next;
        info!("Button press -> LED {}", if next { "ON" } else { "OFF" });
        self.toggles.fetch_add(1, Ordering::Relaxed);

        // WaitingForHeld: a held press must not toggle again
        while self.is_pressed()? {
            self.delay.delay_ms(config::delay_ms(self.timing.poll)).await;
        }

        Ok(Debounce::Toggled { led_on: self.led_on })
    }

    pub async fn run<const N: usize>(mut self, events: &EventChannel<N>) -> ! {
        info!("Button task started");

        loop {
            // WaitingForEvent
            let event = events.pop().await;
            if let Err(e) = self.handle(event).await {
                warn!("Button task: {}", e);
            }
        }
    }
}
