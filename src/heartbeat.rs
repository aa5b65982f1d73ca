//! Liveness blink
//!
//! If this LED stops blinking, the lowest tier is being starved.

use embassy_time::Duration;
use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;

use crate::config;
use crate::error::Error;

pub struct Heartbeat<O, D> {
    led: O,
    delay: D,
    period: Duration,
    on: bool,
}

impl<O: OutputPin, D: DelayNs> Heartbeat<O, D> {
    pub fn new(mut led: O, delay: D, period: Duration) -> Result<Self, Error> {
        led.set_low().map_err(Error::pin)?;
        Ok(Self {
            led,
            delay,
            period,
            on: false,
        })
    }

    /// Flip the LED, then sleep one period. Returns the new level.
    pub async fn beat(&mut self) -> Result<bool, Error> {
        let next = !self.on;
        self.led.set_state(PinState::from(next)).map_err(Error::pin)?;
        self.on = next;
        self.delay.delay_ms(config::delay_ms(self.period)).await;
        Ok(next)
    }

    pub async fn run(mut self) -> ! {
        info!("Heartbeat task started ({} ms)", self.period.as_millis());

        loop {
            if let Err(e) = self.beat().await {
                warn!("Heartbeat: {}", e);
                // keep the cadence even when the pin write failed
                self.delay.delay_ms(config::delay_ms(self.period)).await;
            }
        }
    }
}
