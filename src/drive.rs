//! Flywheel motor drive (L298N)
//!
//! Set-and-forget: the bridge is enabled and the direction pins are set
//! once, after which the task only sleeps. It still occupies the `Low`
//! tier so the scheduler sees the same task set as with a live controller.

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config;
use crate::error::Error;
use crate::types::MotorDirection;

pub struct FlywheelDrive<EN, A, B, D> {
    enable: EN,
    in1: A,
    in2: B,
    delay: D,
    idle: Duration,
    direction: MotorDirection,
}

impl<EN, A, B, D> FlywheelDrive<EN, A, B, D>
where
    EN: OutputPin,
    A: OutputPin,
    B: OutputPin,
    D: DelayNs,
{
    pub fn new(enable: EN, in1: A, in2: B, delay: D, idle: Duration, direction: MotorDirection) -> Self {
        Self {
            enable,
            in1,
            in2,
            delay,
            idle,
            direction,
        }
    }

    /// Enable the bridge and latch the rotation direction
    pub fn engage(&mut self) -> Result<(), Error> {
        self.enable.set_high().map_err(Error::pin)?;

        match self.direction {
            MotorDirection::Forward => {
                self.in1.set_high().map_err(Error::pin)?;
                self.in2.set_low().map_err(Error::pin)?;
            }
            MotorDirection::Reverse => {
                self.in1.set_low().map_err(Error::pin)?;
                self.in2.set_high().map_err(Error::pin)?;
            }
        }
        Ok(())
    }

    pub async fn run(mut self) -> ! {
        info!("Flywheel task started");

        if let Err(e) = self.engage() {
            error!("Flywheel configuration failed: {}", e);
            panic!("flywheel configuration failed");
        }
        info!("Flywheel running {}", self.direction);

        loop {
            self.delay.delay_ms(config::delay_ms(self.idle)).await;
        }
    }
}
