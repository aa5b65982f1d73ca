//! Servo sweep waveform
//!
//! A linear ramp of PWM duty between two pulse widths, reversed after a
//! fixed number of steps. The step count is `floor(range / step)`, so when
//! the range is not a multiple of the step the ramp turns around up to one
//! step short of `duty_max`. The falling ramp uses the same count, so the
//! duty returns exactly to `duty_min` and the shortfall never accumulates.

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

use crate::config;
use crate::error::Error;
use crate::types::Direction;

/// Two-phase PWM duty update: stage a value, then latch it
pub trait DutyChannel {
    /// Stage a new compare value; it has no effect until `update_duty`
    fn set_duty(&mut self, duty: u16);
    /// Apply the staged value
    fn update_duty(&mut self);
}

// ===================================================================
// Sweep Parameters
// ===================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepConfig {
    pub duty_min: u16,
    pub duty_max: u16,
    pub step: u16,
    /// Delay between iterations
    pub period: Duration,
}

impl SweepConfig {
    /// Derive duty bounds from pulse widths within a PWM frame
    ///
    /// `duty = (2^bits - 1) * pulse_us / frame_us`, truncated. Fails with
    /// [`Error::InvalidSweep`] when the resolution is outside `1..=16` bits,
    /// the frame is empty, or a pulse is longer than the frame.
    pub const fn from_pulse_widths(
        resolution_bits: u8,
        min_pulse_us: u32,
        max_pulse_us: u32,
        frame_us: u32,
        step: u16,
        period: Duration,
    ) -> Result<Self, Error> {
        if resolution_bits == 0 || resolution_bits > 16 {
            return Err(Error::InvalidSweep);
        }
        if frame_us == 0 || min_pulse_us > frame_us || max_pulse_us > frame_us {
            return Err(Error::InvalidSweep);
        }

        // pulse <= frame keeps both bounds within full_scale <= u16::MAX
        let full_scale = (1u64 << resolution_bits) - 1;
        Ok(Self {
            duty_min: (full_scale * min_pulse_us as u64 / frame_us as u64) as u16,
            duty_max: (full_scale * max_pulse_us as u64 / frame_us as u64) as u16,
            step,
            period,
        })
    }

    /// Steps per ramp before the direction flips
    pub const fn iteration_count(&self) -> u16 {
        if self.step == 0 || self.duty_max <= self.duty_min {
            return 0;
        }
        (self.duty_max - self.duty_min) / self.step
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.iteration_count() == 0 {
            return Err(Error::InvalidSweep);
        }
        Ok(())
    }
}

// ===================================================================
// Sweep State
// ===================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sweep {
    duty: u16,
    direction: Direction,
    iteration: u16,
    count: u16,
    step: u16,
}

impl Sweep {
    /// Start at `duty_min`, ramping up
    pub fn new(config: &SweepConfig) -> Self {
        Self {
            duty: config.duty_min,
            direction: Direction::Increasing,
            iteration: 0,
            count: config.iteration_count(),
            step: config.step,
        }
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Move one step and return the new duty
    pub fn advance(&mut self) -> u16 {
        self.duty = match self.direction {
            Direction::Increasing => self.duty.saturating_add(self.step),
            Direction::Decreasing => self.duty.saturating_sub(self.step),
        };

        self.iteration += 1;
        if self.iteration >= self.count {
            self.iteration = 0;
            self.direction = self.direction.reversed();
        }
        self.duty
    }
}

// ===================================================================
// Servo Sweep Task
// ===================================================================

/// Sole writer of the servo PWM channel
pub struct ServoSweep<P, D> {
    pwm: P,
    delay: D,
    sweep: Sweep,
    period: Duration,
}

impl<P: DutyChannel, D: DelayNs> ServoSweep<P, D> {
    /// Validate the ramp and park the servo at `duty_min`
    pub fn new(mut pwm: P, delay: D, config: SweepConfig) -> Result<Self, Error> {
        config.validate()?;

        let sweep = Sweep::new(&config);
        pwm.set_duty(sweep.duty());
        pwm.update_duty();

        Ok(Self {
            pwm,
            delay,
            sweep,
            period: config.period,
        })
    }

    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    /// Advance, commit the new duty, sleep one period
    pub async fn step(&mut self) -> u16 {
        let duty = self.sweep.advance();
        self.pwm.set_duty(duty);
        self.pwm.update_duty();
        self.delay.delay_ms(config::delay_ms(self.period)).await;
        duty
    }

    pub async fn run(mut self) -> ! {
        info!(
            "Servo sweep task started (duty {}..{}, {} steps per ramp)",
            self.sweep.duty(),
            self.sweep.duty() + self.sweep.count * self.sweep.step,
            self.sweep.count
        );

        loop {
            self.step().await;
        }
    }
}
