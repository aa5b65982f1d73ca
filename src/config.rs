//! Hardware configuration for ServoBench
//! RP2040 (Raspberry Pi Pico) bench: button + LED, heartbeat, flywheel, servo

use embassy_time::Duration;
use heapless::Vec;

use crate::buttons::DebounceTiming;
use crate::error::Error;
use crate::servo::SweepConfig;
use crate::types::{ActiveLevel, MotorDirection, Priority, TaskId};

// ===================================================================
// GPIO Pin Assignments - Raspberry Pi Pico
// ===================================================================

pub const BUTTON_PIN: u8 = 4; // Push button to GND, internal pull-up
pub const LED_PIN: u8 = 15; // LED toggled by the button
pub const HEARTBEAT_LED_PIN: u8 = 2; // Liveness LED

// L298N flywheel driver (remove the ENA jumper when ENA is wired)
pub const MOTOR_IN1_PIN: u8 = 19;
pub const MOTOR_IN2_PIN: u8 = 21;
pub const MOTOR_ENABLE_PIN: u8 = 18;

pub const SERVO_PIN: u8 = 16; // PWM slice 0, channel A

// ===================================================================
// Button Pipeline
// ===================================================================

pub const EVENT_QUEUE_DEPTH: usize = 8; // Edge tokens buffered between ISR and task
pub const BUTTON_DEBOUNCE_MS: u64 = 30; // Settle time before re-reading the button
pub const BUTTON_RELEASE_POLL_MS: u64 = 5; // Poll interval while the button is held
pub const BUTTON_ACTIVE_LEVEL: ActiveLevel = ActiveLevel::Low;

// ===================================================================
// Periodic Tasks
// ===================================================================

pub const HEARTBEAT_PERIOD_MS: u64 = 500; // Half period of the liveness blink
pub const FLYWHEEL_IDLE_MS: u64 = 1000; // Sleep between idle wake-ups of the drive task
pub const FLYWHEEL_DIRECTION: MotorDirection = MotorDirection::Forward;

// ===================================================================
// Servo PWM Configuration
// ===================================================================

pub const SERVO_PWM_FREQ_HZ: u32 = 50; // 20 ms frame
pub const SERVO_DUTY_RESOLUTION_BITS: u8 = 15; // Duty range 0..=32767
pub const SERVO_FRAME_US: u32 = 1_000_000 / SERVO_PWM_FREQ_HZ;
pub const SERVO_MIN_PULSE_US: u32 = 500; // 0 degrees
pub const SERVO_MAX_PULSE_US: u32 = 2500; // 180 degrees
pub const SERVO_DUTY_STEP: u16 = 14; // Duty increment per iteration
pub const SERVO_STEP_PERIOD_MS: u64 = 10; // Delay between iterations, sets sweep speed

// RP2040 PWM: 125 MHz / (top + 1) / divider = 125e6 / 32768 / 76.3125 ~= 49.99 Hz
pub const SYS_CLOCK_HZ: u32 = 125_000_000;
pub const SERVO_PWM_DIVIDER_INT: u16 = 76;
pub const SERVO_PWM_DIVIDER_FRAC: u16 = 5; // sixteenths

/// Whole milliseconds of `d` for `DelayNs::delay_ms`, saturating at `u32::MAX`
pub fn delay_ms(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

// ===================================================================
// Supervisor
// ===================================================================

pub const STATUS_INTERVAL_SECS: u64 = 10; // Supervisor wake-up period
pub const STATUS_REPORT_SECS: u32 = 60; // Uptime log period

// ===================================================================
// Task Plan
// ===================================================================

/// Upper bound on declared tasks
pub const MAX_TASKS: usize = 8;

/// One task declaration: who runs, and at which scheduling tier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskSpec {
    pub id: TaskId,
    pub priority: Priority,
}

impl TaskSpec {
    pub const fn name(&self) -> &'static str {
        self.id.name()
    }
}

/// Startup declaration of every task and its priority
#[derive(Clone, Debug)]
pub struct TaskPlan {
    tasks: Vec<TaskSpec, MAX_TASKS>,
}

impl TaskPlan {
    pub fn builder() -> TaskPlanBuilder {
        TaskPlanBuilder {
            tasks: Vec::new(),
            error: None,
        }
    }

    /// The firmware's plan: input reaction first, liveness last
    pub fn standard() -> Result<Self, Error> {
        Self::builder()
            .task(TaskId::EdgeListener, Priority::Critical)
            .task(TaskId::ButtonToggle, Priority::High)
            .task(TaskId::ServoSweep, Priority::Medium)
            .task(TaskId::FlywheelDrive, Priority::Low)
            .task(TaskId::Heartbeat, Priority::Idle)
            .build()
    }

    pub fn priority_of(&self, id: TaskId) -> Option<Priority> {
        self.tasks.iter().find(|t| t.id == id).map(|t| t.priority)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskSpec> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Builder for [`TaskPlan`]; the first error sticks and is reported by `build`
///
/// Every [`TaskId`] must be declared exactly once.
pub struct TaskPlanBuilder {
    tasks: Vec<TaskSpec, MAX_TASKS>,
    error: Option<Error>,
}

impl TaskPlanBuilder {
    pub fn task(mut self, id: TaskId, priority: Priority) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.tasks.iter().any(|t| t.id == id) {
            self.error = Some(Error::InvalidTaskPlan);
            return self;
        }
        if self.tasks.push(TaskSpec { id, priority }).is_err() {
            self.error = Some(Error::InvalidTaskPlan);
        }
        self
    }

    /// Fails on a duplicate, an overflow, or a task left undeclared
    pub fn build(self) -> Result<TaskPlan, Error> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(missing) = TaskId::ALL
            .into_iter()
            .find(|id| !self.tasks.iter().any(|t| t.id == *id))
        {
            warn!("Task plan does not declare {}", missing.name());
            return Err(Error::InvalidTaskPlan);
        }
        Ok(TaskPlan { tasks: self.tasks })
    }
}

// ===================================================================
// Application Configuration
// ===================================================================

/// Parameters for every task, fixed at compile time
#[derive(Clone, Copy, Debug)]
pub struct AppConfig {
    pub debounce: DebounceTiming,
    pub heartbeat_period: Duration,
    pub flywheel_idle: Duration,
    pub flywheel_direction: MotorDirection,
    pub sweep: SweepConfig,
}

impl AppConfig {
    pub const DEFAULT: AppConfig = AppConfig {
        debounce: DebounceTiming {
            settle: Duration::from_millis(BUTTON_DEBOUNCE_MS),
            poll: Duration::from_millis(BUTTON_RELEASE_POLL_MS),
            active: BUTTON_ACTIVE_LEVEL,
        },
        heartbeat_period: Duration::from_millis(HEARTBEAT_PERIOD_MS),
        flywheel_idle: Duration::from_millis(FLYWHEEL_IDLE_MS),
        flywheel_direction: FLYWHEEL_DIRECTION,
        sweep: match SweepConfig::from_pulse_widths(
            SERVO_DUTY_RESOLUTION_BITS,
            SERVO_MIN_PULSE_US,
            SERVO_MAX_PULSE_US,
            SERVO_FRAME_US,
            SERVO_DUTY_STEP,
            Duration::from_millis(SERVO_STEP_PERIOD_MS),
        ) {
            Ok(sweep) => sweep,
            Err(_) => panic!("servo pulse widths do not fit the PWM frame"),
        },
    };
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
