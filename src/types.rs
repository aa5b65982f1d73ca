//! Common types and data structures used across the ServoBench application
//!
//! This module contains the event token passed from interrupt context to the
//! button task, plus the small enums shared by the task bodies and the
//! startup task plan.

/// GPIO number on the RP2040 bank 0
pub type PinId = u8;

/// Token produced by the edge listener for each falling edge
///
/// Carries only the originating pin. Tokens are not deduplicated: every
/// bounce that reaches the interrupt becomes its own token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    pub pin: PinId,
}

impl EdgeEvent {
    pub const fn new(pin: PinId) -> Self {
        Self { pin }
    }
}

/// Logical level at which an input counts as "pressed"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Pressed pulls the line to ground (pull-up wiring)
    Low,
    /// Pressed drives the line high (pull-down wiring)
    High,
}

/// Ramp direction of the servo sweep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Increasing,
    Decreasing,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Increasing => Direction::Decreasing,
            Direction::Decreasing => Direction::Increasing,
        }
    }
}

/// Rotation sense of the flywheel motor (H-bridge IN1/IN2)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorDirection {
    #[default]
    Forward,
    Reverse,
}

/// Scheduling tier of a task; higher preempts lower
///
/// Every tier above `Idle` maps to its own interrupt executor, `Idle` runs
/// in the thread-mode executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Priority {
    Idle = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

/// Identity of each task the firmware runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    EdgeListener,
    ButtonToggle,
    ServoSweep,
    FlywheelDrive,
    Heartbeat,
}

impl TaskId {
    /// Every task the firmware runs
    pub const ALL: [TaskId; 5] = [
        TaskId::EdgeListener,
        TaskId::ButtonToggle,
        TaskId::ServoSweep,
        TaskId::FlywheelDrive,
        TaskId::Heartbeat,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            TaskId::EdgeListener => "edge_listener",
            TaskId::ButtonToggle => "button_toggle",
            TaskId::ServoSweep => "servo_sweep",
            TaskId::FlywheelDrive => "flywheel_drive",
            TaskId::Heartbeat => "heartbeat",
        }
    }
}

/// Application version information
pub struct AppVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl AppVersion {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self { major, minor, patch }
    }
}

/// Current application version
pub const APP_VERSION: AppVersion = AppVersion::new(0, 1, 0);
