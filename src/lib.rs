//! ServoBench - RP2040 bench firmware using Embassy
//!
//! One interrupt-driven input path and three independent periodic tasks
//! sharing the CPU under priority-based preemption.
//!
//! ## Tasks
//! - **Edge listener**: falling edge on the button → token into [`channels::BUTTON_EVENTS`]
//! - **Button toggle**: debounce, confirm, toggle LED, wait for release
//! - **Servo sweep**: back-and-forth PWM duty ramp
//! - **Flywheel drive**: enable the motor bridge once, then idle
//! - **Heartbeat**: liveness blink
//!
//! ## Architecture
//! - **Preemption**: one interrupt executor per priority tier, thread mode for the lowest
//! - **Channels**: bounded, non-blocking producer, waiting consumer
//! - **Ownership**: every output pin and the PWM channel belong to exactly one task
//!
//! Task bodies are generic over `embedded-hal` traits; the board binding
//! lives in [`hardware`] behind the `rp2040` feature.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod buttons;
pub mod channels;
pub mod config;
pub mod drive;
pub mod edge;
pub mod error;
pub mod heartbeat;
pub mod servo;
pub mod supervisor;
pub mod types;

#[cfg(feature = "rp2040")]
pub mod hardware;

pub use error::Error;
