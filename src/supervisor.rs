//! Application supervisor and monitoring
//!
//! This module provides the startup banner, the periodic uptime report
//! and the toggle counter fed by the button task.

use embedded_hal_async::delay::DelayNs;
use portable_atomic::{AtomicU32, Ordering};

use crate::config::{self, AppConfig, TaskPlan};
use crate::types::APP_VERSION;

/// Confirmed button toggles, written only by the button task
pub static TOGGLE_COUNT: AtomicU32 = AtomicU32::new(0);

/// Confirmed toggles since boot
pub fn toggle_count() -> u32 {
    TOGGLE_COUNT.load(Ordering::Relaxed)
}

/// Application supervisor responsible for monitoring and lifecycle management
pub struct AppSupervisor {
    config: AppConfig,
    uptime_seconds: u32,
    last_report: u32,
}

impl AppSupervisor {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            uptime_seconds: 0,
            last_report: 0,
        }
    }

    /// Print application startup banner with the task plan
    pub fn print_startup_banner(&self, plan: &TaskPlan) {
        info!("========================================");
        info!(
            "ServoBench v{}.{}.{}",
            APP_VERSION.major,
            APP_VERSION.minor,
            APP_VERSION.patch
        );
        info!("Hardware: RP2040 (Raspberry Pi Pico)");
        info!(
            "Button: GPIO{} -> LED GPIO{} (debounce {} ms)",
            config::BUTTON_PIN,
            config::LED_PIN,
            self.config.debounce.settle.as_millis()
        );
        info!(
            "Heartbeat: GPIO{} every {} ms",
            config::HEARTBEAT_LED_PIN,
            self.config.heartbeat_period.as_millis()
        );
        info!(
            "Servo: GPIO{} duty {}..{} step {}",
            config::SERVO_PIN,
            self.config.sweep.duty_min,
            self.config.sweep.duty_max,
            self.config.sweep.step
        );
        for task in plan.iter() {
            info!("Task {} priority {}", task.name(), task.priority);
        }
        info!("========================================");
    }

    /// Print successful initialization message
    pub fn print_init_success(&self) {
        info!("ServoBench initialized successfully");
    }

    /// Advance the uptime clock; returns `true` when a status line is due
    pub fn tick(&mut self, elapsed_secs: u32) -> bool {
        self.uptime_seconds = self.uptime_seconds.saturating_add(elapsed_secs);
        if self.uptime_seconds - self.last_report >= config::STATUS_REPORT_SECS {
            self.last_report = self.uptime_seconds;
            return true;
        }
        false
    }

    /// Run the main supervisor loop
    pub async fn run<D: DelayNs>(mut self, mut delay: D) -> ! {
        info!("Application supervisor started");

        loop {
            delay.delay_ms(config::STATUS_INTERVAL_SECS as u32 * 1000).await;
            if self.tick(config::STATUS_INTERVAL_SECS as u32) {
                self.print_status();
            }
        }
    }

    /// Print current application status
    fn print_status(&self) {
        let minutes = self.uptime_seconds / 60;
        let hours = minutes / 60;
        let remaining_minutes = minutes % 60;

        if hours > 0 {
            info!("Status: Uptime {}h{}m, {} toggles", hours, remaining_minutes, toggle_count());
        } else {
            info!("Status: Uptime {}m, {} toggles", minutes, toggle_count());
        }
    }

    /// Get current uptime in seconds
    pub fn uptime(&self) -> u32 {
        self.uptime_seconds
    }
}

impl Default for AppSupervisor {
    fn default() -> Self {
        Self::new(AppConfig::DEFAULT)
    }
}
