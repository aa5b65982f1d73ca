//! ServoBench - RP2040 bench firmware
//!
//! Entry point: brings up the board, starts one interrupt executor per
//! priority tier, spawns the tasks of the standard plan and then runs the
//! thread-mode executor for the lowest tier.
//!
//! Hardware: Raspberry Pi Pico (RP2040)
//! Button: GPIO4 to GND (pull-up), toggles LED on GPIO15
//! Heartbeat: GPIO2
//! Flywheel (L298N): ENA GPIO18, IN1 GPIO19, IN2 GPIO21
//! Servo: GPIO16 (PWM slice 0 A, 50 Hz)

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::Executor;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_halt as _};

use servobench::config::{AppConfig, TaskPlan};
use servobench::hardware::{self, supervisor_task, BoardTasks};
use servobench::supervisor::AppSupervisor;

static EXECUTOR_IDLE: StaticCell<Executor> = StaticCell::new();

/// Main application entry point
#[entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());
    let app = AppConfig::DEFAULT;

    let plan = match TaskPlan::standard() {
        Ok(plan) => plan,
        Err(e) => {
            error!("Invalid task plan: {}", e);
            core::panic!("Task plan invalid");
        }
    };

    let supervisor = AppSupervisor::new(app);
    supervisor.print_startup_banner(&plan);

    let mut tasks = match BoardTasks::new(p, &app) {
        Ok(tasks) => tasks,
        Err(e) => {
            error!("Failed to configure hardware: {}", e);
            core::panic!("Hardware initialization failed");
        }
    };

    // Preemptive tiers first so the button path is live before thread mode runs
    let executors = hardware::start_executors();
    if let Err(e) = tasks.spawn_preemptive(&plan, &executors) {
        error!("Failed to spawn tasks: {}", e);
        core::panic!("Task spawn failed");
    }

    let executor = EXECUTOR_IDLE.init(Executor::new());
    executor.run(move |spawner| {
        if let Err(e) = tasks.spawn_idle(&plan, spawner.make_send()) {
            error!("Failed to spawn idle tasks: {}", e);
            core::panic!("Task spawn failed");
        }
        supervisor.print_init_success();
        unwrap!(spawner.spawn(supervisor_task(supervisor)));
    })
}
