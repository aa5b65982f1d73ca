//! Hardware abstraction and initialization
//!
//! This module builds the RP2040 pins and PWM slice for each task, owns the
//! interrupt executors that give the tasks their priorities, and spawns the
//! tasks declared in a [`TaskPlan`].
//!
//! Priority tiers map onto NVIC levels of the software interrupts:
//!
//! | Tier       | Executor                 | NVIC |
//! |------------|--------------------------|------|
//! | `Critical` | `SWI_IRQ_0`              | P0   |
//! | `High`     | `SWI_IRQ_1`              | P1   |
//! | `Medium`   | `SWI_IRQ_2`              | P2   |
//! | `Low`      | `SWI_IRQ_3`              | P3   |
//! | `Idle`     | thread mode (main loop)  | -    |

use embassy_executor::{InterruptExecutor, SendSpawner};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority as IrqPriority};
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::{peripherals, Peri, Peripherals};
use embassy_time::Delay;
use fixed::types::U12F4;

use crate::buttons::ToggleTask;
use crate::channels::BUTTON_EVENTS;
use crate::config::{self, AppConfig, TaskPlan};
use crate::drive::FlywheelDrive;
use crate::edge::EdgeListener;
use crate::error::Error;
use crate::heartbeat::Heartbeat;
use crate::servo::{DutyChannel, ServoSweep};
use crate::supervisor::AppSupervisor;
use crate::types::{Priority, TaskId};

// ===================================================================
// Interrupt Executors
// ===================================================================

static EXECUTOR_CRITICAL: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MEDIUM: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_CRITICAL.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_2() {
    EXECUTOR_MEDIUM.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_3() {
    EXECUTOR_LOW.on_interrupt()
}

/// Spawners for the preemptive tiers
pub struct Executors {
    critical: SendSpawner,
    high: SendSpawner,
    medium: SendSpawner,
    low: SendSpawner,
}

impl Executors {
    /// Spawner for a tier, `None` for `Idle` (thread mode)
    pub fn spawner(&self, priority: Priority) -> Option<SendSpawner> {
        match priority {
            Priority::Critical => Some(self.critical),
            Priority::High => Some(self.high),
            Priority::Medium => Some(self.medium),
            Priority::Low => Some(self.low),
            Priority::Idle => None,
        }
    }
}

/// Set NVIC priorities and start the interrupt executors
pub fn start_executors() -> Executors {
    interrupt::SWI_IRQ_0.set_priority(IrqPriority::P0);
    interrupt::SWI_IRQ_1.set_priority(IrqPriority::P1);
    interrupt::SWI_IRQ_2.set_priority(IrqPriority::P2);
    interrupt::SWI_IRQ_3.set_priority(IrqPriority::P3);

    Executors {
        critical: EXECUTOR_CRITICAL.start(interrupt::SWI_IRQ_0),
        high: EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1),
        medium: EXECUTOR_MEDIUM.start(interrupt::SWI_IRQ_2),
        low: EXECUTOR_LOW.start(interrupt::SWI_IRQ_3),
    }
}

// ===================================================================
// Servo PWM
// ===================================================================

/// PWM slice 0 channel A with a staged config
///
/// The RP2040 double-buffers the compare register and latches it at the
/// counter wrap, so `update_duty` never produces a runt pulse.
pub struct ServoPwm {
    pwm: Pwm<'static>,
    config: pwm::Config,
}

impl ServoPwm {
    fn new(
        slice: Peri<'static, peripherals::PWM_SLICE0>,
        pin: Peri<'static, peripherals::PIN_16>,
        initial_duty: u16,
    ) -> Self {
        let mut cfg = pwm::Config::default();
        cfg.top = ((1u32 << config::SERVO_DUTY_RESOLUTION_BITS) - 1) as u16;
        cfg.divider = U12F4::from_bits(
            config::SERVO_PWM_DIVIDER_INT * 16 + config::SERVO_PWM_DIVIDER_FRAC,
        );
        cfg.compare_a = initial_duty;

        let pwm = Pwm::new_output_a(slice, pin, cfg.clone());
        Self { pwm, config: cfg }
    }
}

impl DutyChannel for ServoPwm {
    fn set_duty(&mut self, duty: u16) {
        self.config.compare_a = duty;
    }

    fn update_duty(&mut self) {
        self.pwm.set_config(&self.config);
    }
}

// ===================================================================
// Board Tasks
// ===================================================================

type ButtonTask = ToggleTask<Input<'static>, Output<'static>, Delay>;
type SweepTask = ServoSweep<ServoPwm, Delay>;
type DriveTask = FlywheelDrive<Output<'static>, Output<'static>, Output<'static>, Delay>;
type HeartbeatTask = Heartbeat<Output<'static>, Delay>;

/// Every task body built from the board peripherals, waiting to be spawned
pub struct BoardTasks {
    edge: Option<EdgeListener<Input<'static>>>,
    button: Option<ButtonTask>,
    sweep: Option<SweepTask>,
    drive: Option<DriveTask>,
    heartbeat: Option<HeartbeatTask>,
}

impl BoardTasks {
    /// Configure all pins and the PWM slice once
    pub fn new(p: Peripherals, app: &AppConfig) -> Result<Self, Error> {
        info!("Initializing board peripherals");

        // Two handles on the button pad: one waits for edges, the other
        // samples the level during debounce and release polling.
        let button_edge = Input::new(p.PIN_4, Pull::Up);
        // SAFETY: PIN_4 is only ever configured here, both handles apply the
        // same pull-up input setup and are never dropped.
        let button_level = Input::new(unsafe { peripherals::PIN_4::steal() }, Pull::Up);

        let led = Output::new(p.PIN_15, Level::Low);
        let heartbeat_led = Output::new(p.PIN_2, Level::Low);

        let motor_enable = Output::new(p.PIN_18, Level::Low);
        let motor_in1 = Output::new(p.PIN_19, Level::Low);
        let motor_in2 = Output::new(p.PIN_21, Level::Low);

        let servo = ServoPwm::new(p.PWM_SLICE0, p.PIN_16, app.sweep.duty_min);

        Ok(Self {
            edge: Some(EdgeListener::new(button_edge, config::BUTTON_PIN)),
            button: Some(ToggleTask::new(button_level, led, Delay, app.debounce)?),
            sweep: Some(ServoSweep::new(servo, Delay, app.sweep)?),
            drive: Some(FlywheelDrive::new(
                motor_enable,
                motor_in1,
                motor_in2,
                Delay,
                app.flywheel_idle,
                app.flywheel_direction,
            )),
            heartbeat: Some(Heartbeat::new(heartbeat_led, Delay, app.heartbeat_period)?),
        })
    }

    /// Spawn one task; each task can be spawned only once
    pub fn spawn(&mut self, id: TaskId, spawner: SendSpawner) -> Result<(), Error> {
        let spawned = match id {
            TaskId::EdgeListener => spawner.spawn(edge_task(self.edge.take().ok_or(Error::InvalidTaskPlan)?)),
            TaskId::ButtonToggle => spawner.spawn(button_task(self.button.take().ok_or(Error::InvalidTaskPlan)?)),
            TaskId::ServoSweep => spawner.spawn(sweep_task(self.sweep.take().ok_or(Error::InvalidTaskPlan)?)),
            TaskId::FlywheelDrive => spawner.spawn(drive_task(self.drive.take().ok_or(Error::InvalidTaskPlan)?)),
            TaskId::Heartbeat => {
                spawner.spawn(heartbeat_task(self.heartbeat.take().ok_or(Error::InvalidTaskPlan)?))
            }
        };
        spawned.map_err(|_| Error::Spawn)?;
        debug!("Spawned {}", id.name());
        Ok(())
    }

    /// Spawn every task of the plan above `Idle` on its interrupt executor
    pub fn spawn_preemptive(&mut self, plan: &TaskPlan, executors: &Executors) -> Result<(), Error> {
        for task in plan.iter() {
            if let Some(spawner) = executors.spawner(task.priority) {
                self.spawn(task.id, spawner)?;
            }
        }
        Ok(())
    }

    /// Spawn every `Idle` task of the plan on the thread-mode executor
    pub fn spawn_idle(&mut self, plan: &TaskPlan, spawner: SendSpawner) -> Result<(), Error> {
        for task in plan.iter().filter(|t| t.priority == Priority::Idle) {
            self.spawn(task.id, spawner)?;
        }
        Ok(())
    }
}

// ===================================================================
// Embassy Task Entry Points
// ===================================================================

#[embassy_executor::task]
async fn edge_task(listener: EdgeListener<Input<'static>>) -> ! {
    listener.run(&BUTTON_EVENTS).await
}

#[embassy_executor::task]
async fn button_task(task: ButtonTask) -> ! {
    task.run(&BUTTON_EVENTS).await
}

#[embassy_executor::task]
async fn sweep_task(task: SweepTask) -> ! {
    task.run().await
}

#[embassy_executor::task]
async fn drive_task(task: DriveTask) -> ! {
    task.run().await
}

#[embassy_executor::task]
async fn heartbeat_task(task: HeartbeatTask) -> ! {
    task.run().await
}

#[embassy_executor::task]
pub async fn supervisor_task(supervisor: AppSupervisor) -> ! {
    supervisor.run(Delay).await
}
