//! Shared test infrastructure for servobench integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorType, InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use servobench::servo::DutyChannel;

// ============================================================================
// Simulated Clock
// ============================================================================

/// Microsecond clock shared by the delay and the scripted inputs
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_us(&self) -> u64 {
        self.0.get()
    }

    pub fn now_ms(&self) -> u64 {
        self.0.get() / 1000
    }

    pub fn advance_us(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }
}

/// Delay that completes immediately and advances the simulated clock
///
/// With a budget, every sleep past the budget stays pending forever, which
/// parks a `-> !` task loop so a single poll can observe it.
#[derive(Clone)]
pub struct SimDelay {
    clock: SimClock,
    sleeps: Rc<RefCell<Vec<u64>>>,
    budget: Option<usize>,
}

impl SimDelay {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            sleeps: Rc::new(RefCell::new(Vec::new())),
            budget: None,
        }
    }

    /// Complete the first `sleeps` sleeps, then block
    pub fn with_budget(clock: &SimClock, sleeps: usize) -> Self {
        Self {
            budget: Some(sleeps),
            ..Self::new(clock)
        }
    }

    pub fn count_sleeps_of_ms(&self, ms: u64) -> usize {
        self.sleeps.borrow().iter().filter(|&&us| us == ms * 1000).count()
    }

    async fn sleep(&mut self, us: u64) {
        if self.budget.is_some_and(|budget| self.sleeps.borrow().len() >= budget) {
            core::future::pending::<()>().await;
        }
        self.sleeps.borrow_mut().push(us);
        self.clock.advance_us(us);
    }
}

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.sleep((ns as u64).div_ceil(1000)).await;
    }

    async fn delay_us(&mut self, us: u32) {
        self.sleep(us as u64).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.sleep(ms as u64 * 1000).await;
    }
}

// ============================================================================
// Scripted Button
// ============================================================================

/// Button whose contact is closed during the given `[start, end)` windows (ms)
///
/// Wired like the board: closed contact pulls the line low.
pub struct ScriptedButton {
    clock: SimClock,
    closed: Vec<(u64, u64)>,
    active_low: bool,
}

impl ScriptedButton {
    pub fn new(clock: &SimClock, closed: &[(u64, u64)]) -> Self {
        Self {
            clock: clock.clone(),
            closed: closed.to_vec(),
            active_low: true,
        }
    }

    /// Closed contact drives the line high instead
    pub fn active_high(mut self) -> Self {
        self.active_low = false;
        self
    }

    fn contact_closed(&self) -> bool {
        let now = self.clock.now_ms();
        self.closed.iter().any(|&(start, end)| now >= start && now < end)
    }

    fn line_high(&self) -> bool {
        self.contact_closed() != self.active_low
    }
}

impl ErrorType for ScriptedButton {
    type Error = Infallible;
}

impl InputPin for ScriptedButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.line_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.line_high())
    }
}

// ============================================================================
// Recording Output
// ============================================================================

/// Output pin that records every level written to it
#[derive(Clone, Default)]
pub struct RecordingPin {
    writes: Rc<RefCell<Vec<bool>>>,
}

impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<bool> {
        self.writes.borrow().clone()
    }

    pub fn level(&self) -> Option<bool> {
        self.writes.borrow().last().copied()
    }

    /// Number of writes that changed the level
    pub fn transitions(&self) -> usize {
        self.writes.borrow().windows(2).filter(|w| w[0] != w[1]).count()
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.writes.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.writes.borrow_mut().push(true);
        Ok(())
    }
}

// ============================================================================
// Faulty Pin
// ============================================================================

#[derive(Debug)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// Pin whose every access fails
pub struct BrokenPin;

impl ErrorType for BrokenPin {
    type Error = PinFault;
}

impl InputPin for BrokenPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(PinFault)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(PinFault)
    }
}

impl OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(PinFault)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(PinFault)
    }
}

/// Output that rejects exactly one write (1-based), recording the rest
#[derive(Clone)]
pub struct GlitchyPin {
    fail_on: usize,
    attempts: Rc<Cell<usize>>,
    landed: RecordingPin,
}

impl GlitchyPin {
    pub fn failing_write(fail_on: usize) -> Self {
        Self {
            fail_on,
            attempts: Rc::new(Cell::new(0)),
            landed: RecordingPin::new(),
        }
    }

    /// Levels that actually reached the pin
    pub fn writes(&self) -> Vec<bool> {
        self.landed.writes()
    }

    fn write(&mut self, high: bool) -> Result<(), PinFault> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt == self.fail_on {
            return Err(PinFault);
        }
        let landed = if high { self.landed.set_high() } else { self.landed.set_low() };
        landed.map_err(|never| match never {})
    }
}

impl ErrorType for GlitchyPin {
    type Error = PinFault;
}

impl OutputPin for GlitchyPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

// ============================================================================
// Edge Source
// ============================================================================

/// Edge waiter that reports a falling edge on every call
#[derive(Clone, Default)]
pub struct InstantEdges {
    waits: Rc<Cell<usize>>,
}

impl InstantEdges {
    /// Falling edges handed out so far
    pub fn waits(&self) -> usize {
        self.waits.get()
    }
}

impl ErrorType for InstantEdges {
    type Error = Infallible;
}

impl Wait for InstantEdges {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.waits.set(self.waits.get() + 1);
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ============================================================================
// Recording PWM
// ============================================================================

/// PWM channel that records staged and latched duty values
#[derive(Clone, Default)]
pub struct RecordingPwm {
    staged: Rc<Cell<Option<u16>>>,
    latched: Rc<RefCell<Vec<u16>>>,
    stage_calls: Rc<Cell<usize>>,
}

impl RecordingPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latched(&self) -> Vec<u16> {
        self.latched.borrow().clone()
    }

    pub fn stage_calls(&self) -> usize {
        self.stage_calls.get()
    }
}

impl DutyChannel for RecordingPwm {
    fn set_duty(&mut self, duty: u16) {
        self.stage_calls.set(self.stage_calls.get() + 1);
        self.staged.set(Some(duty));
    }

    fn update_duty(&mut self) {
        if let Some(duty) = self.staged.take() {
            self.latched.borrow_mut().push(duty);
        }
    }
}
