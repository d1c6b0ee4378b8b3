//! Timer subsystem
//!
//! Owns the timer database, the shared dispatch counters, and the register
//! file they program.
//!
//! ```text
//! foreground                      interrupt / poll
//! ----------                      ----------------
//! init / deinit                   on_overflow
//! enable / disable   -> database  on_compare_match  -> handler
//! delay / generate_pwm -> DispatchState <-          (toggle pin for
//!                                                    emulated PWM)
//! ```

use core::cell::Cell;

use critical_section::Mutex;

pub mod config;
pub mod database;
pub mod delay;
pub mod dispatch;
pub mod handler;
pub mod lifecycle;
pub mod pwm;

pub use config::{PwmOutput, RawTimerConfig, TimerConfig};
pub use database::{ClaimedSlot, Slot, TimerDatabase};
pub use delay::DelayPlan;
pub use dispatch::{DispatchState, PwmPhase, TimerEvent};
pub use handler::{EventRecorder, FnHandler, PinToggleHandler, TimerEventHandler};
pub use pwm::PwmPlan;

use crate::config::{SYSTEM_CLOCK_HZ, TIMER_COUNT};
use crate::hal::registers::RegisterFile;
use crate::types::TimerIndex;

/// The three ATmega32A timers and their sessions
pub struct TimerSubsystem<R> {
    regs: R,
    clock_hz: u32,
    database: TimerDatabase,
    shared: [Mutex<Cell<DispatchState>>; TIMER_COUNT],
}

impl<R: RegisterFile> TimerSubsystem<R> {
    /// Subsystem clocked at `clock_hz`, every slot unclaimed
    pub fn new(regs: R, clock_hz: u32) -> Self {
        Self {
            regs,
            clock_hz,
            database: TimerDatabase::new(),
            shared: [
                Mutex::new(Cell::new(DispatchState::IDLE)),
                Mutex::new(Cell::new(DispatchState::IDLE)),
                Mutex::new(Cell::new(DispatchState::IDLE)),
            ],
        }
    }

    /// Subsystem clocked at the build-time system clock
    pub fn with_system_clock(regs: R) -> Self {
        Self::new(regs, SYSTEM_CLOCK_HZ)
    }

    /// Register file the subsystem programs
    pub const fn registers(&self) -> &R {
        &self.regs
    }

    /// System clock in Hz
    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Database slot of a timer
    pub const fn slot(&self, index: TimerIndex) -> &Slot {
        self.database.get(index)
    }

    /// True while the timer's clock source is connected
    pub fn is_enabled(&self, index: TimerIndex) -> bool {
        self.database.claimed(index).is_some_and(|slot| slot.enabled)
    }

    /// Snapshot of a timer's shared dispatch counters
    pub fn dispatch_state(&self, index: TimerIndex) -> DispatchState {
        critical_section::with(|cs| self.shared[index.as_usize()].borrow(cs).get())
    }

    fn arm(&self, index: TimerIndex, state: DispatchState) {
        critical_section::with(|cs| self.shared[index.as_usize()].borrow(cs).set(state));
    }
}

impl<R> core::fmt::Debug for TimerSubsystem<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimerSubsystem")
            .field("clock_hz", &self.clock_hz)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}
