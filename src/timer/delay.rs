//! Delay engine
//!
//! Turns a duration into a reload value and a number of timer events. All
//! arithmetic is integer: the overflow window is kept as an exact rational
//! so the final partial period is computed without floating point.

use super::dispatch::DispatchState;
use super::TimerSubsystem;
use crate::config::MIN_DELAY_MS;
use crate::error::{HalError, HalResult};
use crate::hal::registers::{RegisterFile, TimerRegisters};
use crate::types::{CounterWidth, Prescaler, TimerIndex, WaveformMode};

const fn delay_in_range(ms: u32) -> bool {
    ms > MIN_DELAY_MS
}

/// Reload value and event count for one delay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayPlan {
    /// Length of one timer tick in nanoseconds
    pub tick_ns: u64,
    /// Time from zero to overflow, in microseconds
    pub overflow_window_us: u64,
    /// Timer events needed before the handler fires
    pub repeat: u32,
    /// Value preloaded into the counter (overflow) or compare (CTC) register
    pub reload: u16,
}

impl DelayPlan {
    /// Plan a delay of `ms` milliseconds
    ///
    /// ```text
    /// tick_ns  = prescaler * 10^6 / (clock_hz / 10^3)
    /// window   = tick_ns * range / 10^3
    /// ms*10^3  = whole * window + rem
    /// repeat   = whole + (rem > 0)
    /// reload   = range - 1 - rem * range / window
    /// ```
    pub fn compute(
        clock_hz: u32,
        prescaler: Prescaler,
        width: CounterWidth,
        ms: u32,
    ) -> HalResult<Self> {
        if !delay_in_range(ms) {
            return Err(HalError::InvalidArguments);
        }
        let clock_khz = u64::from(clock_hz / 1_000);
        if clock_khz == 0 {
            return Err(HalError::InvalidArguments);
        }
        let range = u64::from(width.range());

        let tick_ns = u64::from(prescaler.divisor()) * 1_000_000 / clock_khz;
        let window = tick_ns * range / 1_000;
        if window == 0 {
            return Err(HalError::InvalidArguments);
        }

        let requested = u64::from(ms) * 1_000;
        let whole = requested / window;
        let rem = requested % window;
        let repeat = whole + u64::from(rem > 0);
        let repeat = u32::try_from(repeat).map_err(|_| HalError::InvalidArguments)?;

        let partial_ticks = rem * range / window;
        let reload = range - 1 - partial_ticks;
        let reload = u16::try_from(reload).map_err(|_| HalError::OutOfBoundary)?;

        Ok(Self {
            tick_ns,
            overflow_window_us: window,
            repeat,
            reload,
        })
    }
}

impl<R: RegisterFile> TimerSubsystem<R> {
    /// Fire the slot's handler every `ms` milliseconds
    ///
    /// The slot must be claimed in overflow or CTC mode and stopped. The
    /// counters are armed before the clock is connected.
    pub fn delay(&mut self, index: TimerIndex, ms: u32) -> HalResult<()> {
        if !delay_in_range(ms) {
            warn!("{}: zero-length delay", index);
            return Err(HalError::InvalidArguments);
        }
        let slot = self
            .database
            .claimed(index)
            .ok_or(HalError::NotInitialized)?;
        if slot.enabled {
            warn!("{}: delay requested while running", index);
            return Err(HalError::UnsupportedFeature);
        }
        if !slot.mode.supports_delay() {
            warn!("{}: {} mode has no delay", index, slot.mode);
            return Err(HalError::UnsupportedFeature);
        }

        let mode = slot.mode;
        let plan = DelayPlan::compute(self.clock_hz, slot.prescaler, index.width(), ms)?;
        trace!(
            "{}: delay {} ms -> repeat={} reload={}",
            index,
            ms,
            plan.repeat,
            plan.reload
        );

        let map = TimerRegisters::of(index);
        match mode {
            WaveformMode::CompareMatch => map.write_compare(&self.regs, plan.reload),
            _ => map.write_counter(&self.regs, plan.reload),
        }
        self.arm(index, DispatchState::delay(plan.repeat));
        self.enable(index)
    }
}
