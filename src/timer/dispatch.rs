//! Interrupt dispatch
//!
//! Entry points for the timer interrupt vectors and for the main-loop poll.
//! The only state shared with foreground code is [`DispatchState`], which is
//! read and written inside a critical section.

use super::TimerSubsystem;
use crate::hal::registers::{addr, RegisterFile, TimerRegisters};
use crate::types::{InterruptUsage, TimerIndex, WaveformMode};

/// Hardware event that reached the dispatcher
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// Counter wrapped (TOVn)
    Overflow,
    /// Counter matched the compare register (OCFn)
    CompareMatch,
}

impl TimerEvent {
    /// Event a hardware waveform mode produces for the dispatcher
    #[must_use]
    pub const fn for_mode(mode: WaveformMode) -> Self {
        match mode {
            WaveformMode::CompareMatch => Self::CompareMatch,
            WaveformMode::Overflow | WaveformMode::Pwm | WaveformMode::PhaseCorrectPwm => {
                Self::Overflow
            }
        }
    }

    /// TIMSK bit enabling this event's interrupt
    #[must_use]
    pub const fn interrupt_bit(self, map: &TimerRegisters) -> u8 {
        match self {
            Self::Overflow => map.overflow_interrupt,
            Self::CompareMatch => map.compare_interrupt,
        }
    }

    /// TIFR bit raised by this event
    #[must_use]
    pub const fn flag_bit(self, map: &TimerRegisters) -> u8 {
        match self {
            Self::Overflow => map.overflow_flag,
            Self::CompareMatch => map.compare_flag,
        }
    }
}

/// Half of an emulated PWM period
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PwmPhase {
    /// Output high, compare register holds the on time
    #[default]
    On,
    /// Output low, compare register holds the off time
    Off,
}

impl PwmPhase {
    /// The other half
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// Counters shared between foreground arming and interrupt dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DispatchState {
    needed_interrupts: u32,
    interrupt_counter: u32,
    on_ticks: u16,
    off_ticks: u16,
    phase: PwmPhase,
}

impl DispatchState {
    /// Nothing armed
    pub const IDLE: Self = Self {
        needed_interrupts: 0,
        interrupt_counter: 0,
        on_ticks: 0,
        off_ticks: 0,
        phase: PwmPhase::On,
    };

    /// Armed for a delay of `repeat` events
    #[must_use]
    pub const fn delay(repeat: u32) -> Self {
        Self {
            needed_interrupts: repeat,
            ..Self::IDLE
        }
    }

    /// Armed for PWM with the given thresholds, starting in the on phase
    #[must_use]
    pub const fn pwm(on_ticks: u16, off_ticks: u16) -> Self {
        Self {
            on_ticks,
            off_ticks,
            ..Self::IDLE
        }
    }

    /// Events required before the handler fires, zero when idle
    #[must_use]
    pub const fn needed_interrupts(&self) -> u32 {
        self.needed_interrupts
    }

    /// Events seen since the last fire
    #[must_use]
    pub const fn interrupt_counter(&self) -> u32 {
        self.interrupt_counter
    }

    /// Compare threshold for the on phase
    #[must_use]
    pub const fn on_ticks(&self) -> u16 {
        self.on_ticks
    }

    /// Compare threshold for the off phase
    #[must_use]
    pub const fn off_ticks(&self) -> u16 {
        self.off_ticks
    }

    /// Current emulated PWM phase
    #[must_use]
    pub const fn phase(&self) -> PwmPhase {
        self.phase
    }

    /// True when a delay is armed
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.needed_interrupts != 0
    }

    /// Count one event; true when the target was reached
    fn count_event(&mut self) -> bool {
        if self.needed_interrupts == 0 {
            return false;
        }
        self.interrupt_counter = self.interrupt_counter.wrapping_add(1);
        if self.interrupt_counter >= self.needed_interrupts {
            self.interrupt_counter = 0;
            true
        } else {
            false
        }
    }

    /// Move to the next PWM phase and return its compare threshold
    fn next_edge(&mut self) -> u16 {
        self.phase = self.phase.flip();
        match self.phase {
            PwmPhase::On => self.on_ticks,
            PwmPhase::Off => self.off_ticks,
        }
    }
}

impl<R: RegisterFile> TimerSubsystem<R> {
    /// TIMERn_OVF vector body
    pub fn on_overflow(&self, index: TimerIndex) {
        self.dispatch(index, TimerEvent::Overflow);
    }

    /// TIMERn_COMP (TIMER1_COMPA) vector body
    pub fn on_compare_match(&self, index: TimerIndex) {
        self.dispatch(index, TimerEvent::CompareMatch);
    }

    /// Service polling-mode timers from the main loop
    ///
    /// Checks each enabled polling slot's TIFR flag, clears it, and runs the
    /// same dispatch as the interrupt path. Returns the number of flags
    /// serviced.
    pub fn poll(&self) -> usize {
        let mut serviced = 0;
        for slot in self.database.iter_claimed() {
            if slot.usage != InterruptUsage::Polling || !slot.enabled {
                continue;
            }
            let map = TimerRegisters::of(slot.index);
            let event = TimerEvent::for_mode(slot.hardware_mode());
            let flag = event.flag_bit(map);
            if self.regs.read(addr::TIFR) & flag != 0 {
                // Write-one-to-clear; writing only `flag` leaves the others
                self.regs.write(addr::TIFR, flag);
                self.dispatch(slot.index, event);
                serviced += 1;
            }
        }
        serviced
    }

    fn dispatch(&self, index: TimerIndex, event: TimerEvent) {
        let slot = self.database.claimed(index);
        let emulated = slot.and_then(|s| match s.pwm_output {
            super::PwmOutput::Emulated(pin) if s.is_emulated_pwm() => Some(pin),
            _ => None,
        });

        if let Some(slot) = slot {
            if TimerEvent::for_mode(slot.hardware_mode()) != event {
                return;
            }
        }

        let map = TimerRegisters::of(index);
        let fired = critical_section::with(|cs| {
            let cell = self.shared[index.as_usize()].borrow(cs);
            let mut state = cell.get();
            let fired = if let Some(pin) = emulated {
                // Errors cannot leave interrupt context
                let _ = pin.toggle();
                let threshold = state.next_edge();
                map.write_compare(&self.regs, threshold);
                false
            } else {
                state.count_event()
            };
            cell.set(state);
            fired
        });

        if fired {
            if let Some(slot) = slot {
                slot.handler.on_timer_event(index);
            }
        }
    }
}
