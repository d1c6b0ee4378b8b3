//! Timer database
//!
//! One slot per hardware timer. A slot is either unclaimed or holds a
//! complete configuration; there is no in-between state.

use core::fmt;

use super::config::{PwmOutput, TimerConfig};
use super::handler::TimerEventHandler;
use crate::config::TIMER_COUNT;
use crate::types::{InterruptUsage, Prescaler, TimerIndex, WaveformMode};

/// Configuration and run state of a claimed timer
#[derive(Clone, Copy)]
pub struct ClaimedSlot {
    /// Timer identity
    pub index: TimerIndex,
    /// Interrupt-driven or polled
    pub usage: InterruptUsage,
    /// Waveform mode requested at init
    pub mode: WaveformMode,
    /// Clock prescaler
    pub prescaler: Prescaler,
    /// Clock source currently connected
    pub enabled: bool,
    /// Event handler
    pub handler: &'static dyn TimerEventHandler,
    /// PWM output strategy
    pub pwm_output: PwmOutput,
}

impl ClaimedSlot {
    /// Slot state right after a successful init
    #[must_use]
    pub const fn from_config(config: &TimerConfig) -> Self {
        Self {
            index: config.index,
            usage: config.usage,
            mode: config.mode,
            prescaler: config.prescaler,
            enabled: false,
            handler: config.handler,
            pwm_output: config.pwm_output,
        }
    }

    /// PWM produced by toggling a pin from the compare interrupt
    #[must_use]
    pub const fn is_emulated_pwm(&self) -> bool {
        self.mode.supports_pwm() && self.pwm_output.is_emulated()
    }

    /// Hardware waveform actually programmed
    ///
    /// Emulated PWM runs the counter in CTC so the compare register sets
    /// the edge spacing.
    #[must_use]
    pub const fn hardware_mode(&self) -> WaveformMode {
        if self.is_emulated_pwm() {
            WaveformMode::CompareMatch
        } else {
            self.mode
        }
    }
}

impl fmt::Debug for ClaimedSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimedSlot")
            .field("index", &self.index)
            .field("usage", &self.usage)
            .field("mode", &self.mode)
            .field("prescaler", &self.prescaler)
            .field("enabled", &self.enabled)
            .field("pwm_output", &self.pwm_output)
            .finish_non_exhaustive()
    }
}

/// State of one database entry
#[derive(Clone, Copy, Debug, Default)]
pub enum Slot {
    /// Free for `init`
    #[default]
    Unclaimed,
    /// Owned by a configuration
    Claimed(ClaimedSlot),
}

impl Slot {
    /// True when a configuration owns the slot
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed(_))
    }

    /// The claimed configuration, if any
    #[must_use]
    pub const fn claimed(&self) -> Option<&ClaimedSlot> {
        match self {
            Self::Claimed(slot) => Some(slot),
            Self::Unclaimed => None,
        }
    }
}

/// Per-timer slots
#[derive(Debug)]
pub struct TimerDatabase {
    slots: [Slot; TIMER_COUNT],
}

impl TimerDatabase {
    /// Every slot unclaimed
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [Slot::Unclaimed; TIMER_COUNT],
        }
    }

    /// Slot of a timer
    #[must_use]
    pub const fn get(&self, index: TimerIndex) -> &Slot {
        &self.slots[index.as_usize()]
    }

    /// Mutable slot of a timer
    pub fn get_mut(&mut self, index: TimerIndex) -> &mut Slot {
        &mut self.slots[index.as_usize()]
    }

    /// Claimed configuration of a timer, if any
    #[must_use]
    pub const fn claimed(&self, index: TimerIndex) -> Option<&ClaimedSlot> {
        self.get(index).claimed()
    }

    /// Mutable claimed configuration of a timer, if any
    pub fn claimed_mut(&mut self, index: TimerIndex) -> Option<&mut ClaimedSlot> {
        match self.get_mut(index) {
            Slot::Claimed(slot) => Some(slot),
            Slot::Unclaimed => None,
        }
    }

    /// Iterate over claimed slots
    pub fn iter_claimed(&self) -> impl Iterator<Item = &ClaimedSlot> {
        self.slots.iter().filter_map(Slot::claimed)
    }
}

impl Default for TimerDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;

    impl TimerEventHandler for Nop {
        fn on_timer_event(&self, _timer: TimerIndex) {}
    }

    static NOP: Nop = Nop;

    #[test]
    fn fresh_database_is_unclaimed() {
        let db = TimerDatabase::new();
        for index in TimerIndex::ALL {
            assert!(!db.get(index).is_claimed());
        }
        assert_eq!(db.iter_claimed().count(), 0);
    }

    #[test]
    fn plain_pwm_keeps_its_hardware_mode() {
        let config = TimerConfig::new(TimerIndex::Timer0, &NOP).mode(WaveformMode::Pwm);
        let slot = ClaimedSlot::from_config(&config);
        assert!(!slot.is_emulated_pwm());
        assert_eq!(slot.hardware_mode(), WaveformMode::Pwm);
    }
}
