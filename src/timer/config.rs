//! Timer configuration records
//!
//! [`TimerConfig`] is the typed request passed to `init`. [`RawTimerConfig`]
//! carries the same request as plain integers and validates it on
//! conversion.

use core::fmt;

use super::handler::TimerEventHandler;
use crate::error::HalError;
use crate::hal::gpio::EdgeOutput;
use crate::types::{InterruptUsage, Prescaler, TimerIndex, WaveformMode};

/// Where a PWM waveform appears
#[derive(Clone, Copy)]
pub enum PwmOutput {
    /// The timer's own OCn pin, driven by the compare unit
    Native,
    /// Any output, driven high when PWM starts and toggled from the
    /// compare-match interrupt
    Emulated(&'static dyn EdgeOutput),
}

impl PwmOutput {
    /// True for compare-match emulation
    #[must_use]
    pub const fn is_emulated(&self) -> bool {
        matches!(self, Self::Emulated(_))
    }
}

impl fmt::Debug for PwmOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("Native"),
            Self::Emulated(_) => f.write_str("Emulated"),
        }
    }
}

/// Validated configuration for one timer slot
#[derive(Clone, Copy)]
pub struct TimerConfig {
    /// Timer to claim
    pub index: TimerIndex,
    /// Interrupt-driven or polled
    pub usage: InterruptUsage,
    /// Waveform generation mode
    pub mode: WaveformMode,
    /// Clock prescaler
    pub prescaler: Prescaler,
    /// Called when the armed event count is reached
    pub handler: &'static dyn TimerEventHandler,
    /// PWM output strategy, only consulted in PWM modes
    pub pwm_output: PwmOutput,
}

impl TimerConfig {
    /// Interrupt-driven overflow timer at clk/8
    #[must_use]
    pub const fn new(index: TimerIndex, handler: &'static dyn TimerEventHandler) -> Self {
        Self {
            index,
            usage: InterruptUsage::Interrupt,
            mode: WaveformMode::Overflow,
            prescaler: Prescaler::Div8,
            handler,
            pwm_output: PwmOutput::Native,
        }
    }

    /// Set the interrupt usage
    #[must_use]
    pub const fn usage(mut self, usage: InterruptUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Set the waveform mode
    #[must_use]
    pub const fn mode(mut self, mode: WaveformMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the prescaler
    #[must_use]
    pub const fn prescaler(mut self, prescaler: Prescaler) -> Self {
        self.prescaler = prescaler;
        self
    }

    /// Set the PWM output strategy
    #[must_use]
    pub const fn pwm_output(mut self, output: PwmOutput) -> Self {
        self.pwm_output = output;
        self
    }
}

impl fmt::Debug for TimerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerConfig")
            .field("index", &self.index)
            .field("usage", &self.usage)
            .field("mode", &self.mode)
            .field("prescaler", &self.prescaler)
            .field("pwm_output", &self.pwm_output)
            .finish_non_exhaustive()
    }
}

/// Configuration expressed as raw integers
#[derive(Clone, Copy)]
pub struct RawTimerConfig {
    /// Timer number, 0..=2
    pub index: u8,
    /// 0 = interrupt, 1 = polling
    pub usage: u8,
    /// 0 = overflow, 1 = CTC, 2 = fast PWM, 3 = phase-correct PWM
    pub mode: u8,
    /// Clock divisor: 1, 8, 64, 256 or 1024
    pub prescaler: u16,
    /// Event handler, required
    pub handler: Option<&'static dyn TimerEventHandler>,
}

impl TryFrom<RawTimerConfig> for TimerConfig {
    type Error = HalError;

    fn try_from(raw: RawTimerConfig) -> Result<Self, Self::Error> {
        let index = TimerIndex::from_raw(raw.index).ok_or(HalError::UnsupportedConfiguration)?;
        let usage = InterruptUsage::from_raw(raw.usage).ok_or(HalError::UnsupportedConfiguration)?;
        let mode = WaveformMode::from_raw(raw.mode).ok_or(HalError::UnsupportedConfiguration)?;
        let handler = raw.handler.ok_or(HalError::UnsupportedConfiguration)?;
        let prescaler =
            Prescaler::from_divisor(raw.prescaler).ok_or(HalError::UnsupportedConfiguration)?;

        Ok(Self::new(index, handler)
            .usage(usage)
            .mode(mode)
            .prescaler(prescaler))
    }
}
