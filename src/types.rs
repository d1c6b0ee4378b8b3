//! Shared types used across the timer HAL
//!
//! These enums are the validated forms of the raw integers a caller may
//! pass in. Every `from_raw` returns `None` for the historical `*_INVALID`
//! sentinel and anything above it.

use core::fmt;

use crate::error::HalError;

/// Hardware timer identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerIndex {
    /// Timer/Counter0, 8-bit
    Timer0,
    /// Timer/Counter1, 16-bit
    Timer1,
    /// Timer/Counter2, 8-bit
    Timer2,
}

impl TimerIndex {
    /// All timers in slot order
    pub const ALL: [Self; 3] = [Self::Timer0, Self::Timer1, Self::Timer2];

    /// Validate a raw timer index
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Timer0),
            1 => Some(Self::Timer1),
            2 => Some(Self::Timer2),
            _ => None,
        }
    }

    /// Slot position in the timer database
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self as usize
    }

    /// Counter width of this timer
    #[must_use]
    pub const fn width(self) -> CounterWidth {
        match self {
            Self::Timer0 | Self::Timer2 => CounterWidth::Bits8,
            Self::Timer1 => CounterWidth::Bits16,
        }
    }
}

impl TryFrom<u8> for TimerIndex {
    type Error = HalError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or(HalError::InvalidArguments)
    }
}

impl fmt::Display for TimerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TIMER{}", *self as u8)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerIndex {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TIMER{}", *self as u8);
    }
}

/// Width of a timer's counter register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterWidth {
    /// 8-bit counter (0-255)
    Bits8,
    /// 16-bit counter (0-65535)
    Bits16,
}

impl CounterWidth {
    /// Number of counts from zero until the counter wraps
    #[must_use]
    pub const fn range(self) -> u32 {
        match self {
            Self::Bits8 => 256,
            Self::Bits16 => 65_536,
        }
    }

    /// Highest value the counter holds before wrapping
    #[must_use]
    pub const fn max(self) -> u32 {
        self.range() - 1
    }
}

/// How a timer's events reach the dispatcher
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InterruptUsage {
    /// Hardware interrupt vector calls the dispatcher
    #[default]
    Interrupt,
    /// The main loop polls the interrupt flag
    Polling,
}

impl InterruptUsage {
    /// Validate a raw interrupt-usage value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Interrupt),
            1 => Some(Self::Polling),
            _ => None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptUsage {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Interrupt => defmt::write!(f, "IRQ"),
            Self::Polling => defmt::write!(f, "POLL"),
        }
    }
}

/// Waveform generation mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WaveformMode {
    /// Normal mode, counter counts up and wraps
    #[default]
    Overflow,
    /// Clear timer on compare match (CTC)
    CompareMatch,
    /// Fast PWM
    Pwm,
    /// Phase-correct PWM
    PhaseCorrectPwm,
}

impl WaveformMode {
    /// Validate a raw mode value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Overflow),
            1 => Some(Self::CompareMatch),
            2 => Some(Self::Pwm),
            3 => Some(Self::PhaseCorrectPwm),
            _ => None,
        }
    }

    /// Delay sessions need a counting mode
    #[must_use]
    pub const fn supports_delay(self) -> bool {
        matches!(self, Self::Overflow | Self::CompareMatch)
    }

    /// PWM sessions need one of the PWM modes
    #[must_use]
    pub const fn supports_pwm(self) -> bool {
        matches!(self, Self::Pwm | Self::PhaseCorrectPwm)
    }
}

impl fmt::Display for WaveformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overflow => "OVF",
            Self::CompareMatch => "CTC",
            Self::Pwm => "PWM",
            Self::PhaseCorrectPwm => "PC-PWM",
        })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WaveformMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Overflow => defmt::write!(f, "OVF"),
            Self::CompareMatch => defmt::write!(f, "CTC"),
            Self::Pwm => defmt::write!(f, "PWM"),
            Self::PhaseCorrectPwm => defmt::write!(f, "PC-PWM"),
        }
    }
}

/// Clock prescaler dividing the system clock into timer ticks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Prescaler {
    /// clk/1
    Div1,
    /// clk/8
    #[default]
    Div8,
    /// clk/64
    Div64,
    /// clk/256
    Div256,
    /// clk/1024
    Div1024,
}

impl Prescaler {
    /// All prescalers in clock-select order
    pub const ALL: [Self; 5] = [
        Self::Div1,
        Self::Div8,
        Self::Div64,
        Self::Div256,
        Self::Div1024,
    ];

    /// Validate a raw divisor
    #[must_use]
    pub const fn from_divisor(divisor: u16) -> Option<Self> {
        match divisor {
            1 => Some(Self::Div1),
            8 => Some(Self::Div8),
            64 => Some(Self::Div64),
            256 => Some(Self::Div256),
            1024 => Some(Self::Div1024),
            _ => None,
        }
    }

    /// Clock divisor
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div8 => 8,
            Self::Div64 => 64,
            Self::Div256 => 256,
            Self::Div1024 => 1024,
        }
    }

    /// Position in [`Prescaler::ALL`]
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Prescaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clk/{}", self.divisor())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Prescaler {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "clk/{}", self.divisor());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sentinels_rejected() {
        assert_eq!(TimerIndex::from_raw(3), None);
        assert_eq!(InterruptUsage::from_raw(2), None);
        assert_eq!(WaveformMode::from_raw(4), None);
        assert_eq!(Prescaler::from_divisor(1025), None);
        assert_eq!(Prescaler::from_divisor(32), None);
    }

    #[test]
    fn timer_widths() {
        assert_eq!(TimerIndex::Timer0.width().range(), 256);
        assert_eq!(TimerIndex::Timer1.width().range(), 65_536);
        assert_eq!(TimerIndex::Timer2.width().max(), 255);
    }

    #[test]
    fn prescaler_divisors_round_trip() {
        for p in Prescaler::ALL {
            assert_eq!(Prescaler::from_divisor(p.divisor() as u16), Some(p));
        }
    }

    #[test]
    fn mode_capabilities_are_disjoint() {
        for raw in 0..4 {
            let mode = WaveformMode::from_raw(raw).unwrap();
            assert_ne!(mode.supports_delay(), mode.supports_pwm());
        }
    }
}
