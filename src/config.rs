//! System configuration and hardware constants
//!
//! Compile-time constants for the ATmega32A timer subsystem. The system clock
//! comes from the `AVR_F_CPU` environment variable at build time and
//! defaults to 16 MHz.

use crate::hal::gpio::Port;

include!(concat!(env!("OUT_DIR"), "/clock.rs"));

/// Number of hardware timers (Timer0, Timer1, Timer2)
pub const TIMER_COUNT: usize = 3;

/// Smallest delay accepted by the delay engine, exclusive
pub const MIN_DELAY_MS: u32 = 0;

/// Duty cycle lower bound, exclusive
pub const MIN_DUTY_PERCENT: u8 = 0;

/// Duty cycle upper bound, exclusive
pub const MAX_DUTY_PERCENT: u8 = 100;

/// Mask that clears the three clock-select bits of a timer control register
pub const DISABLE_TIMER_MASK: u8 = 0xF8;

/// Number of pins per GPIO port
pub const PINS_PER_PORT: u8 = 8;

/// Capacity of the firmware's timer event log
pub const EVENT_LOG_CAPACITY: usize = 16;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments used by the demo firmware

    use super::Port;

    /// Status LED toggled by the Timer0 delay callback
    pub const STATUS_LED: (Port, u8) = (Port::A, 3);

    /// Software PWM output driven by Timer2 compare-match emulation
    pub const EMULATED_PWM: (Port, u8) = (Port::C, 2);

    /// OC1A pin driven by Timer1 native PWM
    pub const OC1A: (Port, u8) = (Port::D, 5);
}

/// Demo firmware timing
pub mod demo {
    //! Timer sessions started by the demo firmware

    /// Status LED blink half-period in milliseconds
    pub const BLINK_DELAY_MS: u32 = 500;

    /// Duty cycle of the emulated PWM output
    pub const EMULATED_PWM_DUTY: u8 = 25;

    /// Duty cycle of the Timer1 native PWM output
    pub const NATIVE_PWM_DUTY: u8 = 50;
}
