//! ATmega32A Timer HAL
//!
//! Interrupt-driven timer subsystem for the ATmega32A: a per-timer
//! configuration database, a delay engine that turns milliseconds into a
//! reload value plus an event count, and PWM generation either through the
//! timer's own compare unit or by toggling a pin from the compare interrupt.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  firmware binary  │  TimerEventHandler impls                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     TIMER SUBSYSTEM                          │
//! │  Lifecycle  │  Delay Engine  │  PWM Engine  │  Dispatch      │
//! │                 Timer Database (3 slots)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                          HAL                                 │
//! │  RegisterFile  │  TimerRegisters map  │  GPIO                │
//! ├─────────────────────────────────────────────────────────────┤
//! │        MMIO (target)          │     Simulated (host)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Owned context**: the library has no globals; the firmware decides
//!   where the [`timer::TimerSubsystem`] lives
//! - **Type-driven design**: a timer slot is either unclaimed or fully
//!   configured, never half of each
//! - **No unsafe outside MMIO**: register pointers live in `hal::mmio`
//! - **Explicit error handling**: every operation returns a
//!   [`error::HalResult`]; interrupt context never fails

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

/// System configuration and constants
pub mod config;

/// Error taxonomy and legacy status codes
pub mod error;

/// Hardware Abstraction Layer
///
/// Register file access for the target and for host tests.
pub mod hal;

/// Timer Subsystem
///
/// Lifecycle, delay, PWM and interrupt dispatch.
pub mod timer;

/// Shared types used across modules
pub mod types;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::error::{status_code, HalError, HalResult};
    pub use crate::types::*;

    pub use crate::hal::gpio::{Direction, EdgeOutput, Gpio, GpioPin, PinOperation, Port};
    pub use crate::hal::registers::RegisterFile;
    pub use crate::timer::{
        EventRecorder, FnHandler, PinToggleHandler, PwmOutput, RawTimerConfig, TimerConfig,
        TimerEventHandler, TimerSubsystem,
    };

    #[cfg(feature = "embedded")]
    pub use crate::hal::mmio::Atmega32Registers;
    #[cfg(feature = "std")]
    pub use crate::hal::sim::SimulatedRegisters;

    // Common traits
    pub use embedded_hal::digital::{OutputPin, PinState, StatefulOutputPin};
}
