//! Hardware Abstraction Layer
//!
//! Isolates the ATmega32A register file behind [`registers::RegisterFile`]
//! so the timer core can run against real memory-mapped I/O on the target
//! and against an in-memory register file on the host.

pub mod gpio;
pub mod registers;

#[cfg(feature = "embedded")]
pub mod mmio;

#[cfg(feature = "std")]
pub mod sim;
