//! Memory-mapped register access on the ATmega32A
//!
//! The only place the crate touches raw pointers.

#![allow(unsafe_code)]

use super::registers::RegisterFile;

/// Handle to the on-chip I/O register space
#[derive(Clone, Copy, Debug)]
pub struct Atmega32Registers {
    _private: (),
}

impl Atmega32Registers {
    /// Create a handle to the I/O space
    ///
    /// # Safety
    ///
    /// Every handle aliases the same hardware. Callers must make sure
    /// read-modify-write sequences on a register are not interleaved with an
    /// interrupt handler touching that register, e.g. by holding a critical
    /// section.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterFile for Atmega32Registers {
    #[inline]
    fn read(&self, addr: u8) -> u8 {
        // SAFETY: addresses come from the register map and lie inside the
        // 0x20..=0x5F I/O window, which is always mapped
        unsafe { core::ptr::read_volatile(usize::from(addr) as *const u8) }
    }

    #[inline]
    fn write(&self, addr: u8, value: u8) {
        // SAFETY: see `read`
        unsafe { core::ptr::write_volatile(usize::from(addr) as *mut u8, value) }
    }
}
