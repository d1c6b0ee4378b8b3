//! Host-side register file
//!
//! An in-memory copy of the ATmega32A I/O space used by tests and host
//! builds. TIFR keeps its write-one-to-clear behavior so polling paths see
//! the same semantics as on silicon.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use super::registers::{addr, RegisterFile};

const IO_SPACE: usize = 0x60;

/// Simulated I/O register space
pub struct SimulatedRegisters {
    cells: [AtomicU8; IO_SPACE],
    writes: [AtomicU32; IO_SPACE],
}

impl SimulatedRegisters {
    /// All registers zero, as after reset
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: core::array::from_fn(|_| AtomicU8::new(0)),
            writes: core::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    /// Raise interrupt flags in TIFR as the hardware would
    pub fn raise_flags(&self, mask: u8) {
        self.cells[usize::from(addr::TIFR)].fetch_or(mask, Ordering::SeqCst);
    }

    /// Drive the input pins of a port
    pub fn drive_input(&self, pin_register: u8, value: u8) {
        self.cells[usize::from(pin_register)].store(value, Ordering::SeqCst);
    }

    /// Number of writes a register has received
    #[must_use]
    pub fn write_count(&self, address: u8) -> u32 {
        self.writes[usize::from(address)].load(Ordering::SeqCst)
    }

    /// Snapshot of the whole register space
    #[must_use]
    pub fn snapshot(&self) -> [u8; IO_SPACE] {
        core::array::from_fn(|i| self.cells[i].load(Ordering::SeqCst))
    }
}

impl Default for SimulatedRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SimulatedRegisters {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulatedRegisters")
            .field("tifr", &self.read(addr::TIFR))
            .field("timsk", &self.read(addr::TIMSK))
            .field("sreg", &self.read(addr::SREG))
            .finish_non_exhaustive()
    }
}

impl RegisterFile for SimulatedRegisters {
    fn read(&self, address: u8) -> u8 {
        self.cells[usize::from(address)].load(Ordering::SeqCst)
    }

    fn write(&self, address: u8, value: u8) {
        let index = usize::from(address);
        self.writes[index].fetch_add(1, Ordering::SeqCst);
        if address == addr::TIFR {
            // Writing a one clears the flag
            self.cells[index].fetch_and(!value, Ordering::SeqCst);
        } else {
            self.cells[index].store(value, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tifr_is_write_one_to_clear() {
        let regs = SimulatedRegisters::new();
        regs.raise_flags(0b0100_0001);
        regs.write(addr::TIFR, 0b0000_0001);
        assert_eq!(regs.read(addr::TIFR), 0b0100_0000);
    }

    #[test]
    fn wide_write_is_high_byte_first() {
        let regs = SimulatedRegisters::new();
        regs.write_u16(addr::OCR1AL, 0xABCD);
        assert_eq!(regs.read(addr::OCR1AL), 0xCD);
        assert_eq!(regs.read(addr::OCR1AL + 1), 0xAB);
        assert_eq!(regs.read_u16(addr::OCR1AL), 0xABCD);
    }

    #[test]
    fn writes_are_counted() {
        let regs = SimulatedRegisters::new();
        regs.set_bits(addr::TIMSK, 0x01);
        regs.clear_bits(addr::TIMSK, 0x01);
        assert_eq!(regs.write_count(addr::TIMSK), 2);
        assert_eq!(regs.write_count(addr::TIFR), 0);
    }
}
