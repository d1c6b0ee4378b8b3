//! ATmega32A register map
//!
//! Data-space addresses and bit positions from the ATmega32A datasheet,
//! plus [`TimerRegisters`], the per-timer view the timer core programs.

use crate::types::{CounterWidth, Prescaler, TimerIndex, WaveformMode};

/// Byte-wide access to the I/O register space
///
/// Addresses are data-space addresses (`0x20..=0x5F`). Methods take `&self`
/// because interrupt handlers program registers through a shared reference.
pub trait RegisterFile {
    /// Read one register
    fn read(&self, addr: u8) -> u8;

    /// Write one register
    fn write(&self, addr: u8, value: u8);

    /// Read-modify-write one register
    fn modify<F: FnOnce(u8) -> u8>(&self, addr: u8, f: F) {
        let value = self.read(addr);
        self.write(addr, f(value));
    }

    /// Set the bits in `mask`
    fn set_bits(&self, addr: u8, mask: u8) {
        self.modify(addr, |v| v | mask);
    }

    /// Clear the bits in `mask`
    fn clear_bits(&self, addr: u8, mask: u8) {
        self.modify(addr, |v| v & !mask);
    }

    /// Replace the bits selected by `mask` with `value`
    fn write_field(&self, addr: u8, mask: u8, value: u8) {
        self.modify(addr, |v| (v & !mask) | (value & mask));
    }

    /// Read a 16-bit register pair, low byte first
    fn read_u16(&self, low_addr: u8) -> u16 {
        let low = self.read(low_addr);
        let high = self.read(low_addr + 1);
        u16::from_le_bytes([low, high])
    }

    /// Write a 16-bit register pair, high byte first (latched through TEMP)
    fn write_u16(&self, low_addr: u8, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write(low_addr + 1, high);
        self.write(low_addr, low);
    }
}

impl<R: RegisterFile + ?Sized> RegisterFile for &R {
    fn read(&self, addr: u8) -> u8 {
        (**self).read(addr)
    }

    fn write(&self, addr: u8, value: u8) {
        (**self).write(addr, value);
    }
}

/// Data-space register addresses
pub mod addr {
    /// Status register (global interrupt enable lives in bit 7)
    pub const SREG: u8 = 0x5F;
    /// Timer/Counter interrupt mask register
    pub const TIMSK: u8 = 0x59;
    /// Timer/Counter interrupt flag register
    pub const TIFR: u8 = 0x58;

    /// Timer/Counter0 control register
    pub const TCCR0: u8 = 0x53;
    /// Timer/Counter0 counter
    pub const TCNT0: u8 = 0x52;
    /// Timer/Counter0 output compare register
    pub const OCR0: u8 = 0x5C;

    /// Timer/Counter1 control register A
    pub const TCCR1A: u8 = 0x4F;
    /// Timer/Counter1 control register B
    pub const TCCR1B: u8 = 0x4E;
    /// Timer/Counter1 counter, low byte
    pub const TCNT1L: u8 = 0x4C;
    /// Timer/Counter1 output compare register A, low byte
    pub const OCR1AL: u8 = 0x4A;
    /// Timer/Counter1 input capture register, low byte (PWM TOP)
    pub const ICR1L: u8 = 0x46;

    /// Timer/Counter2 control register
    pub const TCCR2: u8 = 0x45;
    /// Timer/Counter2 counter
    pub const TCNT2: u8 = 0x44;
    /// Timer/Counter2 output compare register
    pub const OCR2: u8 = 0x43;

    /// Port A input pins
    pub const PINA: u8 = 0x39;
    /// Port A data direction
    pub const DDRA: u8 = 0x3A;
    /// Port A data
    pub const PORTA: u8 = 0x3B;
    /// Port B input pins
    pub const PINB: u8 = 0x36;
    /// Port B data direction
    pub const DDRB: u8 = 0x37;
    /// Port B data
    pub const PORTB: u8 = 0x38;
    /// Port C input pins
    pub const PINC: u8 = 0x33;
    /// Port C data direction
    pub const DDRC: u8 = 0x34;
    /// Port C data
    pub const PORTC: u8 = 0x35;
    /// Port D input pins
    pub const PIND: u8 = 0x30;
    /// Port D data direction
    pub const DDRD: u8 = 0x31;
    /// Port D data
    pub const PORTD: u8 = 0x32;
}

/// Global interrupt enable bit in SREG
pub const SREG_I: u8 = 1 << 7;

/// One masked field write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldWrite {
    /// Register address
    pub register: u8,
    /// Bits owned by the field
    pub mask: u8,
    /// New value of the owned bits
    pub value: u8,
}

impl FieldWrite {
    const NONE: Self = Self {
        register: addr::TCCR0,
        mask: 0,
        value: 0,
    };

    /// Apply the write to a register file
    pub fn apply<R: RegisterFile + ?Sized>(&self, regs: &R) {
        if self.mask != 0 {
            regs.write_field(self.register, self.mask, self.value);
        }
    }
}

/// Register layout of one hardware timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerRegisters {
    /// Timer identity
    pub index: TimerIndex,
    /// Register holding the clock-select bits
    pub clock_control: u8,
    /// Counter register (low byte for 16-bit timers)
    pub counter: u8,
    /// Output compare register (low byte for 16-bit timers)
    pub compare: u8,
    /// TIMSK bit enabling the overflow interrupt
    pub overflow_interrupt: u8,
    /// TIMSK bit enabling the compare-match interrupt
    pub compare_interrupt: u8,
    /// TIFR bit raised on overflow
    pub overflow_flag: u8,
    /// TIFR bit raised on compare match
    pub compare_flag: u8,
    /// Register and bits selecting non-inverting compare output
    pub compare_output: FieldWrite,
    /// TOP register programmed to the counter maximum in PWM modes
    pub pwm_top: Option<u8>,
    clock_select: [u8; 5],
    waveform_register: u8,
    waveform_mask: u8,
    waveform_table: [u8; 4],
    waveform_ext_register: u8,
    waveform_ext_mask: u8,
    waveform_ext_table: [u8; 4],
}

// WGM bit positions inside TCCR0/TCCR2
const WGM_0: u8 = 1 << 6;
const WGM_1: u8 = 1 << 3;

// WGM bit positions for Timer1
const WGM10: u8 = 1 << 0;
const WGM11: u8 = 1 << 1;
const WGM12: u8 = 1 << 3;
const WGM13: u8 = 1 << 4;

const TIMER0: TimerRegisters = TimerRegisters {
    index: TimerIndex::Timer0,
    clock_control: addr::TCCR0,
    counter: addr::TCNT0,
    compare: addr::OCR0,
    overflow_interrupt: 1 << 0,
    compare_interrupt: 1 << 1,
    overflow_flag: 1 << 0,
    compare_flag: 1 << 1,
    compare_output: FieldWrite {
        register: addr::TCCR0,
        mask: 0b0011_0000,
        value: 0b0010_0000,
    },
    pwm_top: None,
    clock_select: [0x01, 0x02, 0x03, 0x04, 0x05],
    waveform_register: addr::TCCR0,
    waveform_mask: WGM_0 | WGM_1,
    // Overflow, CTC, fast PWM, phase-correct PWM
    waveform_table: [0, WGM_1, WGM_0 | WGM_1, WGM_0],
    waveform_ext_register: addr::TCCR0,
    waveform_ext_mask: 0,
    waveform_ext_table: [0; 4],
};

const TIMER1: TimerRegisters = TimerRegisters {
    index: TimerIndex::Timer1,
    clock_control: addr::TCCR1B,
    counter: addr::TCNT1L,
    compare: addr::OCR1AL,
    overflow_interrupt: 1 << 2,
    compare_interrupt: 1 << 4,
    overflow_flag: 1 << 2,
    compare_flag: 1 << 4,
    compare_output: FieldWrite {
        register: addr::TCCR1A,
        mask: 0b1100_0000,
        value: 0b1000_0000,
    },
    pwm_top: Some(addr::ICR1L),
    clock_select: [0x01, 0x02, 0x03, 0x04, 0x05],
    waveform_register: addr::TCCR1A,
    waveform_mask: WGM10 | WGM11,
    // Normal (0), CTC/OCR1A (4), fast PWM/ICR1 (14), phase-correct/ICR1 (10)
    waveform_table: [0, 0, WGM11, WGM11],
    waveform_ext_register: addr::TCCR1B,
    waveform_ext_mask: WGM12 | WGM13,
    waveform_ext_table: [0, WGM12, WGM12 | WGM13, WGM13],
};

const TIMER2: TimerRegisters = TimerRegisters {
    index: TimerIndex::Timer2,
    clock_control: addr::TCCR2,
    counter: addr::TCNT2,
    compare: addr::OCR2,
    overflow_interrupt: 1 << 6,
    compare_interrupt: 1 << 7,
    overflow_flag: 1 << 6,
    compare_flag: 1 << 7,
    compare_output: FieldWrite {
        register: addr::TCCR2,
        mask: 0b0011_0000,
        value: 0b0010_0000,
    },
    pwm_top: None,
    // Timer2 has the asynchronous prescaler with clk/32 and clk/128 taps
    clock_select: [0x01, 0x02, 0x04, 0x06, 0x07],
    waveform_register: addr::TCCR2,
    waveform_mask: WGM_0 | WGM_1,
    waveform_table: [0, WGM_1, WGM_0 | WGM_1, WGM_0],
    waveform_ext_register: addr::TCCR2,
    waveform_ext_mask: 0,
    waveform_ext_table: [0; 4],
};

const fn mode_slot(mode: WaveformMode) -> usize {
    match mode {
        WaveformMode::Overflow => 0,
        WaveformMode::CompareMatch => 1,
        WaveformMode::Pwm => 2,
        WaveformMode::PhaseCorrectPwm => 3,
    }
}

impl TimerRegisters {
    /// Register layout for a timer
    #[must_use]
    pub const fn of(index: TimerIndex) -> &'static Self {
        match index {
            TimerIndex::Timer0 => &TIMER0,
            TimerIndex::Timer1 => &TIMER1,
            TimerIndex::Timer2 => &TIMER2,
        }
    }

    /// Counter width
    #[must_use]
    pub const fn width(&self) -> CounterWidth {
        self.index.width()
    }

    /// Clock-select bit pattern for a prescaler
    #[must_use]
    pub const fn clock_select(&self, prescaler: Prescaler) -> u8 {
        self.clock_select[prescaler.ordinal()]
    }

    /// Field writes that program the waveform generation bits for a mode
    #[must_use]
    pub const fn waveform_bits(&self, mode: WaveformMode) -> [FieldWrite; 2] {
        let slot = mode_slot(mode);
        let primary = FieldWrite {
            register: self.waveform_register,
            mask: self.waveform_mask,
            value: self.waveform_table[slot],
        };
        let extended = if self.waveform_ext_mask == 0 {
            FieldWrite::NONE
        } else {
            FieldWrite {
                register: self.waveform_ext_register,
                mask: self.waveform_ext_mask,
                value: self.waveform_ext_table[slot],
            }
        };
        [primary, extended]
    }

    /// Write a value to the counter register
    pub fn write_counter<R: RegisterFile + ?Sized>(&self, regs: &R, value: u16) {
        self.write_wide(regs, self.counter, value);
    }

    /// Write a value to the output compare register
    pub fn write_compare<R: RegisterFile + ?Sized>(&self, regs: &R, value: u16) {
        self.write_wide(regs, self.compare, value);
    }

    /// Read the output compare register
    pub fn read_compare<R: RegisterFile + ?Sized>(&self, regs: &R) -> u16 {
        match self.width() {
            CounterWidth::Bits8 => u16::from(regs.read(self.compare)),
            CounterWidth::Bits16 => regs.read_u16(self.compare),
        }
    }

    /// Read the counter register
    pub fn read_counter<R: RegisterFile + ?Sized>(&self, regs: &R) -> u16 {
        match self.width() {
            CounterWidth::Bits8 => u16::from(regs.read(self.counter)),
            CounterWidth::Bits16 => regs.read_u16(self.counter),
        }
    }

    fn write_wide<R: RegisterFile + ?Sized>(&self, regs: &R, addr: u8, value: u16) {
        match self.width() {
            // 8-bit registers take the low byte; callers never pass more
            CounterWidth::Bits8 => regs.write(addr, value.to_le_bytes()[0]),
            CounterWidth::Bits16 => regs.write_u16(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_bit_waveform_table_matches_datasheet() {
        let t0 = TimerRegisters::of(TimerIndex::Timer0);
        let [ovf, _] = t0.waveform_bits(WaveformMode::Overflow);
        let [ctc, _] = t0.waveform_bits(WaveformMode::CompareMatch);
        let [pwm, _] = t0.waveform_bits(WaveformMode::Pwm);
        let [phase, ext] = t0.waveform_bits(WaveformMode::PhaseCorrectPwm);
        assert_eq!(ovf.value, 0);
        assert_eq!(ctc.value, 0x08);
        assert_eq!(pwm.value, 0x48);
        assert_eq!(phase.value, 0x40);
        assert_eq!(ext.mask, 0);
    }

    #[test]
    fn timer1_waveform_spans_two_registers() {
        let t1 = TimerRegisters::of(TimerIndex::Timer1);
        let [a, b] = t1.waveform_bits(WaveformMode::Pwm);
        assert_eq!((a.register, a.value), (addr::TCCR1A, 0x02));
        assert_eq!((b.register, b.value), (addr::TCCR1B, 0x18));

        let [a, b] = t1.waveform_bits(WaveformMode::CompareMatch);
        assert_eq!(a.value, 0);
        assert_eq!(b.value, 0x08);
    }

    #[test]
    fn clock_select_tables() {
        let t0 = TimerRegisters::of(TimerIndex::Timer0);
        let t2 = TimerRegisters::of(TimerIndex::Timer2);
        assert_eq!(t0.clock_select(Prescaler::Div64), 0x03);
        assert_eq!(t0.clock_select(Prescaler::Div1024), 0x05);
        assert_eq!(t2.clock_select(Prescaler::Div64), 0x04);
        assert_eq!(t2.clock_select(Prescaler::Div1024), 0x07);
    }

    #[test]
    fn clock_select_never_touches_waveform_bits() {
        for index in TimerIndex::ALL {
            let map = TimerRegisters::of(index);
            for p in Prescaler::ALL {
                assert_eq!(map.clock_select(p) & !0x07, 0);
            }
        }
    }

    #[test]
    fn interrupt_bits_are_unique() {
        let mut seen = 0u8;
        for index in TimerIndex::ALL {
            let map = TimerRegisters::of(index);
            for bit in [map.overflow_interrupt, map.compare_interrupt] {
                assert_eq!(seen & bit, 0);
                seen |= bit;
            }
        }
    }
}
