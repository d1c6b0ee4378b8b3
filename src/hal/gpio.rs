//! GPIO Abstractions
//!
//! Port-level pin control for the ATmega32A plus a [`GpioPin`] handle that
//! plugs into `embedded-hal` and into the emulated PWM engine.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, PinState, StatefulOutputPin};

use super::registers::{addr, RegisterFile};
use crate::config::PINS_PER_PORT;
use crate::error::{HalError, HalResult};

/// An output that emulated PWM flips on every compare match
pub trait EdgeOutput: Sync {
    /// Invert the output level
    fn toggle(&self) -> HalResult<()>;

    /// Drive the output to `level`
    fn drive(&self, level: PinState) -> HalResult<()>;
}

/// GPIO port
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    /// Port A
    A,
    /// Port B
    B,
    /// Port C
    C,
    /// Port D
    D,
}

impl Port {
    /// Input pins register
    #[must_use]
    pub const fn pin_register(self) -> u8 {
        match self {
            Self::A => addr::PINA,
            Self::B => addr::PINB,
            Self::C => addr::PINC,
            Self::D => addr::PIND,
        }
    }

    /// Data direction register
    #[must_use]
    pub const fn ddr_register(self) -> u8 {
        match self {
            Self::A => addr::DDRA,
            Self::B => addr::DDRB,
            Self::C => addr::DDRC,
            Self::D => addr::DDRD,
        }
    }

    /// Output data register
    #[must_use]
    pub const fn port_register(self) -> u8 {
        match self {
            Self::A => addr::PORTA,
            Self::B => addr::PORTB,
            Self::C => addr::PORTC,
            Self::D => addr::PORTD,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Port {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::A => defmt::write!(f, "PA"),
            Self::B => defmt::write!(f, "PB"),
            Self::C => defmt::write!(f, "PC"),
            Self::D => defmt::write!(f, "PD"),
        }
    }
}

/// Pin direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// High-impedance input (reset state)
    #[default]
    Input,
    /// Push-pull output
    Output,
}

/// Operation applied to a pin or a whole port
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinOperation {
    /// Drive high
    Set,
    /// Drive low
    Clear,
    /// Invert
    Toggle,
}

const fn pin_mask(pin: u8) -> HalResult<u8> {
    if pin < PINS_PER_PORT {
        Ok(1 << pin)
    } else {
        Err(HalError::InvalidArguments)
    }
}

/// GPIO driver over a register file
#[derive(Clone, Copy, Debug)]
pub struct Gpio<R> {
    regs: R,
}

impl<R: RegisterFile> Gpio<R> {
    /// Wrap a register file
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Configure a pin as input or output
    pub fn set_pin_direction(&self, port: Port, pin: u8, direction: Direction) -> HalResult<()> {
        let mask = pin_mask(pin)?;
        match direction {
            Direction::Input => self.regs.clear_bits(port.ddr_register(), mask),
            Direction::Output => self.regs.set_bits(port.ddr_register(), mask),
        }
        Ok(())
    }

    /// Current direction of a pin
    pub fn pin_direction(&self, port: Port, pin: u8) -> HalResult<Direction> {
        let mask = pin_mask(pin)?;
        Ok(if self.regs.read(port.ddr_register()) & mask == 0 {
            Direction::Input
        } else {
            Direction::Output
        })
    }

    /// Set, clear or toggle one output pin
    pub fn manipulate_pin(&self, port: Port, pin: u8, op: PinOperation) -> HalResult<()> {
        let mask = pin_mask(pin)?;
        self.apply(port, mask, op);
        Ok(())
    }

    /// Set, clear or toggle all eight pins of a port
    pub fn manipulate_port(&self, port: Port, op: PinOperation) {
        self.apply(port, 0xFF, op);
    }

    /// Level sampled on an input pin
    pub fn read_pin(&self, port: Port, pin: u8) -> HalResult<PinState> {
        let mask = pin_mask(pin)?;
        Ok(PinState::from(self.regs.read(port.pin_register()) & mask != 0))
    }

    /// Level last written to an output pin
    pub fn output_level(&self, port: Port, pin: u8) -> HalResult<PinState> {
        let mask = pin_mask(pin)?;
        Ok(PinState::from(self.regs.read(port.port_register()) & mask != 0))
    }

    fn apply(&self, port: Port, mask: u8, op: PinOperation) {
        let reg = port.port_register();
        match op {
            PinOperation::Set => self.regs.set_bits(reg, mask),
            PinOperation::Clear => self.regs.clear_bits(reg, mask),
            PinOperation::Toggle => self.regs.modify(reg, |v| v ^ mask),
        }
    }
}

impl<R: RegisterFile + Clone> Gpio<R> {
    /// Handle to a single pin
    pub fn pin(&self, port: Port, pin: u8) -> HalResult<GpioPin<R>> {
        pin_mask(pin)?;
        Ok(GpioPin {
            gpio: self.clone(),
            port,
            pin,
        })
    }
}

/// A single GPIO pin
#[derive(Clone, Copy, Debug)]
pub struct GpioPin<R> {
    gpio: Gpio<R>,
    port: Port,
    pin: u8,
}

impl<R: RegisterFile> GpioPin<R> {
    /// Port the pin belongs to
    #[must_use]
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Bit index inside the port
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.pin
    }

    /// Make the pin an output
    pub fn into_output(self) -> HalResult<Self> {
        self.gpio.set_pin_direction(self.port, self.pin, Direction::Output)?;
        Ok(self)
    }

    /// Level last written to the pin
    pub fn level(&self) -> HalResult<PinState> {
        self.gpio.output_level(self.port, self.pin)
    }
}

impl<R> ErrorType for GpioPin<R> {
    type Error = Infallible;
}

// The pin index was validated when the handle was built, so the
// HalResults below can only be Ok.
impl<R: RegisterFile> OutputPin for GpioPin<R> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let _ = self.gpio.manipulate_pin(self.port, self.pin, PinOperation::Clear);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let _ = self.gpio.manipulate_pin(self.port, self.pin, PinOperation::Set);
        Ok(())
    }
}

impl<R: RegisterFile> StatefulOutputPin for GpioPin<R> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(matches!(self.level(), Ok(PinState::High)))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(matches!(self.level(), Ok(PinState::Low)))
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        let _ = self.gpio.manipulate_pin(self.port, self.pin, PinOperation::Toggle);
        Ok(())
    }
}

impl<R: RegisterFile + Sync> EdgeOutput for GpioPin<R> {
    fn toggle(&self) -> HalResult<()> {
        self.gpio.manipulate_pin(self.port, self.pin, PinOperation::Toggle)
    }

    fn drive(&self, level: PinState) -> HalResult<()> {
        let operation = match level {
            PinState::High => PinOperation::Set,
            PinState::Low => PinOperation::Clear,
        };
        self.gpio.manipulate_pin(self.port, self.pin, operation)
    }
}
