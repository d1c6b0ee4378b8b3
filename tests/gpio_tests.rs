//! GPIO Tests
//!
//! Tests for pin direction, pin/port manipulation and the embedded-hal
//! pin handle.
//! Run with: cargo test --features std --test gpio_tests

use avr_timer_hal::hal::registers::addr;
use avr_timer_hal::prelude::*;
use embedded_hal::digital::PinState;

// =============================================================================
// Direction
// =============================================================================

#[test]
fn direction_round_trip() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);

    assert_eq!(gpio.pin_direction(Port::B, 3), Ok(Direction::Input));
    gpio.set_pin_direction(Port::B, 3, Direction::Output).unwrap();
    assert_eq!(gpio.pin_direction(Port::B, 3), Ok(Direction::Output));
    assert_eq!(regs.read(addr::DDRB), 0x08);

    gpio.set_pin_direction(Port::B, 3, Direction::Input).unwrap();
    assert_eq!(regs.read(addr::DDRB), 0x00);
}

#[test]
fn pin_index_above_seven_is_invalid() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);

    assert_eq!(
        gpio.set_pin_direction(Port::A, 8, Direction::Output),
        Err(HalError::InvalidArguments)
    );
    assert_eq!(gpio.pin_direction(Port::C, 8), Err(HalError::InvalidArguments));
    assert_eq!(
        gpio.manipulate_pin(Port::D, 200, PinOperation::Set),
        Err(HalError::InvalidArguments)
    );
    assert_eq!(gpio.read_pin(Port::A, 8), Err(HalError::InvalidArguments));
    assert_eq!(regs.snapshot(), [0; 0x60]);
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn set_clear_toggle_pin() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);

    gpio.manipulate_pin(Port::D, 5, PinOperation::Set).unwrap();
    assert_eq!(regs.read(addr::PORTD), 0x20);
    gpio.manipulate_pin(Port::D, 0, PinOperation::Toggle).unwrap();
    assert_eq!(regs.read(addr::PORTD), 0x21);
    gpio.manipulate_pin(Port::D, 5, PinOperation::Clear).unwrap();
    assert_eq!(regs.read(addr::PORTD), 0x01);
}

#[test]
fn manipulate_whole_port() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);

    gpio.manipulate_port(Port::A, PinOperation::Set);
    assert_eq!(regs.read(addr::PORTA), 0xFF);
    gpio.manipulate_pin(Port::A, 0, PinOperation::Clear).unwrap();
    gpio.manipulate_port(Port::A, PinOperation::Toggle);
    assert_eq!(regs.read(addr::PORTA), 0x01);
    gpio.manipulate_port(Port::A, PinOperation::Clear);
    assert_eq!(regs.read(addr::PORTA), 0x00);
}

#[test]
fn read_pin_samples_input_register() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);

    regs.drive_input(addr::PINC, 0b1000_0100);
    assert_eq!(gpio.read_pin(Port::C, 2), Ok(PinState::High));
    assert_eq!(gpio.read_pin(Port::C, 3), Ok(PinState::Low));
    assert_eq!(gpio.read_pin(Port::C, 7), Ok(PinState::High));
}

// =============================================================================
// Pin handle
// =============================================================================

#[test]
fn pin_handle_implements_output_pin() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);
    let mut led = gpio.pin(Port::A, 3).unwrap().into_output().unwrap();

    assert_eq!(regs.read(addr::DDRA), 0x08);
    led.set_high().unwrap();
    assert!(led.is_set_high().unwrap());
    led.set_low().unwrap();
    assert!(led.is_set_low().unwrap());
    StatefulOutputPin::toggle(&mut led).unwrap();
    assert_eq!(regs.read(addr::PORTA), 0x08);
}

#[test]
fn pin_handle_as_edge_output() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);
    let pin = gpio.pin(Port::C, 2).unwrap();

    EdgeOutput::toggle(&pin).unwrap();
    assert_eq!(pin.level(), Ok(PinState::High));
    EdgeOutput::toggle(&pin).unwrap();
    assert_eq!(pin.level(), Ok(PinState::Low));
    assert_eq!((pin.port(), pin.index()), (Port::C, 2));
}

#[test]
fn edge_output_drives_absolute_level() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);
    let pin = gpio.pin(Port::C, 2).unwrap();

    pin.drive(PinState::High).unwrap();
    pin.drive(PinState::High).unwrap();
    assert_eq!(regs.read(addr::PORTC), 0x04);
    pin.drive(PinState::Low).unwrap();
    assert_eq!(regs.read(addr::PORTC), 0x00);
}

#[test]
fn pin_handles_share_the_port_register() {
    let regs = SimulatedRegisters::new();
    let gpio = Gpio::new(&regs);
    let mut a = gpio.pin(Port::B, 0).unwrap();
    let mut b = gpio.pin(Port::B, 7).unwrap();

    a.set_high().unwrap();
    b.set_high().unwrap();
    assert_eq!(regs.read(addr::PORTB), 0x81);
    a.set_low().unwrap();
    assert_eq!(regs.read(addr::PORTB), 0x80);
}
