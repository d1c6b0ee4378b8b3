//! ATmega32A Timer Demo
//!
//! Blinks the status LED from a Timer0 delay and drives a software PWM
//! output from Timer2 compare-match interrupts. Timer1 drives OC1A with
//! hardware PWM.

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use core::cell::RefCell;

use critical_section::Mutex;
use panic_halt as _;

use avr_timer_hal::config::{demo, pins};
use avr_timer_hal::prelude::*;

type Timers = TimerSubsystem<Atmega32Registers>;

/// The subsystem, shared with the interrupt vectors
static TIMERS: Mutex<RefCell<Option<Timers>>> = Mutex::new(RefCell::new(None));

/// A pin addressed through the memory-mapped GPIO registers
struct BoardPin {
    port: Port,
    pin: u8,
}

impl EdgeOutput for BoardPin {
    fn toggle(&self) -> HalResult<()> {
        gpio().manipulate_pin(self.port, self.pin, PinOperation::Toggle)
    }

    fn drive(&self, level: PinState) -> HalResult<()> {
        let operation = match level {
            PinState::High => PinOperation::Set,
            PinState::Low => PinOperation::Clear,
        };
        gpio().manipulate_pin(self.port, self.pin, operation)
    }
}

static STATUS_LED: PinToggleHandler<BoardPin> = PinToggleHandler::new(BoardPin {
    port: pins::STATUS_LED.0,
    pin: pins::STATUS_LED.1,
});

static PWM_PIN: BoardPin = BoardPin {
    port: pins::EMULATED_PWM.0,
    pin: pins::EMULATED_PWM.1,
};

// PWM sessions never fire their handler
static PWM_EVENTS: FnHandler = FnHandler(|_| {});

fn gpio() -> Gpio<Atmega32Registers> {
    // SAFETY: the vectors only touch PORTx bits of pins `main` configured
    // before any timer was started
    Gpio::new(unsafe { Atmega32Registers::new() })
}

/// Claim every timer slot
///
/// No clock runs yet, so the I bit `init` sets cannot let a vector in.
fn claim(timers: &mut Timers) -> HalResult<()> {
    let gpio = gpio();
    for (port, pin) in [pins::STATUS_LED, pins::EMULATED_PWM, pins::OC1A] {
        gpio.set_pin_direction(port, pin, Direction::Output)?;
    }

    timers.init(
        &TimerConfig::new(TimerIndex::Timer0, &STATUS_LED)
            .mode(WaveformMode::Overflow)
            .prescaler(Prescaler::Div1024),
    )?;
    timers.init(
        &TimerConfig::new(TimerIndex::Timer2, &PWM_EVENTS)
            .mode(WaveformMode::Pwm)
            .prescaler(Prescaler::Div64)
            .pwm_output(PwmOutput::Emulated(&PWM_PIN)),
    )?;
    timers.init(
        &TimerConfig::new(TimerIndex::Timer1, &PWM_EVENTS)
            .mode(WaveformMode::Pwm)
            .prescaler(Prescaler::Div1),
    )
}

/// Start the clocks
fn start(timers: &mut Timers) -> HalResult<()> {
    timers.delay(TimerIndex::Timer0, demo::BLINK_DELAY_MS)?;
    timers.generate_pwm(TimerIndex::Timer2, demo::EMULATED_PWM_DUTY)?;
    timers.generate_pwm(TimerIndex::Timer1, demo::NATIVE_PWM_DUTY)
}

fn halt() -> ! {
    // Solid LED: configuration rejected
    let _ = gpio().manipulate_pin(pins::STATUS_LED.0, pins::STATUS_LED.1, PinOperation::Set);
    loop {
        avr_device::asm::nop();
    }
}

#[avr_device::entry]
fn main() -> ! {
    // SAFETY: nothing else owns the register file yet
    let regs = unsafe { Atmega32Registers::new() };

    let mut timers = Timers::with_system_clock(regs);
    if claim(&mut timers).is_err() {
        halt();
    }

    // Flags raised from here on stay pending until TIMERS is installed
    avr_device::interrupt::disable();
    if start(&mut timers).is_err() {
        halt();
    }
    critical_section::with(|cs| {
        TIMERS.borrow_ref_mut(cs).replace(timers);
    });
    // SAFETY: the shared state is in place
    unsafe { avr_device::interrupt::enable() };

    loop {
        critical_section::with(|cs| {
            if let Some(timers) = TIMERS.borrow_ref(cs).as_ref() {
                timers.poll();
            }
        });
    }
}

fn dispatch(f: impl FnOnce(&Timers)) {
    critical_section::with(|cs| {
        if let Some(timers) = TIMERS.borrow_ref(cs).as_ref() {
            f(timers);
        }
    });
}

#[avr_device::interrupt(atmega32a)]
fn TIMER0_OVF() {
    dispatch(|t| t.on_overflow(TimerIndex::Timer0));
}

#[avr_device::interrupt(atmega32a)]
fn TIMER0_COMP() {
    dispatch(|t| t.on_compare_match(TimerIndex::Timer0));
}

#[avr_device::interrupt(atmega32a)]
fn TIMER1_OVF() {
    dispatch(|t| t.on_overflow(TimerIndex::Timer1));
}

#[avr_device::interrupt(atmega32a)]
fn TIMER1_COMPA() {
    dispatch(|t| t.on_compare_match(TimerIndex::Timer1));
}

#[avr_device::interrupt(atmega32a)]
fn TIMER2_OVF() {
    dispatch(|t| t.on_overflow(TimerIndex::Timer2));
}

#[avr_device::interrupt(atmega32a)]
fn TIMER2_COMP() {
    dispatch(|t| t.on_compare_match(TimerIndex::Timer2));
}
