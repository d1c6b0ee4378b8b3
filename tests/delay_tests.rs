//! Delay Engine Tests
//!
//! Tests for reload/repeat programming and delay preconditions.
//! Run with: cargo test --features std --test delay_tests

use avr_timer_hal::hal::registers::addr;
use avr_timer_hal::prelude::*;
use avr_timer_hal::timer::DelayPlan;

fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

fn subsystem(
    clock_hz: u32,
) -> (TimerSubsystem<&'static SimulatedRegisters>, &'static SimulatedRegisters) {
    let regs = leak(SimulatedRegisters::new());
    (TimerSubsystem::new(regs, clock_hz), regs)
}

fn handler() -> &'static EventRecorder<EVENT_LOG_CAPACITY> {
    leak(EventRecorder::new())
}

// =============================================================================
// Regression: 5 ms at clk/8, 16 MHz, 8-bit
// =============================================================================

#[test]
fn five_ms_overflow_mode_programs_counter() {
    let (mut timers, regs) = subsystem(16_000_000);
    timers
        .init(&TimerConfig::new(TimerIndex::Timer0, handler()).prescaler(Prescaler::Div8))
        .unwrap();
    timers.delay(TimerIndex::Timer0, 5).unwrap();

    // tick 500 ns, window 128 us, 5000 = 39 * 128 + 8
    let state = timers.dispatch_state(TimerIndex::Timer0);
    assert_eq!(state.needed_interrupts(), 40);
    assert_eq!(state.interrupt_counter(), 0);
    assert_eq!(regs.read(addr::TCNT0), 239);
    assert_eq!(regs.read(addr::OCR0), 0);

    // Armed, then started at clk/8
    assert!(timers.is_enabled(TimerIndex::Timer0));
    assert_eq!(regs.read(addr::TCCR0) & 0x07, 0x02);
}

#[test]
fn plan_matches_register_programming() {
    let plan =
        DelayPlan::compute(16_000_000, Prescaler::Div8, TimerIndex::Timer2.width(), 5).unwrap();
    assert_eq!(plan.tick_ns, 500);
    assert_eq!(plan.overflow_window_us, 128);
    assert_eq!(plan.repeat, 40);
    assert_eq!(plan.reload, 239);
}

#[test]
fn compare_mode_programs_compare_register() {
    let (mut timers, regs) = subsystem(16_000_000);
    timers
        .init(
            &TimerConfig::new(TimerIndex::Timer2, handler())
                .mode(WaveformMode::CompareMatch)
                .prescaler(Prescaler::Div8),
        )
        .unwrap();
    timers.delay(TimerIndex::Timer2, 5).unwrap();

    assert_eq!(regs.read(addr::OCR2), 239);
    assert_eq!(regs.read(addr::TCNT2), 0);
    assert_eq!(timers.dispatch_state(TimerIndex::Timer2).needed_interrupts(), 40);
}

#[test]
fn sixteen_bit_reload_written_high_byte_first() {
    let (mut timers, regs) = subsystem(16_000_000);
    timers
        .init(&TimerConfig::new(TimerIndex::Timer1, handler()).prescaler(Prescaler::Div1024))
        .unwrap();
    timers.delay(TimerIndex::Timer1, 500).unwrap();

    // window 4194304 us covers 500 ms in one pass
    assert_eq!(timers.dispatch_state(TimerIndex::Timer1).needed_interrupts(), 1);
    assert_eq!(regs.read_u16(addr::TCNT1L), 65_535 - 7_812);
    assert_eq!(regs.write_count(addr::TCNT1L + 1), 1);
    assert_eq!(regs.read(addr::TCCR1B) & 0x07, 0x05);
}

#[test]
fn clock_rate_changes_the_plan() {
    let (mut timers, regs) = subsystem(8_000_000);
    timers
        .init(&TimerConfig::new(TimerIndex::Timer0, handler()).prescaler(Prescaler::Div8))
        .unwrap();
    timers.delay(TimerIndex::Timer0, 5).unwrap();

    // tick 1000 ns, window 256 us, 5000 = 19 * 256 + 136
    assert_eq!(timers.dispatch_state(TimerIndex::Timer0).needed_interrupts(), 20);
    assert_eq!(regs.read(addr::TCNT0), 255 - 136);
}

#[test]
fn exact_window_multiple_uses_full_period() {
    let (mut timers, regs) = subsystem(16_000_000);
    timers
        .init(&TimerConfig::new(TimerIndex::Timer0, handler()).prescaler(Prescaler::Div64))
        .unwrap();
    timers.delay(TimerIndex::Timer0, 1024).unwrap();

    assert_eq!(timers.dispatch_state(TimerIndex::Timer0).needed_interrupts(), 1000);
    assert_eq!(regs.read(addr::TCNT0), 255);
}

// =============================================================================
// Preconditions
// =============================================================================

#[test]
fn zero_delay_is_invalid() {
    let (mut timers, _) = subsystem(16_000_000);
    assert_eq!(timers.delay(TimerIndex::Timer0, 0), Err(HalError::InvalidArguments));

    timers
        .init(&TimerConfig::new(TimerIndex::Timer0, handler()))
        .unwrap();
    assert_eq!(timers.delay(TimerIndex::Timer0, 0), Err(HalError::InvalidArguments));
    assert!(!timers.is_enabled(TimerIndex::Timer0));
}

#[test]
fn delay_requires_init() {
    let (mut timers, regs) = subsystem(16_000_000);
    assert_eq!(timers.delay(TimerIndex::Timer1, 10), Err(HalError::NotInitialized));
    assert_eq!(regs.snapshot(), [0; 0x60]);
}

#[test]
fn delay_refuses_running_timer() {
    let (mut timers, regs) = subsystem(16_000_000);
    timers
        .init(&TimerConfig::new(TimerIndex::Timer0, handler()))
        .unwrap();
    timers.delay(TimerIndex::Timer0, 5).unwrap();
    let counter_writes = regs.write_count(addr::TCNT0);

    assert_eq!(timers.delay(TimerIndex::Timer0, 100), Err(HalError::UnsupportedFeature));
    assert_eq!(regs.write_count(addr::TCNT0), counter_writes);
    assert_eq!(timers.dispatch_state(TimerIndex::Timer0).needed_interrupts(), 40);
}

#[test]
fn delay_rejected_in_pwm_modes() {
    for mode in [WaveformMode::Pwm, WaveformMode::PhaseCorrectPwm] {
        let (mut timers, regs) = subsystem(16_000_000);
        timers
            .init(&TimerConfig::new(TimerIndex::Timer2, handler()).mode(mode))
            .unwrap();
        assert_eq!(timers.delay(TimerIndex::Timer2, 5), Err(HalError::UnsupportedFeature));
        assert!(!timers.is_enabled(TimerIndex::Timer2));
        assert_eq!(regs.write_count(addr::TCNT2), 0);
    }
}

#[test]
fn delay_can_be_rearmed_after_disable() {
    let (mut timers, regs) = subsystem(16_000_000);
    timers
        .init(&TimerConfig::new(TimerIndex::Timer0, handler()))
        .unwrap();
    timers.delay(TimerIndex::Timer0, 5).unwrap();
    timers.disable(TimerIndex::Timer0).unwrap();

    timers.delay(TimerIndex::Timer0, 1).unwrap();
    // 1000 = 7 * 128 + 104
    assert_eq!(timers.dispatch_state(TimerIndex::Timer0).needed_interrupts(), 8);
    assert_eq!(regs.read(addr::TCNT0), 255 - 208);
}
