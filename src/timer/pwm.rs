//! PWM engine
//!
//! Native PWM loads the compare register once and lets the compare unit
//! drive the OC pin. Emulated PWM runs the counter in CTC and flips an
//! arbitrary output from the compare interrupt.

use embedded_hal::digital::PinState;

use super::config::PwmOutput;
use super::dispatch::DispatchState;
use super::TimerSubsystem;
use crate::config::{MAX_DUTY_PERCENT, MIN_DUTY_PERCENT};
use crate::error::{HalError, HalResult};
use crate::hal::registers::{RegisterFile, TimerRegisters};
use crate::types::{CounterWidth, TimerIndex};

/// Both bounds are exclusive
const fn duty_in_range(duty_percent: u8) -> bool {
    duty_percent > MIN_DUTY_PERCENT && duty_percent < MAX_DUTY_PERCENT
}

/// Compare thresholds for one duty cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PwmPlan {
    /// Ticks spent high
    pub on_ticks: u16,
    /// Ticks spent low
    pub off_ticks: u16,
}

impl PwmPlan {
    /// Split the counter range for `duty_percent`, rounding the on time down
    pub fn compute(width: CounterWidth, duty_percent: u8) -> HalResult<Self> {
        if !duty_in_range(duty_percent) {
            return Err(HalError::InvalidArguments);
        }
        let max = width.max();
        let on = u32::from(duty_percent) * max / 100;
        let off = max - on;
        Ok(Self {
            on_ticks: u16::try_from(on).map_err(|_| HalError::OutOfBoundary)?,
            off_ticks: u16::try_from(off).map_err(|_| HalError::OutOfBoundary)?,
        })
    }

    /// Total ticks in one period
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.on_ticks as u32 + self.off_ticks as u32
    }
}

impl<R: RegisterFile> TimerSubsystem<R> {
    /// Start PWM at `duty_percent` on a stopped PWM-mode slot
    ///
    /// An emulated output is driven high before the clock starts, so the
    /// first compare match ends the on phase.
    pub fn generate_pwm(&mut self, index: TimerIndex, duty_percent: u8) -> HalResult<()> {
        if !duty_in_range(duty_percent) {
            warn!("{}: duty {}% out of range", index, duty_percent);
            return Err(HalError::InvalidArguments);
        }
        let slot = self
            .database
            .claimed(index)
            .ok_or(HalError::NotInitialized)?;
        if slot.enabled {
            warn!("{}: PWM requested while running", index);
            return Err(HalError::UnsupportedFeature);
        }
        if !slot.mode.supports_pwm() {
            warn!("{}: {} mode has no PWM", index, slot.mode);
            return Err(HalError::UnsupportedFeature);
        }

        let emulated = match slot.pwm_output {
            PwmOutput::Emulated(pin) if slot.is_emulated_pwm() => Some(pin),
            _ => None,
        };
        let plan = PwmPlan::compute(index.width(), duty_percent)?;
        trace!(
            "{}: duty {}% -> on={} off={}",
            index,
            duty_percent,
            plan.on_ticks,
            plan.off_ticks
        );

        if let Some(pin) = emulated {
            pin.drive(PinState::High)?;
        }
        let map = TimerRegisters::of(index);
        map.write_compare(&self.regs, plan.on_ticks);
        if emulated.is_none() {
            map.compare_output.apply(&self.regs);
        }
        self.arm(index, DispatchState::pwm(plan.on_ticks, plan.off_ticks));
        self.enable(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_duty_on_eight_bits() {
        let plan = PwmPlan::compute(CounterWidth::Bits8, 50).unwrap();
        assert_eq!(plan.on_ticks, 127);
        assert_eq!(plan.off_ticks, 128);
        assert_eq!(plan.period(), 255);
    }

    #[test]
    fn thresholds_always_sum_to_max() {
        for width in [CounterWidth::Bits8, CounterWidth::Bits16] {
            for duty in 1..100 {
                let plan = PwmPlan::compute(width, duty).unwrap();
                assert_eq!(plan.period(), width.max());
            }
        }
    }

    #[test]
    fn boundary_duties_rejected() {
        for duty in [0, 100, 255] {
            assert_eq!(
                PwmPlan::compute(CounterWidth::Bits8, duty),
                Err(HalError::InvalidArguments)
            );
        }
    }

    #[test]
    fn quarter_duty_on_sixteen_bits() {
        let plan = PwmPlan::compute(CounterWidth::Bits16, 25).unwrap();
        assert_eq!(plan.on_ticks, 16_383);
        assert_eq!(plan.off_ticks, 49_152);
    }
}
