//! Slot lifecycle: init, deinit, enable, disable
//!
//! Every precondition is checked before the first register write, so a
//! rejected call leaves both hardware and database untouched.

use super::config::TimerConfig;
use super::database::{ClaimedSlot, Slot};
use super::dispatch::{DispatchState, TimerEvent};
use super::TimerSubsystem;
use crate::config::DISABLE_TIMER_MASK;
use crate::error::{HalError, HalResult};
use crate::hal::registers::{addr, RegisterFile, TimerRegisters, SREG_I};
use crate::types::{InterruptUsage, TimerIndex};

impl<R: RegisterFile> TimerSubsystem<R> {
    /// Claim a timer slot and program its waveform mode
    ///
    /// Emulated PWM requires a PWM mode. In interrupt usage the matching
    /// interrupt source and the global interrupt flag are enabled; native
    /// PWM needs no interrupt and enables none.
    pub fn init(&mut self, config: &TimerConfig) -> HalResult<()> {
        if config.pwm_output.is_emulated() && !config.mode.supports_pwm() {
            warn!("{}: emulated PWM output needs a PWM mode", config.index);
            return Err(HalError::UnsupportedConfiguration);
        }
        if self.database.get(config.index).is_claimed() {
            warn!("{}: already initialized", config.index);
            return Err(HalError::AlreadyInitialized);
        }

        let slot = ClaimedSlot::from_config(config);
        let map = TimerRegisters::of(config.index);
        let hardware_mode = slot.hardware_mode();
        for write in map.waveform_bits(hardware_mode) {
            write.apply(&self.regs);
        }
        if hardware_mode.supports_pwm() {
            if let Some(top) = map.pwm_top {
                self.regs.write_u16(top, map.width().max() as u16);
            }
        }

        if config.usage == InterruptUsage::Interrupt {
            let interrupt = if slot.is_emulated_pwm() || !hardware_mode.supports_pwm() {
                Some(TimerEvent::for_mode(hardware_mode).interrupt_bit(map))
            } else {
                None
            };
            if let Some(bit) = interrupt {
                self.regs.set_bits(addr::TIMSK, bit);
                self.regs.set_bits(addr::SREG, SREG_I);
            }
        }

        self.arm(config.index, DispatchState::IDLE);
        *self.database.get_mut(config.index) = Slot::Claimed(slot);
        debug!(
            "{}: init mode={} prescaler={}",
            config.index, config.mode, config.prescaler
        );
        Ok(())
    }

    /// Claim a slot from a raw integer configuration
    pub fn init_raw(&mut self, raw: super::RawTimerConfig) -> HalResult<()> {
        let config = TimerConfig::try_from(raw)?;
        self.init(&config)
    }

    /// Release a slot
    ///
    /// Waveform bits, interrupt enables and the clock source stay as they
    /// are; the next `init` reprograms the waveform.
    pub fn deinit(&mut self, index: TimerIndex) -> HalResult<()> {
        let slot = self.database.get_mut(index);
        if !slot.is_claimed() {
            warn!("{}: deinit of unclaimed slot", index);
            return Err(HalError::NotInitialized);
        }
        *slot = Slot::Unclaimed;
        debug!("{}: deinit", index);
        Ok(())
    }

    /// Release a slot addressed by a raw index
    pub fn deinit_raw(&mut self, raw_index: u8) -> HalResult<()> {
        self.deinit(TimerIndex::try_from(raw_index)?)
    }

    /// Connect the clock source selected by the slot's prescaler
    ///
    /// The clock-select field is replaced as a whole, so bits left behind
    /// by a released slot never combine with the new prescaler.
    pub fn enable(&mut self, index: TimerIndex) -> HalResult<()> {
        let slot = self
            .database
            .claimed_mut(index)
            .ok_or(HalError::NotInitialized)?;
        if slot.enabled {
            return Err(HalError::AlreadyEnabled);
        }
        let map = TimerRegisters::of(index);
        self.regs.write_field(
            map.clock_control,
            !DISABLE_TIMER_MASK,
            map.clock_select(slot.prescaler),
        );
        slot.enabled = true;
        debug!("{}: enabled at {}", index, slot.prescaler);
        Ok(())
    }

    /// Disconnect the clock source, keeping the waveform bits
    ///
    /// Armed counters are left as they are.
    pub fn disable(&mut self, index: TimerIndex) -> HalResult<()> {
        let slot = self
            .database
            .claimed_mut(index)
            .ok_or(HalError::NotInitialized)?;
        if !slot.enabled {
            return Err(HalError::AlreadyDisabled);
        }
        let map = TimerRegisters::of(index);
        self.regs
            .modify(map.clock_control, |v| v & DISABLE_TIMER_MASK);
        slot.enabled = false;
        debug!("{}: disabled", index);
        Ok(())
    }
}
