// src/tsl2591/mod.rs

//! Driver for the ams TSL2591 ambient-light sensor.
//!
//! The device integrates two photodiodes (full spectrum and infrared) over a
//! configurable time window. The driver caches gain and integration time so
//! that lux can be computed without re-reading the CONTROL register, and
//! paces [`Tsl2591::raw_data`] so a read never returns data from an
//! unfinished cycle.

pub mod lux;
pub mod registers;

pub use registers::{Gain, IntegrationTime, Persist, DEVICE_ADDRESS, DEVICE_ID};

use crate::common::{
    bits::apply_bits,
    error::SensorError,
    hal_traits::{BusError, BusErrorKind, Clock, RegisterBus},
    timing::ReadScheduler,
};
use core::time::Duration;
use registers as reg;

/// Upper bound on STATUS polls in [`Tsl2591::on`] before giving up.
pub const MAX_VALID_POLLS: u32 = 10;

/// Interrupt features enabled whenever the sensor is switched on.
///
/// The physical INT pin is driven low while either interrupt kind is asserted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptConfig {
    /// Persist-filtered ALS interrupt (AIEN).
    pub interrupt: bool,
    /// No-persist interrupt (NPIEN).
    pub np_interrupt: bool,
    /// Sleep after an interrupt until it is cleared (SAI).
    pub sleep_after: bool,
}

impl InterruptConfig {
    /// ENABLE register bits for the selected features.
    pub const fn enable_bits(self) -> u8 {
        let mut bits = 0;
        if self.interrupt {
            bits |= reg::ENABLE_AIEN;
        }
        if self.np_interrupt {
            bits |= reg::ENABLE_NPIEN;
        }
        if self.sleep_after {
            bits |= reg::ENABLE_SAI;
        }
        bits
    }
}

/// One pair of channel counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawLight {
    /// Channel 0: visible plus infrared.
    pub full_spectrum: u16,
    /// Channel 1: infrared only.
    pub infrared: u16,
    /// Either channel was above the saturation count for the integration time.
    pub saturated: bool,
}

impl RawLight {
    /// Visible-light counts: full spectrum minus infrared, floored at zero.
    pub fn visible(&self) -> u16 {
        self.full_spectrum.saturating_sub(self.infrared)
    }
}

/// Low/high count pair for the ALS or no-persist interrupt. Only channel 0 is compared.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    pub low: u16,
    pub high: u16,
}

/// Power state of the sensor as tracked by the driver.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Off,
    On,
}

/// TSL2591 handle.
#[derive(Debug)]
pub struct Tsl2591<B, C>
where
    B: RegisterBus,
    C: Clock,
{
    bus: B,
    clock: C,
    address: u8,
    interrupts: InterruptConfig,
    gain: Gain,
    integration_time: IntegrationTime,
    saturated: bool,
    power: PowerState,
    scheduler: ReadScheduler<C::Instant>,
}

impl<B, C> Tsl2591<B, C>
where
    B: RegisterBus,
    C: Clock,
{
    /// Checks the device ID, then programs 100 ms integration and low gain.
    ///
    /// The sensor is left off; call [`on`](Self::on) before reading.
    pub fn new(bus: B, clock: C, address: u8, interrupts: InterruptConfig) -> Result<Self, SensorError<B::Error>> {
        let mut sensor = Tsl2591 {
            bus,
            clock,
            address,
            interrupts,
            gain: Gain::Low,
            integration_time: IntegrationTime::Ms100,
            saturated: false,
            power: PowerState::Off,
            scheduler: ReadScheduler::new(),
        };

        let found = sensor.device_id()?;
        if found != DEVICE_ID {
            warn!("tsl2591 {:#x}: unexpected device id {:#x}", address, found);
            return Err(SensorError::DeviceMismatch { expected: DEVICE_ID, found });
        }

        sensor.set_integration_time(IntegrationTime::Ms100)?;
        sensor.set_gain(Gain::Low)?;
        let (now, wait) = (sensor.clock.now(), sensor.wait_duration());
        sensor.scheduler.restart(now, wait);
        debug!("tsl2591 {:#x}: initialised", address);
        Ok(sensor)
    }

    /// Destroys the handle and returns the bus and clock.
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }

    /// Bus address this handle talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Interrupt features applied by [`on`](Self::on).
    pub fn interrupt_config(&self) -> InterruptConfig {
        self.interrupts
    }

    /// Power state as last commanded through this handle.
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    // --- Power ---

    /// Powers the ADC on and blocks until the first integration cycle completes.
    pub fn on(&mut self) -> Result<(), SensorError<B::Error>> {
        let base = reg::ENABLE_POWER_ON | reg::ENABLE_AEN;
        // AEN must be latched before the interrupt enables are accepted
        self.write_register(reg::ENABLE, base)?;
        self.write_register(reg::ENABLE, base | self.interrupts.enable_bits())?;
        self.clear_interrupt()?;
        self.power = PowerState::On;

        let wait = self.wait_duration();
        let mut polls = 0;
        loop {
            polls += 1;
            if self.is_valid()? {
                break;
            }
            if polls >= MAX_VALID_POLLS {
                warn!("tsl2591 {:#x}: no valid cycle after {} polls", self.address, polls);
                return Err(SensorError::NotReady { polls });
            }
            self.clock.delay(wait);
        }

        let now = self.clock.now();
        self.scheduler.restart(now, wait);
        debug!("tsl2591 {:#x}: on after {} polls", self.address, polls);
        Ok(())
    }

    /// Powers the device down by writing `0xD0` to ENABLE.
    pub fn off(&mut self) -> Result<(), SensorError<B::Error>> {
        self.write_register(reg::ENABLE, reg::ENABLE_POWER_OFF)?;
        self.power = PowerState::Off;
        debug!("tsl2591 {:#x}: off", self.address);
        Ok(())
    }

    /// Off then on. Needed after changing interrupt thresholds.
    pub fn reset(&mut self) -> Result<(), SensorError<B::Error>> {
        self.off()?;
        self.on()
    }

    /// Full device reset through CONTROL.SRESET; leaves the sensor off.
    ///
    /// The device resets before acknowledging the write, so a missing ACK
    /// counts as success. The reset restores the device's power-on gain and
    /// integration time; the handle writes its own settings back afterwards so
    /// lux, saturation and pacing keep matching the device.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the reset was issued and the settings re-applied.
    /// * `Err(SensorError::Bus)` for any bus failure other than the reset NACK.
    pub fn system_reset(&mut self) -> Result<(), SensorError<B::Error>> {
        match self.write_register(reg::CONTROL, reg::CONTROL_SRESET) {
            Ok(()) => {}
            Err(SensorError::Bus(e)) if e.kind() == BusErrorKind::NoAcknowledge => {
                trace!("tsl2591 {:#x}: reset write not acknowledged", self.address);
            }
            Err(e) => return Err(e),
        }
        self.power = PowerState::Off;

        self.set_integration_time(self.integration_time)?;
        self.set_gain(self.gain)?;
        let (now, wait) = (self.clock.now(), self.wait_duration());
        self.scheduler.restart(now, wait);
        debug!("tsl2591 {:#x}: reset, settings restored", self.address);
        Ok(())
    }

    // --- Gain & integration time ---

    /// Gain used for lux, as last written through this handle.
    pub fn configured_gain(&self) -> Gain {
        self.gain
    }

    /// Integration time used for pacing and lux, as last written through this handle.
    pub fn configured_integration_time(&self) -> IntegrationTime {
        self.integration_time
    }

    /// Reads the gain bits back from the device.
    pub fn gain(&mut self) -> Result<Gain, SensorError<B::Error>> {
        Ok(Gain::from_control(self.read_register(reg::CONTROL)?))
    }

    /// Reads the integration time bits back from the device.
    pub fn integration_time(&mut self) -> Result<IntegrationTime, SensorError<B::Error>> {
        let control = self.read_register(reg::CONTROL)?;
        IntegrationTime::from_control(control)
            .ok_or(SensorError::InvalidConfiguration { value: control & reg::CONTROL_TIME_MASK })
    }

    /// Writes the gain bits of CONTROL, preserving the rest.
    pub fn set_gain(&mut self, gain: Gain) -> Result<(), SensorError<B::Error>> {
        self.update_register(reg::CONTROL, reg::CONTROL_GAIN_MASK, gain.bits())?;
        self.gain = gain;
        Ok(())
    }

    /// Like [`set_gain`](Self::set_gain) from a raw CONTROL encoding. Invalid
    /// codes are rejected without bus traffic.
    pub fn set_gain_code(&mut self, code: u8) -> Result<(), SensorError<B::Error>> {
        match Gain::try_from(code) {
            Ok(gain) => self.set_gain(gain),
            Err(_) => Err(SensorError::InvalidConfiguration { value: code }),
        }
    }

    /// Writes the time bits of CONTROL, preserving the rest.
    pub fn set_integration_time(&mut self, time: IntegrationTime) -> Result<(), SensorError<B::Error>> {
        self.update_register(reg::CONTROL, reg::CONTROL_TIME_MASK, time.bits())?;
        self.integration_time = time;
        Ok(())
    }

    /// Like [`set_integration_time`](Self::set_integration_time) from a raw
    /// CONTROL encoding.
    ///
    /// # Arguments
    ///
    /// * `code` - `0` (100 ms) through `5` (600 ms).
    ///
    /// # Returns
    ///
    /// * `Err(SensorError::InvalidConfiguration)` for any other code, without bus traffic.
    pub fn set_integration_time_code(&mut self, code: u8) -> Result<(), SensorError<B::Error>> {
        match IntegrationTime::try_from(code) {
            Ok(time) => self.set_integration_time(time),
            Err(_) => Err(SensorError::InvalidConfiguration { value: code }),
        }
    }

    /// Pause between two data reads for the configured integration time.
    pub fn wait_duration(&self) -> Duration {
        self.integration_time.wait()
    }

    /// Earliest instant at which [`raw_data`](Self::raw_data) returns without sleeping.
    pub fn next_allowed_read(&self) -> Option<C::Instant> {
        self.scheduler.next_allowed_read()
    }

    // --- Data ---

    /// Saturation flag of the last raw read.
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Reads both channels, sleeping first if the current cycle has not completed.
    pub fn raw_data(&mut self) -> Result<RawLight, SensorError<B::Error>> {
        self.scheduler.wait(&mut self.clock);
        self.read_channels()
    }

    /// Non-blocking variant of [`raw_data`](Self::raw_data).
    pub fn try_raw_data(&mut self) -> nb::Result<RawLight, SensorError<B::Error>> {
        if self.scheduler.remaining(self.clock.now()).is_some() {
            return Err(nb::Error::WouldBlock);
        }
        self.read_channels().map_err(nb::Error::Other)
    }

    /// Takes a fresh raw reading and converts it to lux.
    pub fn lux(&mut self) -> Result<f32, SensorError<B::Error>> {
        let raw = self.raw_data()?;
        Ok(lux::lux(raw.full_spectrum, raw.infrared, self.gain, self.integration_time))
    }

    // --- Interrupts ---

    /// Reads the ALS interrupt thresholds (AILTL/AIHTL).
    pub fn interrupt_thresholds(&mut self) -> Result<Thresholds, SensorError<B::Error>> {
        self.read_thresholds(reg::AILTL, reg::AIHTL)
    }

    /// Takes effect after the next [`reset`](Self::reset).
    pub fn set_interrupt_thresholds(&mut self, thresholds: Thresholds) -> Result<(), SensorError<B::Error>> {
        self.write_thresholds(reg::AILTL, reg::AIHTL, thresholds)
    }

    /// Reads the no-persist interrupt thresholds (NPAILTL/NPAIHTL).
    pub fn np_interrupt_thresholds(&mut self) -> Result<Thresholds, SensorError<B::Error>> {
        self.read_thresholds(reg::NPAILTL, reg::NPAIHTL)
    }

    /// Takes effect after the next [`reset`](Self::reset).
    pub fn set_np_interrupt_thresholds(&mut self, thresholds: Thresholds) -> Result<(), SensorError<B::Error>> {
        self.write_thresholds(reg::NPAILTL, reg::NPAIHTL, thresholds)
    }

    /// Reads the persist filter; only the low nibble of the register is used.
    pub fn persist(&mut self) -> Result<Persist, SensorError<B::Error>> {
        Ok(Persist::from_register(self.read_register(reg::PERSIST)?))
    }

    /// Persist filter for the ALS interrupt. Does not affect no-persist interrupts.
    pub fn set_persist(&mut self, persist: Persist) -> Result<(), SensorError<B::Error>> {
        self.write_register(reg::PERSIST, persist.bits())
    }

    /// Like [`set_persist`](Self::set_persist) from a raw code (`0..=15`).
    pub fn set_persist_code(&mut self, code: u8) -> Result<(), SensorError<B::Error>> {
        match Persist::try_from(code) {
            Ok(persist) => self.set_persist(persist),
            Err(_) => Err(SensorError::InvalidConfiguration { value: code }),
        }
    }

    /// Asserts an ALS interrupt regardless of the thresholds.
    pub fn force_interrupt(&mut self) -> Result<(), SensorError<B::Error>> {
        self.special_function(reg::SPECIAL_FORCE_INTERRUPT)
    }

    /// Clears the ALS interrupt. Thresholds are kept.
    pub fn clear_interrupt(&mut self) -> Result<(), SensorError<B::Error>> {
        let base = reg::ENABLE_POWER_ON | reg::ENABLE_AEN;
        self.write_register(reg::ENABLE, base)?;
        self.write_register(reg::ENABLE, base | self.interrupts.enable_bits())?;
        self.special_function(reg::SPECIAL_CLEAR_INTERRUPT)
    }

    /// Clears ALS and no-persist interrupts. Thresholds are kept.
    pub fn clear_all_interrupts(&mut self) -> Result<(), SensorError<B::Error>> {
        self.special_function(reg::SPECIAL_CLEAR_ALL)
    }

    // --- Status ---

    /// Reads the ID register. Always `0x50` on a TSL2591.
    pub fn device_id(&mut self) -> Result<u8, SensorError<B::Error>> {
        self.read_register(reg::ID)
    }

    /// PON bit of ENABLE, read from the device.
    pub fn is_on(&mut self) -> Result<bool, SensorError<B::Error>> {
        self.enable_flag(reg::ENABLE_POWER_ON)
    }

    pub fn interrupt_enabled(&mut self) -> Result<bool, SensorError<B::Error>> {
        self.enable_flag(reg::ENABLE_AIEN)
    }

    pub fn np_interrupt_enabled(&mut self) -> Result<bool, SensorError<B::Error>> {
        self.enable_flag(reg::ENABLE_NPIEN)
    }

    pub fn sleep_after_enabled(&mut self) -> Result<bool, SensorError<B::Error>> {
        self.enable_flag(reg::ENABLE_SAI)
    }

    /// An integration cycle has completed since the ADC was enabled.
    pub fn is_valid(&mut self) -> Result<bool, SensorError<B::Error>> {
        self.status_flag(reg::STATUS_AVALID)
    }

    /// The device is asserting an ALS interrupt.
    pub fn is_interrupt(&mut self) -> Result<bool, SensorError<B::Error>> {
        self.status_flag(reg::STATUS_AINT)
    }

    /// The device is asserting a no-persist interrupt.
    pub fn is_np_interrupt(&mut self) -> Result<bool, SensorError<B::Error>> {
        self.status_flag(reg::STATUS_NPINTR)
    }

    // --- Internal helpers ---

    fn read_channels(&mut self) -> Result<RawLight, SensorError<B::Error>> {
        let (now, wait) = (self.clock.now(), self.wait_duration());
        self.scheduler.advance(now, wait);

        let full_spectrum = self.bus.read_word(self.address, reg::normal(reg::C0DATAL))?;
        let infrared = self.bus.read_word(self.address, reg::normal(reg::C1DATAL))?;
        self.saturated = lux::is_saturated(full_spectrum, infrared, self.integration_time);
        if self.saturated {
            debug!("tsl2591 {:#x}: saturated ({}, {})", self.address, full_spectrum, infrared);
        }
        Ok(RawLight { full_spectrum, infrared, saturated: self.saturated })
    }

    fn read_thresholds(&mut self, low: u8, high: u8) -> Result<Thresholds, SensorError<B::Error>> {
        Ok(Thresholds {
            low: self.bus.read_word(self.address, reg::normal(low))?,
            high: self.bus.read_word(self.address, reg::normal(high))?,
        })
    }

    fn write_thresholds(&mut self, low: u8, high: u8, thresholds: Thresholds) -> Result<(), SensorError<B::Error>> {
        self.bus.write_word(self.address, reg::normal(low), thresholds.low)?;
        self.bus.write_word(self.address, reg::normal(high), thresholds.high)?;
        Ok(())
    }

    fn enable_flag(&mut self, mask: u8) -> Result<bool, SensorError<B::Error>> {
        Ok(self.read_register(reg::ENABLE)? & mask != 0)
    }

    fn status_flag(&mut self, mask: u8) -> Result<bool, SensorError<B::Error>> {
        Ok(self.read_register(reg::STATUS)? & mask != 0)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, SensorError<B::Error>> {
        let mut value = [0u8; 1];
        self.bus.read_bytes(self.address, reg::normal(register), &mut value)?;
        Ok(value[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), SensorError<B::Error>> {
        trace!("tsl2591 {:#x}: write {:#x} to {:#x}", self.address, value, register);
        self.bus.write_bytes(self.address, reg::normal(register), &[value])?;
        Ok(())
    }

    fn update_register(&mut self, register: u8, mask: u8, bits: u8) -> Result<(), SensorError<B::Error>> {
        let current = self.read_register(register)?;
        self.write_register(register, apply_bits(current, mask, bits))
    }

    fn special_function(&mut self, function: u8) -> Result<(), SensorError<B::Error>> {
        self.bus.write_bytes(self.address, reg::special(function), &[])?;
        Ok(())
    }
}
