// src/sht31/mod.rs

//! Driver for the Sensirion SHT31 temperature and humidity sensor.
//!
//! Measurements are acquired either one at a time ([`Sht31::single_shot`]) or
//! by the device itself at a fixed rate ([`Sht31::set_periodic`] +
//! [`Sht31::periodic_fetch`]). Every data word on the wire is followed by a
//! CRC-8; a word whose checksum fails is reported as `None` so that an intact
//! temperature can still be used when the humidity word was corrupted, and
//! vice versa.

pub mod alert;
pub mod command;
pub mod convert;
pub mod status;

pub use alert::AlertThreshold;
pub use command::{AlertLimit, PeriodicRate, Repeatability, ADDRESS_PRIMARY, ADDRESS_SECONDARY};
pub use convert::TemperatureScale;
pub use status::Status;

use crate::common::{
    crc::{encode_word, verify_word},
    error::SensorError,
    hal_traits::{Clock, RegisterBus},
    timing::{ReadScheduler, COMMAND_SETTLE},
};
use command::Command;
use core::time::Duration;

/// Volatile driver configuration. Defaults: high repeatability, no clock
/// stretching, 1 mps, Fahrenheit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sht31Config {
    pub repeatability: Repeatability,
    pub clock_stretch: bool,
    pub periodic_rate: PeriodicRate,
    pub scale: TemperatureScale,
}

impl Default for Sht31Config {
    fn default() -> Self {
        Sht31Config {
            repeatability: Repeatability::High,
            clock_stretch: false,
            periodic_rate: PeriodicRate::Mps1,
            scale: TemperatureScale::Fahrenheit,
        }
    }
}

/// Acquisition mode of the device as tracked by the driver.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Waiting for single-shot commands.
    Idle,
    /// Measuring on its own at the configured rate.
    Periodic,
}

/// One temperature/humidity result. A component is `None` when its checksum failed.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Temperature in the configured scale.
    pub temperature: Option<f32>,
    /// Relative humidity in percent.
    pub humidity: Option<f32>,
}

/// SHT31 handle.
///
/// Not safe to share between threads without external locking; every bus
/// operation takes `&mut self`.
#[derive(Debug)]
pub struct Sht31<B, C>
where
    B: RegisterBus,
    C: Clock,
{
    bus: B,
    clock: C,
    address: u8,
    config: Sht31Config,
    mode: Mode,
    scheduler: ReadScheduler<C::Instant>,
}

impl<B, C> Sht31<B, C>
where
    B: RegisterBus,
    C: Clock,
{
    /// Creates a handle with the default configuration. Performs no bus traffic.
    pub fn new(bus: B, clock: C, address: u8) -> Self {
        Self::with_config(bus, clock, address, Sht31Config::default())
    }

    /// Creates a handle with an explicit configuration. Performs no bus traffic.
    ///
    /// # Arguments
    ///
    /// * `bus` - Transport the sensor is attached to. Pass `&mut bus` to keep ownership.
    /// * `clock` - Time source for settle delays and the fetch schedule.
    /// * `address` - [`ADDRESS_PRIMARY`] or [`ADDRESS_SECONDARY`].
    /// * `config` - Initial repeatability, clock stretching, rate and scale.
    pub fn with_config(bus: B, clock: C, address: u8, config: Sht31Config) -> Self {
        Sht31 {
            bus,
            clock,
            address,
            config,
            mode: Mode::Idle,
            scheduler: ReadScheduler::new(),
        }
    }

    /// Destroys the handle and returns the bus and clock.
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }

    /// Bus address this handle talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    // --- Configuration ---

    /// Snapshot of the current driver configuration.
    pub fn config(&self) -> Sht31Config {
        self.config
    }

    pub fn repeatability(&self) -> Repeatability {
        self.config.repeatability
    }

    /// Takes effect on the next single shot or the next `set_periodic(true)`.
    pub fn set_repeatability(&mut self, repeatability: Repeatability) {
        self.config.repeatability = repeatability;
    }

    /// Sets repeatability from its numeric code (1..=3). Other codes are
    /// ignored; returns whether the code was applied.
    pub fn set_repeatability_code(&mut self, code: u8) -> bool {
        match Repeatability::try_from(code) {
            Ok(repeatability) => {
                self.config.repeatability = repeatability;
                true
            }
            Err(_) => {
                debug!("ignoring repeatability code {}", code);
                false
            }
        }
    }

    /// Whether single shots use the clock-stretching command row.
    pub fn clock_stretch(&self) -> bool {
        self.config.clock_stretch
    }

    pub fn set_clock_stretch(&mut self, enabled: bool) {
        self.config.clock_stretch = enabled;
    }

    pub fn periodic_rate(&self) -> PeriodicRate {
        self.config.periodic_rate
    }

    /// Takes effect on the device at the next `set_periodic(true)`; the fetch
    /// schedule follows the new rate from the next fetch on.
    pub fn set_periodic_rate(&mut self, rate: PeriodicRate) {
        self.config.periodic_rate = rate;
    }

    /// Sets the periodic rate from its numeric code (0..=4). Other codes are
    /// ignored; returns whether the code was applied.
    pub fn set_periodic_rate_code(&mut self, code: u8) -> bool {
        match PeriodicRate::try_from(code) {
            Ok(rate) => {
                self.config.periodic_rate = rate;
                true
            }
            Err(_) => {
                debug!("ignoring periodic rate code {}", code);
                false
            }
        }
    }

    pub fn scale(&self) -> TemperatureScale {
        self.config.scale
    }

    /// Unit for measured temperatures and alert limits.
    pub fn set_scale(&mut self, scale: TemperatureScale) {
        self.config.scale = scale;
    }

    /// Acquisition mode as last commanded through this handle.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_periodic(&self) -> bool {
        self.mode == Mode::Periodic
    }

    /// Earliest instant at which [`periodic_fetch`](Self::periodic_fetch) returns without sleeping.
    pub fn next_allowed_read(&self) -> Option<C::Instant> {
        self.scheduler.next_allowed_read()
    }

    // --- Measurements ---

    /// Triggers one measurement and blocks until it is read back.
    pub fn single_shot(&mut self) -> Result<Measurement, SensorError<B::Error>> {
        let cmd = command::single_shot(self.config.clock_stretch, self.config.repeatability);
        self.write_command(cmd)?;
        self.clock.delay(self.config.repeatability.settle());
        self.read_measurement()
    }

    /// Starts (`true`) or stops (`false`) periodic acquisition.
    ///
    /// The driver state only changes once the command has been written; a bus
    /// error leaves mode and schedule untouched.
    pub fn set_periodic(&mut self, enabled: bool) -> Result<(), SensorError<B::Error>> {
        if enabled {
            let cmd = command::periodic(self.config.periodic_rate, self.config.repeatability);
            self.start_periodic(cmd, self.config.periodic_rate.interval())
        } else {
            self.write_command(command::BREAK)?;
            self.mode = Mode::Idle;
            self.scheduler.clear();
            debug!("sht31 {:#x}: periodic mode stopped", self.address);
            Ok(())
        }
    }

    /// Starts periodic acquisition in accelerated-response-time mode (4 mps).
    ///
    /// Sets the configured rate to [`PeriodicRate::Mps4`] so the fetch schedule
    /// matches what the device does.
    pub fn start_art(&mut self) -> Result<(), SensorError<B::Error>> {
        self.start_periodic(command::ART, PeriodicRate::Mps4.interval())?;
        self.config.periodic_rate = PeriodicRate::Mps4;
        Ok(())
    }

    /// Fetches the latest periodic result, sleeping until the current
    /// measurement cycle has completed.
    pub fn periodic_fetch(&mut self) -> Result<Measurement, SensorError<B::Error>> {
        if self.mode != Mode::Periodic {
            return Err(SensorError::PeriodicDisabled);
        }
        self.scheduler.wait(&mut self.clock);
        self.fetch_now()
    }

    /// Non-blocking variant of [`periodic_fetch`](Self::periodic_fetch):
    /// returns `WouldBlock` while the measurement cycle is still running.
    pub fn try_periodic_fetch(&mut self) -> nb::Result<Measurement, SensorError<B::Error>> {
        if self.mode != Mode::Periodic {
            return Err(nb::Error::Other(SensorError::PeriodicDisabled));
        }
        if self.scheduler.remaining(self.clock.now()).is_some() {
            return Err(nb::Error::WouldBlock);
        }
        self.fetch_now().map_err(nb::Error::Other)
    }

    // --- Status & housekeeping ---

    /// Reads the 16-bit status register.
    ///
    /// # Returns
    ///
    /// * `Ok(Status)` with the raw flags.
    /// * `Err(SensorError::Bus)` if either transfer fails.
    pub fn status(&mut self) -> Result<Status, SensorError<B::Error>> {
        self.write_command(command::STATUS)?;
        let mut word = [0u8; 2];
        self.bus.read_bytes(self.address, command::STATUS_READ_REGISTER, &mut word)?;
        Ok(Status::from_bits(u16::from_be_bytes(word)))
    }

    /// Clears the alert, reset and error flags of the status register.
    pub fn clear_status(&mut self) -> Result<(), SensorError<B::Error>> {
        self.write_command(command::CLEAR_STATUS)
    }

    /// Soft reset. The device returns to idle, so the driver does too.
    pub fn reset(&mut self) -> Result<(), SensorError<B::Error>> {
        self.write_command(command::SOFT_RESET)?;
        self.mode = Mode::Idle;
        self.scheduler.clear();
        Ok(())
    }

    /// Switches the internal heater on or off.
    pub fn set_heater(&mut self, on: bool) -> Result<(), SensorError<B::Error>> {
        self.write_command(if on { command::HEATER_ON } else { command::HEATER_OFF })
    }

    /// Reads the heater state from the status register.
    pub fn heater_enabled(&mut self) -> Result<bool, SensorError<B::Error>> {
        Ok(self.status()?.is_heater_on())
    }

    // --- Alert limits ---

    /// Reads one alert limit. `Ok(None)` if the reply failed its checksum.
    pub fn alert_threshold(&mut self, limit: AlertLimit) -> Result<Option<AlertThreshold>, SensorError<B::Error>> {
        let cmd = limit.read_command();
        self.write_command(cmd)?;
        let mut reply = [0u8; 3];
        self.bus.read_bytes(self.address, cmd.msb(), &mut reply)?;
        Ok(self.checked_word(&reply).map(|word| alert::unpack(word, self.config.scale)))
    }

    /// Programs one alert limit.
    pub fn set_alert_threshold(
        &mut self,
        limit: AlertLimit,
        threshold: AlertThreshold,
    ) -> Result<(), SensorError<B::Error>> {
        let cmd = limit.write_command();
        let [msb, lsb, crc] = encode_word(alert::pack(threshold, self.config.scale));
        self.bus.write_bytes(self.address, cmd.msb(), &[cmd.lsb(), msb, lsb, crc])?;
        self.clock.delay(COMMAND_SETTLE);
        Ok(())
    }

    // --- Internal helpers ---

    fn write_command(&mut self, cmd: Command) -> Result<(), SensorError<B::Error>> {
        trace!("sht31 {:#x}: command {:#x}", self.address, cmd.code());
        self.bus.write_bytes(self.address, cmd.msb(), &[cmd.lsb()])?;
        self.clock.delay(COMMAND_SETTLE);
        Ok(())
    }

    fn start_periodic(&mut self, cmd: Command, interval: Duration) -> Result<(), SensorError<B::Error>> {
        let issued = self.clock.now();
        self.write_command(cmd)?;
        self.mode = Mode::Periodic;
        self.scheduler.restart(issued, interval + self.config.repeatability.settle());
        debug!("sht31 {:#x}: periodic mode started with command {:#x}", self.address, cmd.code());
        Ok(())
    }

    fn fetch_now(&mut self) -> Result<Measurement, SensorError<B::Error>> {
        let issued = self.clock.now();
        self.write_command(command::FETCH)?;
        let measurement = self.read_measurement()?;
        let latency = self.config.periodic_rate.interval() + self.config.repeatability.settle();
        self.scheduler.advance(issued, latency);
        Ok(measurement)
    }

    fn read_measurement(&mut self) -> Result<Measurement, SensorError<B::Error>> {
        let mut block = [0u8; 6];
        let register = command::measurement_register(self.config.clock_stretch);
        self.bus.read_bytes(self.address, register, &mut block)?;
        Ok(self.decode(&block))
    }

    fn decode(&self, block: &[u8; 6]) -> Measurement {
        let [t_msb, t_lsb, t_crc, h_msb, h_lsb, h_crc] = *block;
        Measurement {
            temperature: self.checked_word(&[t_msb, t_lsb, t_crc]).map(|raw| self.config.scale.from_raw(raw)),
            humidity: self.checked_word(&[h_msb, h_lsb, h_crc]).map(convert::to_relative_humidity),
        }
    }

    fn checked_word(&self, group: &[u8; 3]) -> Option<u16> {
        match verify_word::<B::Error>(group) {
            Ok(word) => Some(word),
            Err(_) => {
                warn!("sht31 {:#x}: checksum mismatch on word {:#x}", self.address, u16::from_be_bytes([group[0], group[1]]));
                None
            }
        }
    }
}
