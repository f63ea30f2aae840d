// src/sht31/status.rs

use crate::common::bits::is_set;

/// Status register snapshot (datasheet Table 17).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u16);

impl Status {
    pub const WRITE_CRC_ERROR: u16 = 0x0001;
    pub const COMMAND_ERROR: u16 = 0x0002;
    pub const RESET_DETECTED: u16 = 0x0010;
    pub const TEMPERATURE_ALERT: u16 = 0x0400;
    pub const HUMIDITY_ALERT: u16 = 0x0800;
    pub const HEATER_ON: u16 = 0x2000;
    pub const ALERT_PENDING: u16 = 0x8000;

    pub const fn from_bits(bits: u16) -> Self {
        Status(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Checksum of the last write transfer failed.
    pub const fn is_crc_error(self) -> bool {
        is_set(self.0, Self::WRITE_CRC_ERROR)
    }

    /// Last command was not processed (invalid or failed checksum).
    pub const fn is_command_error(self) -> bool {
        is_set(self.0, Self::COMMAND_ERROR)
    }

    /// A reset (power-on, soft or hard) occurred since the last clear.
    pub const fn is_reset(self) -> bool {
        is_set(self.0, Self::RESET_DETECTED)
    }

    pub const fn is_temperature_alert(self) -> bool {
        is_set(self.0, Self::TEMPERATURE_ALERT)
    }

    pub const fn is_humidity_alert(self) -> bool {
        is_set(self.0, Self::HUMIDITY_ALERT)
    }

    pub const fn is_heater_on(self) -> bool {
        is_set(self.0, Self::HEATER_ON)
    }

    /// At least one alert is pending.
    pub const fn is_alert(self) -> bool {
        is_set(self.0, Self::ALERT_PENDING)
    }
}
