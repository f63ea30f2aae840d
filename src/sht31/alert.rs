// src/sht31/alert.rs

//! Alert limit encoding (datasheet Section 4.7 / application note "Alert Mode").
//!
//! A limit is a temperature/humidity pair squeezed into one word: the 7 most
//! significant bits of the humidity count in bits 15..9 and the 9 most
//! significant bits of the temperature count in bits 8..0.

use super::convert::{from_relative_humidity, to_relative_humidity, TemperatureScale};

const HUMIDITY_MASK: u16 = 0xFE00;
const TEMPERATURE_MASK: u16 = 0x01FF;
const TEMPERATURE_SHIFT: u32 = 7;

/// One alert limit in physical units.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertThreshold {
    /// Temperature in the driver's configured scale.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
}

/// Packs a threshold into its 16-bit wire word.
pub fn pack(threshold: AlertThreshold, scale: TemperatureScale) -> u16 {
    let humidity = from_relative_humidity(threshold.humidity);
    let temperature = scale.to_raw(threshold.temperature);
    (humidity & HUMIDITY_MASK) | ((temperature >> TEMPERATURE_SHIFT) & TEMPERATURE_MASK)
}

/// Expands a 16-bit wire word back to physical units. Truncated bits read as zero.
pub fn unpack(word: u16, scale: TemperatureScale) -> AlertThreshold {
    let humidity = word & HUMIDITY_MASK;
    let temperature = (word & TEMPERATURE_MASK) << TEMPERATURE_SHIFT;
    AlertThreshold {
        temperature: scale.from_raw(temperature),
        humidity: to_relative_humidity(humidity),
    }
}
