// src/sht31/convert.rs

//! Raw-count ⇄ physical-unit conversions (datasheet Section 4.13).
//!
//! Forward conversions take the full 16-bit range. Inverse conversions round
//! to the nearest count and saturate into `0..=65535`.

/// Temperature unit used by the driver's measurement and alert accessors.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureScale {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TemperatureScale {
    /// Converts a raw temperature word to this scale.
    pub fn from_raw(self, raw: u16) -> f32 {
        match self {
            TemperatureScale::Fahrenheit => to_fahrenheit(raw),
            TemperatureScale::Celsius => to_celsius(raw),
        }
    }

    /// Converts a temperature in this scale to a raw word.
    pub fn to_raw(self, value: f32) -> u16 {
        match self {
            TemperatureScale::Fahrenheit => from_fahrenheit(value),
            TemperatureScale::Celsius => from_celsius(value),
        }
    }
}

#[inline]
fn round_to_count(value: f32) -> u16 {
    // `as` saturates, so out-of-range and NaN inputs land on 0 or 65535
    (value + 0.5) as u16
}

/// Raw temperature word to degrees Fahrenheit (datasheet Equation 3).
pub fn to_fahrenheit(raw: u16) -> f32 {
    -49.0 + 315.0 * (raw as f32 / 65535.0)
}

/// Degrees Fahrenheit to the nearest raw temperature word.
///
/// # Arguments
///
/// * `fahrenheit` - Temperature; values outside -49..=266 °F saturate.
pub fn from_fahrenheit(fahrenheit: f32) -> u16 {
    round_to_count((fahrenheit + 49.0) * 13107.0 / 63.0)
}

/// Raw temperature word to degrees Celsius (datasheet Equation 2).
pub fn to_celsius(raw: u16) -> f32 {
    -45.0 + 175.0 * (raw as f32 / 65535.0)
}

/// Degrees Celsius to the nearest raw temperature word. Saturates outside -45..=130 °C.
pub fn from_celsius(celsius: f32) -> u16 {
    round_to_count((celsius + 45.0) * 13107.0 / 35.0)
}

/// Raw humidity word to percent relative humidity (datasheet Equation 1).
pub fn to_relative_humidity(raw: u16) -> f32 {
    100.0 * (raw as f32 / 65535.0)
}

/// Inverse of [`to_relative_humidity`].
///
/// Scales by 65565 rather than 65535, so a round trip gains up to 30 counts
/// near full scale. Kept as published until the vendor formula is confirmed.
pub fn from_relative_humidity(humidity: f32) -> u16 {
    round_to_count(humidity / 100.0 * 65565.0)
}
