// src/tsl2591/lux.rs

//! Count to lux conversion.
//!
//! The vendor does not publish a lux formula for the TSL2591. This is the
//! empirical one used by the Adafruit library. Treat absolute values as
//! approximate.

use super::registers::{Gain, IntegrationTime};

/// Device factor.
pub const LUX_DF: f32 = 408.0;

/// Counts per lux for a gain and integration time.
pub fn counts_per_lux(gain: Gain, time: IntegrationTime) -> f32 {
    (time.millis() as f32 * gain.multiplier()) / LUX_DF
}

/// Lux from a full-spectrum (`ch0`) and infrared (`ch1`) count pair.
/// Returns 0 when `ch0` is 0.
pub fn lux(ch0: u16, ch1: u16, gain: Gain, time: IntegrationTime) -> f32 {
    if ch0 == 0 {
        return 0.0;
    }
    let full = ch0 as f32;
    let ir = ch1 as f32;
    (full - ir) * (1.0 - ir / full) / counts_per_lux(gain, time)
}

/// Whether either channel exceeds the saturation count of `time`.
pub fn is_saturated(ch0: u16, ch1: u16, time: IntegrationTime) -> bool {
    let max = time.max_count();
    ch0 > max || ch1 > max
}
