// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod bits;
pub mod crc;
pub mod error;
pub mod hal_traits;
pub mod timing;

#[cfg(test)]
pub(crate) mod mock;

// --- Re-export key types/traits/functions for easier access ---

// From bits.rs
pub use bits::apply_bits;

// From crc.rs
pub use crc::{crc8, encode_word, verify_word};

// From error.rs
pub use error::SensorError;

// From hal_traits.rs
pub use hal_traits::{BusError, BusErrorKind, Clock, RegisterBus};

#[cfg(feature = "std")]
pub use hal_traits::StdClock;

#[cfg(feature = "embedded-hal")]
pub use hal_traits::{I2cBus, I2cBusError};

// From timing.rs
pub use timing::ReadScheduler;
