// src/common/error.rs

/// Errors returned by the sensor drivers.
///
/// `E` is the error type of the underlying [`RegisterBus`](super::RegisterBus).
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SensorError<E = ()>
where
    E: core::fmt::Debug, // Still need Debug for the generic Bus error
{
    /// Underlying bus error from the transport implementation. Never retried.
    #[error("Bus error: {0:?}")]
    Bus(E),

    /// Received checksum does not match the checksum calculated over the payload.
    #[error("CRC mismatch: expected {expected:#04x}, calculated {calculated:#04x}")]
    CrcMismatch { expected: u8, calculated: u8 },

    /// The identity register did not hold the expected device ID.
    #[error("Device mismatch: expected ID {expected:#04x}, found {found:#04x}")]
    DeviceMismatch { expected: u8, found: u8 },

    /// A raw configuration code is outside the set the device accepts.
    #[error("Invalid configuration value: {value:#04x}")]
    InvalidConfiguration { value: u8 },

    /// A periodic fetch was requested while periodic mode is off.
    #[error("Periodic mode is not enabled")]
    PeriodicDisabled,

    /// The device never reported a completed integration cycle.
    #[error("Device not ready after {polls} status polls")]
    NotReady { polls: u32 },
}

// Allow mapping from the underlying bus error so `?` works on raw bus calls
impl<E: core::fmt::Debug> From<E> for SensorError<E> {
    fn from(e: E) -> Self {
        SensorError::Bus(e)
    }
}
