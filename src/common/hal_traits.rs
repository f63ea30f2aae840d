// src/common/hal_traits.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// Coarse classification of a transport failure.
///
/// The drivers never retry, but a few device quirks (the TSL2591 dropping off
/// the bus while it performs a system reset) need to tell a NACK apart from a
/// genuine fault.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusErrorKind {
    /// The addressed device did not acknowledge (Linux reports this as error 121).
    NoAcknowledge,
    /// Another controller won arbitration.
    ArbitrationLoss,
    /// The transfer did not complete in time.
    Timeout,
    /// Anything else.
    Other,
}

/// Error type of a [`RegisterBus`].
pub trait BusError: Debug {
    /// Classifies the failure.
    fn kind(&self) -> BusErrorKind;
}

/// Register-addressed serial bus, as used by both sensors.
///
/// `register` is whatever byte the device expects right after its address:
/// a register pointer for the TSL2591, the command MSB for the SHT31.
/// Implementations own addressing and any retry policy; the drivers propagate
/// every error unchanged.
pub trait RegisterBus {
    /// Associated error type for communication errors.
    type Error: BusError;

    /// Writes `register` then reads `buffer.len()` bytes into `buffer`.
    fn read_bytes(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `register` followed by `payload`.
    fn write_bytes(&mut self, address: u8, register: u8, payload: &[u8]) -> Result<(), Self::Error>;

    /// Reads a 16-bit little-endian (SMBus) word starting at `register`.
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error>;

    /// Writes a 16-bit little-endian (SMBus) word starting at `register`.
    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    type Error = T::Error;

    #[inline]
    fn read_bytes(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        T::read_bytes(self, address, register, buffer)
    }

    #[inline]
    fn write_bytes(&mut self, address: u8, register: u8, payload: &[u8]) -> Result<(), Self::Error> {
        T::write_bytes(self, address, register, payload)
    }

    #[inline]
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        T::read_word(self, address, register)
    }

    #[inline]
    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        T::write_word(self, address, register, value)
    }
}

/// Monotonic time source plus a blocking delay.
pub trait Clock {
    /// Point in time. Differences saturate at zero.
    type Instant: Copy + Ord + Debug + Add<Duration, Output = Self::Instant> + Sub<Self::Instant, Output = Duration>;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Blocks for at least `duration`.
    fn delay(&mut self, duration: Duration);
}

/// [`Clock`] backed by `std::time::Instant` and `std::thread::sleep`.
#[cfg(feature = "std")]
#[derive(Debug, Default, Copy, Clone)]
pub struct StdClock;

#[cfg(feature = "std")]
impl Clock for StdClock {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(feature = "embedded-hal")]
pub use self::i2c_adapter::{I2cBus, I2cBusError};

#[cfg(feature = "embedded-hal")]
mod i2c_adapter {
    use super::{BusError, BusErrorKind, RegisterBus};
    use arrayvec::ArrayVec;
    use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

    /// Largest payload accepted by [`I2cBus::write_bytes`], register byte excluded.
    pub const MAX_PAYLOAD: usize = 8;

    /// Error from [`I2cBus`].
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub enum I2cBusError<E> {
        /// Error reported by the HAL.
        I2c(E),
        /// A write payload did not fit the frame buffer.
        PayloadTooLong { len: usize },
    }

    impl<E: embedded_hal::i2c::Error> BusError for I2cBusError<E> {
        fn kind(&self) -> BusErrorKind {
            match self {
                I2cBusError::I2c(e) => match e.kind() {
                    ErrorKind::NoAcknowledge(_) => BusErrorKind::NoAcknowledge,
                    ErrorKind::ArbitrationLoss => BusErrorKind::ArbitrationLoss,
                    _ => BusErrorKind::Other,
                },
                I2cBusError::PayloadTooLong { .. } => BusErrorKind::Other,
            }
        }
    }

    /// Implements [`RegisterBus`] on top of any `embedded_hal::i2c::I2c`.
    #[derive(Debug)]
    pub struct I2cBus<I> {
        i2c: I,
    }

    impl<I: I2c> I2cBus<I> {
        /// Wraps a HAL bus. The device address is passed on every transfer.
        pub fn new(i2c: I) -> Self {
            I2cBus { i2c }
        }

        /// Returns the wrapped HAL bus.
        pub fn release(self) -> I {
            self.i2c
        }
    }

    impl<I: I2c> RegisterBus for I2cBus<I> {
        type Error = I2cBusError<I::Error>;

        /// Writes `register` and reads `buffer` back in one write-read
        /// transaction with a repeated start.
        ///
        /// The register byte is always sent. Devices that are read without a
        /// register pointer, like the SHT31, therefore see the command MSB
        /// (`0x24`/`0x2C`, or `0x00` for status) as a lone byte ahead of the
        /// read header. One byte never forms a complete two-byte command.
        fn read_bytes(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
            self.i2c.write_read(address, &[register], buffer).map_err(I2cBusError::I2c)
        }

        fn write_bytes(&mut self, address: u8, register: u8, payload: &[u8]) -> Result<(), Self::Error> {
            let mut frame: ArrayVec<u8, { MAX_PAYLOAD + 1 }> = ArrayVec::new();
            frame.push(register);
            frame
                .try_extend_from_slice(payload)
                .map_err(|_| I2cBusError::PayloadTooLong { len: payload.len() })?;
            self.i2c.write(address, &frame).map_err(I2cBusError::I2c)
        }

        fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
            let mut word = [0u8; 2];
            self.read_bytes(address, register, &mut word)?;
            Ok(u16::from_le_bytes(word))
        }

        fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
            self.write_bytes(address, register, &value.to_le_bytes())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};

        #[derive(Debug, Copy, Clone, Eq, PartialEq)]
        struct FakeError(ErrorKind);
        impl embedded_hal::i2c::Error for FakeError {
            fn kind(&self) -> ErrorKind {
                self.0
            }
        }

        #[derive(Default)]
        struct FakeI2c {
            written: std::vec::Vec<(u8, std::vec::Vec<u8>)>,
            reply: std::vec::Vec<u8>,
            nack: bool,
        }

        impl ErrorType for FakeI2c {
            type Error = FakeError;
        }

        impl I2c for FakeI2c {
            fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
                if self.nack {
                    return Err(FakeError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
                }
                for op in operations {
                    match op {
                        Operation::Write(bytes) => self.written.push((address, bytes.to_vec())),
                        Operation::Read(buf) => buf.copy_from_slice(&self.reply[..buf.len()]),
                    }
                }
                Ok(())
            }
        }

        #[test]
        fn test_write_bytes_prefixes_register() {
            let mut bus = I2cBus::new(FakeI2c::default());
            bus.write_bytes(0x44, 0x24, &[0x00]).unwrap();
            assert_eq!(bus.release().written, vec![(0x44, vec![0x24, 0x00])]);
        }

        #[test]
        fn test_write_bytes_rejects_long_payload() {
            let mut bus = I2cBus::new(FakeI2c::default());
            let result = bus.write_bytes(0x44, 0x24, &[0u8; MAX_PAYLOAD + 1]);
            assert_eq!(result, Err(I2cBusError::PayloadTooLong { len: MAX_PAYLOAD + 1 }));
        }

        #[test]
        fn test_read_bytes_sends_register_first() {
            let mut bus = I2cBus::new(FakeI2c { reply: vec![0x66, 0x66, 0x93], ..Default::default() });
            let mut buffer = [0u8; 3];
            bus.read_bytes(0x44, 0x24, &mut buffer).unwrap();
            assert_eq!(buffer, [0x66, 0x66, 0x93]);
            assert_eq!(bus.release().written, vec![(0x44, vec![0x24])]);
        }

        #[test]
        fn test_read_word_is_little_endian() {
            let mut bus = I2cBus::new(FakeI2c { reply: vec![0x34, 0x12], ..Default::default() });
            assert_eq!(bus.read_word(0x29, 0xB4).unwrap(), 0x1234);
        }

        #[test]
        fn test_nack_kind() {
            let mut bus = I2cBus::new(FakeI2c { nack: true, ..Default::default() });
            let err = bus.write_bytes(0x29, 0xA1, &[0x80]).unwrap_err();
            assert_eq!(err.kind(), BusErrorKind::NoAcknowledge);
        }
    }
}
