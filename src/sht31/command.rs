// src/sht31/command.rs

//! SHT31 command set.
//!
//! See the SHT3x-DIS datasheet, Section 4 "Operation and Communication".
//! Every command is two bytes; the MSB travels in the register slot of a
//! [`RegisterBus`](crate::RegisterBus) transfer and the LSB as payload.

use core::time::Duration;

use crate::common::SensorError;

/// Default I2C address (ADDR pin low).
pub const ADDRESS_PRIMARY: u8 = 0x44;
/// Alternate I2C address (ADDR pin high).
pub const ADDRESS_SECONDARY: u8 = 0x45;

/// A two-byte SHT31 command.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    msb: u8,
    lsb: u8,
}

impl Command {
    pub const fn new(msb: u8, lsb: u8) -> Self {
        Command { msb, lsb }
    }

    #[inline]
    pub const fn msb(self) -> u8 {
        self.msb
    }

    #[inline]
    pub const fn lsb(self) -> u8 {
        self.lsb
    }

    /// Both bytes as a big-endian word, e.g. `0x2C06`.
    #[inline]
    pub const fn code(self) -> u16 {
        u16::from_be_bytes([self.msb, self.lsb])
    }
}

/// Measurement repeatability. Higher repeatability means lower noise and a
/// longer measurement.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Repeatability {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Repeatability {
    /// Maximum measurement duration (datasheet Table 4).
    pub const fn settle(self) -> Duration {
        match self {
            Repeatability::Low => Duration::from_millis(4),
            Repeatability::Medium => Duration::from_millis(6),
            Repeatability::High => Duration::from_millis(15),
        }
    }

    #[inline]
    const fn column(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Repeatability {
    type Error = SensorError<()>;

    /// Accepts the codes 1 (low), 2 (medium) and 3 (high).
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Repeatability::Low),
            2 => Ok(Repeatability::Medium),
            3 => Ok(Repeatability::High),
            _ => Err(SensorError::InvalidConfiguration { value }),
        }
    }
}

/// Periodic acquisition rate in measurements per second (mps).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PeriodicRate {
    /// 0.5 mps
    Mps0_5 = 0,
    Mps1 = 1,
    Mps2 = 2,
    Mps4 = 3,
    Mps10 = 4,
}

impl PeriodicRate {
    /// Time between two measurements at this rate (datasheet Section 4.5).
    pub const fn interval(self) -> Duration {
        match self {
            PeriodicRate::Mps0_5 => Duration::from_secs(2),
            PeriodicRate::Mps1 => Duration::from_secs(1),
            PeriodicRate::Mps2 => Duration::from_millis(500),
            PeriodicRate::Mps4 => Duration::from_millis(250),
            PeriodicRate::Mps10 => Duration::from_millis(100),
        }
    }

    #[inline]
    const fn row(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for PeriodicRate {
    type Error = SensorError<()>;

    /// Accepts the codes 0 (0.5 mps) through 4 (10 mps).
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PeriodicRate::Mps0_5),
            1 => Ok(PeriodicRate::Mps1),
            2 => Ok(PeriodicRate::Mps2),
            3 => Ok(PeriodicRate::Mps4),
            4 => Ok(PeriodicRate::Mps10),
            _ => Err(SensorError::InvalidConfiguration { value }),
        }
    }
}

// Rows: [MSB, low, medium, high]
const SINGLE_SHOT: [[u8; 4]; 2] = [
    [0x24, 0x16, 0x0B, 0x00], // no clock stretching
    [0x2C, 0x10, 0x0D, 0x06], // clock stretching
];

const PERIODIC: [[u8; 4]; 5] = [
    [0x20, 0x2F, 0x24, 0x32], // 0.5 mps
    [0x21, 0x2D, 0x26, 0x30], // 1 mps
    [0x22, 0x2B, 0x20, 0x36], // 2 mps
    [0x23, 0x29, 0x22, 0x34], // 4 mps
    [0x27, 0x2A, 0x21, 0x37], // 10 mps
];

/// Single-shot measurement command.
pub const fn single_shot(clock_stretch: bool, repeatability: Repeatability) -> Command {
    let row = SINGLE_SHOT[clock_stretch as usize];
    Command::new(row[0], row[repeatability.column()])
}

/// Register byte used to read a 6-byte measurement block back.
pub const fn measurement_register(clock_stretch: bool) -> u8 {
    SINGLE_SHOT[clock_stretch as usize][0]
}

/// Start-periodic-acquisition command.
pub const fn periodic(rate: PeriodicRate, repeatability: Repeatability) -> Command {
    let row = PERIODIC[rate.row()];
    Command::new(row[0], row[repeatability.column()])
}

pub const FETCH: Command = Command::new(0xE0, 0x00);
pub const BREAK: Command = Command::new(0x30, 0x93);
/// Accelerated response time: periodic acquisition at 4 mps.
pub const ART: Command = Command::new(0x2B, 0x32);
pub const SOFT_RESET: Command = Command::new(0x30, 0xA2);
pub const CLEAR_STATUS: Command = Command::new(0x30, 0x41);
pub const HEATER_ON: Command = Command::new(0x30, 0x6D);
pub const HEATER_OFF: Command = Command::new(0x30, 0x66);
pub const STATUS: Command = Command::new(0xF3, 0x2D);

/// Register byte for reading the status word back.
pub const STATUS_READ_REGISTER: u8 = 0x00;

/// The four programmable alert limits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertLimit {
    /// Alert asserts above this pair.
    HighSet,
    /// Alert releases below this pair after a high alert.
    HighClear,
    /// Alert asserts below this pair.
    LowSet,
    /// Alert releases above this pair after a low alert.
    LowClear,
}

impl AlertLimit {
    pub const ALL: [AlertLimit; 4] =
        [AlertLimit::HighSet, AlertLimit::HighClear, AlertLimit::LowSet, AlertLimit::LowClear];

    pub const fn read_command(self) -> Command {
        match self {
            AlertLimit::HighSet => Command::new(0xE1, 0x1F),
            AlertLimit::HighClear => Command::new(0xE1, 0x14),
            AlertLimit::LowSet => Command::new(0xE1, 0x02),
            AlertLimit::LowClear => Command::new(0xE1, 0x09),
        }
    }

    pub const fn write_command(self) -> Command {
        match self {
            AlertLimit::HighSet => Command::new(0x61, 0x1D),
            AlertLimit::HighClear => Command::new(0x61, 0x16),
            AlertLimit::LowSet => Command::new(0x61, 0x00),
            AlertLimit::LowClear => Command::new(0x61, 0x0B),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_shot_table() {
        assert_eq!(single_shot(true, Repeatability::High).code(), 0x2C06);
        assert_eq!(single_shot(true, Repeatability::Medium).code(), 0x2C0D);
        assert_eq!(single_shot(true, Repeatability::Low).code(), 0x2C10);
        assert_eq!(single_shot(false, Repeatability::High).code(), 0x2400);
        assert_eq!(single_shot(false, Repeatability::Medium).code(), 0x240B);
        assert_eq!(single_shot(false, Repeatability::Low).code(), 0x2416);
    }

    #[test]
    fn test_periodic_table() {
        assert_eq!(periodic(PeriodicRate::Mps0_5, Repeatability::High).code(), 0x2032);
        assert_eq!(periodic(PeriodicRate::Mps0_5, Repeatability::Low).code(), 0x202F);
        assert_eq!(periodic(PeriodicRate::Mps1, Repeatability::Medium).code(), 0x2126);
        assert_eq!(periodic(PeriodicRate::Mps2, Repeatability::Low).code(), 0x222B);
        assert_eq!(periodic(PeriodicRate::Mps4, Repeatability::High).code(), 0x2334);
        assert_eq!(periodic(PeriodicRate::Mps10, Repeatability::Low).code(), 0x272A);
    }

    #[test]
    fn test_measurement_register() {
        assert_eq!(measurement_register(false), 0x24);
        assert_eq!(measurement_register(true), 0x2C);
    }

    #[test]
    fn test_settle_times() {
        assert_eq!(Repeatability::Low.settle(), Duration::from_millis(4));
        assert_eq!(Repeatability::Medium.settle(), Duration::from_millis(6));
        assert_eq!(Repeatability::High.settle(), Duration::from_millis(15));
    }

    #[test]
    fn test_intervals() {
        assert_eq!(PeriodicRate::Mps0_5.interval(), Duration::from_secs(2));
        assert_eq!(PeriodicRate::Mps10.interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_codes() {
        assert_eq!(Repeatability::try_from(2), Ok(Repeatability::Medium));
        assert_eq!(Repeatability::try_from(0), Err(SensorError::InvalidConfiguration { value: 0 }));
        assert_eq!(Repeatability::try_from(4), Err(SensorError::InvalidConfiguration { value: 4 }));
        assert_eq!(PeriodicRate::try_from(4), Ok(PeriodicRate::Mps10));
        assert_eq!(PeriodicRate::try_from(5), Err(SensorError::InvalidConfiguration { value: 5 }));
    }

    #[test]
    fn test_alert_commands() {
        assert_eq!(AlertLimit::HighSet.read_command().code(), 0xE11F);
        assert_eq!(AlertLimit::LowSet.read_command().code(), 0xE102);
        assert_eq!(AlertLimit::LowSet.write_command().code(), 0x6100);
        assert_eq!(AlertLimit::LowClear.write_command().code(), 0x610B);
    }
}
