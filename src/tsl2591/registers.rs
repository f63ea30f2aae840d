// src/tsl2591/registers.rs

//! TSL2591 register map and configuration encodings (ams datasheet, "Register Set").

use core::time::Duration;

use crate::common::SensorError;

/// Fixed I2C address of the TSL2591.
pub const DEVICE_ADDRESS: u8 = 0x29;
/// Value of the ID register on every TSL2591.
pub const DEVICE_ID: u8 = 0x50;

// --- Command byte ---
/// Normal register access: CMD bit plus transaction type `01`.
pub const COMMAND_NORMAL: u8 = 0xA0;
/// Special function: force an ALS interrupt.
pub const SPECIAL_FORCE_INTERRUPT: u8 = 0x04;
/// Special function: clear the ALS interrupt.
pub const SPECIAL_CLEAR_INTERRUPT: u8 = 0x06;
/// Special function: clear ALS and no-persist interrupts.
pub const SPECIAL_CLEAR_ALL: u8 = 0x07;
/// Transaction type `11` selects a special function instead of a register.
pub const COMMAND_SPECIAL: u8 = 0xE0;

/// Register pointer byte for a normal access to `register`.
#[inline]
pub const fn normal(register: u8) -> u8 {
    COMMAND_NORMAL | register
}

/// Command byte for a special function (0xE4, 0xE6, 0xE7).
#[inline]
pub const fn special(function: u8) -> u8 {
    COMMAND_SPECIAL | function
}

// --- Registers ---
pub const ENABLE: u8 = 0x00;
pub const CONTROL: u8 = 0x01;
/// ALS low threshold, little-endian word.
pub const AILTL: u8 = 0x04;
/// ALS high threshold, little-endian word.
pub const AIHTL: u8 = 0x06;
/// No-persist low threshold, little-endian word.
pub const NPAILTL: u8 = 0x08;
/// No-persist high threshold, little-endian word.
pub const NPAIHTL: u8 = 0x0A;
pub const PERSIST: u8 = 0x0C;
pub const PACKAGE_ID: u8 = 0x11;
pub const ID: u8 = 0x12;
pub const STATUS: u8 = 0x13;
/// Channel 0 (full spectrum), little-endian word.
pub const C0DATAL: u8 = 0x14;
/// Channel 1 (infrared), little-endian word.
pub const C1DATAL: u8 = 0x16;

// --- ENABLE bits ---
pub const ENABLE_POWER_ON: u8 = 0x01;
pub const ENABLE_AEN: u8 = 0x02;
pub const ENABLE_AIEN: u8 = 0x10;
pub const ENABLE_SAI: u8 = 0x40;
pub const ENABLE_NPIEN: u8 = 0x80;
/// Written to ENABLE to power the device down.
pub const ENABLE_POWER_OFF: u8 = 0xD0;

// --- CONTROL bits ---
/// System reset. The device resets before it acknowledges the write.
pub const CONTROL_SRESET: u8 = 0x80;
pub const CONTROL_GAIN_MASK: u8 = 0x30;
pub const CONTROL_TIME_MASK: u8 = 0x07;

// --- STATUS bits ---
pub const STATUS_AVALID: u8 = 0x01;
pub const STATUS_AINT: u8 = 0x10;
pub const STATUS_NPINTR: u8 = 0x20;

pub const PERSIST_MASK: u8 = 0x0F;

/// Channel count above which a 100 ms integration is saturated.
pub const MAX_COUNT_100MS: u16 = 36863;
/// Channel count above which any longer integration is saturated.
pub const MAX_COUNT: u16 = 65535;

/// Analog gain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    #[default]
    Low = 0x00,
    Medium = 0x10,
    High = 0x20,
    Max = 0x30,
}

impl Gain {
    /// CONTROL register bits.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the gain bits of a CONTROL register value; other bits are ignored.
    pub const fn from_control(control: u8) -> Self {
        match control & CONTROL_GAIN_MASK {
            0x00 => Gain::Low,
            0x10 => Gain::Medium,
            0x20 => Gain::High,
            _ => Gain::Max,
        }
    }

    /// Multiplier used by the lux formula.
    pub const fn multiplier(self) -> f32 {
        match self {
            Gain::Low => 1.0,
            Gain::Medium => 25.0,
            Gain::High => 428.0,
            Gain::Max => 9876.0,
        }
    }
}

impl TryFrom<u8> for Gain {
    type Error = SensorError<()>;

    /// Accepts the CONTROL encodings 0x00, 0x10, 0x20 and 0x30.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Gain::Low),
            0x10 => Ok(Gain::Medium),
            0x20 => Ok(Gain::High),
            0x30 => Ok(Gain::Max),
            _ => Err(SensorError::InvalidConfiguration { value }),
        }
    }
}

/// ADC integration time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IntegrationTime {
    #[default]
    Ms100 = 0,
    Ms200 = 1,
    Ms300 = 2,
    Ms400 = 3,
    Ms500 = 4,
    Ms600 = 5,
}

impl IntegrationTime {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the time bits of a CONTROL register value. Reserved codes
    /// (6, 7) yield `None`.
    pub const fn from_control(control: u8) -> Option<Self> {
        match control & CONTROL_TIME_MASK {
            0 => Some(IntegrationTime::Ms100),
            1 => Some(IntegrationTime::Ms200),
            2 => Some(IntegrationTime::Ms300),
            3 => Some(IntegrationTime::Ms400),
            4 => Some(IntegrationTime::Ms500),
            5 => Some(IntegrationTime::Ms600),
            _ => None,
        }
    }

    pub const fn millis(self) -> u16 {
        (self as u16 + 1) * 100
    }

    /// Driver wait between two data reads: one second per 100 ms of integration.
    pub const fn wait(self) -> Duration {
        Duration::from_secs(self as u64 + 1)
    }

    /// Largest unsaturated channel count at this integration time.
    pub const fn max_count(self) -> u16 {
        match self {
            IntegrationTime::Ms100 => MAX_COUNT_100MS,
            _ => MAX_COUNT,
        }
    }
}

impl TryFrom<u8> for IntegrationTime {
    type Error = SensorError<()>;

    /// Accepts the CONTROL encodings 0 (100 ms) through 5 (600 ms).
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        IntegrationTime::from_control(value)
            .filter(|_| value <= CONTROL_TIME_MASK)
            .ok_or(SensorError::InvalidConfiguration { value })
    }
}

/// Number of consecutive out-of-range cycles before an ALS interrupt.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Persist {
    /// Every ALS cycle interrupts.
    #[default]
    Every = 0x00,
    /// Any value outside the thresholds.
    Any = 0x01,
    Cycles2 = 0x02,
    Cycles3 = 0x03,
    Cycles5 = 0x04,
    Cycles10 = 0x05,
    Cycles15 = 0x06,
    Cycles20 = 0x07,
    Cycles25 = 0x08,
    Cycles30 = 0x09,
    Cycles35 = 0x0A,
    Cycles40 = 0x0B,
    Cycles45 = 0x0C,
    Cycles50 = 0x0D,
    Cycles55 = 0x0E,
    Cycles60 = 0x0F,
}

impl Persist {
    const ALL: [Persist; 16] = [
        Persist::Every,
        Persist::Any,
        Persist::Cycles2,
        Persist::Cycles3,
        Persist::Cycles5,
        Persist::Cycles10,
        Persist::Cycles15,
        Persist::Cycles20,
        Persist::Cycles25,
        Persist::Cycles30,
        Persist::Cycles35,
        Persist::Cycles40,
        Persist::Cycles45,
        Persist::Cycles50,
        Persist::Cycles55,
        Persist::Cycles60,
    ];

    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the low nibble of the PERSIST register.
    pub const fn from_register(value: u8) -> Self {
        Self::ALL[(value & PERSIST_MASK) as usize]
    }
}

impl TryFrom<u8> for Persist {
    type Error = SensorError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > PERSIST_MASK {
            return Err(SensorError::InvalidConfiguration { value });
        }
        Ok(Persist::from_register(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes() {
        assert_eq!(normal(ID), 0xB2);
        assert_eq!(normal(C0DATAL), 0xB4);
        assert_eq!(special(SPECIAL_FORCE_INTERRUPT), 0xE4);
        assert_eq!(special(SPECIAL_CLEAR_INTERRUPT), 0xE6);
        assert_eq!(special(SPECIAL_CLEAR_ALL), 0xE7);
    }

    #[test]
    fn test_gain_codes() {
        assert_eq!(Gain::try_from(0x20), Ok(Gain::High));
        assert_eq!(Gain::try_from(0x01), Err(SensorError::InvalidConfiguration { value: 0x01 }));
        assert_eq!(Gain::from_control(0xF5), Gain::Max);
        assert_eq!(Gain::from_control(0x15), Gain::Medium);
        assert_eq!(Gain::Medium.multiplier(), 25.0);
        assert_eq!(Gain::Max.multiplier(), 9876.0);
    }

    #[test]
    fn test_integration_time_codes() {
        assert_eq!(IntegrationTime::try_from(5), Ok(IntegrationTime::Ms600));
        assert_eq!(IntegrationTime::try_from(6), Err(SensorError::InvalidConfiguration { value: 6 }));
        assert_eq!(IntegrationTime::try_from(0x10), Err(SensorError::InvalidConfiguration { value: 0x10 }));
        assert_eq!(IntegrationTime::from_control(0x31), Some(IntegrationTime::Ms200));
        assert_eq!(IntegrationTime::from_control(0x07), None);
    }

    #[test]
    fn test_integration_time_derived_values() {
        assert_eq!(IntegrationTime::Ms100.millis(), 100);
        assert_eq!(IntegrationTime::Ms600.millis(), 600);
        assert_eq!(IntegrationTime::Ms100.wait(), Duration::from_secs(1));
        assert_eq!(IntegrationTime::Ms300.wait(), Duration::from_secs(3));
        assert_eq!(IntegrationTime::Ms100.max_count(), 36863);
        assert_eq!(IntegrationTime::Ms200.max_count(), 65535);
    }

    #[test]
    fn test_persist_codes() {
        assert_eq!(Persist::try_from(0x0F), Ok(Persist::Cycles60));
        assert_eq!(Persist::try_from(0x04), Ok(Persist::Cycles5));
        assert_eq!(Persist::try_from(0x10), Err(SensorError::InvalidConfiguration { value: 0x10 }));
        assert_eq!(Persist::from_register(0xF2), Persist::Cycles2);
        for (code, persist) in Persist::ALL.iter().enumerate() {
            assert_eq!(persist.bits() as usize, code);
        }
    }
}
