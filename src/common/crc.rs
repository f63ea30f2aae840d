// src/common/crc.rs

use super::error::SensorError;
use crc::{Algorithm, Crc};

/// CRC-8 algorithm used by the SHT3x family to protect every 16-bit word.
/// Polynomial: 0x31 (x^8 + x^5 + x^4 + 1)
/// Initial Value: 0xFF
/// Input Reflected: false
/// Output Reflected: false
/// Final XOR: 0x00
/// Check Value: 0xF7 (for "123456789"), identical to CRC-8/NRSC-5
/// Residue: 0x00
pub const SHT_CRC: Algorithm<u8> = Algorithm {
    width: 8,
    poly: 0x31,
    init: 0xFF,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xF7,
    residue: 0x00,
};

// Create a Crc instance for the algorithm for reuse.
const CRC_COMPUTER: Crc<u8> = Crc::<u8>::new(&SHT_CRC);

/// Calculates the CRC-8 over `data`.
///
/// Starting from `0xFF`, each byte is XORed into the register which is then
/// shifted left eight times, XORing in `0x31` whenever the high bit falls out.
/// Pure and deterministic.
#[inline]
pub fn crc8(data: &[u8]) -> u8 {
    CRC_COMPUTER.checksum(data)
}

/// Verifies a `[msb, lsb, crc]` group and returns the big-endian word it carries.
///
/// # Returns
///
/// * `Ok(word)` if the checksum matches.
/// * `Err(SensorError::CrcMismatch)` if it does not.
pub fn verify_word<E>(group: &[u8; 3]) -> Result<u16, SensorError<E>>
where
    E: core::fmt::Debug,
{
    let calculated = crc8(&group[..2]);
    if calculated == group[2] {
        Ok(u16::from_be_bytes([group[0], group[1]]))
    } else {
        Err(SensorError::CrcMismatch { expected: group[2], calculated })
    }
}

/// Encodes a word as it travels on the wire: `[msb, lsb, crc]`.
pub fn encode_word(word: u16) -> [u8; 3] {
    let [msb, lsb] = word.to_be_bytes();
    [msb, lsb, crc8(&[msb, lsb])]
}
