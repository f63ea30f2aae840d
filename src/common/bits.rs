// src/common/bits.rs

/// Read-modify-write helper for register fields.
///
/// Clears every bit of `clear_mask` in `current` and ORs in `new_bits`
/// restricted to that mask, leaving all other bits untouched.
#[inline]
pub const fn apply_bits(current: u8, clear_mask: u8, new_bits: u8) -> u8 {
    (current & !clear_mask) | (new_bits & clear_mask)
}

/// True if any bit of `mask` is set in `value`.
#[inline]
pub const fn is_set(value: u16, mask: u16) -> bool {
    value & mask != 0
}
