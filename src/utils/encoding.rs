//! Fixed-width binary-string encoding and label packing

use crate::{Result, YgcError};
use num_bigint::BigUint;

/// Renders an integer as a fixed-width big-endian bit string.
///
/// Pads with leading zeros up to `width`; values wider than `width` keep
/// their natural length.
pub fn to_bin_of_size(x: &BigUint, width: usize) -> String {
    let raw = x.to_str_radix(2);
    if raw.len() >= width {
        raw
    } else {
        let mut padded = "0".repeat(width - raw.len());
        padded.push_str(&raw);
        padded
    }
}

/// Packs a wire label and its permutation bit into one (K+1)-bit integer,
/// label in the high K bits, permutation bit in the low bit.
pub fn pack_label(label: &BigUint, perm_bit: u8) -> BigUint {
    (label.clone() << 1u32) | BigUint::from(perm_bit)
}

/// Splits a (K+1)-bit packed value back into (label, permutation bit).
///
/// Values wider than K+1 bits cannot be a packed label and indicate a
/// corrupted transcript.
pub fn unpack_label(packed: &BigUint, label_bits: u64) -> Result<(BigUint, u8)> {
    if packed.bits() > label_bits + 1 {
        return Err(YgcError::DecodeFailure(format!(
            "packed value spans {} bits, labels are {} bits",
            packed.bits(),
            label_bits
        )));
    }
    let perm_bit = u8::from(packed.bit(0));
    Ok((packed >> 1u32, perm_bit))
}
