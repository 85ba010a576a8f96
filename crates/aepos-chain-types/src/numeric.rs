//! Big-endian byte helpers for arbitrary-precision values.
//!
//! RLP and the kernel preimage both use minimal big-endian encodings where
//! zero is the empty byte string, which differs from `BigUint::to_bytes_be`
//! (zero encodes as a single `0x00` there).

use num_bigint::BigUint;
use num_traits::Zero;

/// Minimal big-endian bytes of `value`; empty for zero.
pub fn big_endian_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

/// Minimal big-endian bytes of `value`; empty for zero.
pub fn u64_big_endian_bytes(value: u64) -> Vec<u8> {
    big_endian_bytes(&BigUint::from(value))
}

/// Left-pad `value`'s big-endian bytes to `width`; fails if it does not fit.
pub fn big_endian_fixed(value: &BigUint, width: usize) -> Option<Vec<u8>> {
    let bytes = big_endian_bytes(value);
    if bytes.len() > width {
        return None;
    }
    let mut out = vec![0u8; width];
    out[width - bytes.len()..].copy_from_slice(&bytes);
    Some(out)
}
