//! Conversions between 256-bit header arithmetic and unbounded integers.
//!
//! Window sums, the classic difficulty bomb, and the PoW target `2^256 / d`
//! can all exceed 256 bits mid-computation, so those paths run on `BigUint`
//! and convert back at the edges.

use alloy_primitives::U256;
use num_bigint::BigUint;

/// Widen a 256-bit value.
pub(crate) fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

/// Narrow an unbounded value, saturating at `U256::MAX`.
pub(crate) fn biguint_to_u256(value: &BigUint) -> U256 {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        U256::MAX
    } else {
        U256::from_be_slice(&bytes)
    }
}
