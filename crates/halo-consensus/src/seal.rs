//! Seal hashing and proof-of-work verification.
//!
//! The PoW hash itself (the Ethash/Keccak mix and its DAG) is an external
//! collaborator behind [`PowHasher`]; this module owns the pre-seal hash the
//! miner commits to and the target comparison.

use alloy_primitives::{keccak256, B256};
use alloy_rlp::Encodable;
use halo_types::Header;
use num_bigint::BigUint;
use num_traits::One;

use crate::error::{ConsensusError, ConsensusResult};
use crate::num::u256_to_biguint;

/// Mix digest and final PoW output for a sealing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowOutput {
    /// Intermediate mix digest committed in the header.
    pub mix_digest: B256,
    /// Final PoW value compared against `2^256 / difficulty`.
    pub result: B256,
}

/// External proof-of-work backend.
pub trait PowHasher: Send + Sync {
    /// Recompute the mix digest and PoW output for a sealing attempt.
    fn compute(&self, seal_hash: B256, nonce: u64, number: u64) -> PowOutput;
}

/// Hash of a header prior to sealing: Keccak-256 over the RLP of every field
/// the miner commits to, excluding the seal itself (mix digest and nonce).
///
/// # Panics
///
/// Panics if any field forbidden on this engine is set. Input headers are
/// screened by validation; reaching here with such a field is a programmer
/// error, not an input error.
pub fn seal_hash(header: &Header) -> B256 {
    assert!(
        header.withdrawals_hash.is_none(),
        "withdrawals hash set on a sealing header"
    );
    assert!(
        header.excess_blob_gas.is_none(),
        "excess blob gas set on a sealing header"
    );
    assert!(
        header.blob_gas_used.is_none(),
        "blob gas used set on a sealing header"
    );
    assert!(
        header.parent_beacon_root.is_none(),
        "parent beacon root set on a sealing header"
    );

    let mut payload = Vec::new();
    header.parent_hash.encode(&mut payload);
    header.ommers_hash.encode(&mut payload);
    header.coinbase.encode(&mut payload);
    header.state_root.encode(&mut payload);
    header.transactions_root.encode(&mut payload);
    header.receipts_root.encode(&mut payload);
    header.logs_bloom.encode(&mut payload);
    header.difficulty.encode(&mut payload);
    header.number.encode(&mut payload);
    header.gas_limit.encode(&mut payload);
    header.gas_used.encode(&mut payload);
    header.time.encode(&mut payload);
    header.extra_data.encode(&mut payload);
    if let Some(base_fee) = header.base_fee {
        base_fee.encode(&mut payload);
    }

    let mut encoded = Vec::with_capacity(payload.len() + 4);
    alloy_rlp::Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut encoded);
    encoded.extend_from_slice(&payload);
    keccak256(&encoded)
}

/// Verify the seal of a header against the external PoW backend.
pub(crate) fn verify_seal(pow: &dyn PowHasher, header: &Header) -> ConsensusResult<()> {
    if header.difficulty.is_zero() {
        return Err(ConsensusError::NonPositiveDifficulty);
    }

    let nonce = u64::from_be_bytes(header.nonce.0);
    let output = pow.compute(seal_hash(header), nonce, header.number);
    if output.mix_digest != header.mix_digest {
        return Err(ConsensusError::InvalidMixDigest);
    }

    // result <= 2^256 / difficulty, computed wide since 2^256 overflows.
    let target = (BigUint::one() << 256u32) / u256_to_biguint(header.difficulty);
    if BigUint::from_bytes_be(output.result.as_slice()) > target {
        return Err(ConsensusError::InvalidPow);
    }
    Ok(())
}
