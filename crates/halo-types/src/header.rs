//! Block header type with RLP encoding and Keccak-256 hashing.

use alloy_primitives::{b256, keccak256, Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{BufMut, Encodable};
use serde::{Deserialize, Serialize};

/// Keccak-256 of the RLP encoding of an empty header list (`0xc0`).
///
/// A header whose `ommers_hash` equals this value embeds no uncles.
pub const EMPTY_OMMERS_HASH: B256 =
    b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");

/// A block header.
///
/// Immutable once sealed. The trailing optional fields are encoded only when
/// present; on the Halo chain variant every post-EIP-1559 field except
/// `base_fee` is forbidden and rejected by the consensus engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Hash of the parent block header.
    pub parent_hash: B256,
    /// Hash of the RLP-encoded uncle header list.
    pub ommers_hash: B256,
    /// Beneficiary address credited with block rewards and fees.
    pub coinbase: Address,
    /// State trie root after executing this block.
    pub state_root: B256,
    /// Transactions trie root.
    pub transactions_root: B256,
    /// Receipts trie root.
    pub receipts_root: B256,
    /// Bloom filter over the logs of this block.
    pub logs_bloom: Bloom,
    /// Proof-of-work difficulty target, always >= 1 on a live chain.
    pub difficulty: U256,
    /// Block height.
    pub number: u64,
    /// Gas limit, <= 2^63 - 1.
    pub gas_limit: u64,
    /// Gas consumed, <= `gas_limit`.
    pub gas_used: u64,
    /// Block timestamp in Unix seconds.
    pub time: u64,
    /// Arbitrary extra data, at most 32 bytes.
    pub extra_data: Bytes,
    /// Ethash mix digest, part of the seal.
    pub mix_digest: B256,
    /// Ethash nonce, part of the seal.
    pub nonce: B64,
    /// EIP-1559 base fee, present iff the fork is active at this height.
    pub base_fee: Option<U256>,
    /// EIP-4895 withdrawals root. Forbidden on the Halo variant.
    pub withdrawals_hash: Option<B256>,
    /// EIP-4844 blob gas used. Forbidden on the Halo variant.
    pub blob_gas_used: Option<u64>,
    /// EIP-4844 excess blob gas. Forbidden on the Halo variant.
    pub excess_blob_gas: Option<u64>,
    /// EIP-4788 parent beacon block root. Forbidden on the Halo variant.
    pub parent_beacon_root: Option<B256>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parent_hash: B256::ZERO,
            ommers_hash: EMPTY_OMMERS_HASH,
            coinbase: Address::ZERO,
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::from(1u64),
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            time: 0,
            extra_data: Bytes::new(),
            mix_digest: B256::ZERO,
            nonce: B64::ZERO,
            base_fee: None,
            withdrawals_hash: None,
            blob_gas_used: None,
            excess_blob_gas: None,
            parent_beacon_root: None,
        }
    }
}

impl Header {
    /// Keccak-256 of the full RLP encoding of this header.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }

    /// Whether this header embeds any uncles.
    pub fn has_ommers(&self) -> bool {
        self.ommers_hash != EMPTY_OMMERS_HASH
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        self.parent_hash.encode(out);
        self.ommers_hash.encode(out);
        self.coinbase.encode(out);
        self.state_root.encode(out);
        self.transactions_root.encode(out);
        self.receipts_root.encode(out);
        self.logs_bloom.encode(out);
        self.difficulty.encode(out);
        self.number.encode(out);
        self.gas_limit.encode(out);
        self.gas_used.encode(out);
        self.time.encode(out);
        self.extra_data.encode(out);
        self.mix_digest.encode(out);
        self.nonce.encode(out);
        // Trailing optionals, in canonical order. Encoded only when present.
        if let Some(base_fee) = self.base_fee {
            base_fee.encode(out);
        }
        if let Some(withdrawals_hash) = self.withdrawals_hash {
            withdrawals_hash.encode(out);
        }
        if let Some(blob_gas_used) = self.blob_gas_used {
            blob_gas_used.encode(out);
        }
        if let Some(excess_blob_gas) = self.excess_blob_gas {
            excess_blob_gas.encode(out);
        }
        if let Some(parent_beacon_root) = self.parent_beacon_root {
            parent_beacon_root.encode(out);
        }
    }
}

impl Encodable for Header {
    fn encode(&self, out: &mut dyn BufMut) {
        let mut payload = Vec::new();
        self.encode_fields(&mut payload);
        alloy_rlp::Header {
            list: true,
            payload_length: payload.len(),
        }
        .encode(out);
        out.put_slice(&payload);
    }
}
