//! Block body types.

use crate::header::Header;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// The transaction shape consumed by the consensus core.
///
/// Execution is out of scope here; the core only needs the callee (for
/// per-contract fee sharing) and the gas the transaction consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction hash.
    pub hash: B256,
    /// Callee address; `None` for contract creation.
    pub to: Option<Address>,
    /// Gas consumed by this transaction.
    pub gas_used: u64,
    /// Opaque payload.
    pub input: Bytes,
}

/// A beacon-chain withdrawal operation (EIP-4895).
///
/// The Halo engine does not support withdrawals; this type exists so the
/// engine can reject non-empty withdrawal lists at the interface boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Monotonic withdrawal index.
    pub index: u64,
    /// Validator index on the beacon chain.
    pub validator_index: u64,
    /// Recipient address.
    pub address: Address,
    /// Amount in Gwei.
    pub amount: u64,
}

/// A full block: header plus transactions and uncle headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block header.
    pub header: Header,
    /// Transaction list.
    pub transactions: Vec<Transaction>,
    /// Uncle headers, bounded by the chain profile's uncle cap.
    pub ommers: Vec<Header>,
}

impl Block {
    /// Assemble a block from its parts.
    pub fn new(header: Header, transactions: Vec<Transaction>, ommers: Vec<Header>) -> Self {
        Self {
            header,
            transactions,
            ommers,
        }
    }

    /// Block hash (the header hash).
    pub fn hash(&self) -> B256 {
        self.header.hash()
    }

    /// Block height.
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Parent block hash.
    pub fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }

    /// Total base-fee revenue of this block, if EIP-1559 is active.
    pub fn base_fee_revenue(&self) -> Option<U256> {
        self.header
            .base_fee
            .map(|fee| fee * U256::from(self.header.gas_used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_hash_is_header_hash() {
        let mut header = Header::default();
        header.number = 7;
        let block = Block::new(header.clone(), vec![], vec![]);
        assert_eq!(block.hash(), header.hash());
        assert_eq!(block.number(), 7);
    }

    #[test]
    fn base_fee_revenue() {
        let mut header = Header::default();
        header.gas_used = 3;
        header.base_fee = Some(U256::from(7u64));
        let block = Block::new(header, vec![], vec![]);
        assert_eq!(block.base_fee_revenue(), Some(U256::from(21u64)));

        let block = Block::new(Header::default(), vec![], vec![]);
        assert_eq!(block.base_fee_revenue(), None);
    }
}
