//! Halo network parameters and genesis block definition.

use crate::config::ChainConfig;
use alloy_primitives::{address, Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target block interval in seconds.
pub const HALO_TARGET_BLOCK_TIME: u64 = 4;

/// Genesis gas limit (150M).
pub const HALO_GENESIS_GAS_LIMIT: u64 = 150_000_000;

/// Genesis difficulty, deliberately low for network bootstrap.
pub const HALO_GENESIS_DIFFICULTY: u64 = 500;

/// Difficulty adjustment divisor.
pub const HALO_DIFFICULTY_BOUND_DIVISOR: u64 = 2048;

/// Initial EIP-1559 base fee (1 Gwei).
pub const HALO_INITIAL_BASE_FEE: u64 = 1_000_000_000;

/// EIP-1559 base fee change denominator.
pub const HALO_BASE_FEE_CHANGE_DENOMINATOR: u64 = 8;

/// EIP-1559 elasticity multiplier.
pub const HALO_ELASTICITY_MULTIPLIER: u64 = 2;

/// Ecosystem fund: receives 20% of base fees, and funds per-contract
/// fee sharing.
pub const HALO_ECOSYSTEM_FUND: Address = address!("a7548DF196e2C1476BDc41602E288c0A8F478c4f");

/// Reserve fund: receives 10% of base fees.
pub const HALO_RESERVE_FUND: Address = address!("b95ae9b737e104C666d369CFb16d6De88208Bd80");

/// Genesis block parameters plus initial account allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Chain configuration this genesis seeds.
    pub config: ChainConfig,
    /// Genesis gas limit.
    pub gas_limit: u64,
    /// Genesis difficulty.
    pub difficulty: U256,
    /// Genesis timestamp in Unix seconds.
    pub timestamp: u64,
    /// Genesis extra data.
    pub extra_data: Bytes,
    /// Initial balances.
    pub alloc: BTreeMap<Address, U256>,
}

/// The Halo network genesis block.
///
/// The fund accounts exist from genesis with zero balance; they are funded
/// exclusively through the fee distribution, never pre-mined.
pub fn halo_genesis() -> Genesis {
    let mut alloc = BTreeMap::new();
    alloc.insert(HALO_ECOSYSTEM_FUND, U256::ZERO);
    alloc.insert(HALO_RESERVE_FUND, U256::ZERO);

    Genesis {
        config: ChainConfig::halo(),
        gas_limit: HALO_GENESIS_GAS_LIMIT,
        difficulty: U256::from(HALO_GENESIS_DIFFICULTY),
        timestamp: 1_700_000_000,
        extra_data: Bytes::from_static(b"Halo Network v1 4s"),
        alloc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_parameters() {
        let genesis = halo_genesis();
        assert_eq!(genesis.config.chain_id, 12_000);
        assert_eq!(genesis.gas_limit, 150_000_000);
        assert_eq!(genesis.difficulty, U256::from(500u64));
        assert_eq!(genesis.extra_data.as_ref(), b"Halo Network v1 4s");
    }

    #[test]
    fn fund_accounts_start_empty() {
        let genesis = halo_genesis();
        assert_eq!(genesis.alloc.get(&HALO_ECOSYSTEM_FUND), Some(&U256::ZERO));
        assert_eq!(genesis.alloc.get(&HALO_RESERVE_FUND), Some(&U256::ZERO));
        // No pre-mine beyond the fund placeholders.
        assert_eq!(genesis.alloc.len(), 2);
    }

    #[test]
    fn fund_addresses_are_distinct_and_non_zero() {
        assert_ne!(HALO_ECOSYSTEM_FUND, HALO_RESERVE_FUND);
        assert_ne!(HALO_ECOSYSTEM_FUND, Address::ZERO);
        assert_ne!(HALO_RESERVE_FUND, Address::ZERO);
    }
}
