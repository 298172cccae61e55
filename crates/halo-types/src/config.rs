//! Chain configuration and profile dispatch.
//!
//! Several chains share one engine. Everything that varies by chain — fork
//! activation points, uncle limits, timestamp tolerances, EIP-1559
//! parameters, fund addresses — is centralized here so consensus code never
//! branches on a raw chain id.

use crate::genesis;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Chain id of the Halo network.
pub const HALO_CHAIN_ID: u64 = 12_000;

/// Consensus behavior family selected by the chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainProfile {
    /// The Halo network: 4-second blocks, multi-layer difficulty defense,
    /// 1 uncle at depth <= 2, 30-second future tolerance.
    Halo,
    /// Ethereum-family chains using the classic difficulty algorithm,
    /// 2 uncles at depth <= 7, 15-second future tolerance.
    Classic,
}

/// Error produced when a chain configuration fails validation.
///
/// Names the offending field so operators can fix their config directly.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that is missing or invalid.
    pub field: &'static str,
    /// Description of the error.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain config error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Chain parameters: identity, fork schedule, and chain-level constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain id; 12000 selects the Halo profile.
    pub chain_id: u64,

    /// Homestead (EIP-2) activation block.
    pub homestead_block: Option<u64>,
    /// Byzantium (EIP-100b uncle-aware difficulty) activation block.
    pub byzantium_block: Option<u64>,
    /// EIP-1559 activation block.
    pub eip1559_block: Option<u64>,
    /// Difficulty bomb disposal (ECIP-1041) activation block.
    pub disposal_block: Option<u64>,

    /// ECIP-1010 bomb pause activation block.
    pub ecip1010_pause_block: Option<u64>,
    /// ECIP-1010 pause length in blocks.
    pub ecip1010_length: u64,
    /// Difficulty bomb delays: activation block -> delay in blocks.
    /// Delays compound across entries.
    pub difficulty_bomb_delays: BTreeMap<u64, u64>,

    /// DAO hard-fork block, if this chain observed it.
    pub dao_fork_block: Option<u64>,
    /// Whether this chain supports the DAO fork (true) or opposes it (false).
    pub dao_fork_support: bool,

    /// Base fee of the first EIP-1559 block, in wei.
    pub initial_base_fee: u64,
    /// EIP-1559 base fee change denominator.
    pub base_fee_change_denominator: u64,
    /// EIP-1559 elasticity multiplier.
    pub elasticity_multiplier: u64,

    /// Ecosystem fund address (Halo fee distribution). Must be non-zero.
    pub ecosystem_fund: Address,
    /// Reserve fund address (Halo fee distribution). Must be non-zero.
    pub reserve_fund: Address,
}

impl ChainConfig {
    /// Configuration of the Halo network: every fork active from genesis,
    /// difficulty bomb defused, EIP-1559 with the custom 4-way fee split.
    pub fn halo() -> Self {
        Self {
            chain_id: HALO_CHAIN_ID,
            homestead_block: Some(0),
            byzantium_block: Some(0),
            eip1559_block: Some(0),
            disposal_block: Some(0),
            ecip1010_pause_block: None,
            ecip1010_length: 0,
            difficulty_bomb_delays: BTreeMap::new(),
            dao_fork_block: None,
            dao_fork_support: false,
            initial_base_fee: genesis::HALO_INITIAL_BASE_FEE,
            base_fee_change_denominator: genesis::HALO_BASE_FEE_CHANGE_DENOMINATOR,
            elasticity_multiplier: genesis::HALO_ELASTICITY_MULTIPLIER,
            ecosystem_fund: genesis::HALO_ECOSYSTEM_FUND,
            reserve_fund: genesis::HALO_RESERVE_FUND,
        }
    }

    /// The behavior family this configuration selects.
    pub fn profile(&self) -> ChainProfile {
        if self.chain_id == HALO_CHAIN_ID {
            ChainProfile::Halo
        } else {
            ChainProfile::Classic
        }
    }

    /// Whether this is the Halo network.
    pub fn is_halo(&self) -> bool {
        self.profile() == ChainProfile::Halo
    }

    /// Maximum seconds a block timestamp may run ahead of local time.
    ///
    /// Halo tolerates 30 s of operational clock drift between distributed
    /// mining setups; this bounds acceptance only, never difficulty.
    pub fn future_tolerance_secs(&self) -> u64 {
        match self.profile() {
            ChainProfile::Halo => 30,
            ChainProfile::Classic => 15,
        }
    }

    /// Maximum number of uncles in a single block.
    pub fn max_uncles(&self) -> usize {
        match self.profile() {
            ChainProfile::Halo => 1,
            ChainProfile::Classic => 2,
        }
    }

    /// Maximum depth of an uncle behind its including block.
    pub fn max_uncle_depth(&self) -> u64 {
        match self.profile() {
            ChainProfile::Halo => 2,
            ChainProfile::Classic => 7,
        }
    }

    fn enabled(fork: Option<u64>, number: u64) -> bool {
        fork.is_some_and(|activation| number >= activation)
    }

    /// Whether Homestead (EIP-2) rules apply at `number`.
    pub fn is_homestead(&self, number: u64) -> bool {
        Self::enabled(self.homestead_block, number)
    }

    /// Whether Byzantium (EIP-100b) rules apply at `number`.
    pub fn is_byzantium(&self, number: u64) -> bool {
        Self::enabled(self.byzantium_block, number)
    }

    /// Whether EIP-1559 applies at `number`.
    pub fn is_eip1559(&self, number: u64) -> bool {
        Self::enabled(self.eip1559_block, number)
    }

    /// Whether the difficulty bomb is defused at `number` (ECIP-1041).
    pub fn is_bomb_disposed(&self, number: u64) -> bool {
        Self::enabled(self.disposal_block, number)
    }

    /// Whether the ECIP-1010 bomb pause applies at `number`.
    pub fn is_ecip1010_paused(&self, number: u64) -> bool {
        Self::enabled(self.ecip1010_pause_block, number)
    }

    /// Validate chain-level constants, naming the offending field on error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_halo() {
            if self.ecosystem_fund == Address::ZERO {
                return Err(ConfigError {
                    field: "ecosystem_fund",
                    message: "cannot be the zero address".to_string(),
                });
            }
            if self.reserve_fund == Address::ZERO {
                return Err(ConfigError {
                    field: "reserve_fund",
                    message: "cannot be the zero address".to_string(),
                });
            }
        }
        if self.base_fee_change_denominator == 0 {
            return Err(ConfigError {
                field: "base_fee_change_denominator",
                message: "must be non-zero".to_string(),
            });
        }
        if self.elasticity_multiplier == 0 {
            return Err(ConfigError {
                field: "elasticity_multiplier",
                message: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
