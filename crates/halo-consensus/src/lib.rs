//! # halo-consensus
//!
//! Consensus rules for the Halo chain family.
//!
//! This crate provides:
//! - The multi-layer Halo difficulty adjustment algorithm and the classic
//!   Ethereum-family algorithm for other chains
//! - Full header, uncle, and seal validation
//! - Parallel batch verification with in-order result delivery
//! - The phased block reward schedule and the four-way base-fee
//!   distribution with per-contract fee sharing
//!
//! ## Difficulty defense
//!
//! Halo layers several protections that each cover the others' blind spots:
//! timestamp capping removes future-stamp gaming, bounded per-block change
//! caps volatility, phased minimums harden the young network, multi-window
//! average floors force an attacker to depress every time horizon at once,
//! and an absolute hard floor backstops everything.
//!
//! The proof-of-work hash itself and the state database are external
//! collaborators, consumed through the [`PowHasher`], [`ChainReader`], and
//! [`StateAccess`] seams.

mod batch;
mod chain;
mod classic;
mod clock;
mod difficulty;
mod eip1559;
mod engine;
mod error;
mod fees;
mod num;
mod rewards;
mod seal;
mod state;
pub mod testing;
mod validation;

pub use batch::AbortHandle;
pub use chain::ChainReader;
pub use classic::classic_difficulty;
pub use clock::{Clock, FixedClock, SystemClock};
pub use difficulty::{calc_difficulty, halo_difficulty, HARD_FLOOR};
pub use eip1559::calc_base_fee;
pub use engine::Engine;
pub use error::{ConsensusError, ConsensusResult};
pub use fees::{
    apply_contract_fee_sharing, distribute_base_fee, fee_share_config, set_fee_share_config,
    validate_fund_addresses, FeeShareConfig, BURN_RATIO, ECOSYSTEM_RATIO,
    FEE_SHARE_ENABLED_SLOT, FEE_SHARE_PERCENT_SLOT, FEE_SHARE_RECIPIENT_SLOT, MINER_RATIO,
    RESERVE_RATIO,
};
pub use rewards::{apply_block_rewards, base_reward, max_supply, nephew_reward, uncle_reward};
pub use seal::{seal_hash, PowHasher, PowOutput};
pub use state::{MemoryState, StateAccess};
