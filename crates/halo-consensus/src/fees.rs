//! Halo base-fee distribution and per-contract fee sharing.
//!
//! Instead of burning the whole base fee, Halo splits it four ways: 40%
//! burned, 30% to the miner, 20% to the ecosystem fund, 10% to the reserve
//! fund. Contracts may opt in to fee sharing, which siphons a percentage of
//! the ecosystem portion to a recipient of their choice; miner and reserve
//! shares are never reduced by it. Priority fees are untouched and go to the
//! miner through the normal payment path.

use alloy_primitives::{b256, Address, B256, U256};
use halo_types::{ChainConfig, Header};
use tracing::debug;

use crate::error::{ConsensusError, ConsensusResult};
use crate::state::StateAccess;

/// Burned share of the base fee, per 1000.
pub const BURN_RATIO: u64 = 400;
/// Miner share of the base fee, per 1000.
pub const MINER_RATIO: u64 = 300;
/// Ecosystem fund share of the base fee, per 1000.
pub const ECOSYSTEM_RATIO: u64 = 200;
/// Reserve fund share of the base fee, per 1000.
pub const RESERVE_RATIO: u64 = 100;
/// Ratio denominator.
pub const RATIO_DENOMINATOR: u64 = 1000;

/// Storage slot holding the fee-share enabled flag.
/// keccak256("halo.feeshare.enabled") - 1
pub const FEE_SHARE_ENABLED_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");
/// Storage slot holding the fee-share recipient address.
/// keccak256("halo.feeshare.recipient") - 1
pub const FEE_SHARE_RECIPIENT_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbd");
/// Storage slot holding the fee-share percentage.
/// keccak256("halo.feeshare.percent") - 1
pub const FEE_SHARE_PERCENT_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbe");

/// Per-contract fee sharing record, read from the contract's own storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeShareConfig {
    /// Whether fee sharing is enabled for this contract.
    pub enabled: bool,
    /// Recipient of the contract's share.
    pub recipient: Address,
    /// Share of the ecosystem portion, 0-100.
    pub percent: u8,
}

impl FeeShareConfig {
    /// A disabled record.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            recipient: Address::ZERO,
            percent: 0,
        }
    }
}

/// Check that the configured fund addresses are usable.
pub fn validate_fund_addresses(config: &ChainConfig) -> ConsensusResult<()> {
    if config.ecosystem_fund == Address::ZERO {
        return Err(ConsensusError::ZeroEcosystemAddress);
    }
    if config.reserve_fund == Address::ZERO {
        return Err(ConsensusError::ZeroReserveAddress);
    }
    Ok(())
}

/// Split a block's base-fee revenue and credit each recipient.
///
/// The burned 40% is simply never credited, reducing total supply. A zero
/// revenue block is a successful no-op.
pub fn distribute_base_fee(
    state: &mut dyn StateAccess,
    config: &ChainConfig,
    header: &Header,
    base_fee: U256,
    gas_used: u64,
) -> ConsensusResult<()> {
    validate_fund_addresses(config)?;

    let total = base_fee * U256::from(gas_used);
    if total.is_zero() {
        return Ok(());
    }

    let denominator = U256::from(RATIO_DENOMINATOR);
    let miner_share = total * U256::from(MINER_RATIO) / denominator;
    let ecosystem_share = total * U256::from(ECOSYSTEM_RATIO) / denominator;
    let reserve_share = total * U256::from(RESERVE_RATIO) / denominator;

    state.add_balance(header.coinbase, miner_share);
    state.add_balance(config.ecosystem_fund, ecosystem_share);
    state.add_balance(config.reserve_fund, reserve_share);

    debug!(
        number = header.number,
        %total,
        %miner_share,
        %ecosystem_share,
        %reserve_share,
        "distributed base fee"
    );
    Ok(())
}

/// Read a contract's fee-share record from its storage.
///
/// Records that cannot be honored — percent above 100 or a zero recipient —
/// read back as disabled.
pub fn fee_share_config(state: &dyn StateAccess, contract: Address) -> FeeShareConfig {
    let enabled = !state.storage(contract, FEE_SHARE_ENABLED_SLOT).is_zero();
    if !enabled {
        return FeeShareConfig::disabled();
    }

    let recipient = Address::from_word(state.storage(contract, FEE_SHARE_RECIPIENT_SLOT));
    if recipient == Address::ZERO {
        return FeeShareConfig::disabled();
    }

    let percent_raw = U256::from_be_bytes(state.storage(contract, FEE_SHARE_PERCENT_SLOT).0);
    if percent_raw > U256::from(100u64) {
        return FeeShareConfig::disabled();
    }

    FeeShareConfig {
        enabled: true,
        recipient,
        percent: percent_raw.to::<u8>(),
    }
}

/// Write a contract's fee-share record into its storage.
///
/// Access control belongs to the contract itself; this only performs the
/// storage writes and rejects out-of-range percentages.
pub fn set_fee_share_config(
    state: &mut dyn StateAccess,
    contract: Address,
    config: &FeeShareConfig,
) -> ConsensusResult<()> {
    if config.percent > 100 {
        return Err(ConsensusError::InvalidFeePercent(config.percent));
    }

    let enabled = if config.enabled {
        B256::with_last_byte(1)
    } else {
        B256::ZERO
    };
    state.set_storage(contract, FEE_SHARE_ENABLED_SLOT, enabled);
    state.set_storage(contract, FEE_SHARE_RECIPIENT_SLOT, config.recipient.into_word());
    state.set_storage(
        contract,
        FEE_SHARE_PERCENT_SLOT,
        B256::from(U256::from(config.percent)),
    );
    Ok(())
}

/// Redirect a contract's share of one transaction's ecosystem portion.
///
/// Applied once per contract interaction. The share is clamped to whatever
/// the ecosystem fund actually holds — the fund balance never goes negative
/// and a shortfall is not an error, the share is simply reduced.
pub fn apply_contract_fee_sharing(
    state: &mut dyn StateAccess,
    chain_config: &ChainConfig,
    contract: Address,
    gas_used: u64,
    base_fee: U256,
) -> ConsensusResult<()> {
    let config = fee_share_config(state, contract);
    if !config.enabled || config.percent == 0 {
        return Ok(());
    }
    validate_fund_addresses(chain_config)?;

    let total = base_fee * U256::from(gas_used);
    let ecosystem_portion = total * U256::from(ECOSYSTEM_RATIO) / U256::from(RATIO_DENOMINATOR);
    let share = ecosystem_portion * U256::from(config.percent) / U256::from(100u64);
    if share.is_zero() {
        return Ok(());
    }

    let available = state.balance(chain_config.ecosystem_fund);
    let transfer = share.min(available);
    if transfer.is_zero() {
        return Ok(());
    }

    state.sub_balance(chain_config.ecosystem_fund, transfer);
    state.add_balance(config.recipient, transfer);
    debug!(%contract, recipient = %config.recipient, %transfer, "applied contract fee share");
    Ok(())
}
