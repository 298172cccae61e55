//! EIP-1559 base-fee verification and the pre-fork gas-limit rule.

use alloy_primitives::U256;
use halo_types::{ChainConfig, Header};

use crate::error::{ConsensusError, ConsensusResult};

/// Minimum gas limit any header may carry.
const MIN_GAS_LIMIT: u64 = 5_000;
/// Gas limit bound divisor: per-block movement must stay under parent/1024.
const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;

/// Expected base fee of the child of `parent`.
///
/// The first EIP-1559 block uses the configured initial base fee; afterwards
/// the fee tracks gas usage against the target with truncating division.
pub fn calc_base_fee(config: &ChainConfig, parent: &Header) -> U256 {
    if !config.is_eip1559(parent.number) {
        return U256::from(config.initial_base_fee);
    }

    let parent_base_fee = parent.base_fee.unwrap_or_default();
    let gas_target = parent.gas_limit / config.elasticity_multiplier;
    if parent.gas_used == gas_target {
        return parent_base_fee;
    }

    let denominator = U256::from(config.base_fee_change_denominator);
    if parent.gas_used > gas_target {
        let delta = U256::from(parent.gas_used - gas_target);
        let increase = parent_base_fee * delta / U256::from(gas_target) / denominator;
        parent_base_fee + increase.max(U256::from(1u64))
    } else {
        let delta = U256::from(gas_target - parent.gas_used);
        let decrease = parent_base_fee * delta / U256::from(gas_target) / denominator;
        parent_base_fee.saturating_sub(decrease)
    }
}

/// Gas-limit bound rule shared by both fork regimes.
pub(crate) fn verify_gas_limit(parent_gas_limit: u64, gas_limit: u64) -> ConsensusResult<()> {
    if gas_limit < MIN_GAS_LIMIT {
        return Err(ConsensusError::GasLimitTooLow {
            have: gas_limit,
            min: MIN_GAS_LIMIT,
        });
    }
    let diff = parent_gas_limit.abs_diff(gas_limit);
    let allowed = parent_gas_limit / GAS_LIMIT_BOUND_DIVISOR;
    if diff >= allowed {
        return Err(ConsensusError::GasLimitBound {
            have: gas_limit,
            parent: parent_gas_limit,
            allowed,
        });
    }
    Ok(())
}

/// Verify the EIP-1559 attributes of `header` against its parent: the gas
/// limit bound (elasticity-adjusted across the fork block), base fee
/// presence, and the base-fee formula.
pub(crate) fn verify_eip1559_header(
    config: &ChainConfig,
    parent: &Header,
    header: &Header,
) -> ConsensusResult<()> {
    // At the fork block the target doubles, so the parent limit is scaled
    // by the elasticity multiplier before the bound check.
    let parent_gas_limit = if !config.is_eip1559(parent.number) {
        parent.gas_limit * config.elasticity_multiplier
    } else {
        parent.gas_limit
    };
    verify_gas_limit(parent_gas_limit, header.gas_limit)?;

    let have = header.base_fee.ok_or(ConsensusError::MissingBaseFee)?;
    let want = calc_base_fee(config, parent);
    if have != want {
        return Err(ConsensusError::InvalidBaseFee { have, want });
    }
    Ok(())
}
