//! Classic Ethereum-family difficulty adjustment.
//!
//! Non-Halo chains use the published algorithm selected by fork
//! configuration: Frontier, Homestead (EIP-2), or the uncle-aware Byzantium
//! rule (EIP-100), plus the difficulty bomb. Bomb offsets (EIP-649 through
//! EIP-5133) are modeled uniformly as the compounding
//! `difficulty_bomb_delays` schedule; ECIP-1010 pauses the bomb and
//! ECIP-1041 removes it.

use alloy_primitives::U256;
use halo_types::{ChainConfig, Header};
use num_bigint::{BigInt, BigUint};
use num_traits::One;

use crate::num::{biguint_to_u256, u256_to_biguint};

/// Minimum difficulty on classic chains.
const MINIMUM_DIFFICULTY: u64 = 131_072;
/// Frontier duration limit: faster blocks raise difficulty.
const DURATION_LIMIT: i64 = 13;
/// Difficulty bound divisor.
const BOUND_DIVISOR: u64 = 2048;
/// Exponential bomb period.
const EXP_DIFF_PERIOD: i128 = 100_000;
/// EIP-2 interval divisor.
const EIP2_DIVISOR: i64 = 10;
/// EIP-100 interval divisor.
const EIP100_DIVISOR: i64 = 9;
/// Lower clamp on the adjustment multiplier.
const SIGMA_FLOOR: i64 = -99;

/// Expected difficulty for a child of `parent` at `time` on a classic chain.
pub fn classic_difficulty(config: &ChainConfig, time: u64, parent: &Header) -> U256 {
    let next = parent.number + 1;
    let parent_diff = BigInt::from(u256_to_biguint(parent.difficulty));
    let step = &parent_diff / BigInt::from(BOUND_DIVISOR);
    let delta = time as i64 - parent.time as i64;

    let adjusted: BigInt = if config.is_byzantium(next) {
        // EIP-100: uncle-aware target.
        let k: i64 = if parent.has_ommers() { 2 } else { 1 };
        let sigma = (k - delta.div_euclid(EIP100_DIVISOR)).max(SIGMA_FLOOR);
        &parent_diff + step * BigInt::from(sigma)
    } else if config.is_homestead(next) {
        // EIP-2.
        let sigma = (1 - delta.div_euclid(EIP2_DIVISOR)).max(SIGMA_FLOOR);
        &parent_diff + step * BigInt::from(sigma)
    } else {
        // Frontier.
        if delta < DURATION_LIMIT {
            &parent_diff + step
        } else {
            &parent_diff - step
        }
    };

    let mut out = adjusted
        .max(BigInt::from(MINIMUM_DIFFICULTY))
        .to_biguint()
        .unwrap_or_default();

    if config.is_bomb_disposed(next) {
        return biguint_to_u256(&out);
    }

    // The bomb reference point, shifted by whichever delay mechanism the
    // fork schedule configures.
    let mut period_ref: i128 = next as i128;
    if config.is_ecip1010_paused(next) {
        let pause = config
            .ecip1010_pause_block
            .unwrap_or_default();
        let explosion = pause + config.ecip1010_length;
        period_ref = if next < explosion {
            pause as i128
        } else {
            (next - config.ecip1010_length) as i128
        };
    } else {
        for (&activated, &delay) in &config.difficulty_bomb_delays {
            if next >= activated {
                period_ref -= delay as i128;
            }
        }
    }

    let periods = period_ref.div_euclid(EXP_DIFF_PERIOD);
    if periods > 1 {
        out += BigUint::one() << ((periods - 2) as u64);
    }
    biguint_to_u256(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_types::EMPTY_OMMERS_HASH;
    use alloy_primitives::B256;

    fn classic_config() -> ChainConfig {
        let mut config = ChainConfig::halo();
        config.chain_id = 61;
        config.homestead_block = None;
        config.byzantium_block = None;
        config.disposal_block = None;
        config
    }

    fn parent(number: u64, time: u64, difficulty: u64) -> Header {
        let mut header = Header::default();
        header.number = number;
        header.time = time;
        header.difficulty = U256::from(difficulty);
        header
    }

    #[test]
    fn frontier_adjustment() {
        let config = classic_config();
        let p = parent(100, 1_000, 1_000_000);

        // Fast block: difficulty rises by parent / 2048.
        assert_eq!(
            classic_difficulty(&config, 1_005, &p),
            U256::from(1_000_488u64)
        );
        // Slow block: it falls by the same step.
        assert_eq!(
            classic_difficulty(&config, 1_020, &p),
            U256::from(999_512u64)
        );
    }

    #[test]
    fn homestead_adjustment() {
        let mut config = classic_config();
        config.homestead_block = Some(0);
        let p = parent(100, 1_000, 1_000_000);

        // sigma = max(1 - delta/10, -99)
        assert_eq!(
            classic_difficulty(&config, 1_005, &p),
            U256::from(1_000_488u64)
        );
        assert_eq!(
            classic_difficulty(&config, 1_015, &p),
            U256::from(1_000_000u64)
        );
        assert_eq!(
            classic_difficulty(&config, 1_025, &p),
            U256::from(999_512u64)
        );
    }

    #[test]
    fn byzantium_counts_uncles() {
        let mut config = classic_config();
        config.homestead_block = Some(0);
        config.byzantium_block = Some(0);

        let empty = parent(100, 1_000, 1_000_000);
        assert_eq!(
            classic_difficulty(&config, 1_005, &empty),
            U256::from(1_000_488u64)
        );

        let mut with_uncles = parent(100, 1_000, 1_000_000);
        with_uncles.ommers_hash = B256::repeat_byte(7);
        assert_ne!(with_uncles.ommers_hash, EMPTY_OMMERS_HASH);
        assert_eq!(
            classic_difficulty(&config, 1_005, &with_uncles),
            U256::from(1_000_976u64)
        );
    }

    #[test]
    fn minimum_difficulty_clamps() {
        let mut config = classic_config();
        config.homestead_block = Some(0);
        let p = parent(100, 1_000, MINIMUM_DIFFICULTY);

        // Very slow block would push below the floor.
        let result = classic_difficulty(&config, 1_000 + 10_000, &p);
        assert_eq!(result, U256::from(MINIMUM_DIFFICULTY));
    }

    #[test]
    fn bomb_explodes_past_two_periods() {
        let mut config = classic_config();
        config.homestead_block = Some(0);
        config.byzantium_block = Some(0);
        // Next block 300,000: period 3, bomb term 2^(3-2) = 2.
        let p = parent(299_999, 1_000, 1_000_000);
        assert_eq!(
            classic_difficulty(&config, 1_009, &p),
            U256::from(1_000_002u64)
        );
    }

    #[test]
    fn bomb_delay_schedule_compounds() {
        let mut config = classic_config();
        config.homestead_block = Some(0);
        config.byzantium_block = Some(0);
        config.difficulty_bomb_delays.insert(0, 3_000_000);
        let p = parent(299_999, 1_000, 1_000_000);

        // Reference pushed far negative: no bomb term at all.
        assert_eq!(
            classic_difficulty(&config, 1_009, &p),
            U256::from(1_000_000u64)
        );
    }

    #[test]
    fn ecip1010_freezes_bomb_during_pause() {
        let mut config = classic_config();
        config.homestead_block = Some(0);
        config.ecip1010_pause_block = Some(200_000);
        config.ecip1010_length = 2_000_000;
        let p = parent(299_999, 1_000, 1_000_000);

        // Frozen at the pause block: period 2, bomb term 2^0 = 1.
        assert_eq!(
            classic_difficulty(&config, 1_015, &p),
            U256::from(1_000_001u64)
        );
    }

    #[test]
    fn disposal_removes_bomb() {
        let mut config = classic_config();
        config.homestead_block = Some(0);
        config.byzantium_block = Some(0);
        config.disposal_block = Some(0);
        let p = parent(299_999, 1_000, 1_000_000);
        assert_eq!(
            classic_difficulty(&config, 1_009, &p),
            U256::from(1_000_000u64)
        );
    }
}
