//! Halo block reward schedule.
//!
//! Phased emission converging on a 100M-token cap: a short bootstrap phase
//! at 40 tokens per block, stepped reductions through year one, then a 25%
//! cut per year down to the permanent 0.125-token floor.

use alloy_primitives::U256;
use halo_types::Header;

use crate::state::StateAccess;

/// Atomic units per token.
const TOKEN: u128 = 1_000_000_000_000_000_000;

/// Phase boundaries (exclusive upper ends) and year marks in blocks.
const PHASE1_END: u64 = 25_000;
const PHASE2_END: u64 = 358_333;
const PHASE3_END: u64 = 691_666;
const PHASE4_END: u64 = 5_691_666;
const YEAR1_END: u64 = 31_536_000;
const YEAR2_END: u64 = 63_072_000;
const YEAR3_END: u64 = 94_608_000;
const YEAR4_END: u64 = 126_144_000;
const YEAR5_END: u64 = 157_680_000;

const PHASE1_REWARD: u128 = 40 * TOKEN;
const PHASE2_REWARD: u128 = 3 * TOKEN;
const PHASE3_REWARD: u128 = 1_500_000_000_000_000_000;
const PHASE4_REWARD: u128 = TOKEN;
const PHASE5_REWARD: u128 = 500_000_000_000_000_000;
const YEAR2_REWARD: u128 = 375_000_000_000_000_000;
const YEAR3_REWARD: u128 = 281_250_000_000_000_000;
const YEAR4_REWARD: u128 = 210_937_500_000_000_000;
const YEAR5_REWARD: u128 = 158_203_125_000_000_000;
const FLOOR_REWARD: u128 = 125_000_000_000_000_000;

/// Uncle reward at depth 1, per 1000 of the base reward.
const UNCLE_DEPTH1_RATIO: u64 = 875;
/// Uncle reward at depth 2, per 1000 of the base reward.
const UNCLE_DEPTH2_RATIO: u64 = 750;
/// Nephew bonus per included uncle, per 1000 of the base reward.
const NEPHEW_RATIO: u64 = 31;
const RATIO_DENOMINATOR: u64 = 1000;

/// Maximum token supply in atomic units (100 million tokens).
pub fn max_supply() -> U256 {
    U256::from(100_000_000u64) * U256::from(TOKEN)
}

/// Base miner reward for the block at the given height.
pub fn base_reward(number: u64) -> U256 {
    let reward = match number {
        n if n < PHASE1_END => PHASE1_REWARD,
        n if n < PHASE2_END => PHASE2_REWARD,
        n if n < PHASE3_END => PHASE3_REWARD,
        n if n < PHASE4_END => PHASE4_REWARD,
        n if n < YEAR1_END => PHASE5_REWARD,
        n if n < YEAR2_END => YEAR2_REWARD,
        n if n < YEAR3_END => YEAR3_REWARD,
        n if n < YEAR4_END => YEAR4_REWARD,
        n if n < YEAR5_END => YEAR5_REWARD,
        _ => FLOOR_REWARD,
    };
    U256::from(reward)
}

/// Reward for an uncle miner: 87.5% of the base at depth 1, 75% at depth 2,
/// nothing deeper.
pub fn uncle_reward(block_number: u64, uncle_number: u64, base: U256) -> U256 {
    let ratio = match block_number.saturating_sub(uncle_number) {
        1 => UNCLE_DEPTH1_RATIO,
        2 => UNCLE_DEPTH2_RATIO,
        _ => return U256::ZERO,
    };
    base * U256::from(ratio) / U256::from(RATIO_DENOMINATOR)
}

/// Bonus to the including miner: 3.1% of the base reward per uncle.
pub fn nephew_reward(uncle_count: usize, base: U256) -> U256 {
    base * U256::from(NEPHEW_RATIO) / U256::from(RATIO_DENOMINATOR) * U256::from(uncle_count as u64)
}

/// Credit the block and uncle rewards for a finalized block.
pub fn apply_block_rewards(state: &mut dyn StateAccess, header: &Header, uncles: &[Header]) {
    let base = base_reward(header.number);
    for uncle in uncles {
        state.add_balance(uncle.coinbase, uncle_reward(header.number, uncle.number, base));
    }
    state.add_balance(header.coinbase, base + nephew_reward(uncles.len(), base));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryState;
    use alloy_primitives::Address;

    fn tokens(whole: u64, fraction: u128) -> U256 {
        U256::from(whole as u128 * TOKEN + fraction)
    }

    #[test]
    fn schedule_table() {
        let cases: &[(u64, u128)] = &[
            (0, PHASE1_REWARD),
            (10_000, PHASE1_REWARD),
            (24_999, PHASE1_REWARD),
            (25_000, PHASE2_REWARD),
            (358_332, PHASE2_REWARD),
            (358_333, PHASE3_REWARD),
            (691_665, PHASE3_REWARD),
            (691_666, PHASE4_REWARD),
            (5_691_665, PHASE4_REWARD),
            (5_691_666, PHASE5_REWARD),
            (31_535_999, PHASE5_REWARD),
            (31_536_000, YEAR2_REWARD),
            (63_072_000, YEAR3_REWARD),
            (94_608_000, YEAR4_REWARD),
            (126_144_000, YEAR5_REWARD),
            (157_680_000, FLOOR_REWARD),
            (500_000_000, FLOOR_REWARD),
        ];
        for &(number, expected) in cases {
            assert_eq!(base_reward(number), U256::from(expected), "block {number}");
        }
    }

    #[test]
    fn phase_boundary_switches_reward() {
        assert_eq!(base_reward(24_999), tokens(40, 0));
        assert_eq!(base_reward(25_000), tokens(3, 0));
    }

    #[test]
    fn schedule_is_non_increasing() {
        let marks = [
            0,
            24_999,
            25_000,
            358_333,
            691_666,
            5_691_666,
            31_536_000,
            63_072_000,
            94_608_000,
            126_144_000,
            157_680_000,
            u64::MAX,
        ];
        for pair in marks.windows(2) {
            assert!(
                base_reward(pair[0]) >= base_reward(pair[1]),
                "reward rose between {} and {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn uncle_reward_by_depth() {
        let base = tokens(40, 0);
        assert_eq!(uncle_reward(100, 99, base), tokens(35, 0)); // 87.5%
        assert_eq!(uncle_reward(100, 98, base), tokens(30, 0)); // 75%
        assert_eq!(uncle_reward(100, 97, base), U256::ZERO);
        assert_eq!(uncle_reward(100, 100, base), U256::ZERO);
    }

    #[test]
    fn nephew_reward_per_uncle() {
        let base = U256::from(1000u64);
        assert_eq!(nephew_reward(0, base), U256::ZERO);
        assert_eq!(nephew_reward(1, base), U256::from(31u64));
        assert_eq!(nephew_reward(2, base), U256::from(62u64));
    }

    #[test]
    fn rewards_are_credited() {
        let miner = Address::repeat_byte(1);
        let uncle_miner = Address::repeat_byte(2);

        let mut header = Header::default();
        header.number = 100;
        header.coinbase = miner;

        let mut uncle = Header::default();
        uncle.number = 99;
        uncle.coinbase = uncle_miner;

        let mut state = MemoryState::new();
        apply_block_rewards(&mut state, &header, &[uncle]);

        let base = base_reward(100);
        assert_eq!(state.balance(miner), base + nephew_reward(1, base));
        assert_eq!(state.balance(uncle_miner), uncle_reward(100, 99, base));
    }

    #[test]
    fn supply_cap_is_100m_tokens() {
        assert_eq!(
            max_supply(),
            U256::from(100_000_000_000_000_000_000_000_000u128)
        );
    }
}
