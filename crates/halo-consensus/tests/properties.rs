//! Property-based tests for the consensus invariants.
//!
//! These verify the universally quantified guarantees of the difficulty
//! engine, reward schedule, fee split, and seal hashing using randomly
//! generated inputs with shrinking support.

use std::sync::Arc;

use alloy_primitives::{Address, B256, B64, U256};
use halo_consensus::testing::{child_of, FakePow, MemoryChain, TEST_GENESIS_TIME};
use halo_consensus::{
    apply_contract_fee_sharing, base_reward, halo_difficulty, seal_hash, set_fee_share_config,
    ConsensusError, Engine, FeeShareConfig, FixedClock, MemoryState, StateAccess, BURN_RATIO,
    ECOSYSTEM_RATIO, HARD_FLOOR, MINER_RATIO, RESERVE_RATIO,
};
use halo_types::{ChainConfig, Header};
use proptest::prelude::*;

const NOW: u64 = TEST_GENESIS_TIME + 1_000_000;

fn parent_header(number: u64, difficulty: u128) -> Header {
    let mut header = Header::default();
    header.number = number;
    header.time = TEST_GENESIS_TIME;
    header.difficulty = U256::from(difficulty);
    header
}

/// Positive difficulties across the realistic range.
fn arb_difficulty() -> impl Strategy<Value = u128> {
    1u128..=u128::MAX / 2
}

/// Block intervals from same-second to far beyond the 60s cap.
fn arb_interval() -> impl Strategy<Value = u64> {
    0u64..=100_000
}

proptest! {
    // Invariant 1: the engine never returns below the hard floor, for any
    // parent state whatsoever.
    #[test]
    fn difficulty_never_below_hard_floor(
        difficulty in arb_difficulty(),
        interval in arb_interval(),
        number in 0u64..=10_000_000,
    ) {
        let chain = MemoryChain::empty(ChainConfig::halo());
        let parent = parent_header(number, difficulty);
        let result = halo_difficulty(&chain, parent.time + interval, &parent, NOW);
        prop_assert!(result >= U256::from(HARD_FLOOR));
    }

    // Invariant 3: before floors, a single block moves difficulty by at
    // most 20% in either direction. Parents large enough that no floor can
    // reach 80% of them expose the raw adjustment.
    #[test]
    fn single_block_ratio_is_bounded(
        difficulty in 1_000_000u128..=u128::MAX / 2,
        interval in arb_interval(),
        number in 100u64..=10_000_000,
    ) {
        let chain = MemoryChain::empty(ChainConfig::halo());
        let parent = parent_header(number, difficulty);
        let result = halo_difficulty(&chain, parent.time + interval, &parent, NOW);

        let parent_diff = U256::from(difficulty);
        let bound = parent_diff * U256::from(20u64) / U256::from(100u64);
        prop_assert!(result >= parent_diff - bound);
        prop_assert!(result <= parent_diff + bound);
    }

    // Invariant 4: the reward schedule is non-increasing.
    #[test]
    fn reward_schedule_is_non_increasing(a in any::<u64>(), b in any::<u64>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(base_reward(lo) >= base_reward(hi));
    }

    // Invariant 5: the four-way split never credits more than the revenue
    // and loses at most 3 units to truncation.
    #[test]
    fn fee_split_residual_is_bounded(base_fee in any::<u64>(), gas_used in any::<u64>()) {
        let total = U256::from(base_fee) * U256::from(gas_used);
        let denominator = U256::from(1000u64);
        let sum = total * U256::from(BURN_RATIO) / denominator
            + total * U256::from(MINER_RATIO) / denominator
            + total * U256::from(ECOSYSTEM_RATIO) / denominator
            + total * U256::from(RESERVE_RATIO) / denominator;
        prop_assert!(sum <= total);
        prop_assert!(total - sum <= U256::from(3u64));
    }

    // Invariant 6: contract fee sharing can never overdraw the ecosystem
    // fund, whatever the fund holds and whatever the share works out to.
    #[test]
    fn fee_sharing_never_overdraws_the_fund(
        fund_balance in any::<u64>(),
        percent in 0u8..=100,
        gas_used in any::<u64>(),
        base_fee in 0u64..=1_000_000,
    ) {
        let config = ChainConfig::halo();
        let contract = Address::repeat_byte(0xc0);
        let recipient = Address::repeat_byte(0xd0);

        let mut state = MemoryState::new();
        state.add_balance(config.ecosystem_fund, U256::from(fund_balance));
        set_fee_share_config(&mut state, contract, &FeeShareConfig {
            enabled: true,
            recipient,
            percent,
        }).unwrap();

        apply_contract_fee_sharing(&mut state, &config, contract, gas_used, U256::from(base_fee))
            .unwrap();

        let paid = state.balance(recipient);
        let remaining = state.balance(config.ecosystem_fund);
        prop_assert_eq!(paid + remaining, U256::from(fund_balance));

        let share = U256::from(base_fee) * U256::from(gas_used)
            * U256::from(ECOSYSTEM_RATIO) / U256::from(1000u64)
            * U256::from(percent) / U256::from(100u64);
        prop_assert_eq!(paid, share.min(U256::from(fund_balance)));
    }

    // Invariant 9: the seal hash depends on neither mix digest nor nonce.
    #[test]
    fn seal_hash_ignores_mix_and_nonce(mix in any::<[u8; 32]>(), nonce in any::<[u8; 8]>()) {
        let mut header = Header::default();
        header.number = 1;
        header.base_fee = Some(U256::from(1_000_000_000u64));
        let reference = seal_hash(&header);

        header.mix_digest = B256::from(mix);
        header.nonce = B64::from(nonce);
        prop_assert_eq!(seal_hash(&header), reference);
    }

    // Invariant 7: batch output order matches input order for any batch
    // size and any single fault position.
    #[test]
    fn batch_order_matches_input_order(count in 1usize..=24, fault in 0usize..=23) {
        let chain = MemoryChain::linear(ChainConfig::halo(), 1, 4, 1_000_000);
        let mut headers = Vec::with_capacity(count);
        let mut parent = chain.tip();
        for _ in 0..count {
            let child = child_of(&chain, &parent, parent.time + 4, NOW);
            headers.push(child.clone());
            parent = child;
        }
        let fault = fault % count;
        headers[fault].gas_used = headers[fault].gas_limit + 1;

        let engine = Engine::with_clock(Arc::new(FakePow::valid()), Arc::new(FixedClock(NOW)));
        let (_abort, rx) =
            engine.verify_headers(Arc::new(chain), headers, vec![false; count]);
        let results: Vec<_> = rx.iter().collect();

        prop_assert_eq!(results.len(), count);
        for (index, result) in results.iter().enumerate() {
            if index == fault {
                let is_invalid_gas_used =
                    matches!(result, Err(ConsensusError::InvalidGasUsed { .. }));
                prop_assert!(is_invalid_gas_used);
            } else if index == fault + 1 {
                // The fault re-hashed its header, orphaning the successor.
                prop_assert_eq!(result, &Err(ConsensusError::UnknownAncestor));
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}

// Round-trip: prepare followed by verify_header succeeds for every
// difficulty the engine itself produces.
proptest! {
    #[test]
    fn prepare_verify_round_trip(interval in 1u64..=120, difficulty in 100_000u128..=10_000_000) {
        let chain = MemoryChain::linear(ChainConfig::halo(), 12, 4, difficulty as u64);
        let parent = chain.tip();
        let engine = Engine::with_clock(Arc::new(FakePow::valid()), Arc::new(FixedClock(NOW)));

        let mut header = child_of(&chain, &parent, parent.time + interval, NOW);
        header.difficulty = U256::ZERO;
        engine.prepare(&chain, &mut header).unwrap();
        prop_assert!(engine.verify_header(&chain, &header, true).is_ok());
    }
}
