//! Halo difficulty adjustment.
//!
//! Multi-layer defense against difficulty manipulation. The layers apply in
//! strict order and the final value is the maximum of the base adjustment and
//! every applicable floor:
//!
//! - Layer 0: future timestamps are capped to local time for difficulty
//!   purposes only, so a miner cannot inflate the perceived interval.
//! - Layer 1: bounded per-block adjustment around the 4-second target.
//! - Layer 2: phased absolute minimum, hardening as the network matures.
//! - Layer 3: emergency recovery mode relaxes the phase minimum by at most
//!   50% when blocks are consistently slow.
//! - Layer 4: multi-window average floors. Single-point floors are gameable
//!   by one outlier header; overlapping averages require sustained
//!   manipulation across every horizon at once.
//! - Layer 5: symmetric early-block adjustment to bootstrap a cold chain.
//! - Layer 6: an absolute hard floor the engine never goes below.

use crate::chain::ChainReader;
use crate::classic::classic_difficulty;
use crate::num::{biguint_to_u256, u256_to_biguint};
use alloy_primitives::U256;
use halo_types::Header;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

/// Target block interval in seconds.
const TARGET_BLOCK_TIME: i64 = 4;
/// Difficulty adjustment divisor.
const ADJUSTMENT_DIVISOR: u64 = 2048;
/// Maximum single-block adjustment, percent of parent difficulty.
const MAX_ADJUSTMENT_PERCENT: u64 = 20;
/// Block intervals are clamped to [1, 60] seconds for adjustment purposes.
const MAX_TIME_DELTA: i64 = 60;

/// Absolute hard floor. The engine never returns less than this.
pub const HARD_FLOOR: u64 = 0x10000;

/// Phase 1 ends here; minimum is 32,768 up to this block.
const PHASE1_END: u64 = 10_000;
/// Phase 3 starts here; minimum is 131,072 from this block on.
const PHASE2_END: u64 = 50_000;
/// Early-phase minimum difficulty.
const MIN_EARLY: u64 = 32_768;
/// Mature-phase minimum difficulty.
const MIN_FULL: u64 = 131_072;

/// Emergency mode floor; the halved phase minimum never drops below this.
const EMERGENCY_FLOOR: u64 = 0x4000;
/// Headers inspected for the emergency-mode interval average.
const EMERGENCY_LOOKBACK: u64 = 10;
/// Average inter-block seconds beyond which emergency mode activates.
const EMERGENCY_AVG_SECS: u64 = 60;

/// (window length in blocks, floor as percent of the window average)
const AVERAGE_WINDOWS: [(u64, u64); 3] = [(15, 50), (75, 40), (150, 30)];

/// Early-block adjustment applies below this height.
const EARLY_BLOCK_CUTOFF: u64 = 100;
/// Early-block adjustment applies below this candidate difficulty.
const EARLY_DIFFICULTY_CUTOFF: u64 = 500_000;

/// Expected difficulty for a child of `parent` proposed at `block_time`,
/// dispatching on the chain profile.
///
/// `unix_now` is the caller's notion of the current time. When recomputing
/// for a header already rooted in the chain, pass the header's own accepted
/// timestamp so the capping layer is a no-op and the result is deterministic.
pub fn calc_difficulty(
    chain: &dyn ChainReader,
    block_time: u64,
    parent: &Header,
    unix_now: u64,
) -> U256 {
    if chain.config().is_halo() {
        halo_difficulty(chain, block_time, parent, unix_now)
    } else {
        classic_difficulty(chain.config(), block_time, parent)
    }
}

/// The Halo multi-layer difficulty algorithm.
pub fn halo_difficulty(
    chain: &dyn ChainReader,
    block_time: u64,
    parent: &Header,
    unix_now: u64,
) -> U256 {
    // Layer 0: cap future timestamps to "now" for difficulty purposes only.
    // Acceptance still tolerates the configured future drift.
    let adjusted_time = block_time.min(unix_now);

    // Layer 1: bounded base adjustment.
    let mut delta = adjusted_time as i64 - parent.time as i64;
    if delta <= 0 {
        // Ordering validation guarantees time > parent.time; keep liveness
        // if a capped timestamp lands on the parent's second.
        delta = 1;
    }
    if delta > MAX_TIME_DELTA {
        delta = MAX_TIME_DELTA;
    }
    let deviation = delta - TARGET_BLOCK_TIME;

    let step = parent.difficulty / U256::from(ADJUSTMENT_DIVISOR);
    let mut adjustment = step * U256::from(deviation.unsigned_abs());
    let max_adjustment =
        parent.difficulty * U256::from(MAX_ADJUSTMENT_PERCENT) / U256::from(100u64);
    if adjustment > max_adjustment {
        adjustment = max_adjustment;
    }
    let mut candidate = if deviation > 0 {
        parent.difficulty - adjustment
    } else if deviation < 0 {
        parent.difficulty + adjustment
    } else {
        parent.difficulty
    };

    let number = parent.number + 1;

    // Layer 2 / Layer 3: phased minimum, relaxed in emergency mode.
    let phase_min = phase_minimum(number);
    let minimum = if is_emergency_mode(chain, parent) {
        debug!(number, "emergency recovery mode active, relaxing phase minimum");
        (phase_min / 2).max(EMERGENCY_FLOOR)
    } else {
        phase_min
    };
    let mut floor = U256::from(minimum);

    // Layer 4: multi-window average floors.
    for (window, percent) in AVERAGE_WINDOWS {
        if number < window {
            continue;
        }
        if let Some(average) = average_difficulty(chain, parent.number, window) {
            let window_floor = average * U256::from(percent) / U256::from(100u64);
            if window_floor > floor {
                floor = window_floor;
            }
        }
    }

    // Layer 5: symmetric early-block adjustment.
    if number < EARLY_BLOCK_CUTOFF && candidate < U256::from(EARLY_DIFFICULTY_CUTOFF) {
        let nudge = candidate / U256::from(10u64);
        if delta < TARGET_BLOCK_TIME {
            candidate += nudge;
        } else if delta > 2 * TARGET_BLOCK_TIME {
            candidate -= nudge;
        }
    }

    // Layer 6: compose with the absolute hard floor.
    candidate.max(floor).max(U256::from(HARD_FLOOR))
}

/// Block-number-dependent absolute minimum difficulty.
///
/// 32,768 through block 10,000, then a linear climb to 131,072 at block
/// 50,000 where it stays.
fn phase_minimum(number: u64) -> u64 {
    if number <= PHASE1_END {
        return MIN_EARLY;
    }
    if number >= PHASE2_END {
        return MIN_FULL;
    }
    let progress = number - PHASE1_END;
    let span = PHASE2_END - PHASE1_END;
    MIN_EARLY + (MIN_FULL - MIN_EARLY) * progress / span
}

/// Whether the chain is in emergency recovery mode: the average interval
/// over the 9 most recent block gaps exceeds 60 seconds.
///
/// Unreadable history means "not emergency" — the relaxation never activates
/// on guesswork.
fn is_emergency_mode(chain: &dyn ChainReader, parent: &Header) -> bool {
    if parent.number < EMERGENCY_LOOKBACK {
        return false;
    }
    let mut total = 0u64;
    for i in 0..EMERGENCY_LOOKBACK - 1 {
        let Some(current) = chain.header_by_number(parent.number - i) else {
            return false;
        };
        let Some(previous) = chain.header_by_number(parent.number - i - 1) else {
            return false;
        };
        total += current.time.saturating_sub(previous.time);
    }
    total / (EMERGENCY_LOOKBACK - 1) > EMERGENCY_AVG_SECS
}

/// Arithmetic mean of the difficulties of the last `lookback` canonical
/// blocks ending at `parent_number` inclusive. `None` if any block in the
/// window is unreadable.
fn average_difficulty(
    chain: &dyn ChainReader,
    parent_number: u64,
    lookback: u64,
) -> Option<U256> {
    let start = (parent_number + 1).checked_sub(lookback)?;
    let mut sum = BigUint::zero();
    for number in start..=parent_number {
        let header = chain.header_by_number(number)?;
        sum += u256_to_biguint(header.difficulty);
    }
    Some(biguint_to_u256(&(sum / BigUint::from(lookback))))
}
