//! Header and uncle validation.
//!
//! Implements the full rule set a header must pass exactly once on receipt:
//! structural bounds, timestamp ordering (including median-time-past on
//! Halo), difficulty expectation, gas accounting, EIP-1559 attributes,
//! forbidden post-merge fields, the PoW seal, and the DAO extra-data rule.

use std::collections::{HashMap, HashSet};

use alloy_primitives::B256;
use halo_types::{Block, ChainConfig, Header};
use tracing::{debug, instrument};

use crate::chain::ChainReader;
use crate::difficulty::calc_difficulty;
use crate::eip1559;
use crate::error::{ConsensusError, ConsensusResult};
use crate::seal::{verify_seal, PowHasher};

/// Maximum size of the header extra-data section.
const MAX_EXTRA_DATA_SIZE: usize = 32;
/// Maximum gas limit (2^63 - 1).
const MAX_GAS_LIMIT: u64 = 0x7fff_ffff_ffff_ffff;
/// Median-time-past window.
const MTP_WINDOW: usize = 11;
/// Number of blocks after the DAO fork that must carry the fork extra-data.
const DAO_FORK_EXTRA_RANGE: u64 = 10;
/// Extra-data carried by pro-fork blocks: "dao-hard-fork".
const DAO_FORK_EXTRA_DATA: &[u8] = b"dao-hard-fork";

/// Verify a header against its resolved parent.
///
/// `uncle` relaxes the future-block and MTP rules (an uncle is by definition
/// old); `seal` additionally verifies the proof-of-work. `unix_now` is the
/// single clock sample used for both the future tolerance and the difficulty
/// engine's timestamp capping.
#[instrument(skip_all, fields(number = header.number, uncle))]
pub(crate) fn verify_header_against_parent(
    chain: &dyn ChainReader,
    pow: &dyn PowHasher,
    header: &Header,
    parent: &Header,
    uncle: bool,
    seal: bool,
    unix_now: u64,
) -> ConsensusResult<()> {
    let config = chain.config();

    if header.extra_data.len() > MAX_EXTRA_DATA_SIZE {
        return Err(ConsensusError::ExtraDataTooLong {
            len: header.extra_data.len(),
            max: MAX_EXTRA_DATA_SIZE,
        });
    }

    if !uncle {
        let limit = unix_now + config.future_tolerance_secs();
        if header.time > limit {
            return Err(ConsensusError::FutureBlock {
                time: header.time,
                limit,
            });
        }
    }

    if header.time <= parent.time {
        return Err(ConsensusError::OlderBlockTime {
            time: header.time,
            parent_time: parent.time,
        });
    }

    if config.is_halo() && !uncle {
        verify_median_time_past(chain, header, parent)?;
    }

    let expected = calc_difficulty(chain, header.time, parent, unix_now);
    if header.difficulty != expected {
        return Err(ConsensusError::DifficultyMismatch {
            have: header.difficulty,
            want: expected,
        });
    }

    if header.gas_limit > MAX_GAS_LIMIT {
        return Err(ConsensusError::InvalidGasLimit {
            have: header.gas_limit,
            max: MAX_GAS_LIMIT,
        });
    }
    if header.gas_used > header.gas_limit {
        return Err(ConsensusError::InvalidGasUsed {
            used: header.gas_used,
            limit: header.gas_limit,
        });
    }

    if header.number != parent.number + 1 {
        return Err(ConsensusError::InvalidNumber {
            have: header.number,
            want: parent.number + 1,
        });
    }

    if !config.is_eip1559(header.number) {
        if let Some(base_fee) = header.base_fee {
            return Err(ConsensusError::BaseFeeBeforeFork { have: base_fee });
        }
        eip1559::verify_gas_limit(parent.gas_limit, header.gas_limit)?;
    } else {
        eip1559::verify_eip1559_header(config, parent, header)?;
    }

    // This chain variant never activates the beacon-era forks; the fields
    // they introduce must be absent outright.
    if header.withdrawals_hash.is_some() {
        return Err(ConsensusError::ForbiddenField("withdrawals_hash"));
    }
    if header.blob_gas_used.is_some() {
        return Err(ConsensusError::ForbiddenField("blob_gas_used"));
    }
    if header.excess_blob_gas.is_some() {
        return Err(ConsensusError::ForbiddenField("excess_blob_gas"));
    }
    if header.parent_beacon_root.is_some() {
        return Err(ConsensusError::ForbiddenField("parent_beacon_root"));
    }

    if seal {
        verify_seal(pow, header)?;
    }

    verify_dao_extra_data(config, header)?;

    debug!("header validation passed");
    Ok(())
}

/// Median-time-past rule: the timestamp must strictly exceed the median of
/// the last 11 canonical timestamps, parent inclusive.
///
/// Early blocks (parent below the window) fall back to plain parent
/// ordering. A node that cannot read the full window skips the check rather
/// than manufacture a median from partial history.
pub(crate) fn verify_median_time_past(
    chain: &dyn ChainReader,
    header: &Header,
    parent: &Header,
) -> ConsensusResult<()> {
    if (parent.number as usize) < MTP_WINDOW {
        if header.time <= parent.time {
            return Err(ConsensusError::OlderBlockTime {
                time: header.time,
                parent_time: parent.time,
            });
        }
        return Ok(());
    }

    let mut timestamps = [0u64; MTP_WINDOW];
    for (i, slot) in timestamps.iter_mut().enumerate() {
        match chain.header_by_number(parent.number - i as u64) {
            Some(ancestor) => *slot = ancestor.time,
            None => return Ok(()),
        }
    }
    timestamps.sort_unstable();
    let median = timestamps[MTP_WINDOW / 2];

    if header.time <= median {
        return Err(ConsensusError::BackdatedViaMtp {
            time: header.time,
            median,
        });
    }
    Ok(())
}

/// DAO hard-fork extra-data rule: for the ten blocks from the fork point,
/// supporting chains must carry the fork marker and opposing chains must
/// not.
pub(crate) fn verify_dao_extra_data(
    config: &ChainConfig,
    header: &Header,
) -> ConsensusResult<()> {
    let Some(fork_block) = config.dao_fork_block else {
        return Ok(());
    };
    if header.number < fork_block || header.number >= fork_block + DAO_FORK_EXTRA_RANGE {
        return Ok(());
    }
    let has_marker = header.extra_data.as_ref() == DAO_FORK_EXTRA_DATA;
    if config.dao_fork_support != has_marker {
        return Err(ConsensusError::InvalidDaoExtraData);
    }
    Ok(())
}

/// Verify the uncles of a block: count, uniqueness, ancestry, depth, and a
/// full recursive header validation with the seal required.
#[instrument(skip_all, fields(number = block.number(), uncles = block.ommers.len()))]
pub(crate) fn verify_uncles(
    chain: &dyn ChainReader,
    pow: &dyn PowHasher,
    block: &Block,
    unix_now: u64,
) -> ConsensusResult<()> {
    let config = chain.config();
    let max_uncles = config.max_uncles();
    let max_depth = config.max_uncle_depth();

    if block.ommers.len() > max_uncles {
        return Err(ConsensusError::TooManyUncles {
            have: block.ommers.len(),
            max: max_uncles,
        });
    }
    if block.ommers.is_empty() {
        return Ok(());
    }

    // Walk back up to `max_depth` ancestors, collecting them and every uncle
    // they already rewarded.
    let mut ancestors: HashMap<B256, Header> = HashMap::new();
    let mut seen: HashSet<B256> = HashSet::new();

    let mut cursor_hash = block.parent_hash();
    let mut cursor_number = block.number().checked_sub(1);
    for _ in 0..max_depth {
        let Some(number) = cursor_number else { break };
        let Some(ancestor) = chain.header_by_hash_and_number(cursor_hash, number) else {
            break;
        };
        if ancestor.has_ommers() {
            let Some(ancestor_block) = chain.block_by_hash_and_number(cursor_hash, number)
            else {
                break;
            };
            for rewarded in &ancestor_block.ommers {
                seen.insert(rewarded.hash());
            }
        }
        let next_hash = ancestor.parent_hash;
        ancestors.insert(cursor_hash, ancestor);
        cursor_hash = next_hash;
        cursor_number = number.checked_sub(1);
    }
    ancestors.insert(block.hash(), block.header.clone());
    seen.insert(block.hash());

    for uncle in &block.ommers {
        let hash = uncle.hash();
        if !seen.insert(hash) {
            return Err(ConsensusError::DuplicateUncle(hash));
        }
        if ancestors.contains_key(&hash) {
            return Err(ConsensusError::UncleIsAncestor(hash));
        }
        let Some(uncle_parent) = ancestors.get(&uncle.parent_hash) else {
            return Err(ConsensusError::DanglingUncle(hash));
        };
        if uncle.parent_hash == block.parent_hash() {
            return Err(ConsensusError::DanglingUncle(hash));
        }

        if uncle.number >= block.number() {
            return Err(ConsensusError::UncleIsAncestor(hash));
        }
        let depth = block.number() - uncle.number;
        if depth == 0 || depth > max_depth {
            return Err(ConsensusError::UncleTooDeep {
                depth,
                max: max_depth,
            });
        }

        verify_header_against_parent(chain, pow, uncle, uncle_parent, true, true, unix_now)?;
    }
    Ok(())
}
