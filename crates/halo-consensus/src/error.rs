//! Error types for consensus validation.

use alloy_primitives::{B256, U256};
use thiserror::Error;

/// Consensus validation errors.
///
/// Nothing here is retried by the engine itself; every error surfaces to the
/// caller. `UnknownAncestor` and `FutureBlock` are the only non-permanent
/// outcomes — the caller may retry after sync or defer respectively.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// Parent header is not known to the chain. Retryable after sync.
    #[error("unknown ancestor")]
    UnknownAncestor,

    /// Block timestamp is beyond the future tolerance. May be deferred.
    #[error("block in the future: timestamp {time}, limit {limit}")]
    FutureBlock {
        /// Header timestamp.
        time: u64,
        /// Latest acceptable timestamp.
        limit: u64,
    },

    /// Block timestamp does not exceed its parent's.
    #[error("timestamp {time} not greater than parent timestamp {parent_time}")]
    OlderBlockTime {
        /// Header timestamp.
        time: u64,
        /// Parent timestamp.
        parent_time: u64,
    },

    /// Block timestamp does not exceed the median of the last 11 blocks.
    #[error("timestamp {time} not greater than median time past {median}")]
    BackdatedViaMtp {
        /// Header timestamp.
        time: u64,
        /// Median of the last 11 canonical timestamps.
        median: u64,
    },

    /// Extra-data section exceeds the maximum size.
    #[error("extra-data too long: {len} > {max}")]
    ExtraDataTooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Header difficulty does not match the engine's expectation.
    #[error("invalid difficulty: have {have}, want {want}")]
    DifficultyMismatch {
        /// Difficulty claimed by the header.
        have: U256,
        /// Difficulty computed by the engine.
        want: U256,
    },

    /// Gas limit exceeds the protocol maximum.
    #[error("invalid gas limit: have {have}, max {max}")]
    InvalidGasLimit {
        /// Header gas limit.
        have: u64,
        /// Protocol maximum.
        max: u64,
    },

    /// Gas limit below the protocol minimum.
    #[error("gas limit {have} below minimum {min}")]
    GasLimitTooLow {
        /// Header gas limit.
        have: u64,
        /// Protocol minimum.
        min: u64,
    },

    /// Gas limit moved too far from the parent's.
    #[error("gas limit {have} out of bound from parent {parent} (max delta {allowed})")]
    GasLimitBound {
        /// Header gas limit.
        have: u64,
        /// Parent gas limit.
        parent: u64,
        /// Maximum allowed delta.
        allowed: u64,
    },

    /// Gas used exceeds the gas limit.
    #[error("invalid gas used: {used} exceeds gas limit {limit}")]
    InvalidGasUsed {
        /// Gas used.
        used: u64,
        /// Gas limit.
        limit: u64,
    },

    /// Block number is not parent + 1.
    #[error("invalid block number: have {have}, want {want}")]
    InvalidNumber {
        /// Header number.
        have: u64,
        /// Expected number.
        want: u64,
    },

    /// Base fee present before the EIP-1559 fork.
    #[error("base fee present before activation: {have}")]
    BaseFeeBeforeFork {
        /// The unexpected base fee.
        have: U256,
    },

    /// Base fee missing after the EIP-1559 fork.
    #[error("header is missing base fee")]
    MissingBaseFee,

    /// Base fee does not match the EIP-1559 formula.
    #[error("invalid base fee: have {have}, want {want}")]
    InvalidBaseFee {
        /// Base fee claimed by the header.
        have: U256,
        /// Base fee computed from the parent.
        want: U256,
    },

    /// A header field forbidden on this chain variant is set.
    #[error("forbidden header field set: {0}")]
    ForbiddenField(&'static str),

    /// More uncles than the chain profile allows.
    #[error("too many uncles: {have} > {max}")]
    TooManyUncles {
        /// Uncle count in the block.
        have: usize,
        /// Profile maximum.
        max: usize,
    },

    /// Uncle already included in a recent block.
    #[error("duplicate uncle {0}")]
    DuplicateUncle(B256),

    /// Uncle is an ancestor of the including block.
    #[error("uncle {0} is an ancestor")]
    UncleIsAncestor(B256),

    /// Uncle's parent is not an ancestor of the including block.
    #[error("uncle {0} has a non-ancestor parent")]
    DanglingUncle(B256),

    /// Uncle is deeper than the chain profile allows.
    #[error("uncle depth {depth} exceeds maximum {max}")]
    UncleTooDeep {
        /// Distance between the block and the uncle.
        depth: u64,
        /// Profile maximum.
        max: u64,
    },

    /// Header difficulty is zero; no seal can be verified against it.
    #[error("non-positive difficulty")]
    NonPositiveDifficulty,

    /// Recomputed mix digest does not match the header's.
    #[error("invalid mix digest")]
    InvalidMixDigest,

    /// Proof-of-work output does not meet the difficulty target.
    #[error("invalid proof-of-work")]
    InvalidPow,

    /// Extra-data violates the DAO hard-fork rule in its enforcement range.
    #[error("invalid DAO fork extra-data")]
    InvalidDaoExtraData,

    /// Ecosystem fund address is the zero address. Fatal for the block.
    #[error("ecosystem fund address cannot be the zero address")]
    ZeroEcosystemAddress,

    /// Reserve fund address is the zero address. Fatal for the block.
    #[error("reserve fund address cannot be the zero address")]
    ZeroReserveAddress,

    /// Fee-share percent outside [0, 100].
    #[error("fee share percent must be 0-100, got {0}")]
    InvalidFeePercent(u8),

    /// Withdrawals handed to an engine that does not support them.
    #[error("this engine does not support withdrawals")]
    WithdrawalsUnsupported,
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
