//! Read-only chain access consumed by the consensus engine.

use alloy_primitives::B256;
use halo_types::{Block, ChainConfig, Header};

/// Read-only view of the canonical chain.
///
/// All lookups are synchronous; callers must tolerate arbitrary latency per
/// lookup. A missing ancestor is a valid outcome (`None`), never an error —
/// the engine maps it to [`UnknownAncestor`](crate::ConsensusError::UnknownAncestor)
/// where a parent is required.
pub trait ChainReader: Send + Sync {
    /// Header with the given hash at the given height, if canonical.
    fn header_by_hash_and_number(&self, hash: B256, number: u64) -> Option<Header>;

    /// Canonical header at the given height.
    fn header_by_number(&self, number: u64) -> Option<Header>;

    /// Full block with the given hash at the given height.
    ///
    /// Only needed for uncle enumeration during uncle validation.
    fn block_by_hash_and_number(&self, hash: B256, number: u64) -> Option<Block>;

    /// The chain configuration.
    fn config(&self) -> &ChainConfig;
}
