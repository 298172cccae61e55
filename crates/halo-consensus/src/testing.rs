//! Deterministic fixtures shared by unit and integration tests.

use std::collections::HashMap;

use alloy_primitives::{B256, U256};
use halo_types::{Block, ChainConfig, Header};

use crate::chain::ChainReader;
use crate::difficulty::calc_difficulty;
use crate::eip1559::calc_base_fee;
use crate::seal::{PowHasher, PowOutput};

/// Timestamp of the fixture genesis block.
pub const TEST_GENESIS_TIME: u64 = 1_700_000_000;

/// Gas limit used by fixture headers.
pub const TEST_GAS_LIMIT: u64 = 20_000_000;

/// In-memory canonical chain.
#[derive(Debug, Clone)]
pub struct MemoryChain {
    config: ChainConfig,
    by_number: HashMap<u64, Header>,
    by_hash: HashMap<B256, Header>,
    blocks: HashMap<B256, Block>,
    tip: u64,
}

impl MemoryChain {
    /// A chain with no headers at all.
    pub fn empty(config: ChainConfig) -> Self {
        Self {
            config,
            by_number: HashMap::new(),
            by_hash: HashMap::new(),
            blocks: HashMap::new(),
            tip: 0,
        }
    }

    /// A linked chain of `count` headers starting at height 0, spaced
    /// `interval` seconds apart, all at the same difficulty.
    pub fn linear(config: ChainConfig, count: u64, interval: u64, difficulty: u64) -> Self {
        Self::linear_from(config, 0, count, interval, difficulty)
    }

    /// A linked chain of `count` headers starting at height `start`.
    ///
    /// Timestamps are `TEST_GENESIS_TIME + number * interval`, so windows of
    /// the same chain shape are comparable regardless of the start height.
    pub fn linear_from(
        config: ChainConfig,
        start: u64,
        count: u64,
        interval: u64,
        difficulty: u64,
    ) -> Self {
        let mut chain = Self::empty(config);
        let mut parent_hash = B256::ZERO;
        for number in start..start + count {
            let mut header = raw_header(&chain, number, TEST_GENESIS_TIME + number * interval, difficulty);
            header.parent_hash = parent_hash;
            parent_hash = header.hash();
            chain.insert(header);
        }
        chain
    }

    /// Append a child of the current tip after `interval` seconds, at the
    /// given difficulty. Returns the new tip.
    pub fn append(&mut self, interval: u64, difficulty: u64) -> Header {
        let parent = self.tip();
        let mut header = raw_header(self, parent.number + 1, parent.time + interval, difficulty);
        header.parent_hash = parent.hash();
        self.insert(header.clone());
        header
    }

    /// Insert a header as canonical at its height.
    pub fn insert(&mut self, header: Header) {
        self.tip = self.tip.max(header.number);
        self.by_hash.insert(header.hash(), header.clone());
        self.by_number.insert(header.number, header);
    }

    /// Insert a full block (and its header) as canonical.
    pub fn insert_block(&mut self, block: Block) {
        self.insert(block.header.clone());
        self.blocks.insert(block.hash(), block);
    }

    /// The highest header inserted so far.
    pub fn tip(&self) -> Header {
        self.by_number
            .get(&self.tip)
            .cloned()
            .expect("memory chain has at least one header")
    }
}

impl ChainReader for MemoryChain {
    fn header_by_hash_and_number(&self, hash: B256, number: u64) -> Option<Header> {
        self.by_hash
            .get(&hash)
            .filter(|header| header.number == number)
            .cloned()
    }

    fn header_by_number(&self, number: u64) -> Option<Header> {
        self.by_number.get(&number).cloned()
    }

    fn block_by_hash_and_number(&self, hash: B256, number: u64) -> Option<Block> {
        self.blocks
            .get(&hash)
            .filter(|block| block.number() == number)
            .cloned()
    }

    fn config(&self) -> &ChainConfig {
        &self.config
    }
}

/// A standalone header with fixture gas accounting: gas used sits exactly on
/// the EIP-1559 target so the base fee stays at the configured initial value
/// along the whole chain.
pub fn raw_header(chain: &MemoryChain, number: u64, time: u64, difficulty: u64) -> Header {
    let config = chain.config();
    let mut header = Header::default();
    header.number = number;
    header.time = time;
    header.difficulty = U256::from(difficulty);
    header.gas_limit = TEST_GAS_LIMIT;
    header.gas_used = TEST_GAS_LIMIT / config.elasticity_multiplier;
    if config.is_eip1559(number) {
        header.base_fee = Some(U256::from(config.initial_base_fee));
    }
    header
}

/// A consensus-correct child of `parent` at the given time: linked hash,
/// expected difficulty, and the base fee the EIP-1559 formula demands.
pub fn child_of(chain: &MemoryChain, parent: &Header, time: u64, unix_now: u64) -> Header {
    let config = chain.config();
    let mut header = raw_header(chain, parent.number + 1, time, 0);
    header.parent_hash = parent.hash();
    header.difficulty = calc_difficulty(chain, time, parent, unix_now);
    header.base_fee = config
        .is_eip1559(header.number)
        .then(|| calc_base_fee(config, parent));
    header
}

/// A PoW backend with a canned answer.
#[derive(Debug, Clone)]
pub struct FakePow {
    output: PowOutput,
}

impl FakePow {
    /// Matches the zero mix digest of fixture headers and always meets the
    /// target.
    pub fn valid() -> Self {
        Self {
            output: PowOutput {
                mix_digest: B256::ZERO,
                result: B256::ZERO,
            },
        }
    }

    /// Matches the mix digest but never meets any realistic target.
    pub fn failing() -> Self {
        Self {
            output: PowOutput {
                mix_digest: B256::ZERO,
                result: B256::repeat_byte(0xff),
            },
        }
    }
}

impl PowHasher for FakePow {
    fn compute(&self, _seal_hash: B256, _nonce: u64, _number: u64) -> PowOutput {
        self.output.clone()
    }
}
