//! The consensus engine facade consumed by the block processor.

use std::sync::{mpsc, Arc};

use alloy_primitives::{Address, B256, U256};
use halo_types::{Block, Header, Transaction, Withdrawal};
use tracing::debug;

use crate::batch::{self, AbortHandle};
use crate::chain::ChainReader;
use crate::clock::{Clock, SystemClock};
use crate::difficulty;
use crate::error::{ConsensusError, ConsensusResult};
use crate::fees;
use crate::rewards;
use crate::seal::{self, PowHasher};
use crate::state::StateAccess;
use crate::validation;

/// Proof-of-work consensus engine for the Halo chain family.
///
/// The PoW hash backend and the clock are injected: the former is an
/// external collaborator, the latter keeps difficulty deterministic in tests
/// and lets consumers recompute persisted headers with `now` pinned to the
/// header's own timestamp.
#[derive(Clone)]
pub struct Engine {
    pow: Arc<dyn PowHasher>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Engine using the system wall clock.
    pub fn new(pow: Arc<dyn PowHasher>) -> Self {
        Self::with_clock(pow, Arc::new(SystemClock))
    }

    /// Engine with an injected clock.
    pub fn with_clock(pow: Arc<dyn PowHasher>, clock: Arc<dyn Clock>) -> Self {
        Self { pow, clock }
    }

    /// The proof-of-work verified author of the block.
    pub fn author(&self, header: &Header) -> Address {
        header.coinbase
    }

    /// Validate a single header against the consensus rules.
    ///
    /// Known headers short-circuit to success; a missing parent is
    /// [`ConsensusError::UnknownAncestor`]. `seal` additionally verifies the
    /// proof-of-work.
    pub fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> ConsensusResult<()> {
        if chain
            .header_by_hash_and_number(header.hash(), header.number)
            .is_some()
        {
            return Ok(());
        }
        let parent = self.resolve_parent(chain, header)?;
        validation::verify_header_against_parent(
            chain,
            self.pow.as_ref(),
            header,
            &parent,
            false,
            seal,
            self.clock.unix_now(),
        )
    }

    /// Validate a batch of headers concurrently.
    ///
    /// Results arrive on the returned channel in strict input order; the
    /// handle aborts further dispatch. See [`crate::batch`].
    pub fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (AbortHandle, mpsc::Receiver<ConsensusResult<()>>) {
        debug!(count = headers.len(), "starting batch header verification");
        batch::run(chain, self.pow.clone(), headers, seals, self.clock.unix_now())
    }

    /// Validate the uncles of a block.
    pub fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()> {
        validation::verify_uncles(chain, self.pow.as_ref(), block, self.clock.unix_now())
    }

    /// Initialize `header.difficulty` with the engine's expected value.
    pub fn prepare(&self, chain: &dyn ChainReader, header: &mut Header) -> ConsensusResult<()> {
        let parent = self.resolve_parent(chain, header)?;
        header.difficulty = self.calc_difficulty(chain, header.time, &parent);
        Ok(())
    }

    /// Expected difficulty for a child of `parent` at `time`.
    pub fn calc_difficulty(&self, chain: &dyn ChainReader, time: u64, parent: &Header) -> U256 {
        difficulty::calc_difficulty(chain, time, parent, self.clock.unix_now())
    }

    /// Apply block and uncle rewards, then the Halo base-fee distribution
    /// when EIP-1559 is active and the header carries a base fee.
    ///
    /// This engine does not support beacon withdrawals; a non-empty list is
    /// rejected.
    pub fn finalize(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        state: &mut dyn StateAccess,
        _txs: &[Transaction],
        uncles: &[Header],
        withdrawals: &[Withdrawal],
    ) -> ConsensusResult<()> {
        if !withdrawals.is_empty() {
            return Err(ConsensusError::WithdrawalsUnsupported);
        }
        let config = chain.config();
        if config.is_halo() {
            rewards::apply_block_rewards(state, header, uncles);
            if config.is_eip1559(header.number) {
                if let Some(base_fee) = header.base_fee {
                    fees::distribute_base_fee(state, config, header, base_fee, header.gas_used)?;
                }
            }
        }
        Ok(())
    }

    /// Finalize, then assemble the block from its parts.
    pub fn finalize_and_assemble(
        &self,
        chain: &dyn ChainReader,
        header: Header,
        state: &mut dyn StateAccess,
        txs: Vec<Transaction>,
        uncles: Vec<Header>,
        withdrawals: &[Withdrawal],
    ) -> ConsensusResult<Block> {
        self.finalize(chain, &header, state, &txs, &uncles, withdrawals)?;
        Ok(Block::new(header, txs, uncles))
    }

    /// Hash of the header prior to sealing. See [`seal::seal_hash`].
    pub fn seal_hash(&self, header: &Header) -> B256 {
        seal::seal_hash(header)
    }

    fn resolve_parent(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
    ) -> ConsensusResult<Header> {
        header
            .number
            .checked_sub(1)
            .and_then(|number| chain.header_by_hash_and_number(header.parent_hash, number))
            .ok_or(ConsensusError::UnknownAncestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::testing::{child_of, FakePow, MemoryChain, TEST_GENESIS_TIME};
    use halo_types::ChainConfig;

    const NOW: u64 = TEST_GENESIS_TIME + 1_000_000;

    fn engine() -> Engine {
        Engine::with_clock(Arc::new(FakePow::valid()), Arc::new(FixedClock(NOW)))
    }

    #[test]
    fn author_is_the_coinbase() {
        let mut header = Header::default();
        header.coinbase = Address::repeat_byte(0xab);
        assert_eq!(engine().author(&header), header.coinbase);
    }

    #[test]
    fn known_header_short_circuits() {
        let chain = MemoryChain::linear(ChainConfig::halo(), 5, 4, 1_000_000);
        let known = chain.tip();
        // The tip is already canonical; its (stale) difficulty is accepted
        // without recomputation.
        assert!(engine().verify_header(&chain, &known, true).is_ok());
    }

    #[test]
    fn missing_parent_is_unknown_ancestor() {
        let chain = MemoryChain::linear(ChainConfig::halo(), 5, 4, 1_000_000);
        let mut orphan = child_of(&chain, &chain.tip(), chain.tip().time + 4, NOW);
        orphan.parent_hash = B256::repeat_byte(0x99);
        assert_eq!(
            engine().verify_header(&chain, &orphan, false),
            Err(ConsensusError::UnknownAncestor)
        );
    }

    #[test]
    fn prepare_then_verify_round_trips() {
        let chain = MemoryChain::linear(ChainConfig::halo(), 20, 4, 1_000_000);
        let parent = chain.tip();
        let engine = engine();

        let mut header = child_of(&chain, &parent, parent.time + 4, NOW);
        header.difficulty = U256::ZERO;
        engine.prepare(&chain, &mut header).unwrap();
        assert!(engine.verify_header(&chain, &header, true).is_ok());
    }

    #[test]
    fn finalize_rejects_withdrawals() {
        let chain = MemoryChain::linear(ChainConfig::halo(), 2, 4, 1_000_000);
        let mut state = crate::state::MemoryState::new();
        let withdrawal = Withdrawal {
            index: 0,
            validator_index: 0,
            address: Address::repeat_byte(1),
            amount: 1,
        };
        assert_eq!(
            engine().finalize(
                &chain,
                &chain.tip(),
                &mut state,
                &[],
                &[],
                &[withdrawal.clone()]
            ),
            Err(ConsensusError::WithdrawalsUnsupported)
        );
        assert!(matches!(
            engine().finalize_and_assemble(
                &chain,
                chain.tip(),
                &mut state,
                vec![],
                vec![],
                &[withdrawal]
            ),
            Err(ConsensusError::WithdrawalsUnsupported)
        ));
    }

    #[test]
    fn finalize_credits_rewards_and_fees() {
        let chain = MemoryChain::linear(ChainConfig::halo(), 2, 4, 1_000_000);
        let config = chain.config().clone();
        let miner = Address::repeat_byte(0x11);

        let mut header = chain.tip();
        header.coinbase = miner;
        header.gas_used = 1_000;
        header.base_fee = Some(U256::from(10u64));

        let mut state = crate::state::MemoryState::new();
        engine()
            .finalize(&chain, &header, &mut state, &[], &[], &[])
            .unwrap();

        let base = crate::rewards::base_reward(header.number);
        // Base reward plus the miner's 30% of the 10,000 wei fee revenue.
        assert_eq!(state.balance(miner), base + U256::from(3_000u64));
        assert_eq!(state.balance(config.ecosystem_fund), U256::from(2_000u64));
        assert_eq!(state.balance(config.reserve_fund), U256::from(1_000u64));
    }

    #[test]
    fn assemble_returns_the_block() {
        let chain = MemoryChain::linear(ChainConfig::halo(), 2, 4, 1_000_000);
        let mut state = crate::state::MemoryState::new();
        let header = chain.tip();
        let block = engine()
            .finalize_and_assemble(&chain, header.clone(), &mut state, vec![], vec![], &[])
            .unwrap();
        assert_eq!(block.header, header);
        assert!(block.transactions.is_empty());
        assert!(block.ommers.is_empty());
    }
}
