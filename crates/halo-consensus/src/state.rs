//! State access seam used by finalization.
//!
//! The real state database is an external collaborator; the engine only needs
//! balance credits/debits and raw storage reads for fee-share records. State
//! mutation during finalization is serialized by the caller — one finalizer
//! per block — so the trait takes `&mut self` and needs no interior locking.

use alloy_primitives::{Address, B256, U256};
use std::collections::HashMap;

/// Minimal mutable state surface consumed by reward and fee application.
pub trait StateAccess {
    /// Current balance of an account.
    fn balance(&self, address: Address) -> U256;

    /// Credit an account.
    fn add_balance(&mut self, address: Address, amount: U256);

    /// Debit an account. Saturates at zero; callers check balances first.
    fn sub_balance(&mut self, address: Address, amount: U256);

    /// Raw storage slot of a contract.
    fn storage(&self, address: Address, slot: B256) -> B256;

    /// Write a raw storage slot of a contract.
    fn set_storage(&mut self, address: Address, slot: B256, value: B256);
}

/// In-memory state, for tests and light tooling.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    balances: HashMap<Address, U256>,
    storage: HashMap<(Address, B256), B256>,
}

impl MemoryState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// State pre-funded with the given balances.
    pub fn with_balances(balances: impl IntoIterator<Item = (Address, U256)>) -> Self {
        Self {
            balances: balances.into_iter().collect(),
            storage: HashMap::new(),
        }
    }
}

impl StateAccess for MemoryState {
    fn balance(&self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or_default()
    }

    fn add_balance(&mut self, address: Address, amount: U256) {
        let entry = self.balances.entry(address).or_default();
        *entry = entry.saturating_add(amount);
    }

    fn sub_balance(&mut self, address: Address, amount: U256) {
        let entry = self.balances.entry(address).or_default();
        *entry = entry.saturating_sub(amount);
    }

    fn storage(&self, address: Address, slot: B256) -> B256 {
        self.storage
            .get(&(address, slot))
            .copied()
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: Address, slot: B256, value: B256) {
        self.storage.insert((address, slot), value);
    }
}
