use core::convert::Infallible;
use std::sync::Arc;

use alloy_consensus::Header;
use alloy_primitives::{Address, Bytes, B256, U256};
use revm::{
    primitives::{StorageKey, StorageValue},
    state::{AccountInfo, Bytecode},
    DatabaseRef,
};

use super::{Account, BlockState, SealedBlock};

/// A read-only view of the state after one finalized block.
///
/// Cloning is cheap. The view keeps its block alive, so it stays valid and consistent while newer
/// blocks are published.
#[derive(Debug, Clone)]
pub struct StateView {
    state: Arc<BlockState>,
}

impl StateView {
    /// Creates a view of `state`.
    pub const fn new(state: Arc<BlockState>) -> Self {
        Self { state }
    }

    /// Returns the account at `address`.
    ///
    /// Addresses that were never written read as an empty account.
    pub fn account(&self, address: Address) -> Account {
        self.state.account(&address).map(|account| account.as_ref().clone()).unwrap_or_default()
    }

    /// Whether `address` exists in this state.
    pub fn contains(&self, address: Address) -> bool {
        self.state.account(&address).is_some()
    }

    /// Returns the code at `address`, empty for externally-owned or unknown accounts.
    pub fn code(&self, address: Address) -> Bytes {
        self.state.account(&address).map(|account| account.code_bytes()).unwrap_or_default()
    }

    /// Returns the balance at `address`.
    pub fn balance(&self, address: Address) -> U256 {
        self.state.account(&address).map(|account| account.balance).unwrap_or_default()
    }

    /// Returns the nonce at `address`.
    pub fn nonce(&self, address: Address) -> u64 {
        self.state.account(&address).map(|account| account.nonce).unwrap_or_default()
    }

    /// Returns the storage value at (`address`, `slot`), zero when unset.
    pub fn storage(&self, address: Address, slot: U256) -> U256 {
        self.state
            .account(&address)
            .map(|account| account.storage_value(&slot))
            .unwrap_or_default()
    }

    /// The header of the block this view belongs to.
    pub fn header(&self) -> &Header {
        self.state.block().header()
    }

    /// The sealed block this view belongs to.
    pub fn block(&self) -> &SealedBlock {
        self.state.block()
    }

    /// The hash of the block this view belongs to.
    pub fn block_hash(&self) -> B256 {
        self.state.hash()
    }

    /// The block number of this view.
    pub fn number(&self) -> u64 {
        self.state.number()
    }

    /// The underlying block state.
    pub const fn state(&self) -> &Arc<BlockState> {
        &self.state
    }
}

impl DatabaseRef for StateView {
    type Error = Infallible;

    fn basic_ref(&self, address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        Ok(self.state.account(&address).map(|account| account.info()))
    }

    fn code_by_hash_ref(&self, code_hash: B256) -> Result<Bytecode, Self::Error> {
        Ok(self.state.code_by_hash(&code_hash).cloned().unwrap_or_default())
    }

    fn storage_ref(
        &self,
        address: Address,
        index: StorageKey,
    ) -> Result<StorageValue, Self::Error> {
        Ok(self.storage(address, index))
    }

    fn block_hash_ref(&self, number: u64) -> Result<B256, Self::Error> {
        Ok(self.state.block_hash(number).unwrap_or_default())
    }
}
