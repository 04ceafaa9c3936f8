use std::sync::Arc;

use alloy_consensus::Header;
use alloy_primitives::{map::HashMap, Address, B256};
use revm::state::Bytecode;
use serde::{Deserialize, Serialize};

use super::{Account, StateChanges};

/// Number of ancestor hashes served to `BLOCKHASH`.
pub const BLOCK_HASH_HISTORY: u64 = 256;

/// A block header together with its hash and the hashes of the transactions it includes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Deref)]
#[serde(rename_all = "camelCase")]
pub struct SealedBlock {
    hash: B256,
    #[deref]
    #[serde(flatten)]
    header: Header,
    transactions: Vec<B256>,
}

impl SealedBlock {
    /// Seals `header`, computing its hash.
    pub fn seal(header: Header, transactions: Vec<B256>) -> Self {
        Self { hash: header.hash_slow(), header, transactions }
    }

    /// The block hash.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// The block header.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Hashes of the included transactions, in execution order.
    pub fn transactions(&self) -> &[B256] {
        &self.transactions
    }
}

/// The post-state of one finalized block.
///
/// Never mutated once built. Accounts are reference counted so that a child block shares every
/// account it did not touch with its parent.
#[derive(Debug, Clone)]
pub struct BlockState {
    block: SealedBlock,
    accounts: HashMap<Address, Arc<Account>>,
    contracts: Arc<HashMap<B256, Bytecode>>,
    /// This block's own hash preceded by up to [`BLOCK_HASH_HISTORY`] ancestor hashes.
    recent_hashes: Vec<B256>,
}

impl BlockState {
    /// Builds the genesis state.
    pub fn genesis(header: Header, accounts: impl IntoIterator<Item = (Address, Account)>) -> Self {
        let block = SealedBlock::seal(header, Vec::new());
        let mut contracts = HashMap::default();
        let accounts = accounts
            .into_iter()
            .map(|(address, account)| {
                if account.is_contract() {
                    contracts.insert(account.code_hash, account.code.clone());
                }
                (address, Arc::new(account))
            })
            .collect();
        let recent_hashes = vec![block.hash()];
        Self { block, accounts, contracts: Arc::new(contracts), recent_hashes }
    }

    /// Builds the state of `block` by applying `changes` on top of this state.
    pub fn child(&self, block: SealedBlock, changes: StateChanges) -> Self {
        let mut accounts = self.accounts.clone();
        let mut contracts = Arc::clone(&self.contracts);

        for (hash, code) in changes.contracts {
            if !contracts.contains_key(&hash) {
                Arc::make_mut(&mut contracts).insert(hash, code);
            }
        }

        for (address, change) in changes.accounts {
            let Some(change) = change else {
                accounts.remove(&address);
                continue;
            };

            let mut account = match accounts.remove(&address) {
                Some(_) if change.storage_cleared => Account::default(),
                Some(existing) => Arc::unwrap_or_clone(existing),
                None => Account::default(),
            };
            account.balance = change.info.balance;
            account.nonce = change.info.nonce;
            if account.code_hash != change.info.code_hash {
                let code = change
                    .info
                    .code
                    .filter(|code| !code.is_empty())
                    .or_else(|| contracts.get(&change.info.code_hash).cloned())
                    .unwrap_or_default();
                account.set_code(code);
            }
            for (slot, value) in change.storage {
                account.set_storage(slot, value);
            }
            accounts.insert(address, Arc::new(account));
        }

        let mut recent_hashes = self.recent_hashes.clone();
        recent_hashes.push(block.hash());
        if recent_hashes.len() as u64 > BLOCK_HASH_HISTORY + 1 {
            recent_hashes.remove(0);
        }

        Self { block, accounts, contracts, recent_hashes }
    }

    /// The sealed block this state belongs to.
    pub const fn block(&self) -> &SealedBlock {
        &self.block
    }

    /// The block number.
    pub const fn number(&self) -> u64 {
        self.block.header.number
    }

    /// The block hash.
    pub const fn hash(&self) -> B256 {
        self.block.hash
    }

    /// Looks up an account.
    pub fn account(&self, address: &Address) -> Option<&Arc<Account>> {
        self.accounts.get(address)
    }

    /// Number of accounts that exist in this state.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Looks up code by its hash.
    pub fn code_by_hash(&self, code_hash: &B256) -> Option<&Bytecode> {
        self.contracts.get(code_hash)
    }

    /// The hash of block `number`, if it is this block or one of its recent ancestors.
    pub fn block_hash(&self, number: u64) -> Option<B256> {
        let distance = self.number().checked_sub(number)?;
        let index = (self.recent_hashes.len() as u64).checked_sub(distance + 1)?;
        self.recent_hashes.get(index as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AccountChange;
    use alloy_primitives::{address, U256};
    use revm::state::AccountInfo;

    fn header(number: u64, parent_hash: B256) -> Header {
        Header { number, parent_hash, ..Default::default() }
    }

    fn child_of(parent: &BlockState, changes: StateChanges) -> BlockState {
        let block = SealedBlock::seal(header(parent.number() + 1, parent.hash()), Vec::new());
        parent.child(block, changes)
    }

    #[test]
    fn test_child_shares_untouched_accounts() {
        let alice = address!("0x00000000000000000000000000000000000a11ce");
        let bob = address!("0x0000000000000000000000000000000000000b0b");
        let genesis = BlockState::genesis(
            header(0, B256::ZERO),
            [
                (alice, Account::with_balance(U256::from(100))),
                (bob, Account::with_balance(U256::from(5))),
            ],
        );

        let mut info = AccountInfo::default();
        info.balance = U256::from(6);
        let mut changes = StateChanges::default();
        changes.accounts.insert(bob, Some(AccountChange { info, ..Default::default() }));
        let child = child_of(&genesis, changes);

        assert!(Arc::ptr_eq(
            genesis.account(&alice).unwrap(),
            child.account(&alice).unwrap()
        ));
        assert_eq!(child.account(&bob).unwrap().balance, U256::from(6));
        assert_eq!(genesis.account(&bob).unwrap().balance, U256::from(5));
    }

    #[test]
    fn test_destroyed_account_is_removed() {
        let alice = address!("0x00000000000000000000000000000000000a11ce");
        let genesis =
            BlockState::genesis(header(0, B256::ZERO), [(alice, Account::with_balance(U256::ONE))]);

        let mut changes = StateChanges::default();
        changes.accounts.insert(alice, None);
        let child = child_of(&genesis, changes);

        assert!(child.account(&alice).is_none());
        assert!(genesis.account(&alice).is_some());
    }

    #[test]
    fn test_block_hash_window() {
        let mut state = BlockState::genesis(header(0, B256::ZERO), []);
        let genesis_hash = state.hash();
        for _ in 0..300 {
            state = child_of(&state, StateChanges::default());
        }

        assert_eq!(state.number(), 300);
        assert_eq!(state.block_hash(300), Some(state.hash()));
        assert!(state.block_hash(299).is_some());
        assert!(state.block_hash(44).is_some());
        assert_eq!(state.block_hash(43), None);
        assert_eq!(state.block_hash(301), None);
        assert_ne!(state.block_hash(44), Some(genesis_hash));

        // A call executing on top of this block sees 256 ancestors, the oldest one included.
        let oldest = state.number() - BLOCK_HASH_HISTORY;
        assert_eq!(oldest, 44);
        assert!(state.block_hash(oldest).is_some());
    }
}
