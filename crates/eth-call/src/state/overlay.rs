use core::convert::Infallible;

use alloy_primitives::{map::HashMap, Address, B256};
use revm::{
    primitives::{StorageKey, StorageValue},
    state::{Account as EvmAccount, AccountInfo, Bytecode},
    Database, DatabaseCommit, DatabaseRef,
};
use tracing::trace;

use super::StateView;

/// The net change of one account recorded by a [`StateOverlay`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChange {
    /// Balance, nonce and code after the change.
    pub info: AccountInfo,
    /// Written slots. Zero values clear the slot.
    pub storage: HashMap<StorageKey, StorageValue>,
    /// The account was (re)created, so slots not in `storage` are zero.
    pub storage_cleared: bool,
}

/// Everything an overlay recorded, ready to be applied to a block state.
#[derive(Debug, Clone, Default)]
pub struct StateChanges {
    /// Changed accounts. `None` marks a destroyed account.
    pub accounts: HashMap<Address, Option<AccountChange>>,
    /// Code deployed while the overlay was live.
    pub contracts: HashMap<B256, Bytecode>,
}

/// A copy-on-write layer over a [`StateView`].
///
/// Reads fall through to the view unless the overlay holds a newer value, and commits land in the
/// overlay only. The view is borrowed immutably, so nothing written here can reach it. Dropping
/// the overlay discards the writes; [`StateOverlay::into_changes`] hands them to block
/// production instead.
#[derive(Debug)]
pub struct StateOverlay<'a> {
    view: &'a StateView,
    changes: StateChanges,
}

impl<'a> StateOverlay<'a> {
    /// Creates an empty overlay over `view`.
    pub fn new(view: &'a StateView) -> Self {
        Self { view, changes: StateChanges::default() }
    }

    /// The view this overlay reads through to.
    pub const fn view(&self) -> &'a StateView {
        self.view
    }

    /// Whether no write has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.changes.accounts.is_empty()
    }

    /// Consumes the overlay, returning the recorded changes.
    pub fn into_changes(self) -> StateChanges {
        self.changes
    }
}

impl Database for StateOverlay<'_> {
    type Error = Infallible;

    fn basic(&mut self, address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        match self.changes.accounts.get(&address) {
            Some(Some(change)) => Ok(Some(change.info.clone())),
            Some(None) => Ok(None),
            None => self.view.basic_ref(address),
        }
    }

    fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytecode, Self::Error> {
        match self.changes.contracts.get(&code_hash) {
            Some(code) => Ok(code.clone()),
            None => self.view.code_by_hash_ref(code_hash),
        }
    }

    fn storage(
        &mut self,
        address: Address,
        index: StorageKey,
    ) -> Result<StorageValue, Self::Error> {
        match self.changes.accounts.get(&address) {
            Some(Some(change)) => match change.storage.get(&index) {
                Some(value) => Ok(*value),
                None if change.storage_cleared => Ok(StorageValue::ZERO),
                None => self.view.storage_ref(address, index),
            },
            Some(None) => Ok(StorageValue::ZERO),
            None => self.view.storage_ref(address, index),
        }
    }

    fn block_hash(&mut self, number: u64) -> Result<B256, Self::Error> {
        self.view.block_hash_ref(number)
    }
}

impl DatabaseCommit for StateOverlay<'_> {
    fn commit(&mut self, changes: HashMap<Address, EvmAccount>) {
        for (address, account) in changes {
            if !account.is_touched() {
                continue;
            }
            if account.is_selfdestructed() || account.is_empty() {
                trace!(%address, "Removing account");
                self.changes.accounts.insert(address, None);
                continue;
            }

            let was_destroyed = matches!(self.changes.accounts.get(&address), Some(None));
            if let Some(code) = &account.info.code {
                if !code.is_empty() {
                    self.changes
                        .contracts
                        .entry(account.info.code_hash)
                        .or_insert_with(|| code.clone());
                }
            }

            let change = self
                .changes
                .accounts
                .entry(address)
                .or_default()
                .get_or_insert_with(AccountChange::default);
            if account.is_created() || was_destroyed {
                change.storage.clear();
                change.storage_cleared = true;
            }
            change.info = account.info;
            change.storage.extend(
                account
                    .storage
                    .into_iter()
                    .filter(|(_, slot)| slot.is_changed())
                    .map(|(key, slot)| (key, slot.present_value)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{state::BlockState, Account};
    use alloy_consensus::Header;
    use alloy_primitives::{address, U256};
    use revm::state::{AccountStatus, EvmStorageSlot};
    use std::sync::Arc;

    const ALICE: Address = address!("0x00000000000000000000000000000000000a11ce");

    fn view() -> StateView {
        let account = Account::with_balance(U256::from(10)).storage_slot(U256::ONE, U256::from(7));
        StateView::new(Arc::new(BlockState::genesis(Header::default(), [(ALICE, account)])))
    }

    fn touched(info: AccountInfo, storage: &[(u64, u64, u64)]) -> EvmAccount {
        let mut account = EvmAccount::from(info);
        account.status = AccountStatus::Touched;
        for (slot, original, present) in storage {
            account.storage.insert(
                U256::from(*slot),
                EvmStorageSlot::new_changed(U256::from(*original), U256::from(*present), 0),
            );
        }
        account
    }

    #[test]
    fn test_reads_fall_through_to_view() {
        let view = view();
        let mut overlay = StateOverlay::new(&view);
        assert_eq!(overlay.basic(ALICE).unwrap().unwrap().balance, U256::from(10));
        assert_eq!(overlay.storage(ALICE, U256::ONE).unwrap(), U256::from(7));
        assert_eq!(overlay.basic(Address::ZERO).unwrap(), None);
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_commit_shadows_view_without_mutating_it() {
        let view = view();
        let mut overlay = StateOverlay::new(&view);

        let mut info = AccountInfo::default();
        info.balance = U256::from(3);
        let mut changes = HashMap::default();
        changes.insert(ALICE, touched(info, &[(1, 7, 9)]));
        overlay.commit(changes);

        assert_eq!(overlay.basic(ALICE).unwrap().unwrap().balance, U256::from(3));
        assert_eq!(overlay.storage(ALICE, U256::ONE).unwrap(), U256::from(9));
        assert!(!overlay.is_empty());
        drop(overlay);

        assert_eq!(view.account(ALICE).balance, U256::from(10));
        assert_eq!(view.storage(ALICE, U256::ONE), U256::from(7));
    }

    #[test]
    fn test_untouched_accounts_are_ignored() {
        let view = view();
        let mut overlay = StateOverlay::new(&view);
        let mut changes = HashMap::default();
        changes.insert(ALICE, EvmAccount::from(AccountInfo::default()));
        overlay.commit(changes);
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_touched_empty_account_is_removed() {
        let view = view();
        let mut overlay = StateOverlay::new(&view);
        let mut changes = HashMap::default();
        changes.insert(ALICE, touched(AccountInfo::default(), &[]));
        overlay.commit(changes);

        assert_eq!(overlay.basic(ALICE).unwrap(), None);
        assert_eq!(overlay.storage(ALICE, U256::ONE).unwrap(), U256::ZERO);
        assert!(matches!(overlay.into_changes().accounts.get(&ALICE), Some(None)));
    }
}
