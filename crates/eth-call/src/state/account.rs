use alloy_primitives::{map::HashMap, Bytes, B256, U256};
use revm::{
    primitives::{StorageKey, StorageValue, KECCAK_EMPTY},
    state::{AccountInfo, Bytecode},
};

/// An account as stored in a block snapshot.
///
/// The address is the key the account is stored under. An account with empty code is an
/// externally-owned account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Balance in wei.
    pub balance: U256,
    /// Transaction count (EOA) or creation count (contract).
    pub nonce: u64,
    /// Hash of `code`.
    pub code_hash: B256,
    /// Deployed code, empty for externally-owned accounts.
    pub code: Bytecode,
    /// Non-zero storage slots.
    pub storage: HashMap<StorageKey, StorageValue>,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            balance: U256::ZERO,
            nonce: 0,
            code_hash: KECCAK_EMPTY,
            code: Bytecode::default(),
            storage: HashMap::default(),
        }
    }
}

impl Account {
    /// Creates an account holding `balance` and nothing else.
    pub fn with_balance(balance: U256) -> Self {
        Self { balance, ..Default::default() }
    }

    /// Sets the nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the code from raw bytes, updating the code hash.
    pub fn code(mut self, code: Bytes) -> Self {
        self.set_code(Bytecode::new_legacy(code));
        self
    }

    /// Sets a storage slot. Zero values remove the slot.
    pub fn storage_slot(mut self, slot: U256, value: U256) -> Self {
        self.set_storage(slot, value);
        self
    }

    /// Replaces the code and recomputes the code hash.
    pub fn set_code(&mut self, code: Bytecode) {
        if code.is_empty() {
            self.code = Bytecode::default();
            self.code_hash = KECCAK_EMPTY;
        } else {
            self.code_hash = code.hash_slow();
            self.code = code;
        }
    }

    /// Writes a storage slot, keeping only non-zero values.
    pub fn set_storage(&mut self, slot: StorageKey, value: StorageValue) {
        if value.is_zero() {
            self.storage.remove(&slot);
        } else {
            self.storage.insert(slot, value);
        }
    }

    /// Reads a storage slot, zero when unset.
    pub fn storage_value(&self, slot: &StorageKey) -> StorageValue {
        self.storage.get(slot).copied().unwrap_or_default()
    }

    /// Whether the account carries code.
    pub fn is_contract(&self) -> bool {
        self.code_hash != KECCAK_EMPTY
    }

    /// Whether the account is empty in the EIP-161 sense.
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && !self.is_contract()
    }

    /// The account's code as raw bytes.
    pub fn code_bytes(&self) -> Bytes {
        self.code.original_bytes()
    }

    /// The account in the shape `revm` loads it.
    pub fn info(&self) -> AccountInfo {
        AccountInfo::new(self.balance, self.nonce, self.code_hash, self.code.clone())
    }
}
