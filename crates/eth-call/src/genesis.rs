use std::collections::BTreeMap;

use alloy_consensus::Header;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{state::BlockState, Account, CallConfig};

/// Genesis description: chain configuration plus the initial account allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genesis {
    /// Chain configuration.
    #[serde(default)]
    pub config: CallConfig,
    /// Genesis block timestamp.
    #[serde(default, with = "alloy_serde::quantity")]
    pub timestamp: u64,
    /// Beneficiary of every block.
    #[serde(default)]
    pub coinbase: Address,
    /// Extra data of the genesis block.
    #[serde(default)]
    pub extra_data: Bytes,
    /// Initial accounts.
    #[serde(default)]
    pub alloc: BTreeMap<Address, GenesisAccount>,
}

/// An account in the genesis allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisAccount {
    /// Balance in wei.
    #[serde(default)]
    pub balance: U256,
    /// Nonce.
    #[serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Deployed code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Bytes>,
    /// Storage slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<BTreeMap<U256, U256>>,
}

impl GenesisAccount {
    /// Sets the balance.
    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    /// Sets the code.
    pub fn with_code(mut self, code: Bytes) -> Self {
        self.code = Some(code);
        self
    }

    /// Converts the genesis entry into a stored account.
    pub fn into_account(self) -> Account {
        let mut account = Account::with_balance(self.balance).nonce(self.nonce.unwrap_or_default());
        if let Some(code) = self.code {
            account = account.code(code);
        }
        for (slot, value) in self.storage.unwrap_or_default() {
            account.set_storage(slot, value);
        }
        account
    }
}

impl Genesis {
    /// Sets the chain configuration.
    pub fn with_config(mut self, config: CallConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an account to the allocation.
    pub fn with_account(mut self, address: Address, account: GenesisAccount) -> Self {
        self.alloc.insert(address, account);
        self
    }

    /// The genesis block header.
    pub fn header(&self) -> Header {
        Header {
            number: 0,
            parent_hash: B256::ZERO,
            beneficiary: self.coinbase,
            timestamp: self.timestamp,
            gas_limit: self.config.block_gas_limit,
            base_fee_per_gas: Some(self.config.base_fee),
            extra_data: self.extra_data.clone(),
            ..Default::default()
        }
    }

    /// Builds the state of block 0.
    pub fn into_block_state(self) -> BlockState {
        let header = self.header();
        BlockState::genesis(
            header,
            self.alloc.into_iter().map(|(address, account)| (address, account.into_account())),
        )
    }
}
