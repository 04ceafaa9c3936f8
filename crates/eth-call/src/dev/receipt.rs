use alloy_consensus::Eip658Value;
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use super::ExecutedTransaction;
use crate::SealedBlock;

/// The receipt of a transaction included in a finalized block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// The transaction hash.
    pub transaction_hash: B256,
    /// Position of the transaction in its block.
    #[serde(with = "alloy_serde::quantity")]
    pub transaction_index: u64,
    /// Hash of the including block.
    pub block_hash: B256,
    /// Number of the including block.
    #[serde(with = "alloy_serde::quantity")]
    pub block_number: u64,
    /// The sender.
    pub from: Address,
    /// The callee, `None` for contract creation.
    pub to: Option<Address>,
    /// The created contract, if any.
    pub contract_address: Option<Address>,
    /// Gas used by this transaction.
    #[serde(with = "alloy_serde::quantity")]
    pub gas_used: u64,
    /// Gas used by the block up to and including this transaction.
    #[serde(with = "alloy_serde::quantity")]
    pub cumulative_gas_used: u64,
    /// `0x1` on success, `0x0` on revert or halt.
    #[serde(flatten)]
    pub status: Eip658Value,
}

impl Receipt {
    /// Builds the receipt of the `index`th transaction of `block`.
    pub fn new(block: &SealedBlock, index: usize, tx: &ExecutedTransaction) -> Self {
        Self {
            transaction_hash: tx.hash,
            transaction_index: index as u64,
            block_hash: block.hash(),
            block_number: block.number,
            from: tx.from,
            to: tx.to,
            contract_address: tx.contract_address,
            gas_used: tx.gas_used,
            cumulative_gas_used: tx.cumulative_gas_used,
            status: Eip658Value::Eip658(tx.success),
        }
    }

    /// Whether the transaction succeeded.
    pub fn is_success(&self) -> bool {
        self.status.coerce_status()
    }
}
