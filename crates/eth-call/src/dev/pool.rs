use alloy_consensus::{transaction::SignerRecoverable, Transaction, TxEnvelope};
use alloy_eips::{eip2718::Decodable2718, Typed2718};
use alloy_primitives::{keccak256, Address, TxKind, B256};
use revm::context::TxEnv;

use crate::CallError;

/// A signed transaction waiting for the next block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    hash: B256,
    sender: Address,
    envelope: TxEnvelope,
}

impl PendingTransaction {
    /// Decodes an EIP-2718 encoded transaction and recovers its sender.
    ///
    /// Legacy, EIP-2930 and EIP-1559 transactions are accepted.
    pub fn decode(raw: &[u8]) -> Result<Self, CallError> {
        let envelope = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|err| CallError::InvalidParams(format!("invalid transaction: {err}")))?;
        if matches!(envelope, TxEnvelope::Eip4844(_) | TxEnvelope::Eip7702(_)) {
            return Err(CallError::InvalidParams(format!(
                "unsupported transaction type {}",
                envelope.ty()
            )));
        }
        let sender = envelope
            .recover_signer()
            .map_err(|err| CallError::InvalidParams(format!("invalid signature: {err}")))?;
        Ok(Self { hash: keccak256(raw), sender, envelope })
    }

    /// The transaction hash.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// The transaction nonce.
    pub fn nonce(&self) -> u64 {
        self.envelope.nonce()
    }

    /// The recovered sender.
    pub const fn sender(&self) -> Address {
        self.sender
    }

    /// The signed transaction.
    pub const fn envelope(&self) -> &TxEnvelope {
        &self.envelope
    }

    /// The gas limit.
    pub fn gas_limit(&self) -> u64 {
        self.envelope.gas_limit()
    }

    /// The callee, `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        self.envelope.to()
    }

    /// The transaction environment for executing this transaction.
    pub fn tx_env(&self) -> TxEnv {
        let tx = &self.envelope;
        TxEnv {
            tx_type: tx.ty(),
            caller: self.sender,
            gas_limit: tx.gas_limit(),
            gas_price: tx.max_fee_per_gas(),
            kind: match tx.to() {
                Some(to) => TxKind::Call(to),
                None => TxKind::Create,
            },
            value: tx.value(),
            data: tx.input().clone(),
            nonce: tx.nonce(),
            chain_id: tx.chain_id(),
            access_list: tx.access_list().cloned().unwrap_or_default(),
            gas_priority_fee: tx.max_priority_fee_per_gas(),
            ..Default::default()
        }
    }
}
