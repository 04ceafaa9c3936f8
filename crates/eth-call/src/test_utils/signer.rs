use alloy_consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{b256, Bytes, Signature, TxKind, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::constants::chain::DEFAULT_CHAIN_ID;

/// Private key of the account funded by [`dev_genesis`](super::dev_genesis).
pub const GENESIS_ACCOUNT_PRIVATE_KEY: B256 =
    b256!("0x99b3c12287537e38c90a9219d4cb074a89a16e9cdb20bf85728ebd97c343e342");

/// Gas limit of transactions built by [`create_transaction`].
pub const DEFAULT_TX_GAS: u64 = 0x100000;

/// Gas price of transactions built by [`create_transaction`].
pub const DEFAULT_GAS_PRICE: u128 = 1_000_000_000;

/// The signer of the genesis account.
pub fn genesis_signer() -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&GENESIS_ACCOUNT_PRIVATE_KEY).unwrap()
}

/// Signs `tx` and returns its EIP-2718 encoding.
pub fn sign_transaction<T>(signer: &PrivateKeySigner, tx: T) -> Bytes
where
    T: SignableTransaction<Signature>,
    TxEnvelope: From<Signed<T>>,
{
    let signature = signer.sign_hash_sync(&tx.signature_hash()).unwrap();
    TxEnvelope::from(tx.into_signed(signature)).encoded_2718().into()
}

/// A legacy transaction deploying `initcode`.
pub fn create_transaction(nonce: u64, initcode: Bytes) -> TxLegacy {
    TxLegacy {
        chain_id: Some(DEFAULT_CHAIN_ID),
        nonce,
        gas_price: DEFAULT_GAS_PRICE,
        gas_limit: DEFAULT_TX_GAS,
        to: TxKind::Create,
        value: U256::ZERO,
        input: initcode,
    }
}
