use alloy_primitives::{Address, Bytes, U256};
use alloy_signer_local::PrivateKeySigner;

use super::{create_transaction, genesis_signer, sign_transaction};
use crate::{DevNode, Genesis, GenesisAccount};

/// Balance of the genesis account: 2^80 wei.
pub const GENESIS_BALANCE: U256 = U256::from_limbs([0, 1 << 16, 0, 0]);

/// A dev genesis funding the account of [`genesis_signer`].
pub fn dev_genesis() -> Genesis {
    Genesis::default().with_account(
        genesis_signer().address(),
        GenesisAccount::default().with_balance(GENESIS_BALANCE),
    )
}

/// Deploys `initcode` from `signer` in a block of its own and returns the contract address.
pub fn deploy(node: &DevNode, signer: &PrivateKeySigner, initcode: Bytes) -> Address {
    let nonce = node.store().latest().nonce(signer.address());
    let raw = sign_transaction(signer, create_transaction(nonce, initcode));
    let hash = node.send_raw_transaction(raw).unwrap();
    node.finalize_block().unwrap();
    let receipt = node.transaction_receipt(hash).unwrap();
    assert!(receipt.is_success(), "deployment failed: {receipt:?}");
    receipt.contract_address.unwrap()
}
