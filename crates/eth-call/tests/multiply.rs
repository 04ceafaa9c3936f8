//! Calls into a deployed contract from senders with and without code.

use std::sync::Arc;

use alloy_primitives::{address, hex, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use eth_call::{
    jsonrpsee::RpcModule,
    test_utils::{
        contracts::{self, IMultiplier},
        deploy, dev_genesis, genesis_signer, initcode, rpc_call,
    },
    DevNode,
};
use serde_json::{json, Value};

fn multiply_data(a: u64) -> Bytes {
    IMultiplier::multiplyCall { a: U256::from(a) }.abi_encode().into()
}

async fn eth_call(module: &RpcModule<Arc<DevNode>>, call: Value) -> Value {
    let response = rpc_call(module, "eth_call", json!([call, "latest"])).await;
    match response.get("result") {
        Some(result) => result.clone(),
        None => panic!("eth_call failed: {}", response["error"]),
    }
}

fn decode_word(result: &Value) -> U256 {
    let bytes = hex::decode(result.as_str().unwrap()).unwrap();
    IMultiplier::multiplyCall::abi_decode_returns(&bytes).unwrap()
}

#[tokio::test]
async fn test_multiply_from_genesis_account_and_contract() {
    let node = Arc::new(DevNode::new(dev_genesis()));
    let module = node.rpc_module().unwrap();
    let signer = genesis_signer();

    let multiplier = deploy(&node, &signer, initcode(contracts::multiplier(7)));
    let second = deploy(&node, &signer, initcode(contracts::multiplier(7)));
    assert_ne!(multiplier, second);
    assert_eq!(node.store().head_number(), 2);

    let from_account = eth_call(
        &module,
        json!({
            "from": signer.address(),
            "to": multiplier,
            "data": multiply_data(5),
            "gas": "0x100000",
            "gasPrice": "0x3b9aca00",
            "value": "0x0",
        }),
    )
    .await;
    assert_eq!(decode_word(&from_account), U256::from(35));

    let from_contract =
        eth_call(&module, json!({"from": second, "to": multiplier, "data": multiply_data(5)}))
            .await;
    assert_eq!(from_contract, from_account);
}

#[tokio::test]
async fn test_multiply_from_fresh_senders() {
    let node = Arc::new(DevNode::new(dev_genesis()));
    let multiplier = deploy(&node, &genesis_signer(), initcode(contracts::multiplier(7)));
    let module = node.rpc_module().unwrap();

    for from in [
        Address::ZERO,
        address!("0x00000000000000000000000000000000deadbeef"),
        address!("0xffffffffffffffffffffffffffffffffffffffff"),
        multiplier,
    ] {
        for a in [0u64, 1, 5, 1 << 40] {
            let call = json!({"from": from, "to": multiplier, "data": multiply_data(a)});
            let result = eth_call(&module, call).await;
            assert_eq!(decode_word(&result), U256::from(a) * U256::from(7), "from {from}");
        }
    }
}

#[tokio::test]
async fn test_call_to_plain_address_returns_empty() {
    let module = Arc::new(DevNode::new(dev_genesis())).rpc_module().unwrap();
    let to = address!("0x0000000000000000000000000000000000c0ffee");
    let result = eth_call(&module, json!({"to": to, "data": multiply_data(5)})).await;
    assert_eq!(result, json!("0x"));
    let result = eth_call(&module, json!({"to": genesis_signer().address()})).await;
    assert_eq!(result, json!("0x"));
}
