//! How failed calls surface on the JSON-RPC wire.

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::{Revert, SolError};
use eth_call::{
    handle_request,
    jsonrpsee::RpcModule,
    test_utils::{contracts, rpc_call},
    ChainStore, EthCallDispatcher, Genesis, GenesisAccount,
};
use rstest::rstest;
use serde_json::{json, Value};

const REVERTER: Address = address!("0x1000000000000000000000000000000000000001");
const PANICKER: Address = address!("0x1000000000000000000000000000000000000002");
const LOOPER: Address = address!("0x1000000000000000000000000000000000000003");
const INVALID: Address = address!("0x1000000000000000000000000000000000000004");
const UNDERFLOW: Address = address!("0x1000000000000000000000000000000000000005");
const RAW_REVERTER: Address = address!("0x1000000000000000000000000000000000000006");

fn module() -> RpcModule<EthCallDispatcher> {
    let genesis = [
        (REVERTER, contracts::reverter("not allowed")),
        (PANICKER, contracts::panicker(0x11)),
        (LOOPER, contracts::infinite_loop()),
        (INVALID, contracts::invalid_opcode()),
        (UNDERFLOW, contracts::stack_underflow()),
        (RAW_REVERTER, contracts::raw_reverter([0xde, 0xad])),
    ]
    .into_iter()
    .fold(Genesis::default(), |genesis, (address, code)| {
        genesis.with_account(address, GenesisAccount::default().with_code(code))
    });
    EthCallDispatcher::new(ChainStore::from_genesis(genesis).into()).rpc_module().unwrap()
}

async fn call(params: Value) -> Value {
    rpc_call(&module(), "eth_call", params).await
}

#[tokio::test]
async fn test_revert_reason_and_data() {
    let response = call(json!([{"to": REVERTER}])).await;
    let data = Bytes::from(Revert { reason: "not allowed".to_string() }.abi_encode());
    assert_eq!(
        response["error"],
        json!({"code": 3, "message": "execution reverted: not allowed", "data": data})
    );
}

#[rstest]
#[case::panic(PANICKER, 3, "execution reverted: panic: arithmetic underflow or overflow")]
#[case::raw_revert(RAW_REVERTER, 3, "execution reverted")]
#[case::out_of_gas(LOOPER, -32000, "out of gas")]
#[case::invalid_opcode(INVALID, -32000, "invalid opcode: INVALID")]
#[case::stack_underflow(UNDERFLOW, -32000, "stack underflow")]
#[tokio::test]
async fn test_failure_codes(#[case] to: Address, #[case] code: i64, #[case] message: &str) {
    let response = call(json!([{"to": to, "gas": "0x30000"}, "latest"])).await;
    let error = &response["error"];
    assert_eq!((&error["code"], &error["message"]), (&json!(code), &json!(message)));
    assert_eq!(error.get("data").is_some(), code == 3);
}

#[tokio::test]
async fn test_intrinsic_gas_shortfall() {
    let response = call(json!([{"to": REVERTER, "gas": "0x100"}])).await;
    assert_eq!(response["error"]["code"], json!(-32000));
    assert!(response["error"].get("data").is_none());
}

#[rstest]
#[case::no_params(json!([]))]
#[case::missing_to(json!([{"data": "0x"}]))]
#[case::negative_value(json!([{"to": REVERTER, "value": "-0x1"}]))]
#[case::non_hex_value(json!([{"to": REVERTER, "value": "ten"}]))]
#[case::bad_block(json!([{"to": REVERTER}, "yesterday"]))]
#[case::too_many(json!([{"to": REVERTER}, "latest", {}]))]
#[tokio::test]
async fn test_invalid_params(#[case] params: Value) {
    let response = call(params).await;
    assert_eq!(response["error"]["code"], json!(-32602));
    assert_eq!(response["id"], json!(1));
}

#[tokio::test]
async fn test_request_level_errors() {
    let module = module();
    let response =
        handle_request(&module, r#"{"jsonrpc":"2.0","id":9,"method":"eth_call""#).await.unwrap();
    let response: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["error"]["code"], json!(-32700));

    let response = rpc_call(&module, "eth_sign", json!([])).await;
    assert_eq!(response["error"]["code"], json!(-32601));
    assert_eq!(response["id"], json!(1));
}

#[tokio::test]
async fn test_value_transfer_without_balance_succeeds() {
    let recipient = address!("0x2000000000000000000000000000000000000002");
    let one_ether = U256::from(10).pow(U256::from(18));
    let response = call(json!([{"to": recipient, "value": one_ether}])).await;
    assert_eq!(response["result"], json!("0x"));
}
