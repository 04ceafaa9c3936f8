use jsonrpsee::RpcModule;
use serde_json::{json, Value};

use crate::rpc::handle_request;

/// Sends `method` with `params` to `module` under id 1 and returns the decoded response.
pub async fn rpc_call<Context>(module: &RpcModule<Context>, method: &str, params: Value) -> Value
where
    Context: Send + Sync + 'static,
{
    let request = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
    let response = handle_request(module, &request.to_string()).await.unwrap();
    serde_json::from_str(&response).unwrap()
}
