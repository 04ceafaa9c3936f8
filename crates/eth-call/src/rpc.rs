//! JSON-RPC plumbing shared by the `eth_call` dispatcher and the dev node.
//!
//! Methods are registered on a [`jsonrpsee::RpcModule`]. [`handle_request`] drives a module
//! in-process, so any transport that moves request and response text can serve it.

use jsonrpsee::{
    types::{Id, Params, Response, ResponsePayload},
    RpcModule,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::CallError;

/// Decodes the positional parameters as a list of `required..=max` values.
///
/// Missing parameters decode as an empty list, so trailing optional parameters may be omitted.
pub fn param_list(
    params: &Params<'_>,
    required: usize,
    max: usize,
) -> Result<Vec<Value>, CallError> {
    let list = match params.parse::<Option<Value>>() {
        Ok(None) => Vec::new(),
        Ok(Some(Value::Array(list))) => list,
        Ok(Some(other)) => {
            return Err(CallError::InvalidParams(format!(
                "expected a parameter array, got {other}"
            )))
        }
        Err(err) => return Err(CallError::InvalidParams(err.message().to_string())),
    };
    if list.len() < required || list.len() > max {
        return Err(CallError::InvalidParams(format!(
            "expected {required} to {max} parameters, got {}",
            list.len()
        )));
    }
    Ok(list)
}

/// Decodes exactly one positional parameter.
pub fn single_param<T: DeserializeOwned>(params: &Params<'_>) -> Result<T, CallError> {
    let mut list = param_list(params, 1, 1)?;
    Ok(serde_json::from_value(list.remove(0))?)
}

/// Answers one JSON-RPC request given as text with the response text.
///
/// Text that is not JSON gets a parse error and JSON that is not a request gets an invalid
/// request error. Everything else is answered by `module`, unknown methods included.
pub async fn handle_request<Context>(
    module: &RpcModule<Context>,
    request: &str,
) -> Result<String, serde_json::Error>
where
    Context: Send + Sync + 'static,
{
    trace!(request, "Handling request");
    match module.raw_json_request(request, 1).await {
        Ok((response, _)) => Ok(response.to_string()),
        Err(err) => rejection(request, err),
    }
}

/// The response to text the module could not read as a request.
fn rejection(request: &str, err: serde_json::Error) -> Result<String, serde_json::Error> {
    let (id, err) = match serde_json::from_str::<Value>(request) {
        Ok(value) => (request_id(&value), CallError::InvalidRequest(err.to_string())),
        Err(err) => (Id::Null, CallError::Parse(err.to_string())),
    };
    debug!(code = err.code(), %err, "Rejected request");
    serde_json::to_string(&Response::<()>::new(ResponsePayload::error(err), id))
}

/// The id of a malformed request, `null` when it has none that can be echoed.
fn request_id(request: &Value) -> Id<'static> {
    match request.get("id") {
        Some(Value::Number(id)) => id.as_u64().map_or(Id::Null, Id::Number),
        Some(Value::String(id)) => Id::Str(id.clone().into()),
        _ => Id::Null,
    }
}
