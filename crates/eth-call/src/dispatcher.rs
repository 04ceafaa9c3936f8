//! The `eth_call` entry point.

use std::sync::Arc;

use alloy_eips::BlockId;
use alloy_primitives::Bytes;
use alloy_rpc_types_eth::TransactionRequest;
use jsonrpsee::{
    core::{RegisterMethodError, RpcResult},
    types::Params,
    RpcModule,
};
use tracing::debug;

use crate::{
    constants::methods::ETH_CALL, encoder::encode_outcome, message::MessageBuilder, rpc::param_list,
    state::ChainStore, CallError, ExecutionOutcome, Sandbox,
};

/// Serves `eth_call` against a [`ChainStore`].
///
/// Holds no per-request state, so one dispatcher can serve any number of threads.
#[derive(Debug, Clone)]
pub struct EthCallDispatcher {
    store: Arc<ChainStore>,
    sandbox: Sandbox,
}

impl EthCallDispatcher {
    /// Creates a dispatcher over `store`.
    pub fn new(store: Arc<ChainStore>) -> Self {
        let sandbox = Sandbox::new(store.config().clone());
        Self { store, sandbox }
    }

    /// The store calls are resolved against.
    pub const fn store(&self) -> &Arc<ChainStore> {
        &self.store
    }

    /// Resolves the block, builds the message and executes it.
    ///
    /// The block defaults to `latest`. Parameter and block errors are returned before anything
    /// is executed.
    pub fn execute(
        &self,
        request: TransactionRequest,
        block: Option<BlockId>,
    ) -> Result<ExecutionOutcome, CallError> {
        let view = self.store.state_at(block.unwrap_or_else(BlockId::latest))?;
        let builder = MessageBuilder::for_header(view.header(), self.store.config());
        let message = builder.build(request)?;
        self.sandbox.execute(&view, &message)
    }

    /// Executes a call and encodes its outcome.
    pub fn call(&self, request: TransactionRequest, block: Option<BlockId>) -> RpcResult<Bytes> {
        let outcome = self.execute(request, block)?;
        encode_outcome(outcome)
    }

    /// Handles the parameters of an `eth_call` request: `[callObject, blockReference?]`.
    pub fn handle_call(&self, params: &Params<'_>) -> RpcResult<Bytes> {
        let (call, block) = parse_call_params(params)?;
        self.call(call, block).inspect_err(|err| {
            debug!(method = ETH_CALL, code = err.code(), message = err.message(), "Call failed");
        })
    }

    /// An RPC module serving `eth_call` with a clone of this dispatcher.
    pub fn rpc_module(&self) -> Result<RpcModule<Self>, RegisterMethodError> {
        let mut module = RpcModule::new(self.clone());
        module.register_method(ETH_CALL, |params, dispatcher, _| dispatcher.handle_call(&params))?;
        Ok(module)
    }
}

/// Decodes `[callObject, blockReference?]`.
pub fn parse_call_params(
    params: &Params<'_>,
) -> Result<(TransactionRequest, Option<BlockId>), CallError> {
    let mut params = param_list(params, 1, 2)?;
    let block = match params.len() {
        2 => Some(serde_json::from_value::<BlockId>(params.remove(1))?),
        _ => None,
    };
    let call = serde_json::from_value::<TransactionRequest>(params.remove(0))?;
    Ok((call, block))
}
