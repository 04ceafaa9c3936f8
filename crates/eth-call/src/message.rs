//! Turns an RPC call object into an executable [`CallMessage`].

use alloy_consensus::Header;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_rpc_types_eth::TransactionRequest;
use revm::context::TxEnv;
use tracing::trace;

use crate::{CallConfig, CallError};

/// A fully-resolved call, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMessage {
    /// The caller. Defaults to the zero address.
    pub from: Address,
    /// The callee.
    pub to: Address,
    /// Wei transferred with the call.
    pub value: U256,
    /// Call data.
    pub input: Bytes,
    /// Gas available to the call.
    pub gas_limit: u64,
}

impl CallMessage {
    /// The transaction environment the sandbox executes.
    ///
    /// Gas price is always zero and the nonce is taken from the caller's account.
    pub fn tx_env(&self, nonce: u64, chain_id: u64) -> TxEnv {
        TxEnv {
            caller: self.from,
            kind: TxKind::Call(self.to),
            value: self.value,
            data: self.input.clone(),
            gas_limit: self.gas_limit,
            gas_price: 0,
            nonce,
            chain_id: Some(chain_id),
            ..Default::default()
        }
    }
}

/// Builds [`CallMessage`]s against one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageBuilder {
    max_gas: u64,
}

impl MessageBuilder {
    /// Creates a builder whose gas ceiling is the smaller of the block gas limit and the gas cap.
    pub fn new(block_gas_limit: u64, gas_cap: u64) -> Self {
        Self { max_gas: block_gas_limit.min(gas_cap) }
    }

    /// Creates a builder for calls executed on top of `header`.
    pub fn for_header(header: &Header, config: &CallConfig) -> Self {
        Self::new(header.gas_limit, config.rpc_gas_cap)
    }

    /// The gas granted to calls without an explicit limit, and the ceiling for explicit ones.
    pub const fn max_gas(&self) -> u64 {
        self.max_gas
    }

    /// Validates `request` and fills in defaults.
    ///
    /// Fee fields and the nonce are accepted but play no part in the call.
    pub fn build(&self, request: TransactionRequest) -> Result<CallMessage, CallError> {
        let to = match request.to {
            Some(TxKind::Call(to)) => to,
            Some(TxKind::Create) | None => {
                return Err(CallError::InvalidParams(
                    "contract creation is not supported, `to` is required".to_string(),
                ))
            }
        };
        let input = request.input.try_into_unique_input().map_err(CallError::invalid_params)?;
        let gas_limit = match request.gas {
            Some(gas) if gas > self.max_gas => {
                trace!(requested = gas, cap = self.max_gas, "Clamping gas");
                self.max_gas
            }
            Some(gas) => gas,
            None => self.max_gas,
        };

        Ok(CallMessage {
            from: request.from.unwrap_or_default(),
            to,
            value: request.value.unwrap_or_default(),
            input: input.unwrap_or_default(),
            gas_limit,
        })
    }
}
