//! Read-only `eth_call` execution over versioned block state.
//!
//! The crate is organized leaf-first:
//!
//! - [`state`]: the chain store with per-block immutable snapshots ([`StateView`]) and the
//!   copy-on-write [`StateOverlay`] used to sandbox a single execution.
//! - [`message`]: turns an RPC call object into a validated [`CallMessage`].
//! - [`sandbox`]: runs a [`CallMessage`] against a [`StateView`] with `revm`, never committing.
//! - [`encoder`]: maps an [`ExecutionOutcome`] to a JSON-RPC result or error object.
//! - [`rpc`]: drives a `jsonrpsee` [`RpcModule`](jsonrpsee::RpcModule) in-process.
//! - [`dispatcher`]: the `eth_call` entry point.
//! - [`dev`]: an in-process dev node (raw transaction submission and block finalization) that
//!   produces the chain state calls are made against.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod genesis;
pub use genesis::*;

pub mod state;
pub use state::{Account, BlockState, ChainStore, SealedBlock, StateOverlay, StateView};

pub mod message;
pub use message::{CallMessage, MessageBuilder};

pub mod sandbox;
pub use sandbox::{ExecutionErrorKind, ExecutionOutcome, Sandbox};

pub mod encoder;

pub mod rpc;
pub use rpc::handle_request;

pub mod dispatcher;
pub use dispatcher::EthCallDispatcher;

pub mod dev;
pub use dev::{DevNode, Receipt};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use alloy_eips::{BlockId, BlockNumberOrTag};
pub use alloy_rpc_types_eth::TransactionRequest;
pub use jsonrpsee;
pub use revm;
