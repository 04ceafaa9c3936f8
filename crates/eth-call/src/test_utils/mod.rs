//! Test utilities for the `eth_call` execution path.

mod bytecode;
pub mod contracts;
mod node;
mod rpc;
mod signer;

pub use bytecode::*;
pub use node::*;
pub use rpc::*;
pub use signer::*;
