//! Rpc module serving newline-delimited JSON-RPC requests over stdio

mod cmd;

pub use cmd::*;
