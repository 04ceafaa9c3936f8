use std::path::PathBuf;

use alloy_primitives::hex::FromHexError;
use eth_call::{jsonrpsee::core::RegisterMethodError, CallError};

/// Error types for the eth-call CLI
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Failed to read or write a file or stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file did not hold the expected JSON
    #[error("Invalid JSON in {path}: {source}")]
    InvalidJson {
        /// The file being read
        path: PathBuf,
        /// The decoding error
        source: serde_json::Error,
    },

    /// A response could not be encoded or decoded
    #[error("JSON error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The call could not be set up
    #[error("Call error: {0}")]
    Call(#[from] CallError),

    /// The RPC module could not be assembled
    #[error("Failed to register RPC methods: {0}")]
    Rpc(#[from] RegisterMethodError),

    /// Logging could not be initialized
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for the eth-call command
pub type Result<T> = std::result::Result<T, CliError>;
