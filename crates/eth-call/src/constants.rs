//! Constants for the `eth_call` execution path.
//!
//! It groups the constants by concern as sub-modules.

/// JSON-RPC error codes.
///
/// The standard codes come from the JSON-RPC 2.0 specification, the server-side codes follow the
/// conventions used by geth and reth (EIP-1474).
pub mod rpc {
    /// Invalid JSON was received by the server.
    pub const PARSE_ERROR_CODE: i32 = -32700;
    /// The JSON sent is not a valid request object.
    pub const INVALID_REQUEST_CODE: i32 = -32600;
    /// The method does not exist or is not available. Answered by the RPC module itself.
    pub const METHOD_NOT_FOUND_CODE: i32 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS_CODE: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR_CODE: i32 = -32603;
    /// Generic server error, used for execution failures such as out of gas.
    pub const SERVER_ERROR_CODE: i32 = -32000;
    /// The requested resource (block) does not exist.
    pub const RESOURCE_NOT_FOUND_CODE: i32 = -32001;
    /// Execution reverted. The revert data is attached to the error object.
    pub const EXECUTION_REVERTED_CODE: i32 = 3;
}

/// Defaults for chain configuration.
pub mod chain {
    /// Default chain id of a dev chain.
    pub const DEFAULT_CHAIN_ID: u64 = 1337;
    /// Default block gas limit of the genesis block.
    pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 30_000_000;
    /// Default seconds between two finalized blocks.
    pub const DEFAULT_BLOCK_TIME: u64 = 6;
    /// Default gas cap for `eth_call` requests, the same as reth's `RPC_DEFAULT_GAS_CAP`.
    pub const DEFAULT_RPC_GAS_CAP: u64 = 50_000_000;
}

/// RPC method names served by the dispatcher and the dev node.
pub mod methods {
    /// Executes a read-only call.
    pub const ETH_CALL: &str = "eth_call";
    /// Submits a signed raw transaction.
    pub const ETH_SEND_RAW_TRANSACTION: &str = "eth_sendRawTransaction";
    /// Looks up a transaction receipt.
    pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
    /// Returns the head block number.
    pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
    /// Returns the code of an account.
    pub const ETH_GET_CODE: &str = "eth_getCode";
    /// Returns the balance of an account.
    pub const ETH_GET_BALANCE: &str = "eth_getBalance";
    /// Executes the pending transactions and seals a new block.
    pub const DEV_FINALIZE_BLOCK: &str = "dev_finalizeBlock";
}
