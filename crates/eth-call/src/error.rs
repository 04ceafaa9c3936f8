use alloy_eips::BlockId;
use jsonrpsee::types::{ErrorObject, ErrorObjectOwned};

use crate::constants::rpc::{
    INTERNAL_ERROR_CODE, INVALID_PARAMS_CODE, INVALID_REQUEST_CODE, PARSE_ERROR_CODE,
    RESOURCE_NOT_FOUND_CODE,
};

/// Errors raised before or around execution of a call.
///
/// Execution-level failures (revert, out of gas, halts) are not errors, they are values of
/// [`ExecutionOutcome`](crate::ExecutionOutcome).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// The request parameters are malformed or unsupported.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The block reference does not resolve to a known block.
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    /// The request object is not a valid JSON-RPC request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request is not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Internal failure, e.g. a database error during execution.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CallError {
    /// Returns the JSON-RPC error code of this error.
    pub const fn code(&self) -> i32 {
        match self {
            Self::InvalidParams(_) => INVALID_PARAMS_CODE,
            Self::BlockNotFound(_) => RESOURCE_NOT_FOUND_CODE,
            Self::InvalidRequest(_) => INVALID_REQUEST_CODE,
            Self::Parse(_) => PARSE_ERROR_CODE,
            Self::Internal(_) => INTERNAL_ERROR_CODE,
        }
    }

    /// Creates an [`CallError::InvalidParams`] from anything printable.
    pub fn invalid_params(err: impl core::fmt::Display) -> Self {
        Self::InvalidParams(err.to_string())
    }
}

impl From<CallError> for ErrorObjectOwned {
    fn from(err: CallError) -> Self {
        ErrorObject::owned(err.code(), err.to_string(), None::<()>)
    }
}

impl From<serde_json::Error> for CallError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidParams(err.to_string())
    }
}
