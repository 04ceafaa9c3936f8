//! Maps execution outcomes to JSON-RPC results and error objects.

use alloy_primitives::Bytes;
use alloy_sol_types::{Panic, Revert, SolError};
use jsonrpsee::{
    core::RpcResult,
    types::{ErrorObject, ErrorObjectOwned},
};
use revm::context::result::HaltReason;

use crate::{
    constants::rpc::{EXECUTION_REVERTED_CODE, SERVER_ERROR_CODE},
    ExecutionErrorKind, ExecutionOutcome,
};

/// Encodes `outcome` as the result of `eth_call`.
///
/// Only a successful call yields data. A revert yields an error carrying the revert bytes; halts
/// and rejections yield an error without data.
pub fn encode_outcome(outcome: ExecutionOutcome) -> RpcResult<Bytes> {
    match outcome {
        ExecutionOutcome::Success { output, .. } => Ok(output),
        ExecutionOutcome::Revert { output, .. } => Err(revert_error(output)),
        ExecutionOutcome::Error { kind, .. } => {
            Err(ErrorObject::owned(SERVER_ERROR_CODE, error_message(&kind), None::<()>))
        }
    }
}

/// The error object for a reverted call.
pub fn revert_error(output: Bytes) -> ErrorObjectOwned {
    let message = match decode_revert_reason(&output) {
        Some(reason) => format!("execution reverted: {reason}"),
        None => "execution reverted".to_string(),
    };
    ErrorObject::owned(EXECUTION_REVERTED_CODE, message, Some(output))
}

/// Decodes revert data as `Error(string)` or `Panic(uint256)`.
pub fn decode_revert_reason(output: &[u8]) -> Option<String> {
    if let Ok(revert) = Revert::abi_decode(output) {
        return Some(revert.reason().to_string());
    }
    if let Ok(panic) = Panic::abi_decode(output) {
        return Some(match panic.kind() {
            Some(kind) => format!("panic: {kind}"),
            None => format!("panic: 0x{:x}", panic.code),
        });
    }
    None
}

/// The message for a halted or rejected call.
pub fn error_message(kind: &ExecutionErrorKind) -> String {
    match kind {
        ExecutionErrorKind::OutOfGas => "out of gas".to_string(),
        ExecutionErrorKind::ExecutionFault(reason) => halt_message(reason),
        ExecutionErrorKind::Rejected(err) => err.to_string(),
    }
}

fn halt_message(reason: &HaltReason) -> String {
    let message = match reason {
        HaltReason::OutOfGas(_) => "out of gas",
        HaltReason::OpcodeNotFound => "invalid opcode",
        HaltReason::InvalidFEOpcode => "invalid opcode: INVALID",
        HaltReason::InvalidJump => "invalid jump destination",
        HaltReason::NotActivated => "opcode not activated",
        HaltReason::StackUnderflow => "stack underflow",
        HaltReason::StackOverflow => "stack limit reached 1024",
        HaltReason::OutOfOffset => "return data out of bounds",
        HaltReason::CreateCollision => "contract address collision",
        HaltReason::PrecompileError => "precompiled contract failed",
        HaltReason::NonceOverflow => "nonce uint64 overflow",
        HaltReason::CreateContractSizeLimit => "max code size exceeded",
        HaltReason::CreateContractStartingWithEF => "invalid code: must not begin with 0xef",
        HaltReason::CreateInitCodeSizeLimit => "max initcode size exceeded",
        HaltReason::OverflowPayment => "gas uint64 overflow",
        HaltReason::StateChangeDuringStaticCall | HaltReason::CallNotAllowedInsideStatic => {
            "write protection"
        }
        HaltReason::OutOfFunds => "insufficient balance for transfer",
        HaltReason::CallTooDeep => "max call depth exceeded",
        #[allow(unreachable_patterns)]
        other => return format!("execution halted: {other:?}"),
    };
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{bytes, U256};
    use revm::context::result::{InvalidTransaction, OutOfGasError};

    /// The serialized `data` member of an error object.
    fn data(err: &ErrorObjectOwned) -> Option<String> {
        err.data().map(|data| data.get().to_string())
    }

    fn hex_data(output: &Bytes) -> Option<String> {
        Some(serde_json::to_string(output).unwrap())
    }

    #[test]
    fn test_success_is_raw_output() {
        let output = Bytes::from(U256::from(35).to_be_bytes_vec());
        let encoded =
            encode_outcome(ExecutionOutcome::Success { output: output.clone(), gas_used: 21_500 });
        assert_eq!(encoded.unwrap(), output);
    }

    #[test]
    fn test_revert_with_reason() {
        let output: Bytes = Revert { reason: "not owner".to_string() }.abi_encode().into();
        let err = encode_outcome(ExecutionOutcome::Revert { output: output.clone(), gas_used: 1 })
            .unwrap_err();
        assert_eq!(err.code(), 3);
        assert_eq!(err.message(), "execution reverted: not owner");
        assert_eq!(data(&err), hex_data(&output));
    }

    #[test]
    fn test_revert_with_panic() {
        let output: Bytes =
            Panic { code: U256::from(0x12) }.abi_encode().into();
        let err = revert_error(output);
        assert_eq!(err.message(), "execution reverted: panic: division or modulo by zero");

        let output: Bytes = Panic { code: U256::from(0x99) }.abi_encode().into();
        assert_eq!(revert_error(output).message(), "execution reverted: panic: 0x99");
    }

    #[test]
    fn test_revert_without_reason() {
        for output in [Bytes::new(), bytes!("deadbeef")] {
            let err = revert_error(output.clone());
            assert_eq!(err.message(), "execution reverted");
            assert_eq!(data(&err), hex_data(&output));
        }
    }

    #[test]
    fn test_halt_messages() {
        let err = encode_outcome(ExecutionOutcome::Error {
            kind: ExecutionErrorKind::OutOfGas,
            gas_used: 100,
        })
        .unwrap_err();
        assert_eq!((err.code(), err.message(), data(&err)), (-32000, "out of gas", None));

        assert_eq!(
            error_message(&ExecutionErrorKind::ExecutionFault(HaltReason::InvalidFEOpcode)),
            "invalid opcode: INVALID"
        );
        assert_eq!(
            error_message(&ExecutionErrorKind::ExecutionFault(HaltReason::StackUnderflow)),
            "stack underflow"
        );
        assert_eq!(
            error_message(&ExecutionErrorKind::ExecutionFault(HaltReason::OutOfGas(
                OutOfGasError::Memory
            ))),
            "out of gas"
        );
    }

    #[test]
    fn test_rejected_message() {
        let err = InvalidTransaction::RejectCallerWithCode;
        let encoded = encode_outcome(ExecutionOutcome::Error {
            kind: ExecutionErrorKind::Rejected(err.clone()),
            gas_used: 0,
        })
        .unwrap_err();
        assert_eq!(encoded.code(), -32000);
        assert_eq!(encoded.message(), err.to_string());
    }
}
