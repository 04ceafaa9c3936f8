//! Isolated execution of a [`CallMessage`] against a [`StateView`].

use alloy_consensus::Header;
use alloy_primitives::{Bytes, U256};
use revm::{
    context::{
        result::{EVMError, ExecutionResult, HaltReason, InvalidTransaction},
        BlockEnv, Context,
    },
    handler::{ExecuteCommitEvm, MainBuilder, MainnetContext},
};
use tracing::{debug, trace};

use crate::{
    message::CallMessage,
    state::{StateOverlay, StateView},
    CallConfig, CallError,
};

/// Why an execution ended without returning or reverting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    /// The call ran out of gas.
    OutOfGas,
    /// The interpreter halted for any other reason (invalid opcode, bad jump, stack errors...).
    ExecutionFault(HaltReason),
    /// The EVM refused to start the call, e.g. the gas limit is below the intrinsic cost.
    Rejected(InvalidTransaction),
}

/// The result of one sandboxed execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The call returned normally.
    Success {
        /// Return data.
        output: Bytes,
        /// Gas consumed.
        gas_used: u64,
    },
    /// The call executed `REVERT`.
    Revert {
        /// Revert data.
        output: Bytes,
        /// Gas consumed.
        gas_used: u64,
    },
    /// The call halted or was rejected.
    Error {
        /// What went wrong.
        kind: ExecutionErrorKind,
        /// Gas consumed.
        gas_used: u64,
    },
}

impl ExecutionOutcome {
    /// Converts a `revm` execution result.
    pub fn from_result(result: ExecutionResult<HaltReason>) -> Self {
        match result {
            ExecutionResult::Success { gas_used, output, .. } => {
                Self::Success { output: output.into_data(), gas_used }
            }
            ExecutionResult::Revert { gas_used, output } => Self::Revert { output, gas_used },
            ExecutionResult::Halt { reason: HaltReason::OutOfGas(_), gas_used } => {
                Self::Error { kind: ExecutionErrorKind::OutOfGas, gas_used }
            }
            ExecutionResult::Halt { reason, gas_used } => {
                Self::Error { kind: ExecutionErrorKind::ExecutionFault(reason), gas_used }
            }
        }
    }

    /// Whether the call returned normally.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Return or revert data, if any.
    pub const fn output(&self) -> Option<&Bytes> {
        match self {
            Self::Success { output, .. } | Self::Revert { output, .. } => Some(output),
            Self::Error { .. } => None,
        }
    }

    /// Gas consumed by the call.
    pub const fn gas_used(&self) -> u64 {
        match self {
            Self::Success { gas_used, .. }
            | Self::Revert { gas_used, .. }
            | Self::Error { gas_used, .. } => *gas_used,
        }
    }
}

/// The block environment for executing on top of `header`.
pub(crate) fn block_env(header: &Header) -> BlockEnv {
    let mut block = BlockEnv::default();
    block.number = U256::from(header.number);
    block.timestamp = U256::from(header.timestamp);
    block.beneficiary = header.beneficiary;
    block.gas_limit = header.gas_limit;
    block.basefee = header.base_fee_per_gas.unwrap_or_default();
    block.difficulty = header.difficulty;
    block.prevrandao = Some(header.mix_hash);
    block
}

/// Executes calls without ever committing their effects.
///
/// Each execution gets a fresh [`StateOverlay`] over the view and the overlay is dropped when the
/// execution ends, whatever the outcome. Checks that only make sense for signed transactions are
/// switched off: nonce, balance, base fee, block gas limit and EIP-3607 (senders with code). The
/// per-transaction gas cap of Osaka does not apply either, calls are bounded by the gas cap.
#[derive(Debug, Clone)]
pub struct Sandbox {
    config: CallConfig,
}

impl Sandbox {
    /// Creates a sandbox executing with `config`'s chain id and spec.
    pub const fn new(config: CallConfig) -> Self {
        Self { config }
    }

    /// The configuration calls are executed with.
    pub const fn config(&self) -> &CallConfig {
        &self.config
    }

    /// Executes `message` on top of `view`.
    ///
    /// Execution failures are reported in the returned [`ExecutionOutcome`]; `Err` is reserved for
    /// failures of the node itself.
    pub fn execute(
        &self,
        view: &StateView,
        message: &CallMessage,
    ) -> Result<ExecutionOutcome, CallError> {
        let mut overlay = StateOverlay::new(view);
        let tx = message.tx_env(view.nonce(message.from), self.config.chain_id);

        let result = {
            let mut ctx: MainnetContext<&mut StateOverlay<'_>> =
                Context::new(&mut overlay, self.config.spec);
            ctx.block = block_env(view.header());
            ctx.cfg.chain_id = self.config.chain_id;
            ctx.cfg.disable_nonce_check = true;
            ctx.cfg.disable_balance_check = true;
            ctx.cfg.disable_base_fee = true;
            ctx.cfg.disable_block_gas_limit = true;
            ctx.cfg.disable_eip3607 = true;
            ctx.cfg.tx_gas_limit_cap = Some(u64::MAX);

            let mut evm = ctx.build_mainnet();
            evm.transact_commit(tx)
        };
        trace!(touched = !overlay.is_empty(), "Discarding overlay");
        drop(overlay);

        let outcome = match result {
            Ok(result) => ExecutionOutcome::from_result(result),
            Err(EVMError::Transaction(err)) => {
                ExecutionOutcome::Error { kind: ExecutionErrorKind::Rejected(err), gas_used: 0 }
            }
            Err(EVMError::Database(err)) => match err {},
            Err(err) => return Err(CallError::Internal(err.to_string())),
        };
        debug!(
            from = %message.from,
            to = %message.to,
            block = view.number(),
            success = outcome.is_success(),
            gas_used = outcome.gas_used(),
            "Executed call"
        );
        Ok(outcome)
    }
}
