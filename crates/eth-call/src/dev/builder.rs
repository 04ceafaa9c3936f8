use alloy_consensus::Header;
use alloy_primitives::{Address, B256};
use revm::{
    context::{
        result::{EVMError, ExecutionResult, Output},
        Context,
    },
    handler::{ExecuteCommitEvm, MainBuilder, MainnetContext},
};
use tracing::trace;

use super::PendingTransaction;
use crate::{
    sandbox::block_env,
    state::{SealedBlock, StateChanges, StateOverlay, StateView},
    CallConfig,
};

/// A transaction included in a block under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedTransaction {
    /// The transaction hash.
    pub hash: B256,
    /// The recovered sender.
    pub from: Address,
    /// The callee, `None` for contract creation.
    pub to: Option<Address>,
    /// The address of the created contract, if any.
    pub contract_address: Option<Address>,
    /// Whether execution succeeded.
    pub success: bool,
    /// Gas used by this transaction.
    pub gas_used: u64,
    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
}

/// Executes transactions on top of a parent block and seals the result.
///
/// Unlike the call sandbox, every transaction is fully validated and its effects are committed to
/// a block-local overlay, so later transactions observe earlier ones.
#[derive(Debug)]
pub struct BlockBuilder<'a> {
    config: &'a CallConfig,
    overlay: StateOverlay<'a>,
    header: Header,
    executed: Vec<ExecutedTransaction>,
}

impl<'a> BlockBuilder<'a> {
    /// Starts a block on top of `parent`.
    pub fn new(config: &'a CallConfig, parent: &'a StateView) -> Self {
        let parent_header = parent.header();
        let header = Header {
            parent_hash: parent.block_hash(),
            number: parent_header.number + 1,
            timestamp: parent_header.timestamp + config.block_time,
            beneficiary: parent_header.beneficiary,
            gas_limit: config.block_gas_limit,
            base_fee_per_gas: Some(config.base_fee),
            ..Default::default()
        };
        Self { config, overlay: StateOverlay::new(parent), header, executed: Vec::new() }
    }

    /// The header of the block under construction.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Gas still available in this block.
    pub const fn gas_remaining(&self) -> u64 {
        self.header.gas_limit.saturating_sub(self.header.gas_used)
    }

    /// Transactions included so far.
    pub fn executed(&self) -> &[ExecutedTransaction] {
        &self.executed
    }

    /// Executes `tx` and commits its effects.
    ///
    /// A transaction that fails validation leaves the block untouched and its reason is returned.
    pub fn execute(&mut self, tx: &PendingTransaction) -> Result<&ExecutedTransaction, String> {
        let result = {
            let mut ctx: MainnetContext<&mut StateOverlay<'a>> =
                Context::new(&mut self.overlay, self.config.spec);
            ctx.block = block_env(&self.header);
            ctx.cfg.chain_id = self.config.chain_id;
            ctx.cfg.tx_chain_id_check = true;

            let mut evm = ctx.build_mainnet();
            evm.transact_commit(tx.tx_env())
        };

        let result = match result {
            Ok(result) => result,
            Err(EVMError::Database(err)) => match err {},
            Err(err) => return Err(err.to_string()),
        };

        let gas_used = result.gas_used();
        self.header.gas_used += gas_used;
        let contract_address = match &result {
            ExecutionResult::Success { output: Output::Create(_, address), .. } => *address,
            _ => None,
        };
        trace!(hash = %tx.hash(), gas_used, success = result.is_success(), "Executed transaction");

        self.executed.push(ExecutedTransaction {
            hash: tx.hash(),
            from: tx.sender(),
            to: tx.to(),
            contract_address,
            success: result.is_success(),
            gas_used,
            cumulative_gas_used: self.header.gas_used,
        });
        Ok(&self.executed[self.executed.len() - 1])
    }

    /// Seals the block, returning it with the state changes and the included transactions.
    pub fn finish(self) -> (SealedBlock, StateChanges, Vec<ExecutedTransaction>) {
        let hashes = self.executed.iter().map(|tx| tx.hash).collect();
        let block = SealedBlock::seal(self.header, hashes);
        (block, self.overlay.into_changes(), self.executed)
    }
}
