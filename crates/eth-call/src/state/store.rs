use std::sync::Arc;

use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_primitives::{map::HashMap, B256};
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{BlockState, StateView};
use crate::{CallConfig, CallError, Genesis};

/// Append-only store of finalized block states.
///
/// Readers take the read lock only to clone an `Arc<BlockState>`. Block states are immutable, so
/// nothing a reader holds changes under it when a new block is published.
#[derive(Debug)]
pub struct ChainStore {
    config: CallConfig,
    index: RwLock<ChainIndex>,
}

#[derive(Debug)]
struct ChainIndex {
    /// Canonical blocks, indexed by number.
    blocks: Vec<Arc<BlockState>>,
    by_hash: HashMap<B256, u64>,
}

impl ChainIndex {
    fn head(&self) -> &Arc<BlockState> {
        // The genesis block is inserted on construction and blocks are never removed.
        &self.blocks[self.blocks.len() - 1]
    }
}

impl ChainStore {
    /// Creates a store whose only block is `genesis`.
    pub fn new(config: CallConfig, genesis: BlockState) -> Self {
        let mut by_hash = HashMap::default();
        by_hash.insert(genesis.hash(), genesis.number());
        info!(
            hash = %genesis.hash(),
            accounts = genesis.account_count(),
            "Initialized chain store"
        );
        Self { config, index: RwLock::new(ChainIndex { blocks: vec![Arc::new(genesis)], by_hash }) }
    }

    /// Creates a store from a genesis description.
    pub fn from_genesis(genesis: Genesis) -> Self {
        let config = genesis.config.clone();
        Self::new(config, genesis.into_block_state())
    }

    /// The chain configuration.
    pub const fn config(&self) -> &CallConfig {
        &self.config
    }

    /// The most recent block state.
    pub fn head(&self) -> Arc<BlockState> {
        Arc::clone(self.index.read().head())
    }

    /// The number of the most recent block.
    pub fn head_number(&self) -> u64 {
        self.index.read().head().number()
    }

    /// A view of the most recent block state.
    pub fn latest(&self) -> StateView {
        StateView::new(self.head())
    }

    /// Looks up a block state by number.
    pub fn block_by_number(&self, number: u64) -> Option<Arc<BlockState>> {
        let index = self.index.read();
        usize::try_from(number).ok().and_then(|number| index.blocks.get(number)).cloned()
    }

    /// Looks up a block state by hash.
    pub fn block_by_hash(&self, hash: B256) -> Option<Arc<BlockState>> {
        let index = self.index.read();
        let number = *index.by_hash.get(&hash)?;
        index.blocks.get(number as usize).cloned()
    }

    /// Resolves a block reference to a block state.
    ///
    /// `latest`, `pending`, `safe` and `finalized` all resolve to the head: blocks are final as
    /// soon as they are published and pending transactions are not pre-executed. Every stored
    /// block is canonical, so `requireCanonical` needs no extra check.
    pub fn resolve(&self, block: BlockId) -> Result<Arc<BlockState>, CallError> {
        let state = match block {
            BlockId::Number(
                BlockNumberOrTag::Latest
                | BlockNumberOrTag::Pending
                | BlockNumberOrTag::Safe
                | BlockNumberOrTag::Finalized,
            ) => Some(self.head()),
            BlockId::Number(BlockNumberOrTag::Earliest) => self.block_by_number(0),
            BlockId::Number(BlockNumberOrTag::Number(number)) => self.block_by_number(number),
            BlockId::Hash(hash) => self.block_by_hash(hash.block_hash),
        };
        state.ok_or(CallError::BlockNotFound(block))
    }

    /// Returns a view of the state after the referenced block.
    pub fn state_at(&self, block: BlockId) -> Result<StateView, CallError> {
        let state = self.resolve(block)?;
        debug!(%block, number = state.number(), "Resolved block");
        Ok(StateView::new(state))
    }

    /// Appends `state` as the new head.
    ///
    /// Fails unless `state` is the child of the current head.
    pub fn publish(&self, state: BlockState) -> Result<Arc<BlockState>, CallError> {
        let state = Arc::new(state);
        let mut index = self.index.write();
        let head = index.head();
        if state.block().parent_hash != head.hash() || state.number() != head.number() + 1 {
            return Err(CallError::Internal(format!(
                "block {} ({}) does not extend head {} ({})",
                state.number(),
                state.hash(),
                head.number(),
                head.hash()
            )));
        }
        index.by_hash.insert(state.hash(), state.number());
        index.blocks.push(Arc::clone(&state));
        drop(index);

        info!(number = state.number(), hash = %state.hash(), "Published block");
        Ok(state)
    }
}
