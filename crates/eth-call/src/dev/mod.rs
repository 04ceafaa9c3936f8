//! An in-process dev node.
//!
//! Accepts signed raw transactions into a pending queue and turns them into blocks on demand, so
//! there is chain state to run calls against. Block production is serialized, calls are not: a
//! call in flight keeps reading the block it resolved even while a new one is published.

use std::{collections::VecDeque, sync::Arc};

use alloy_consensus::Transaction;
use alloy_eips::BlockId;
use alloy_primitives::{
    map::{HashMap, HashSet},
    Address, Bytes, B256, U256, U64,
};
use jsonrpsee::{core::RegisterMethodError, types::Params, RpcModule};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{
    constants::methods::{
        DEV_FINALIZE_BLOCK, ETH_BLOCK_NUMBER, ETH_GET_BALANCE, ETH_GET_CODE,
        ETH_GET_TRANSACTION_RECEIPT, ETH_SEND_RAW_TRANSACTION,
    },
    rpc::{param_list, single_param},
    state::{ChainStore, SealedBlock},
    CallError, EthCallDispatcher, Genesis,
};

mod builder;
pub use builder::{BlockBuilder, ExecutedTransaction};

mod pool;
pub use pool::PendingTransaction;

mod receipt;
pub use receipt::Receipt;

/// A single-sequencer dev chain serving `eth_call` and the calls needed to populate it.
#[derive(Debug)]
pub struct DevNode {
    store: Arc<ChainStore>,
    dispatcher: EthCallDispatcher,
    pool: Mutex<VecDeque<PendingTransaction>>,
    receipts: RwLock<HashMap<B256, Receipt>>,
    /// Held while a block is being built.
    producer: Mutex<()>,
}

impl DevNode {
    /// Creates a node whose chain starts at `genesis`.
    pub fn new(genesis: Genesis) -> Self {
        Self::with_store(Arc::new(ChainStore::from_genesis(genesis)))
    }

    /// Creates a node producing blocks on top of `store`.
    pub fn with_store(store: Arc<ChainStore>) -> Self {
        Self {
            dispatcher: EthCallDispatcher::new(Arc::clone(&store)),
            store,
            pool: Mutex::default(),
            receipts: RwLock::default(),
            producer: Mutex::default(),
        }
    }

    /// The chain store.
    pub const fn store(&self) -> &Arc<ChainStore> {
        &self.store
    }

    /// The `eth_call` dispatcher over this node's chain.
    pub const fn dispatcher(&self) -> &EthCallDispatcher {
        &self.dispatcher
    }

    /// Number of transactions waiting for the next block.
    pub fn pending_count(&self) -> usize {
        self.pool.lock().len()
    }

    /// Decodes a signed transaction and queues it for the next block.
    ///
    /// Only decoding, the signature and the chain id are checked here. Nonce and balance are
    /// checked when the transaction is executed.
    pub fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, CallError> {
        let tx = PendingTransaction::decode(&raw)?;
        let chain_id = self.store.config().chain_id;
        if let Some(id) = tx.envelope().chain_id() {
            if id != chain_id {
                return Err(CallError::InvalidParams(format!(
                    "invalid chain id {id}, expected {chain_id}"
                )));
            }
        }

        let hash = tx.hash();
        let mut pool = self.pool.lock();
        let known = pool.iter().any(|pending| pending.hash() == hash) ||
            self.receipts.read().contains_key(&hash);
        if known {
            return Err(CallError::InvalidParams(format!("transaction {hash} already known")));
        }
        debug!(%hash, sender = %tx.sender(), nonce = tx.nonce(), "Queued transaction");
        pool.push_back(tx);
        Ok(hash)
    }

    /// Executes the pending transactions and publishes the resulting block.
    ///
    /// Transactions run in arrival order, except that each sender's transactions run in nonce
    /// order. Transactions that fail validation are dropped. A transaction whose gas limit does
    /// not fit in the rest of the block stays queued for the next one. Once a sender has a
    /// transaction dropped or deferred, all of its later transactions are deferred too.
    pub fn finalize_block(&self) -> Result<SealedBlock, CallError> {
        let _producer = self.producer.lock();
        let mut pending: Vec<_> = self.pool.lock().drain(..).collect();
        order_by_nonce(&mut pending);

        let parent = self.store.latest();
        let mut builder = BlockBuilder::new(self.store.config(), &parent);
        let mut deferred = Vec::new();
        let mut deferred_senders: HashSet<Address> = HashSet::default();
        for tx in pending {
            // Transactions above the block gas limit never fit and are rejected by execution.
            let overflows = tx.gas_limit() > builder.gas_remaining() &&
                tx.gas_limit() <= builder.header().gas_limit;
            if overflows || deferred_senders.contains(&tx.sender()) {
                deferred_senders.insert(tx.sender());
                deferred.push(tx);
                continue;
            }
            if let Err(reason) = builder.execute(&tx) {
                warn!(
                    hash = %tx.hash(),
                    sender = %tx.sender(),
                    %reason,
                    "Dropped invalid transaction"
                );
                deferred_senders.insert(tx.sender());
            }
        }

        let (block, changes, executed) = builder.finish();
        let state = self.store.publish(parent.state().child(block.clone(), changes))?;

        let mut receipts = self.receipts.write();
        for (index, tx) in executed.iter().enumerate() {
            receipts.insert(tx.hash, Receipt::new(&block, index, tx));
        }
        drop(receipts);

        let requeued = deferred.len();
        let mut pool = self.pool.lock();
        for tx in deferred.into_iter().rev() {
            pool.push_front(tx);
        }
        drop(pool);

        info!(
            number = state.number(),
            hash = %state.hash(),
            transactions = executed.len(),
            gas_used = block.gas_used,
            requeued,
            "Finalized block"
        );
        Ok(block)
    }

    /// Looks up the receipt of an included transaction.
    pub fn transaction_receipt(&self, hash: B256) -> Option<Receipt> {
        self.receipts.read().get(&hash).cloned()
    }

    /// The code of `address` at `block`.
    pub fn code(&self, address: Address, block: BlockId) -> Result<Bytes, CallError> {
        Ok(self.store.state_at(block)?.code(address))
    }

    /// The balance of `address` at `block`.
    pub fn balance(&self, address: Address, block: BlockId) -> Result<U256, CallError> {
        Ok(self.store.state_at(block)?.balance(address))
    }

    /// An RPC module serving the dev methods and `eth_call`.
    pub fn rpc_module(self: &Arc<Self>) -> Result<RpcModule<Arc<Self>>, RegisterMethodError> {
        let mut module = RpcModule::new(Arc::clone(self));
        module.register_method(ETH_SEND_RAW_TRANSACTION, |params, node, _| {
            logged(ETH_SEND_RAW_TRANSACTION, single_param(&params))
                .and_then(|raw| logged(ETH_SEND_RAW_TRANSACTION, node.send_raw_transaction(raw)))
        })?;
        module.register_method(ETH_GET_TRANSACTION_RECEIPT, |params, node, _| {
            logged(ETH_GET_TRANSACTION_RECEIPT, single_param(&params))
                .map(|hash| node.transaction_receipt(hash))
        })?;
        module.register_method(ETH_BLOCK_NUMBER, |_, node, _| {
            Ok::<_, CallError>(U64::from(node.store.head_number()))
        })?;
        module.register_method(ETH_GET_CODE, |params, node, _| {
            let result = parse_account_params(&params)
                .and_then(|(address, block)| node.code(address, block));
            logged(ETH_GET_CODE, result)
        })?;
        module.register_method(ETH_GET_BALANCE, |params, node, _| {
            let result = parse_account_params(&params)
                .and_then(|(address, block)| node.balance(address, block));
            logged(ETH_GET_BALANCE, result)
        })?;
        module.register_method(DEV_FINALIZE_BLOCK, |_, node, _| {
            logged(DEV_FINALIZE_BLOCK, node.finalize_block())
        })?;
        module.merge(self.dispatcher.rpc_module()?)?;
        Ok(module)
    }
}

/// Sorts each sender's transactions by nonce, keeping the queue positions each sender holds.
fn order_by_nonce(pending: &mut [PendingTransaction]) {
    let mut positions: HashMap<Address, Vec<usize>> = HashMap::default();
    for (index, tx) in pending.iter().enumerate() {
        positions.entry(tx.sender()).or_default().push(index);
    }
    for indices in positions.values().filter(|indices| indices.len() > 1) {
        let mut txs: Vec<_> = indices.iter().map(|&index| pending[index].clone()).collect();
        txs.sort_by_key(PendingTransaction::nonce);
        for (&index, tx) in indices.iter().zip(txs) {
            pending[index] = tx;
        }
    }
}

/// Decodes `[address, blockReference?]`, defaulting the block to `latest`.
fn parse_account_params(params: &Params<'_>) -> Result<(Address, BlockId), CallError> {
    let mut params = param_list(params, 1, 2)?;
    let block = match params.len() {
        2 => serde_json::from_value(params.remove(1))?,
        _ => BlockId::latest(),
    };
    Ok((serde_json::from_value(params.remove(0))?, block))
}

fn logged<T>(method: &str, result: Result<T, CallError>) -> Result<T, CallError> {
    if let Err(err) = &result {
        debug!(method, code = err.code(), %err, "Request failed");
    }
    result
}
