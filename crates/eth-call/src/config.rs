use revm::primitives::hardfork::SpecId;
use serde::{Deserialize, Serialize};

use crate::constants::chain::{
    DEFAULT_BLOCK_GAS_LIMIT, DEFAULT_BLOCK_TIME, DEFAULT_CHAIN_ID, DEFAULT_RPC_GAS_CAP,
};

/// Configuration of the chain and of the `eth_call` execution path.
///
/// Every field has a default, so a partial JSON object (or none at all) is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallConfig {
    /// The chain id, checked for transactions submitted to the dev node.
    pub chain_id: u64,
    /// The EVM specification calls and blocks are executed with.
    pub spec: SpecId,
    /// Upper bound for the gas limit of a single `eth_call`.
    ///
    /// The effective limit is the smaller of this value and the resolved block's gas limit.
    pub rpc_gas_cap: u64,
    /// The gas limit of every block produced by the dev node.
    pub block_gas_limit: u64,
    /// The base fee of every block produced by the dev node.
    pub base_fee: u64,
    /// Seconds added to the parent timestamp when a block is finalized.
    pub block_time: u64,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            spec: SpecId::CANCUN,
            rpc_gas_cap: DEFAULT_RPC_GAS_CAP,
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
            base_fee: 0,
            block_time: DEFAULT_BLOCK_TIME,
        }
    }
}

impl CallConfig {
    /// Sets the chain id.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Sets the EVM specification.
    pub fn with_spec(mut self, spec: SpecId) -> Self {
        self.spec = spec;
        self
    }

    /// Sets the RPC gas cap.
    pub fn with_rpc_gas_cap(mut self, rpc_gas_cap: u64) -> Self {
        self.rpc_gas_cap = rpc_gas_cap;
        self
    }

    /// Sets the block gas limit.
    pub fn with_block_gas_limit(mut self, block_gas_limit: u64) -> Self {
        self.block_gas_limit = block_gas_limit;
        self
    }

    /// Sets the base fee.
    pub fn with_base_fee(mut self, base_fee: u64) -> Self {
        self.base_fee = base_fee;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CallConfig = serde_json::from_str(r#"{"chainId": 42}"#).unwrap();
        assert_eq!(config.chain_id, 42);
        assert_eq!(config.rpc_gas_cap, DEFAULT_RPC_GAS_CAP);
        assert_eq!(config.block_gas_limit, DEFAULT_BLOCK_GAS_LIMIT);
        assert_eq!(config.spec, SpecId::CANCUN);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = CallConfig::default().with_rpc_gas_cap(1_000_000).with_base_fee(7);
        let json = serde_json::to_string(&config).unwrap();
        let decoded: CallConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, decoded);
    }
}
