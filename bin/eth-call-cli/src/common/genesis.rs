//! Genesis loading for the eth-call CLI

use std::{fs, path::PathBuf, str::FromStr};

use clap::Parser;
use eth_call::{revm::primitives::hardfork::SpecId, Genesis};
use tracing::info;

use super::{CliError, Result};

/// Chain configuration arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(next_help_heading = "Chain Options")]
pub struct GenesisArgs {
    /// JSON file with the genesis config and allocation. An empty chain is used if omitted.
    #[arg(long = "genesis", visible_aliases = ["prestate"])]
    pub genesis: Option<PathBuf>,

    /// Override the chain id of the genesis file
    #[arg(long = "chain.id", visible_aliases = ["chainid"])]
    pub chain_id: Option<u64>,

    /// Override the EVM spec of the genesis file, e.g. `Cancun` or `Prague`
    #[arg(long = "chain.spec", visible_aliases = ["spec"])]
    pub spec: Option<String>,

    /// Override the block gas limit of the genesis file
    #[arg(long = "chain.gaslimit")]
    pub block_gas_limit: Option<u64>,

    /// Override the gas cap applied to calls
    #[arg(long = "rpc.gascap", visible_aliases = ["gas-cap"], env = "ETH_CALL_GAS_CAP")]
    pub rpc_gas_cap: Option<u64>,
}

impl GenesisArgs {
    /// Loads the genesis file, if any, and applies the overrides.
    pub fn load(&self) -> Result<Genesis> {
        let mut genesis = match &self.genesis {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                serde_json::from_str::<Genesis>(&text)
                    .map_err(|source| CliError::InvalidJson { path: path.clone(), source })?
            }
            None => Genesis::default(),
        };

        if let Some(chain_id) = self.chain_id {
            genesis.config.chain_id = chain_id;
        }
        if let Some(spec) = &self.spec {
            genesis.config.spec = SpecId::from_str(spec)
                .map_err(|_| CliError::InvalidInput(format!("Unknown spec: {spec}")))?;
        }
        if let Some(gas_limit) = self.block_gas_limit {
            genesis.config.block_gas_limit = gas_limit;
        }
        if let Some(gas_cap) = self.rpc_gas_cap {
            genesis.config.rpc_gas_cap = gas_cap;
        }

        info!(
            chain_id = genesis.config.chain_id,
            spec = ?genesis.config.spec,
            accounts = genesis.alloc.len(),
            "Loaded genesis"
        );
        Ok(genesis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn genesis_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_with_overrides() {
        let file = genesis_file(
            r#"{
                "config": { "chainId": 42 },
                "alloc": {
                    "0x1000000000000000000000000000000000000001": { "balance": "0x10" }
                }
            }"#,
        );
        let args = GenesisArgs {
            genesis: Some(file.path().to_path_buf()),
            spec: Some("Prague".to_string()),
            rpc_gas_cap: Some(1_000_000),
            ..Default::default()
        };
        let genesis = args.load().unwrap();
        assert_eq!(genesis.config.chain_id, 42);
        assert_eq!(genesis.config.spec, SpecId::PRAGUE);
        assert_eq!(genesis.config.rpc_gas_cap, 1_000_000);
        assert_eq!(genesis.alloc.len(), 1);
    }

    #[test]
    fn test_load_defaults_without_file() {
        let genesis = GenesisArgs { chain_id: Some(7), ..Default::default() }.load().unwrap();
        assert_eq!(genesis.config.chain_id, 7);
        assert!(genesis.alloc.is_empty());
    }

    #[test]
    fn test_load_errors() {
        let file = genesis_file("{ not json");
        let args = GenesisArgs { genesis: Some(file.path().to_path_buf()), ..Default::default() };
        assert!(matches!(args.load(), Err(CliError::InvalidJson { .. })));

        let args = GenesisArgs { spec: Some("Nonsense".to_string()), ..Default::default() };
        assert!(matches!(args.load(), Err(CliError::InvalidInput(_))));

        let missing = PathBuf::from("/nonexistent/genesis.json");
        let args = GenesisArgs { genesis: Some(missing), ..Default::default() };
        assert!(matches!(args.load(), Err(CliError::Io(_))));
    }
}
