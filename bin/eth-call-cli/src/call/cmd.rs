use std::{path::PathBuf, sync::Arc};

use alloy_primitives::{Address, U256};
use clap::Parser;
use eth_call::{
    constants::methods::ETH_CALL, handle_request, BlockId, ChainStore, EthCallDispatcher,
    TransactionRequest,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::common::{load_hex, GenesisArgs, LogArgs, Result};

/// Execute one read-only call and print the JSON-RPC response
#[derive(Parser, Debug)]
pub struct Cmd {
    /// The callee
    #[arg(long = "to", visible_aliases = ["receiver"])]
    pub to: Address,

    /// The caller. Defaults to the zero address.
    #[arg(long = "from", visible_aliases = ["sender"])]
    pub from: Option<Address>,

    /// Call data as hex string
    #[arg(long = "data", visible_aliases = ["input"])]
    pub data: Option<String>,

    /// File containing call data. If '-' is specified, data is read from stdin
    #[arg(long = "datafile", visible_aliases = ["inputfile"])]
    pub datafile: Option<PathBuf>,

    /// Value transferred with the call, in wei
    #[arg(long = "value")]
    pub value: Option<U256>,

    /// Gas limit of the call. Defaults to the gas cap.
    #[arg(long = "gas")]
    pub gas: Option<u64>,

    /// Block to call against: a tag, a number or a block hash
    #[arg(long = "block", default_value = "latest")]
    pub block: BlockId,

    /// Chain configuration
    #[command(flatten)]
    pub genesis_args: GenesisArgs,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the call command
    pub async fn run(&self) -> Result<()> {
        self.log_args.init()?;
        let response = self.execute().await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }

    /// Builds the chain and runs the call as an `eth_call` request. Failures of the call itself
    /// are carried in the response.
    pub async fn execute(&self) -> Result<Value> {
        let store = Arc::new(ChainStore::from_genesis(self.genesis_args.load()?));
        let module = EthCallDispatcher::new(store).rpc_module()?;
        let call = self.request()?;
        debug!(?call, block = %self.block, "Executing call");

        let request =
            json!({"jsonrpc": "2.0", "id": 1, "method": ETH_CALL, "params": [call, self.block]});
        let response = handle_request(&module, &request.to_string()).await?;
        Ok(serde_json::from_str(&response)?)
    }

    /// The call object described by the arguments.
    pub fn request(&self) -> Result<TransactionRequest> {
        let mut request = TransactionRequest::default().to(self.to);
        if let Some(from) = self.from {
            request = request.from(from);
        }
        if let Some(data) = load_hex(self.data.as_deref(), self.datafile.as_deref())? {
            request = request.input(data.into());
        }
        if let Some(value) = self.value {
            request = request.value(value);
        }
        if let Some(gas) = self.gas {
            request = request.gas_limit(gas);
        }
        Ok(request)
    }
}
