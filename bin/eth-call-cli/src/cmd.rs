use clap::Parser;

use crate::common::Result;

/// Main command enumeration for the eth-call CLI tool
#[derive(Parser, Debug)]
#[command(infer_subcommands = true, version)]
pub enum MainCmd {
    /// Execute one read-only call and print the JSON-RPC response
    Call(crate::call::Cmd),
    /// Serve JSON-RPC requests over stdio, one per line
    Rpc(crate::rpc::Cmd),
}

impl MainCmd {
    /// Execute the main command
    pub async fn run(&self) -> Result<()> {
        match self {
            Self::Call(cmd) => cmd.run().await,
            Self::Rpc(cmd) => cmd.run().await,
        }
    }
}
