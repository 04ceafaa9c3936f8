use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    sync::Arc,
};

use clap::Parser;
use eth_call::{handle_request, jsonrpsee::RpcModule, DevNode};
use tracing::info;

use crate::common::{GenesisArgs, LogArgs, Result};

/// Serve JSON-RPC requests over stdio, one per line
///
/// Every request line gets exactly one response line, in order. Besides `eth_call` the dev node
/// serves `eth_sendRawTransaction`, `eth_getTransactionReceipt`, `eth_blockNumber`,
/// `eth_getCode`, `eth_getBalance` and `dev_finalizeBlock`.
#[derive(Parser, Debug)]
pub struct Cmd {
    /// File to read requests from. If '-' is specified, requests are read from stdin
    #[arg(long = "input", default_value = "-")]
    pub input: PathBuf,

    /// Chain configuration
    #[command(flatten)]
    pub genesis_args: GenesisArgs,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the rpc command
    pub async fn run(&self) -> Result<()> {
        self.log_args.init()?;
        let node = Arc::new(DevNode::new(self.genesis_args.load()?));
        let module = node.rpc_module()?;
        let stdout = io::stdout().lock();

        let served = if self.input.as_os_str() == "-" {
            serve(&module, io::stdin().lock(), stdout).await?
        } else {
            serve(&module, BufReader::new(File::open(&self.input)?), stdout).await?
        };
        info!(served, head = node.store().head_number(), "Input exhausted");
        Ok(())
    }
}

/// Answers each non-blank line of `input` with one line on `output`. Returns the number of
/// requests served.
pub async fn serve<Context>(
    module: &RpcModule<Context>,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<usize>
where
    Context: Send + Sync + 'static,
{
    let mut served = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_request(module, &line).await?;
        writeln!(output, "{response}")?;
        output.flush()?;
        served += 1;
    }
    Ok(served)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eth_call::{Genesis, GenesisAccount};
    use rstest::rstest;
    use serde_json::{json, Value};

    fn module() -> RpcModule<Arc<DevNode>> {
        let code = "0x60043560070260005260206000f3".parse().unwrap();
        let node = Arc::new(DevNode::new(Genesis::default().with_account(
            "0x1000000000000000000000000000000000000001".parse().unwrap(),
            GenesisAccount::default().with_code(code),
        )));
        node.rpc_module().unwrap()
    }

    async fn serve_lines(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        let served = serve(&module(), input.as_bytes(), &mut output).await.unwrap();
        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), served);
        responses
    }

    #[tokio::test]
    async fn test_serve_session() {
        let data = format!("0xc6888fa1{:064x}", 5);
        let input = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "eth_blockNumber"}).to_string(),
            String::new(),
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "eth_call",
                "params": [{"to": "0x1000000000000000000000000000000000000001", "data": data}]
            })
            .to_string(),
            json!({"jsonrpc": "2.0", "id": 3, "method": "dev_finalizeBlock"}).to_string(),
            json!({"jsonrpc": "2.0", "id": 4, "method": "eth_blockNumber", "params": []})
                .to_string(),
        ]
        .join("\n");

        let responses = serve_lines(&input).await;
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["result"], json!("0x0"));
        assert_eq!(responses[1]["result"], json!(format!("0x{:064x}", 35)));
        assert_eq!(responses[2]["result"]["number"], json!("0x1"));
        assert_eq!(responses[3]["result"], json!("0x1"));
        assert_eq!(
            responses.iter().map(|response| response["id"].clone()).collect::<Vec<_>>(),
            [json!(1), json!(2), json!(3), json!(4)]
        );
    }

    #[rstest]
    #[case::not_json("{", Value::Null, -32700)]
    #[case::not_a_request(r#"{"jsonrpc":"2.0","id":5}"#, json!(5), -32600)]
    #[case::unknown_method(r#"{"jsonrpc":"2.0","id":"x","method":"eth_mine"}"#, json!("x"), -32601)]
    #[case::bad_params(r#"{"jsonrpc":"2.0","id":6,"method":"eth_call","params":[]}"#, json!(6), -32602)]
    #[tokio::test]
    async fn test_serve_errors(#[case] line: &str, #[case] id: Value, #[case] code: i64) {
        let responses = serve_lines(line).await;
        assert_eq!(responses[0]["id"], id);
        assert_eq!(responses[0]["error"]["code"], json!(code));
    }
}
