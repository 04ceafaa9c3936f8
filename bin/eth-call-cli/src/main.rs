//! `eth-call` CLI: read-only contract calls against a chain built from a genesis file.
//!
//! `eth-call call` runs a single call and prints the JSON-RPC response. `eth-call rpc` serves
//! newline-delimited JSON-RPC requests over stdio, backed by an in-process dev node.

use clap::Parser;

mod cmd;
pub use cmd::*;

mod call;
mod common;
mod rpc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), common::CliError> {
    set_thread_panic_hook();
    MainCmd::parse().run().await.inspect_err(|e| eprintln!("{e}"))
}

/// Sets thread panic hook so a panic in any thread terminates the process.
fn set_thread_panic_hook() {
    use std::{
        backtrace::Backtrace,
        panic::{set_hook, take_hook},
        process::exit,
    };
    let orig_hook = take_hook();
    set_hook(Box::new(move |panic_info| {
        eprintln!("Custom backtrace: {}", Backtrace::capture());
        orig_hook(panic_info);
        exit(1);
    }));
}
