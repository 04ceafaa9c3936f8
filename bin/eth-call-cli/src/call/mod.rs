//! Call module for executing one read-only call against a genesis state

mod cmd;

pub use cmd::*;
