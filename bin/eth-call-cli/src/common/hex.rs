//! Hex loading utilities

use std::{fs, io::Read, path::Path};

use alloy_primitives::{hex, Bytes};

use super::Result;

/// Load hex-encoded bytes from an argument or a file. If the file is a dash (-), read from stdin.
/// Priority: arg > file. Returns `None` if neither is provided.
pub fn load_hex(arg: Option<&str>, file: Option<&Path>) -> Result<Option<Bytes>> {
    let hex_string = match (arg, file) {
        (Some(arg), _) => arg.to_string(),
        (None, Some(file)) if file == Path::new("-") => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        (None, Some(file)) => fs::read_to_string(file)?,
        (None, None) => return Ok(None),
    };
    Ok(Some(hex::decode(hex_string.trim())?.into()))
}
