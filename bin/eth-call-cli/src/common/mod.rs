mod error;
mod genesis;
mod hex;
mod logging;

pub use error::*;
pub use genesis::*;
pub use hex::*;
pub use logging::*;
