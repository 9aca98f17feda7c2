//! `permit712` command line entrypoint.
//!
//! Signs EIP-2612 permits with a configured key, verifies signed permit
//! documents offline, and submits them to the token contract.
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `CONFIG` selects the configuration file (default `config.json`)
//! - `RUST_LOG` controls log verbosity; logs go to stderr

mod cli;
mod run;

use std::process;

use crate::run::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1)
    }
}
