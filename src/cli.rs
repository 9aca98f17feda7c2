use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use permit712::types::amount::TokenAmount;
use std::path::PathBuf;

/// CLI arguments for `permit712`.
#[derive(Parser, Debug)]
#[command(name = "permit712")]
#[command(about = "Sign, verify and submit EIP-2612 token permits")]
pub struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", default_value = "config.json", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the token's EIP-712 domain and its separator
    Domain {
        /// Compare the separator with the contract's DOMAIN_SEPARATOR()
        #[arg(long)]
        check: bool,
    },
    /// Print the current permit nonce of an owner
    Nonce {
        /// Owner address; defaults to the configured signer
        #[arg(long)]
        owner: Option<Address>,
    },
    /// Sign a permit with the configured signer
    Sign {
        /// Address allowed to spend the tokens
        #[arg(long)]
        spender: Address,
        /// Amount in token units, e.g. "42" or "0.5"
        #[arg(long)]
        amount: TokenAmount,
        /// Permit nonce; fetched from the contract when omitted
        #[arg(long)]
        nonce: Option<u64>,
        /// Deadline as Unix seconds; defaults to now plus the configured TTL
        #[arg(long)]
        deadline: Option<u64>,
        /// Write the signed permit here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Recover the signer of a signed permit file and compare it with the owner
    Verify {
        #[arg(long)]
        permit: PathBuf,
    },
    /// Simulate, then submit a signed permit to the token contract
    Submit {
        #[arg(long)]
        permit: PathBuf,
    },
}
