//! JSON configuration for the `permit712` command line.
//!
//! ```json
//! {
//!   "token": { "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3", "name": "Permit Token", "decimals": 18 },
//!   "chain_id": 31337,
//!   "rpc": [{ "http": "http://127.0.0.1:8545", "rate_limit": 25 }],
//!   "signer": "$PERMIT_SIGNER_KEY",
//!   "receipt_timeout_secs": 30,
//!   "permit_ttl_secs": 2592000
//! }
//! ```
//!
//! Only `token.address` and `rpc` are required. A missing `token.name` or
//! `token.decimals` is read from the contract, a missing `chain_id` from the
//! RPC endpoint.

use alloy_primitives::Address;
use permit712_types::address::ChecksummedAddress;
use permit712_types::config::{LiteralOrEnv, RpcConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::chain::EvmPrivateKey;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    address: ChecksummedAddress,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    decimals: Option<u8>,
}

impl TokenConfig {
    pub fn address(&self) -> Address {
        self.address.0
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn decimals(&self) -> Option<u8> {
        self.decimals
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    token: TokenConfig,
    #[serde(default)]
    chain_id: Option<u64>,
    rpc: Vec<RpcConfig>,
    #[serde(default)]
    signer: Option<LiteralOrEnv<EvmPrivateKey>>,
    #[serde(default = "config_defaults::default_receipt_timeout_secs")]
    receipt_timeout_secs: u64,
    #[serde(default = "config_defaults::default_permit_ttl_secs")]
    permit_ttl_secs: u64,
}

pub mod config_defaults {
    use std::env;

    use crate::permit::DEFAULT_PERMIT_TTL_SECS;

    pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 30;

    /// Returns the receipt timeout with fallback: $TX_RECEIPT_TIMEOUT_SECS env var -> 30
    pub fn default_receipt_timeout_secs() -> u64 {
        env::var("TX_RECEIPT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RECEIPT_TIMEOUT_SECS)
    }

    pub fn default_permit_ttl_secs() -> u64 {
        DEFAULT_PERMIT_TTL_SECS
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Config {
    pub fn token(&self) -> &TokenConfig {
        &self.token
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn rpc(&self) -> &[RpcConfig] {
        &self.rpc
    }

    pub fn signer(&self) -> Option<&EvmPrivateKey> {
        self.signer.as_ref().map(|s| s.inner())
    }

    pub fn receipt_timeout_secs(&self) -> u64 {
        self.receipt_timeout_secs
    }

    pub fn permit_ttl_secs(&self) -> u64 {
        self.permit_ttl_secs
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        content.parse()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = serde_json::from_str(s)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_full_config() {
        let config: Config = r#"{
            "token": { "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3", "name": "Permit Token", "decimals": 6 },
            "chain_id": 31337,
            "rpc": [{ "http": "http://127.0.0.1:8545", "rate_limit": 25 }],
            "signer": "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "receipt_timeout_secs": 12,
            "permit_ttl_secs": 3600
        }"#
        .parse()
        .unwrap();
        assert_eq!(
            config.token().address(),
            address!("0x5FbDB2315678afecb367f032d93F642f64180aa3")
        );
        assert_eq!(config.token().name(), Some("Permit Token"));
        assert_eq!(config.token().decimals(), Some(6));
        assert_eq!(config.chain_id(), Some(31337));
        assert_eq!(config.rpc().len(), 1);
        assert_eq!(config.receipt_timeout_secs(), 12);
        assert_eq!(config.permit_ttl_secs(), 3600);
        let signer = config.signer().unwrap().signer().unwrap();
        assert_eq!(
            signer.address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config: Config = r#"{
            "token": { "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3" },
            "rpc": [{ "http": "http://127.0.0.1:8545" }]
        }"#
        .parse()
        .unwrap();
        assert_eq!(config.token().name(), None);
        assert_eq!(config.token().decimals(), None);
        assert_eq!(config.chain_id(), None);
        assert!(config.signer().is_none());
        assert_eq!(config.permit_ttl_secs(), 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_debug_does_not_leak_signer() {
        let config: Config = r#"{
            "token": { "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3" },
            "rpc": [{ "http": "http://127.0.0.1:8545" }],
            "signer": "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
        }"#
        .parse()
        .unwrap();
        assert!(!format!("{config:?}").contains("ac0974bec39a17e3"));
    }

    #[test]
    fn test_invalid_signer_rejected() {
        let result = r#"{
            "token": { "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3" },
            "rpc": [{ "http": "http://127.0.0.1:8545" }],
            "signer": "not-a-key"
        }"#
        .parse::<Config>();
        assert!(matches!(result, Err(ConfigError::JsonParse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load_from_path(Path::new("/nonexistent/permit712.json"));
        assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
    }
}
