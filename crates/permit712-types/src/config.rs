//! Configuration primitives.
//!
//! This module provides the RPC endpoint configuration and the
//! [`LiteralOrEnv`] wrapper used to keep secrets out of configuration files.
//!
//! # Environment Variable Resolution
//!
//! ```json
//! {
//!   "http": "http://localhost:8545",           // Literal value
//!   "signer": "$PERMIT_SIGNER_KEY",            // Simple env var
//!   "secret": "${PERMIT_SIGNER_KEY}"           // Braced env var
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::ops::Deref;
use std::str::FromStr;
use url::Url;

/// RPC provider configuration for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcConfig {
    /// HTTP URL for the RPC endpoint.
    pub http: Url,
    /// Rate limit for requests per second (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
}

/// A config value that is either written inline or read from the environment.
///
/// - Literal: `"0xac09..."`
/// - Simple env var: `"$PERMIT_SIGNER_KEY"`
/// - Braced env var: `"${PERMIT_SIGNER_KEY}"`
///
/// Deserialize-only: the resolved value is usually a secret and is never
/// written back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn inner(&self) -> &T {
        &self.0
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Returns the variable name if `raw` is a `$VAR` or `${VAR}` reference.
fn env_var_name(raw: &str) -> Option<&str> {
    let name = raw
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .or_else(|| raw.strip_prefix('$'))?;
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let value = match env_var_name(&raw) {
            Some(name) => env::var(name).map_err(|_| {
                serde::de::Error::custom(format!("Environment variable '{name}' is not set"))
            })?,
            None => raw,
        };
        // The value may be a private key: report the parse error only.
        value
            .parse::<T>()
            .map(LiteralOrEnv)
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_syntax() {
        assert_eq!(env_var_name("${FOO_BAR}"), Some("FOO_BAR"));
        assert_eq!(env_var_name("$FOO"), Some("FOO"));
        assert_eq!(env_var_name("$"), None);
        assert_eq!(env_var_name("${}"), None);
        assert_eq!(env_var_name("$FOO-BAR"), None);
        assert_eq!(env_var_name("${FOO BAR}"), None);
        assert_eq!(env_var_name("plain"), None);
        assert_eq!(env_var_name("0xac09"), None);
    }

    #[test]
    fn test_parse_error_does_not_echo_value() {
        let err = serde_json::from_str::<LiteralOrEnv<u32>>("\"secret-ish\"")
            .unwrap_err()
            .to_string();
        assert!(!err.contains("secret-ish"));
    }

    #[test]
    fn test_literal_value() {
        let value: LiteralOrEnv<u32> = serde_json::from_str("\"31337\"").unwrap();
        assert_eq!(*value, 31337);
    }

    #[test]
    fn test_missing_env_var() {
        let result =
            serde_json::from_str::<LiteralOrEnv<u32>>("\"$PERMIT712_SURELY_UNSET_VARIABLE\"");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("PERMIT712_SURELY_UNSET_VARIABLE"));
    }

    #[test]
    fn test_rpc_config() {
        let config: RpcConfig =
            serde_json::from_str(r#"{"http":"http://127.0.0.1:8545","rate_limit":10}"#).unwrap();
        assert_eq!(config.http.as_str(), "http://127.0.0.1:8545/");
        assert_eq!(config.rate_limit, Some(10));
    }
}
