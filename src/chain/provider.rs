//! RPC provider construction.
//!
//! Every configured HTTP endpoint gets its own [`ThrottleLayer`]; the
//! endpoints are then combined behind a [`FallbackLayer`] so that a failing
//! node is transparently replaced by the next one.

use alloy_network::EthereumWallet;
use alloy_primitives::B256;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use alloy_transport::layers::{FallbackLayer, ThrottleLayer};
use alloy_transport_http::Http;
use permit712_types::config::RpcConfig;
use std::fmt::{Debug, Formatter};
use std::num::NonZeroUsize;
use std::str::FromStr;
use tower::ServiceBuilder;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("No HTTP(S) RPC endpoint configured")]
    NoHttpTransport,
    #[error("Invalid signer key: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A raw secp256k1 private key, validated as 32 hex-encoded bytes.
///
/// `Debug` output is redacted.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EvmPrivateKey(B256);

impl EvmPrivateKey {
    pub fn signer(&self) -> Result<PrivateKeySigner, ProviderError> {
        PrivateKeySigner::from_bytes(&self.0).map_err(|e| ProviderError::InvalidKey(e.to_string()))
    }
}

impl FromStr for EvmPrivateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid evm private key: {}", e))
    }
}

impl Debug for EvmPrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("EvmPrivateKey(<redacted>)")
    }
}

/// Builds a throttled, fallback-capable JSON-RPC client over the HTTP(S) endpoints in `rpc`.
pub fn rpc_client(rpc: &[RpcConfig]) -> Result<RpcClient, ProviderError> {
    let transports = rpc
        .iter()
        .filter_map(|provider_config| {
            let scheme = provider_config.http.scheme();
            let is_http = scheme == "http" || scheme == "https";
            if !is_http {
                tracing::warn!(rpc_url = %provider_config.http, "Skipping non-HTTP RPC endpoint");
                return None;
            }
            let rpc_url = provider_config.http.clone();
            tracing::info!(rpc_url = %rpc_url, rate_limit = ?provider_config.rate_limit, "Using HTTP transport");
            let rate_limit = provider_config.rate_limit.unwrap_or(u32::MAX);
            let service = ServiceBuilder::new()
                .layer(ThrottleLayer::new(rate_limit))
                .service(Http::new(rpc_url));
            Some(service)
        })
        .collect::<Vec<_>>();
    let active = NonZeroUsize::new(transports.len()).ok_or(ProviderError::NoHttpTransport)?;
    let fallback = ServiceBuilder::new()
        .layer(FallbackLayer::default().with_active_transport_count(active))
        .service(transports);
    Ok(RpcClient::new(fallback, false))
}

/// Connects a provider, with `signer` as its wallet when one is given.
///
/// Without a signer the provider can only read chain state.
pub fn connect(client: RpcClient, signer: Option<PrivateKeySigner>, chain_id: Option<u64>) -> DynProvider {
    match signer {
        Some(signer) => {
            let signer = signer.with_chain_id(chain_id);
            tracing::info!(signer = %signer.address(), "Using EVM provider with wallet");
            ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_client(client)
                .erased()
        }
        None => ProviderBuilder::new().connect_client(client).erased(),
    }
}

/// Fetches `eth_chainId`.
#[instrument(skip_all, err)]
pub async fn fetch_chain_id<P: Provider>(provider: &P) -> Result<u64, ProviderError> {
    let chain_id = provider.get_chain_id().await?;
    Ok(chain_id)
}
