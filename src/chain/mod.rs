//! On-chain side of the permit flow: RPC connectivity and the token contract.

pub mod provider;
pub mod token;

pub use provider::{EvmPrivateKey, ProviderError, connect, fetch_chain_id, rpc_client};
pub use token::{IERC20Permit, PermitToken, TokenError, permit_call};
