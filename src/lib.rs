//! EIP-712 typed-data signing and verification for EIP-2612 permit tokens.
//!
//! A permit lets a token holder authorize an allowance with an off-chain
//! signature instead of an `approve` transaction. This crate produces and
//! checks those signatures and drives the token contract that consumes them.
//!
//! # Modules
//!
//! - [`eip712`]: Domains, type schemas, validated payloads, and the
//!   sign/recover pair over them.
//! - [`permit`]: The fixed `Permit` schema, permit messages and signed permits.
//! - [`chain`]: RPC provider construction and the ERC-20 permit contract client.
//! - [`config`]: JSON configuration for the command line.
//! - [`telemetry`]: `tracing` subscriber setup.
//!
//! Chain-agnostic support types (timestamps, wire encodings, token amounts,
//! `LiteralOrEnv`) live in the `permit712-types` crate, re-exported as [`types`].
//!
//! # Example
//!
//! ```
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use alloy_primitives::{U256, address};
//! use alloy_signer_local::PrivateKeySigner;
//! use permit712::eip712::build_domain;
//! use permit712::permit::{PermitMessage, default_deadline, sign_permit};
//! use permit712::types::amount::parse_units;
//!
//! let owner: PrivateKeySigner =
//!     "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".parse()?;
//! let domain = build_domain("Permit Token", 31337, address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
//! let message = PermitMessage::new(
//!     owner.address(),
//!     address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
//!     parse_units("42", 18)?,
//!     U256::ZERO,
//!     default_deadline(),
//! );
//! let signed = sign_permit(&owner, &domain, message).await?;
//! assert!(signed.is_signed_by_owner()?);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod eip712;
pub mod permit;
pub mod telemetry;

pub use permit712_types as types;
