#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core support types for `permit712`.
//!
//! This crate holds the chain-agnostic building blocks shared by the permit
//! signing library and its command line tool.
//!
//! # Modules
//!
//! - [`address`] - EIP-55 checksummed address and decimal `U256` wire encodings
//! - [`amount`] - Human-readable token amounts scaled by token decimals
//! - [`config`] - RPC configuration and environment variable resolution
//! - [`timestamp`] - Unix timestamps used for permit deadlines

pub mod address;
pub mod amount;
pub mod config;
pub mod timestamp;
