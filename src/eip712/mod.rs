//! EIP-712 typed-data signing and verification.
//!
//! The three moving parts are the [`Domain`], which binds a signature to one
//! contract on one chain; the [`TypeSchema`] and [`Payload`] describing the
//! signed struct; and the [`sign_typed_data`] / [`recover_signer`] pair that
//! hash them together and produce or check a [`SplitSignature`].
//!
//! ```
//! # async fn demo() {
//! use alloy_primitives::{U256, address};
//! use alloy_signer_local::PrivateKeySigner;
//! use permit712::eip712::*;
//!
//! let signer: PrivateKeySigner =
//!     "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".parse().unwrap();
//! let domain = build_domain("Permit Token", 31337, address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
//! let schema = TypeSchema::new("Ping", [FieldDescriptor::new("seq", FieldType::Uint256)]).unwrap();
//! let payload = Payload::new(&schema, [("seq", U256::from(1u64))]).unwrap();
//!
//! let signature = sign_typed_data(&signer, &domain, &schema, &payload).await.unwrap();
//! let recovered = recover_signer(&domain, &schema, &payload, &signature).unwrap();
//! assert_eq!(recovered, signer.address());
//! # }
//! ```

pub mod domain;
pub mod payload;
pub mod schema;
pub mod signature;
pub mod signer;
pub mod typed_data;
pub mod verifier;

pub use domain::{DOMAIN_VERSION, Domain, build_domain};
pub use payload::{FieldValue, Payload, PayloadError};
pub use schema::{FieldDescriptor, FieldType, SchemaError, TypeSchema};
pub use signature::{SignatureFormatError, SplitSignature};
pub use signer::{SignerLike, SigningError, sign_typed_data};
pub use typed_data::{DigestError, signing_hash, typed_data};
pub use verifier::{VerificationError, recover_signer, recover_signer_from_bytes};
