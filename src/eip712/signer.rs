//! Typed-data signing through a [`SignerLike`] capability.
//!
//! Signatures leave this module in low-s form, the only form the verifier
//! and EIP-2612 tokens accept.

use alloy_primitives::{Address, FixedBytes, Signature};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::eip712::domain::Domain;
use crate::eip712::payload::Payload;
use crate::eip712::schema::TypeSchema;
use crate::eip712::signature::SplitSignature;
use crate::eip712::typed_data::{DigestError, signing_hash};

/// A signing capability: something that owns a key and signs 32-byte digests.
///
/// Implemented for [`PrivateKeySigner`] and for any `Arc<T>` where `T: SignerLike`,
/// so one identity can be shared between tasks:
///
/// ```
/// use std::sync::Arc;
/// use alloy_signer_local::PrivateKeySigner;
/// use permit712::eip712::SignerLike;
///
/// let signer = Arc::new(PrivateKeySigner::random());
/// let address = SignerLike::address(&signer);
/// assert_eq!(address, signer.address());
/// ```
#[async_trait]
pub trait SignerLike {
    /// Returns the address of the signer.
    fn address(&self) -> Address;

    /// Signs the given hash.
    async fn sign_hash(&self, hash: &FixedBytes<32>) -> Result<Signature, alloy_signer::Error>;
}

#[async_trait]
impl SignerLike for PrivateKeySigner {
    fn address(&self) -> Address {
        PrivateKeySigner::address(self)
    }

    async fn sign_hash(&self, hash: &FixedBytes<32>) -> Result<Signature, alloy_signer::Error> {
        alloy_signer::Signer::sign_hash(self, hash).await
    }
}

#[async_trait]
impl<T: SignerLike + Send + Sync> SignerLike for Arc<T> {
    fn address(&self) -> Address {
        self.as_ref().address()
    }

    async fn sign_hash(&self, hash: &FixedBytes<32>) -> Result<Signature, alloy_signer::Error> {
        self.as_ref().sign_hash(hash).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error(transparent)]
    Digest(#[from] DigestError),
    #[error("Signer failed: {0}")]
    Signer(#[from] alloy_signer::Error),
}

/// Signs `payload` under `domain` and `schema` and splits the result into `(v, r, s)`.
#[instrument(skip_all, err, fields(
    signer = %signer.address(),
    domain = %domain,
    primary_type = schema.primary_type(),
))]
pub async fn sign_typed_data<S: SignerLike + Sync>(
    signer: &S,
    domain: &Domain,
    schema: &TypeSchema,
    payload: &Payload,
) -> Result<SplitSignature, SigningError> {
    let digest = signing_hash(domain, schema, payload)?;
    tracing::debug!(%digest, "Signing typed data");
    let signature = signer.sign_hash(&digest).await?.normalized_s();
    Ok(SplitSignature::from_signature(&signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eip712::domain::build_domain;
    use crate::eip712::payload::FieldValue;
    use crate::eip712::schema::{FieldDescriptor, FieldType};
    use crate::eip712::signature::{SECP256K1_ORDER, SIGNATURE_S_UPPER_BOUND};
    use crate::eip712::verifier::recover_signer;
    use alloy_primitives::{U256, address};

    struct BrokenSigner;

    #[async_trait]
    impl SignerLike for BrokenSigner {
        fn address(&self) -> Address {
            Address::ZERO
        }

        async fn sign_hash(&self, _hash: &FixedBytes<32>) -> Result<Signature, alloy_signer::Error> {
            Err(alloy_signer::Error::other("device disconnected"))
        }
    }

    /// Signs correctly but hands out the high-s twin of every signature.
    struct HighSSigner(PrivateKeySigner);

    #[async_trait]
    impl SignerLike for HighSSigner {
        fn address(&self) -> Address {
            self.0.address()
        }

        async fn sign_hash(&self, hash: &FixedBytes<32>) -> Result<Signature, alloy_signer::Error> {
            let signature = alloy_signer::Signer::sign_hash(&self.0, hash).await?;
            Ok(Signature::new(
                signature.r(),
                SECP256K1_ORDER - signature.s(),
                !signature.v(),
            ))
        }
    }

    fn fixture() -> (Domain, TypeSchema, Payload) {
        let domain = build_domain(
            "Vote",
            1,
            address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
        );
        let schema = TypeSchema::new(
            "Ballot",
            [
                FieldDescriptor::new("voter", FieldType::Address),
                FieldDescriptor::new("choice", FieldType::Uint256),
            ],
        )
        .unwrap();
        let payload = Payload::new(
            &schema,
            [
                (
                    "voter",
                    FieldValue::from(address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")),
                ),
                ("choice", FieldValue::from(U256::from(2u64))),
            ],
        )
        .unwrap();
        (domain, schema, payload)
    }

    #[tokio::test]
    async fn test_signer_failure_propagates() {
        let (domain, schema, payload) = fixture();
        let err = sign_typed_data(&BrokenSigner, &domain, &schema, &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::Signer(_)));
    }

    #[tokio::test]
    async fn test_mismatched_payload_is_not_signed() {
        let (domain, _, payload) = fixture();
        let other = TypeSchema::new(
            "Ballot",
            [FieldDescriptor::new("voter", FieldType::Address)],
        )
        .unwrap();
        let signer = PrivateKeySigner::random();
        let err = sign_typed_data(&signer, &domain, &other, &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::Digest(DigestError::Payload(_))));
    }

    #[tokio::test]
    async fn test_arc_signer_signs_like_inner() {
        let (domain, schema, payload) = fixture();
        let signer = PrivateKeySigner::random();
        let direct = sign_typed_data(&signer, &domain, &schema, &payload)
            .await
            .unwrap();
        let shared = Arc::new(signer);
        let via_arc = sign_typed_data(&shared, &domain, &schema, &payload)
            .await
            .unwrap();
        assert_eq!(direct, via_arc);
    }

    #[tokio::test]
    async fn test_high_s_signature_is_normalized() {
        let (domain, schema, payload) = fixture();
        let signer = HighSSigner(PrivateKeySigner::random());
        let signature = sign_typed_data(&signer, &domain, &schema, &payload)
            .await
            .unwrap();
        assert!(U256::from_be_bytes(signature.s.0) <= SIGNATURE_S_UPPER_BOUND);

        let recovered = recover_signer(&domain, &schema, &payload, &signature).unwrap();
        assert_eq!(recovered, signer.address());

        let low_s = sign_typed_data(&signer.0, &domain, &schema, &payload)
            .await
            .unwrap();
        assert_eq!(signature, low_s);
    }
}
