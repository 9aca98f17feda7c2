//! Signer recovery for EIP-712 typed data.
//!
//! Recovery makes no authorization decision: a signature from some other key
//! recovers that key's address and is returned as `Ok`.

use alloy_primitives::{Address, SignatureError};
use tracing::instrument;

use crate::eip712::domain::Domain;
use crate::eip712::payload::Payload;
use crate::eip712::schema::TypeSchema;
use crate::eip712::signature::{SignatureFormatError, SplitSignature};
use crate::eip712::typed_data::{DigestError, signing_hash};

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Digest(#[from] DigestError),
    #[error("Malformed signature: {0}")]
    Format(#[from] SignatureFormatError),
    #[error("Public key recovery failed: {0}")]
    Recovery(#[from] SignatureError),
}

/// Recovers the address that signed `payload` under `domain` and `schema`.
///
/// No authorization decision is made here: a well-formed signature over a
/// different message yields some other address, and comparing it with the
/// expected signer is up to the caller.
#[instrument(skip_all, err, fields(domain = %domain, primary_type = schema.primary_type()))]
pub fn recover_signer(
    domain: &Domain,
    schema: &TypeSchema,
    payload: &Payload,
    signature: &SplitSignature,
) -> Result<Address, VerificationError> {
    let signature = signature.to_signature()?;
    let digest = signing_hash(domain, schema, payload)?;
    let address = signature.recover_address_from_prehash(&digest)?;
    tracing::debug!(%digest, %address, "Recovered typed data signer");
    Ok(address)
}

/// Same as [`recover_signer`], taking a 65-byte (or 64-byte compact) signature blob.
pub fn recover_signer_from_bytes(
    domain: &Domain,
    schema: &TypeSchema,
    payload: &Payload,
    signature: &[u8],
) -> Result<Address, VerificationError> {
    let signature = SplitSignature::from_bytes(signature)?;
    recover_signer(domain, schema, payload, &signature)
}
