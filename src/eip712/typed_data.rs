//! Digest computation over `(domain, schema, payload)`.

use alloy_dyn_abi::TypedData;
use alloy_primitives::B256;

use crate::eip712::domain::Domain;
use crate::eip712::payload::{Payload, PayloadError};
use crate::eip712::schema::TypeSchema;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("Typed data encoding failed: {0}")]
    Encoding(#[from] alloy_dyn_abi::Error),
}

/// Assembles the EIP-712 typed-data document.
pub fn typed_data(
    domain: &Domain,
    schema: &TypeSchema,
    payload: &Payload,
) -> Result<TypedData, DigestError> {
    payload.conforms_to(schema)?;
    Ok(TypedData {
        domain: domain.to_eip712(),
        resolver: schema.resolver()?,
        primary_type: schema.primary_type().to_string(),
        message: payload.to_message(),
    })
}

/// `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(payload))`.
pub fn signing_hash(
    domain: &Domain,
    schema: &TypeSchema,
    payload: &Payload,
) -> Result<B256, DigestError> {
    let digest = typed_data(domain, schema, payload)?.eip712_signing_hash()?;
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eip712::domain::build_domain;
    use crate::eip712::payload::FieldValue;
    use crate::eip712::schema::{FieldDescriptor, FieldType};
    use alloy_primitives::{U256, address, keccak256};
    use alloy_sol_types::{SolStruct, SolValue, sol};

    sol! {
        struct Ticket {
            address holder;
            uint256 seat;
            bytes32 code;
        }
    }

    fn schema() -> TypeSchema {
        TypeSchema::new(
            "Ticket",
            [
                FieldDescriptor::new("holder", FieldType::Address),
                FieldDescriptor::new("seat", FieldType::Uint256),
                FieldDescriptor::new("code", FieldType::Bytes32),
            ],
        )
        .unwrap()
    }

    fn ticket() -> Ticket {
        Ticket {
            holder: address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
            seat: U256::from(12u64),
            code: B256::repeat_byte(0x11),
        }
    }

    fn payload(t: &Ticket) -> Payload {
        Payload::new(
            &schema(),
            [
                ("holder", FieldValue::from(t.holder)),
                ("seat", FieldValue::from(t.seat)),
                ("code", FieldValue::from(t.code)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_type_hash_matches_static_struct() {
        assert_eq!(schema().type_hash(), ticket().eip712_type_hash());
    }

    #[test]
    fn test_digest_matches_static_struct() {
        let domain = build_domain("Box Office", 1, address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        let dynamic = signing_hash(&domain, &schema(), &payload(&ticket())).unwrap();
        let fixed = ticket().eip712_signing_hash(&domain.to_eip712());
        assert_eq!(dynamic, fixed);
    }

    #[test]
    fn test_digest_matches_manual_encoding() {
        let domain = build_domain("Box Office", 1, address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        let t = ticket();
        let struct_hash =
            keccak256((schema().type_hash(), t.holder, t.seat, t.code).abi_encode());
        let mut preimage = Vec::with_capacity(66);
        preimage.extend_from_slice(&[0x19, 0x01]);
        preimage.extend_from_slice(domain.separator().as_slice());
        preimage.extend_from_slice(struct_hash.as_slice());
        assert_eq!(
            signing_hash(&domain, &schema(), &payload(&t)).unwrap(),
            keccak256(&preimage)
        );
    }

    #[test]
    fn test_payload_for_other_schema_rejected() {
        let domain = build_domain("Box Office", 1, address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        let other = TypeSchema::new(
            "Ticket",
            [FieldDescriptor::new("holder", FieldType::Address)],
        )
        .unwrap();
        let err = signing_hash(&domain, &other, &payload(&ticket())).unwrap_err();
        assert!(matches!(err, DigestError::Payload(_)));
    }
}
