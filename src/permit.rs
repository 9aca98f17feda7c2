//! EIP-2612 permits.
//!
//! A permit is an EIP-712 signature by a token `owner` authorizing `spender`
//! to move up to `value` tokens until `deadline`. The token contract checks
//! the signature against its own domain and the owner's current `nonce`, then
//! sets the allowance.
//!
//! This module binds the generic [`crate::eip712`] machinery to the fixed
//! `Permit` struct:
//!
//! ```text
//! Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)
//! ```

use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use permit712_types::address::{ChecksummedAddress, decimal_u256};
use permit712_types::timestamp::UnixTimestamp;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::eip712::{
    DigestError, Domain, FieldDescriptor, FieldType, FieldValue, Payload, PayloadError, SignerLike,
    SigningError, SplitSignature, TypeSchema, VerificationError, recover_signer, sign_typed_data,
};

pub const PERMIT_PRIMARY_TYPE: &str = "Permit";

/// Default validity window of a freshly signed permit: 30 days.
pub const DEFAULT_PERMIT_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// The `Permit` schema, fields in the order the token contract hashes them.
pub static PERMIT_SCHEMA: LazyLock<TypeSchema> = LazyLock::new(|| {
    TypeSchema::new(
        PERMIT_PRIMARY_TYPE,
        [
            FieldDescriptor::new("owner", FieldType::Address),
            FieldDescriptor::new("spender", FieldType::Address),
            FieldDescriptor::new("value", FieldType::Uint256),
            FieldDescriptor::new("nonce", FieldType::Uint256),
            FieldDescriptor::new("deadline", FieldType::Uint256),
        ],
    )
    .expect("permit schema is well-formed")
});

sol! {
    /// Statically typed twin of [`PERMIT_SCHEMA`].
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }
}

/// Returns `now + DEFAULT_PERMIT_TTL_SECS`.
pub fn default_deadline() -> UnixTimestamp {
    UnixTimestamp::now() + DEFAULT_PERMIT_TTL_SECS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitMessage {
    pub owner: ChecksummedAddress,
    pub spender: ChecksummedAddress,
    #[serde(with = "decimal_u256")]
    pub value: U256,
    #[serde(with = "decimal_u256")]
    pub nonce: U256,
    pub deadline: UnixTimestamp,
}

impl PermitMessage {
    pub fn new(
        owner: Address,
        spender: Address,
        value: U256,
        nonce: U256,
        deadline: UnixTimestamp,
    ) -> Self {
        Self {
            owner: owner.into(),
            spender: spender.into(),
            value,
            nonce,
            deadline,
        }
    }

    pub fn to_payload(&self) -> Result<Payload, PayloadError> {
        Payload::new(
            &PERMIT_SCHEMA,
            [
                ("owner", FieldValue::Address(self.owner.0)),
                ("spender", FieldValue::Address(self.spender.0)),
                ("value", FieldValue::Uint(self.value)),
                ("nonce", FieldValue::Uint(self.nonce)),
                ("deadline", FieldValue::Uint(self.deadline.into())),
            ],
        )
    }

    pub fn as_sol(&self) -> Permit {
        Permit {
            owner: self.owner.0,
            spender: self.spender.0,
            value: self.value,
            nonce: self.nonce,
            deadline: self.deadline.into(),
        }
    }
}

/// A permit message together with the owner's signature over it.
///
/// ```json
/// {
///   "domain": { "name": "Permit Token", "version": "1", "chainId": 31337, "verifyingContract": "0x5FbD..." },
///   "message": { "owner": "0xf39F...", "spender": "0x7099...", "value": "42000000000000000000", "nonce": "0", "deadline": "1702592000" },
///   "signature": { "v": 28, "r": "0x...", "s": "0x..." }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPermit {
    pub domain: Domain,
    pub message: PermitMessage,
    pub signature: SplitSignature,
}

impl SignedPermit {
    /// Recovers the signer and compares it with `message.owner`.
    pub fn is_signed_by_owner(&self) -> Result<bool, VerificationError> {
        let signer = recover_permit_signer(&self.domain, &self.message, &self.signature)?;
        Ok(signer == self.message.owner)
    }
}

pub async fn sign_permit<S: SignerLike + Sync>(
    signer: &S,
    domain: &Domain,
    message: PermitMessage,
) -> Result<SignedPermit, SigningError> {
    let payload = message.to_payload().map_err(DigestError::from)?;
    let signature = sign_typed_data(signer, domain, &PERMIT_SCHEMA, &payload).await?;
    Ok(SignedPermit {
        domain: domain.clone(),
        message,
        signature,
    })
}

pub fn recover_permit_signer(
    domain: &Domain,
    message: &PermitMessage,
    signature: &SplitSignature,
) -> Result<Address, VerificationError> {
    let payload = message.to_payload().map_err(DigestError::from)?;
    recover_signer(domain, &PERMIT_SCHEMA, &payload, signature)
}
