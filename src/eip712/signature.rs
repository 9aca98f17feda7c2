//! Decomposed `(v, r, s)` signatures.

use alloy_primitives::{B256, Signature, U256, hex, uint};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Order of the secp256k1 group.
pub const SECP256K1_ORDER: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// Largest `s` accepted: half the curve order. Higher values are the malleable twin.
pub const SIGNATURE_S_UPPER_BOUND: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureFormatError {
    #[error("Invalid signature length {0}, expected 64 or 65 bytes")]
    InvalidLength(usize),
    #[error("Invalid recovery id v={0}")]
    InvalidV(u8),
    #[error("Signature r is out of range")]
    InvalidR,
    #[error("Signature s is out of range")]
    InvalidS,
    #[error("Invalid signature hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// A secp256k1 signature split into the three arguments a `permit` call takes.
///
/// `v` is 27 or 28.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl SplitSignature {
    pub fn from_signature(signature: &Signature) -> Self {
        Self {
            v: 27 + signature.v() as u8,
            r: B256::from(signature.r()),
            s: B256::from(signature.s()),
        }
    }

    /// Validates the components and converts back to an alloy signature.
    ///
    /// Accepts `v` as 27/28 or as the raw parity 0/1.
    pub fn to_signature(&self) -> Result<Signature, SignatureFormatError> {
        let parity = match self.v {
            0 | 27 => false,
            1 | 28 => true,
            other => return Err(SignatureFormatError::InvalidV(other)),
        };
        let r = U256::from_be_bytes(self.r.0);
        if r.is_zero() || r >= SECP256K1_ORDER {
            return Err(SignatureFormatError::InvalidR);
        }
        let s = U256::from_be_bytes(self.s.0);
        if s.is_zero() || s > SIGNATURE_S_UPPER_BOUND {
            return Err(SignatureFormatError::InvalidS);
        }
        Ok(Signature::new(r, s, parity))
    }

    /// The 65-byte `r ‖ s ‖ v` blob.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }

    /// Parses a 65-byte `r ‖ s ‖ v` blob or a 64-byte EIP-2098 compact signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureFormatError> {
        let split = match bytes.len() {
            65 => {
                let v = match bytes[64] {
                    0 | 27 => 27,
                    1 | 28 => 28,
                    other => return Err(SignatureFormatError::InvalidV(other)),
                };
                Self {
                    v,
                    r: B256::from_slice(&bytes[..32]),
                    s: B256::from_slice(&bytes[32..64]),
                }
            }
            64 => {
                let mut s = B256::from_slice(&bytes[32..64]);
                let parity = s[0] & 0x80 != 0;
                s[0] &= 0x7f;
                Self {
                    v: 27 + parity as u8,
                    r: B256::from_slice(&bytes[..32]),
                    s,
                }
            }
            other => return Err(SignatureFormatError::InvalidLength(other)),
        };
        split.to_signature()?;
        Ok(split)
    }
}

impl From<Signature> for SplitSignature {
    fn from(signature: Signature) -> Self {
        Self::from_signature(&signature)
    }
}

impl FromStr for SplitSignature {
    type Err = SignatureFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl Display for SplitSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode_prefixed(self.to_bytes()))
    }
}
