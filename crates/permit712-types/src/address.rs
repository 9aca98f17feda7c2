//! Wire encodings for EVM values.
//!
//! Addresses travel as EIP-55 checksummed strings and 256-bit integers as
//! decimal strings, so that every JSON document produced by this workspace
//! has one canonical textual form.

use alloy_primitives::{Address, hex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// An Ethereum address that serializes with EIP-55 checksum encoding.
///
/// # Example
///
/// ```
/// use permit712_types::address::ChecksummedAddress;
///
/// let addr: ChecksummedAddress = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
/// assert_eq!(addr.to_string(), "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ChecksummedAddress(pub Address);

impl FromStr for ChecksummedAddress {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = Address::from_str(s)?;
        Ok(Self(address))
    }
}

impl Display for ChecksummedAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_checksum(None))
    }
}

impl Serialize for ChecksummedAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_checksum(None))
    }
}

impl<'de> Deserialize<'de> for ChecksummedAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<ChecksummedAddress> for Address {
    fn from(value: ChecksummedAddress) -> Self {
        value.0
    }
}

impl From<Address> for ChecksummedAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl PartialEq<ChecksummedAddress> for Address {
    fn eq(&self, other: &ChecksummedAddress) -> bool {
        self.eq(&other.0)
    }
}

/// Serde adapter encoding a `U256` as a decimal string.
pub mod decimal_u256 {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a U256 as a decimal string.
    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserialize a decimal string into a U256.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        U256::from_str_radix(&s, 10).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Amount {
        #[serde(with = "decimal_u256")]
        value: U256,
    }

    #[test]
    fn test_checksummed_serialization() {
        let addr: ChecksummedAddress = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\"");
    }

    #[test]
    fn test_invalid_address_rejected() {
        let result = serde_json::from_str::<ChecksummedAddress>("\"0x1234\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_decimal_u256_large_value() {
        let amount = Amount {
            value: U256::from(42u64) * U256::from(10u64).pow(U256::from(18u64)),
        };
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, r#"{"value":"42000000000000000000"}"#);
        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, amount);
    }

    #[test]
    fn test_decimal_u256_rejects_hex() {
        let result = serde_json::from_str::<Amount>(r#"{"value":"0x10"}"#);
        assert!(result.is_err());
    }
}
