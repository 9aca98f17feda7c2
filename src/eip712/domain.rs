//! EIP-712 signing domains.
//!
//! The domain binds a signature to one token contract on one chain. Signer,
//! verifier and contract must agree on it byte for byte: any difference in
//! `name`, `version`, `chainId` or `verifyingContract` changes the domain
//! separator and therefore the recovered address.

use alloy_primitives::{Address, B256};
use alloy_sol_types::{Eip712Domain, eip712_domain};
use permit712_types::address::ChecksummedAddress;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Version string used by [`build_domain`].
pub const DOMAIN_VERSION: &str = "1";

/// An EIP-712 domain descriptor: `{ name, version, chainId, verifyingContract }`.
///
/// Serializes in camelCase with the contract as an EIP-55 checksummed string:
///
/// ```json
/// {
///   "name": "Permit Token",
///   "version": "1",
///   "chainId": 31337,
///   "verifyingContract": "0x5FbDB2315678afecb367f032d93F642f64180aa3"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    name: String,
    version: String,
    chain_id: u64,
    verifying_contract: ChecksummedAddress,
}

/// Builds the domain a permit token verifies against, with version [`DOMAIN_VERSION`].
pub fn build_domain(name: impl Into<String>, chain_id: u64, verifying_contract: Address) -> Domain {
    Domain::new(name, DOMAIN_VERSION, chain_id, verifying_contract)
}

impl Domain {
    /// Creates a domain with an explicit version string.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract: verifying_contract.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract.into()
    }

    /// Converts into the alloy representation used for hashing.
    pub fn to_eip712(&self) -> Eip712Domain {
        eip712_domain! {
            name: self.name.clone(),
            version: self.version.clone(),
            chain_id: self.chain_id,
            verifying_contract: self.verifying_contract.0,
        }
    }

    /// The EIP-712 domain separator, `hashStruct(EIP712Domain)`.
    ///
    /// This is the value a token contract exposes as `DOMAIN_SEPARATOR()`.
    pub fn separator(&self) -> B256 {
        self.to_eip712().separator()
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} v{} @ {} on chain {}",
            self.name, self.version, self.verifying_contract, self.chain_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address, keccak256};
    use alloy_sol_types::SolValue;

    const TOKEN: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    /// The separator as OpenZeppelin's `EIP712` contract computes it.
    fn contract_separator(name: &str, version: &str, chain_id: u64, contract: Address) -> B256 {
        let type_hash = keccak256(
            "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
        );
        keccak256(
            (
                type_hash,
                keccak256(name),
                keccak256(version),
                U256::from(chain_id),
                contract,
            )
                .abi_encode(),
        )
    }

    #[test]
    fn test_build_domain_fixes_version() {
        let domain = build_domain("Permit Token", 31337, TOKEN);
        assert_eq!(domain.name(), "Permit Token");
        assert_eq!(domain.version(), "1");
        assert_eq!(domain.chain_id(), 31337);
        assert_eq!(domain.verifying_contract(), TOKEN);
    }

    #[test]
    fn test_separator_matches_contract_encoding() {
        let domain = build_domain("Permit Token", 31337, TOKEN);
        assert_eq!(
            domain.separator(),
            contract_separator("Permit Token", "1", 31337, TOKEN)
        );
    }

    #[test]
    fn test_every_field_changes_separator() {
        let base = build_domain("Permit Token", 31337, TOKEN).separator();
        let variants = [
            build_domain("PermitToken", 31337, TOKEN),
            Domain::new("Permit Token", "2", 31337, TOKEN),
            build_domain("Permit Token", 1, TOKEN),
            build_domain("Permit Token", 31337, Address::ZERO),
        ];
        for variant in variants {
            assert_ne!(variant.separator(), base, "{variant}");
        }
    }

    #[test]
    fn test_serialization_is_camel_case_and_checksummed() {
        let domain = build_domain("Permit Token", 31337, TOKEN);
        let json = serde_json::to_value(&domain).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Permit Token",
                "version": "1",
                "chainId": 31337,
                "verifyingContract": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            })
        );
        let parsed: Domain = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, domain);
    }
}
