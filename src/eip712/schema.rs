//! Typed-data schemas.
//!
//! A [`TypeSchema`] names the primary EIP-712 struct and lists its fields in
//! order. The order is part of the wire contract: it defines the encoded type
//! string, hence the type hash, hence every digest computed over it.

use alloy_dyn_abi::eip712::Resolver;
use alloy_primitives::{B256, keccak256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Solidity types a schema field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Address,
    Uint256,
    Bytes32,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Address => "address",
            FieldType::Uint256 => "uint256",
            FieldType::Bytes32 => "bytes32",
        }
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "address" => Ok(FieldType::Address),
            "uint256" | "uint" => Ok(FieldType::Uint256),
            "bytes32" => Ok(FieldType::Bytes32),
            other => Err(SchemaError::UnsupportedType(other.to_string())),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One `{ name, type }` entry of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: String,
    #[serde(rename = "type")]
    kind: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Parses the Solidity type name, e.g. `FieldDescriptor::parse("owner", "address")`.
    pub fn parse(name: impl Into<String>, type_name: &str) -> Result<Self, SchemaError> {
        Ok(Self::new(name, type_name.parse()?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldType {
        self.kind
    }
}

/// Errors raised while constructing a [`TypeSchema`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("Schema {0} has no fields")]
    NoFields(String),
    #[error("Duplicate field {0}")]
    DuplicateField(String),
    #[error("Unsupported field type {0}")]
    UnsupportedType(String),
}

/// An ordered EIP-712 struct definition.
///
/// ```
/// use permit712::eip712::{FieldDescriptor, FieldType, TypeSchema};
///
/// let schema = TypeSchema::new(
///     "Mail",
///     [
///         FieldDescriptor::new("to", FieldType::Address),
///         FieldDescriptor::new("amount", FieldType::Uint256),
///     ],
/// )
/// .unwrap();
/// assert_eq!(schema.encode_type(), "Mail(address to,uint256 amount)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSchema {
    primary_type: String,
    fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    /// Validates and builds a schema. Field order is preserved as given.
    pub fn new(
        primary_type: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let primary_type = primary_type.into();
        if !is_identifier(&primary_type) {
            return Err(SchemaError::InvalidIdentifier(primary_type));
        }
        let fields: Vec<FieldDescriptor> = fields.into_iter().collect();
        if fields.is_empty() {
            return Err(SchemaError::NoFields(primary_type));
        }
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !is_identifier(&field.name) {
                return Err(SchemaError::InvalidIdentifier(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self {
            primary_type,
            fields,
        })
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The EIP-712 `encodeType` string, e.g. `Permit(address owner,...)`.
    pub fn encode_type(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.kind, f.name))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.primary_type, fields)
    }

    /// `keccak256(encodeType)`.
    pub fn type_hash(&self) -> B256 {
        keccak256(self.encode_type())
    }

    /// Builds the dynamic-ABI type resolver for this schema.
    pub fn resolver(&self) -> Result<Resolver, alloy_dyn_abi::Error> {
        let mut resolver = Resolver::default();
        resolver.ingest_string(self.encode_type())?;
        Ok(resolver)
    }

    /// Returns the same schema with its fields in a different order.
    ///
    /// `order` lists every field name exactly once.
    pub fn reordered(&self, order: &[&str]) -> Result<Self, SchemaError> {
        let fields = order
            .iter()
            .map(|name| {
                self.field(name)
                    .cloned()
                    .ok_or_else(|| SchemaError::InvalidIdentifier(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if fields.len() != self.fields.len() {
            return Err(SchemaError::NoFields(self.primary_type.clone()));
        }
        Self::new(self.primary_type.clone(), fields)
    }
}

impl<'de> Deserialize<'de> for TypeSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct TypeSchemaWire {
            primary_type: String,
            fields: Vec<FieldDescriptor>,
        }
        let wire = TypeSchemaWire::deserialize(deserializer)?;
        TypeSchema::new(wire.primary_type, wire.fields).map_err(serde::de::Error::custom)
    }
}

impl Display for TypeSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode_type())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> TypeSchema {
        TypeSchema::new(
            "Mail",
            [
                FieldDescriptor::new("from", FieldType::Address),
                FieldDescriptor::new("to", FieldType::Address),
                FieldDescriptor::new("amount", FieldType::Uint256),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_type_preserves_order() {
        assert_eq!(
            mail().encode_type(),
            "Mail(address from,address to,uint256 amount)"
        );
    }

    #[test]
    fn test_reordering_changes_type_hash() {
        let schema = mail();
        let swapped = schema.reordered(&["to", "from", "amount"]).unwrap();
        assert_eq!(swapped.encode_type(), "Mail(address to,address from,uint256 amount)");
        assert_ne!(schema.type_hash(), swapped.type_hash());
    }

    #[test]
    fn test_reordered_requires_every_field() {
        let err = mail().reordered(&["to", "from"]).unwrap_err();
        assert_eq!(err, SchemaError::NoFields("Mail".into()));
        let err = mail().reordered(&["to", "from", "nope"]).unwrap_err();
        assert_eq!(err, SchemaError::InvalidIdentifier("nope".into()));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = TypeSchema::new(
            "Mail",
            [
                FieldDescriptor::new("to", FieldType::Address),
                FieldDescriptor::new("to", FieldType::Uint256),
            ],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("to".into()));
    }

    #[test]
    fn test_empty_schema_rejected() {
        let err = TypeSchema::new("Mail", []).unwrap_err();
        assert_eq!(err, SchemaError::NoFields("Mail".into()));
    }

    #[test]
    fn test_bad_identifiers_rejected() {
        assert!(matches!(
            TypeSchema::new("Ma il", [FieldDescriptor::new("to", FieldType::Address)]),
            Err(SchemaError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            TypeSchema::new("Mail", [FieldDescriptor::new("1to", FieldType::Address)]),
            Err(SchemaError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let err = FieldDescriptor::parse("memo", "string").unwrap_err();
        assert_eq!(err, SchemaError::UnsupportedType("string".into()));
        assert_eq!(
            FieldDescriptor::parse("amount", "uint").unwrap().kind(),
            FieldType::Uint256
        );
    }

    #[test]
    fn test_deserialization_validates() {
        let json = r#"{"primaryType":"Mail","fields":[{"name":"to","type":"address"},{"name":"to","type":"address"}]}"#;
        assert!(serde_json::from_str::<TypeSchema>(json).is_err());

        let json = r#"{"primaryType":"Mail","fields":[{"name":"to","type":"address"}]}"#;
        let schema: TypeSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.encode_type(), "Mail(address to)");
    }

    #[test]
    fn test_resolver_accepts_schema() {
        let resolver = mail().resolver().unwrap();
        assert_eq!(
            resolver.encode_type("Mail").unwrap(),
            "Mail(address from,address to,uint256 amount)"
        );
    }
}
