//! Message values checked against a [`TypeSchema`] before they are hashed.

use alloy_primitives::{Address, B256, U256};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::eip712::schema::{FieldType, TypeSchema};

/// A single typed value of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Address(Address),
    Uint(U256),
    Bytes32(B256),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Address(_) => FieldType::Address,
            FieldValue::Uint(_) => FieldType::Uint256,
            FieldValue::Bytes32(_) => FieldType::Bytes32,
        }
    }

    /// JSON form understood by the typed-data encoder.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Address(address) => Value::String(address.to_checksum(None)),
            FieldValue::Uint(value) => Value::String(value.to_string()),
            FieldValue::Bytes32(word) => Value::String(word.to_string()),
        }
    }
}

impl From<Address> for FieldValue {
    fn from(value: Address) -> Self {
        FieldValue::Address(value)
    }
}

impl From<U256> for FieldValue {
    fn from(value: U256) -> Self {
        FieldValue::Uint(value)
    }
}

impl From<B256> for FieldValue {
    fn from(value: B256) -> Self {
        FieldValue::Bytes32(value)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Field {field} is not declared by {primary_type}")]
    UnknownField { field: String, primary_type: String },
    #[error("Field {0} is missing")]
    MissingField(String),
    #[error("Field {field} expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: FieldType,
    },
    #[error("Field {0} given more than once")]
    DuplicateField(String),
}

/// Field values checked against a [`TypeSchema`].
///
/// A `Payload` only exists in a state that fits the schema it was built for:
/// every declared field present, nothing extra, every value of the declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    values: BTreeMap<String, FieldValue>,
}

impl Payload {
    pub fn new<K, V>(
        schema: &TypeSchema,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, PayloadError>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut collected = BTreeMap::new();
        for (name, value) in values {
            let name = name.into();
            let value = value.into();
            let Some(descriptor) = schema.field(&name) else {
                return Err(PayloadError::UnknownField {
                    field: name,
                    primary_type: schema.primary_type().to_string(),
                });
            };
            if descriptor.kind() != value.field_type() {
                return Err(PayloadError::TypeMismatch {
                    field: name,
                    expected: descriptor.kind(),
                    actual: value.field_type(),
                });
            }
            if collected.contains_key(&name) {
                return Err(PayloadError::DuplicateField(name));
            }
            collected.insert(name, value);
        }
        if let Some(missing) = schema
            .fields()
            .iter()
            .find(|f| !collected.contains_key(f.name()))
        {
            return Err(PayloadError::MissingField(missing.name().to_string()));
        }
        Ok(Self { values: collected })
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Re-checks the payload against another schema.
    ///
    /// Signing and recovery take the schema separately, so a payload built for
    /// one schema may be presented with another.
    pub fn conforms_to(&self, schema: &TypeSchema) -> Result<(), PayloadError> {
        Payload::new(schema, self.values.iter().map(|(k, v)| (k.as_str(), *v))).map(|_| ())
    }

    /// Returns a copy with `name` replaced by `value`, re-validated against `schema`.
    pub fn with(
        &self,
        schema: &TypeSchema,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Self, PayloadError> {
        let mut values = self.values.clone();
        values.insert(name.to_string(), value.into());
        Payload::new(schema, values)
    }

    /// The `message` object of an EIP-712 typed-data document.
    pub fn to_message(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}
