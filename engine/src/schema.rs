//! Optional key presence checks for dealers.
//!
//! The engine is schema-agnostic beyond `name`: the dealer format changed
//! between mod versions and the merge logic must not care. Callers that
//! want stricter loading can list extra keys a dealer must carry.

use crate::{dealer::json_type_name, error::Result, Dealer, Error, NAME_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field types a check can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Array,
    Object,
    /// Arbitrary nested JSON
    Json,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Bool => write!(f, "Bool"),
            FieldType::Array => write!(f, "Array"),
            FieldType::Object => write!(f, "Object"),
            FieldType::Json => write!(f, "Json"),
        }
    }
}

/// A key check on a dealer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

impl FieldDef {
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
        }
    }

    /// Validate a JSON value against this field definition.
    pub fn validate(&self, value: Option<&Value>) -> Result<()> {
        match value {
            None | Some(Value::Null) if self.required => Err(Error::MissingRequiredField {
                field: self.name.clone(),
            }),
            None | Some(Value::Null) => Ok(()),
            Some(v) => self.validate_type(v),
        }
    }

    fn validate_type(&self, value: &Value) -> Result<()> {
        let valid = match self.field_type {
            FieldType::String => value.is_string(),
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Json => true,
        };

        if valid {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                field: self.name.clone(),
                expected: self.field_type.to_string(),
                got: json_type_name(value).to_string(),
            })
        }
    }
}

/// Key checks applied to every dealer by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerSchema {
    pub fields: Vec<FieldDef>,
}

impl Default for DealerSchema {
    /// Only `name` is checked; the loader enforces that it is non-empty.
    fn default() -> Self {
        Self {
            fields: vec![FieldDef::required(NAME_KEY, FieldType::String)],
        }
    }
}

impl DealerSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to add a check.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    /// Validate a dealer. The first failing check is returned.
    pub fn validate(&self, dealer: &Dealer) -> Result<()> {
        for field in &self.fields {
            field.validate(dealer.get(&field.name))?;
        }
        Ok(())
    }
}
