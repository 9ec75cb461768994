//! Collection specifications and their validation
//!
//! A [`CollectionSpec`] is only obtainable through [`CollectionSpecBuilder`]
//! or [`CollectionSpec::from_value`], both of which validate the whole
//! specification before handing it out.

use crate::config::CollectionLimits;
use crate::error::{Error, Result};
use derive_builder::{Builder, UninitializedFieldError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Longest accepted collection or field name
pub const MAX_NAME_LENGTH: usize = 255;

/// Largest vector dimension any service accepts
pub const MAX_DIMENSION: u32 = 32768;

/// Data type of a collection field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DataType {
    Int32,
    Int64,
    Bool,
    Float,
    Double,
    FloatVector,
    BinaryVector,
}

impl DataType {
    pub fn is_vector(self) -> bool {
        matches!(self, Self::FloatVector | Self::BinaryVector)
    }
}

/// One field of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub data_type: DataType,
    /// Vector dimension, required for vector types and absent otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<u32>,
}

impl FieldSpec {
    /// Create a scalar field
    pub fn scalar(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            dim: None,
        }
    }

    /// Create a vector field with the given dimension
    pub fn vector(name: impl Into<String>, data_type: DataType, dim: u32) -> Self {
        Self {
            name: name.into(),
            data_type,
            dim: Some(dim),
        }
    }

    fn validate(&self) -> Result<()> {
        validate_identifier("field", &self.name)?;

        match (self.data_type.is_vector(), self.dim) {
            (true, None) => Err(Error::validation(format!(
                "Vector field '{}' requires a 'dim' parameter",
                self.name
            ))),
            (true, Some(dim)) => {
                if dim == 0 || dim > MAX_DIMENSION {
                    return Err(Error::validation(format!(
                        "Field '{}' has invalid dimension {dim}, expected 1..={MAX_DIMENSION}",
                        self.name
                    )));
                }
                if self.data_type == DataType::BinaryVector && dim % 8 != 0 {
                    return Err(Error::validation(format!(
                        "Binary vector field '{}' dimension {dim} is not a multiple of 8",
                        self.name
                    )));
                }
                Ok(())
            }
            (false, Some(_)) => Err(Error::validation(format!(
                "Scalar field '{}' of type {} does not take a 'dim' parameter",
                self.name, self.data_type
            ))),
            (false, None) => Ok(()),
        }
    }
}

/// Immutable description of a collection to create
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
#[builder(build_fn(validate = "Self::validate", error = "Error"))]
pub struct CollectionSpec {
    #[builder(setter(custom))]
    fields: Vec<FieldSpec>,

    #[builder(default, setter(strip_option))]
    segment_row_limit: Option<u64>,

    #[builder(default, setter(strip_option))]
    auto_id: Option<bool>,
}

impl From<UninitializedFieldError> for Error {
    fn from(err: UninitializedFieldError) -> Self {
        Error::validation(format!("Missing collection parameter '{}'", err.field_name()))
    }
}

impl CollectionSpecBuilder {
    /// Append a field
    pub fn field(&mut self, field: FieldSpec) -> &mut Self {
        self.fields.get_or_insert_with(Vec::new).push(field);
        self
    }

    /// Append several fields in order
    pub fn fields(&mut self, fields: impl IntoIterator<Item = FieldSpec>) -> &mut Self {
        self.fields.get_or_insert_with(Vec::new).extend(fields);
        self
    }

    fn validate(&self) -> Result<()> {
        let fields = self.fields.as_deref().unwrap_or_default();
        if fields.is_empty() {
            return Err(Error::validation("Collection must declare at least one field"));
        }

        let mut seen = HashSet::new();
        for field in fields {
            field.validate()?;
            if !seen.insert(field.name.as_str()) {
                return Err(Error::validation(format!(
                    "Duplicate field name '{}'",
                    field.name
                )));
            }
        }

        if !fields.iter().any(|f| f.data_type.is_vector()) {
            return Err(Error::validation(
                "Collection must declare at least one vector field",
            ));
        }

        if let Some(Some(0)) = self.segment_row_limit {
            return Err(Error::validation("segment_row_limit must be positive"));
        }

        Ok(())
    }
}

impl CollectionSpec {
    pub fn builder() -> CollectionSpecBuilder {
        CollectionSpecBuilder::default()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn segment_row_limit(&self) -> Option<u64> {
        self.segment_row_limit
    }

    pub fn auto_id(&self) -> Option<bool> {
        self.auto_id
    }

    /// Check the spec against service-defined limits
    pub fn check_limits(&self, limits: &CollectionLimits) -> Result<()> {
        if let Some(limit) = self.segment_row_limit {
            if limit < limits.min_segment_row_limit || limit > limits.max_segment_row_limit {
                return Err(Error::validation(format!(
                    "segment_row_limit {limit} is out of range [{}, {}]",
                    limits.min_segment_row_limit, limits.max_segment_row_limit
                )));
            }
        }

        for field in &self.fields {
            if let Some(dim) = field.dim {
                if dim > limits.max_dimension {
                    return Err(Error::validation(format!(
                        "Field '{}' dimension {dim} exceeds the configured maximum {}",
                        field.name, limits.max_dimension
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse a loosely typed parameter mapping
    ///
    /// Accepts the mapping shape
    /// `{"fields": [{"name", "type", "params": {"dim"}}], "segment_row_limit", "auto_id"}`.
    /// Every type mismatch is a validation error.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::validation("Collection parameters must be a mapping"))?;

        let mut builder = CollectionSpec::builder();

        for (key, entry) in map {
            match key.as_str() {
                "fields" => {
                    let list = entry
                        .as_array()
                        .ok_or_else(|| type_error("fields", "a list", entry))?;
                    for item in list {
                        builder.field(parse_field(item)?);
                    }
                }
                "segment_row_limit" => {
                    let limit = entry
                        .as_u64()
                        .ok_or_else(|| type_error("segment_row_limit", "a positive integer", entry))?;
                    builder.segment_row_limit(limit);
                }
                "auto_id" => {
                    let auto_id = entry
                        .as_bool()
                        .ok_or_else(|| type_error("auto_id", "a boolean", entry))?;
                    builder.auto_id(auto_id);
                }
                other => {
                    return Err(Error::validation(format!(
                        "Unknown collection parameter '{other}'"
                    )))
                }
            }
        }

        builder.build()
    }

    /// Parse a JSON document into a spec
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| Error::validation(format!("Failed to parse JSON spec: {e}")))?;
        Self::from_value(&value)
    }

    /// Parse a TOML document into a spec
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let value: Value = toml::from_str(content)
            .map_err(|e| Error::validation(format!("Failed to parse TOML spec: {e}")))?;
        Self::from_value(&value)
    }
}

fn parse_field(value: &Value) -> Result<FieldSpec> {
    let map = value
        .as_object()
        .ok_or_else(|| type_error("field", "a mapping", value))?;

    let name = match map.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => return Err(type_error("field name", "a string", other)),
        None => return Err(Error::validation("Field is missing 'name'")),
    };

    let data_type = match map.get("type") {
        Some(Value::String(ty)) => DataType::from_str(ty)
            .map_err(|_| Error::validation(format!("Field '{name}' has unknown type '{ty}'")))?,
        Some(other) => return Err(type_error("field type", "a string", other)),
        None => return Err(Error::validation(format!("Field '{name}' is missing 'type'"))),
    };

    let dim = match map.get("params") {
        None | Some(Value::Null) => None,
        Some(Value::Object(params)) => parse_dim(&name, params)?,
        Some(other) => return Err(type_error("field params", "a mapping", other)),
    };

    for key in map.keys() {
        if !matches!(key.as_str(), "name" | "type" | "params") {
            return Err(Error::validation(format!(
                "Field '{name}' has unknown key '{key}'"
            )));
        }
    }

    Ok(FieldSpec {
        name,
        data_type,
        dim,
    })
}

fn parse_dim(field: &str, params: &Map<String, Value>) -> Result<Option<u32>> {
    match params.get("dim") {
        None => Ok(None),
        Some(value) => {
            let dim = value
                .as_u64()
                .ok_or_else(|| type_error("dim", "a positive integer", value))?;
            u32::try_from(dim).map(Some).map_err(|_| {
                Error::validation(format!("Field '{field}' dimension {dim} is out of range"))
            })
        }
    }
}

fn type_error(what: &str, expected: &str, got: &Value) -> Error {
    let kind = match got {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    };
    Error::validation(format!("{what} must be {expected}, got {kind}"))
}

/// Validate a collection name before it is sent anywhere
///
/// Names are 1..=255 characters, start with a letter or underscore, and
/// contain only ASCII alphanumerics and underscores.
pub fn validate_collection_name(name: &str) -> Result<()> {
    validate_identifier("collection", name)
}

fn validate_identifier(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation(format!("{what} name must not be empty")));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(Error::validation(format!(
            "{what} name is longer than {MAX_NAME_LENGTH} characters"
        )));
    }

    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::validation(format!(
            "Invalid {what} name '{name}': use letters, digits and underscores, not starting with a digit"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn vector_only() -> CollectionSpec {
        CollectionSpec::builder()
            .field(FieldSpec::vector("v", DataType::FloatVector, 128))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_single_vector_field() {
        let spec = vector_only();
        assert_eq!(spec.fields().len(), 1);
        assert_eq!(spec.segment_row_limit(), None);
        assert_eq!(spec.auto_id(), None);
    }

    #[test]
    fn test_builder_scalar_and_vector_combinations() {
        let scalars = [
            DataType::Int32,
            DataType::Int64,
            DataType::Bool,
            DataType::Float,
            DataType::Double,
        ];
        for scalar in scalars {
            for vector in [DataType::FloatVector, DataType::BinaryVector] {
                let spec = CollectionSpec::builder()
                    .field(FieldSpec::scalar("A", scalar))
                    .field(FieldSpec::vector("v", vector, 128))
                    .build();
                assert!(spec.is_ok(), "{scalar} + {vector} should be valid");
            }
        }
    }

    #[test]
    fn test_builder_rejects_missing_fields() {
        let err = CollectionSpec::builder().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_builder_requires_vector_field() {
        let err = CollectionSpec::builder()
            .field(FieldSpec::scalar("id", DataType::Int64))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("vector field"));
    }

    #[test]
    fn test_builder_rejects_duplicate_field_names() {
        let err = CollectionSpec::builder()
            .field(FieldSpec::vector("v", DataType::FloatVector, 8))
            .field(FieldSpec::scalar("v", DataType::Int32))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate field name"));
    }

    #[test]
    fn test_vector_dimension_rules() {
        let missing_dim = FieldSpec {
            name: "v".to_string(),
            data_type: DataType::FloatVector,
            dim: None,
        };
        assert!(CollectionSpec::builder().field(missing_dim).build().is_err());

        let zero = FieldSpec::vector("v", DataType::FloatVector, 0);
        assert!(CollectionSpec::builder().field(zero).build().is_err());

        let too_big = FieldSpec::vector("v", DataType::FloatVector, MAX_DIMENSION + 1);
        assert!(CollectionSpec::builder().field(too_big).build().is_err());

        let odd_binary = FieldSpec::vector("v", DataType::BinaryVector, 12);
        assert!(CollectionSpec::builder().field(odd_binary).build().is_err());
    }

    #[test]
    fn test_scalar_field_rejects_dim() {
        let err = CollectionSpec::builder()
            .field(FieldSpec::vector("v", DataType::FloatVector, 16))
            .field(FieldSpec {
                name: "count".to_string(),
                data_type: DataType::Int32,
                dim: Some(4),
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("does not take a 'dim'"));
    }

    #[test]
    fn test_zero_segment_row_limit_rejected() {
        let err = CollectionSpec::builder()
            .field(FieldSpec::vector("v", DataType::FloatVector, 16))
            .segment_row_limit(0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_check_limits_range() {
        let limits = CollectionLimits::default();
        for srl in [1, 10_000_000] {
            let spec = CollectionSpec::builder()
                .field(FieldSpec::vector("v", DataType::FloatVector, 128))
                .segment_row_limit(srl)
                .build()
                .unwrap();
            let err = spec.check_limits(&limits).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }

        let spec = CollectionSpec::builder()
            .field(FieldSpec::vector("v", DataType::FloatVector, 128))
            .segment_row_limit(10_000)
            .build()
            .unwrap();
        assert!(spec.check_limits(&limits).is_ok());
    }

    #[test]
    fn test_from_value_full_mapping() {
        let spec = CollectionSpec::from_value(&json!({
            "fields": [
                {"name": "A", "type": "INT64"},
                {"name": "v", "type": "FLOAT_VECTOR", "params": {"dim": 128}}
            ],
            "segment_row_limit": 10000,
            "auto_id": false
        }))
        .unwrap();

        assert_eq!(
            spec.fields(),
            &[
                FieldSpec::scalar("A", DataType::Int64),
                FieldSpec::vector("v", DataType::FloatVector, 128),
            ]
        );
        assert_eq!(spec.segment_row_limit(), Some(10000));
        assert_eq!(spec.auto_id(), Some(false));
    }

    #[test]
    fn test_from_value_rejects_wrong_segment_row_limit_types() {
        for srl in [Value::Null, json!("123"), json!(-5), json!(12.5)] {
            let err = CollectionSpec::from_value(&json!({
                "fields": [{"name": "v", "type": "FLOAT_VECTOR", "params": {"dim": 128}}],
                "segment_row_limit": srl
            }))
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.to_string().contains("segment_row_limit"));
        }
    }

    #[test]
    fn test_from_value_rejects_non_boolean_auto_id() {
        let err = CollectionSpec::from_value(&json!({
            "fields": [{"name": "v", "type": "FLOAT_VECTOR", "params": {"dim": 128}}],
            "auto_id": "yes"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("auto_id must be a boolean"));
    }

    #[test]
    fn test_from_value_rejects_unknown_type_and_keys() {
        let unknown_type = CollectionSpec::from_value(&json!({
            "fields": [{"name": "v", "type": "HALF_VECTOR", "params": {"dim": 128}}]
        }));
        assert!(unknown_type.is_err());

        let unknown_key = CollectionSpec::from_value(&json!({
            "fields": [{"name": "v", "type": "FLOAT_VECTOR", "params": {"dim": 128}}],
            "shards": 2
        }));
        assert!(unknown_key.unwrap_err().to_string().contains("shards"));
    }

    #[test]
    fn test_data_type_parsing_is_case_insensitive() {
        assert_eq!(DataType::from_str("float_vector").unwrap(), DataType::FloatVector);
        assert_eq!(DataType::from_str("INT32").unwrap(), DataType::Int32);
        assert_eq!(DataType::BinaryVector.to_string(), "BINARY_VECTOR");
    }

    #[test]
    fn test_from_toml_str() {
        let spec = CollectionSpec::from_toml_str(
            r#"
            segment_row_limit = 8192

            [[fields]]
            name = "embedding"
            type = "BINARY_VECTOR"
            params = { dim = 256 }
            "#,
        )
        .unwrap();
        assert_eq!(spec.fields()[0].dim, Some(256));
        assert_eq!(spec.segment_row_limit(), Some(8192));
    }

    #[test]
    fn test_collection_name_rules() {
        assert!(validate_collection_name("test_collection_01").is_ok());
        assert!(validate_collection_name("_hidden").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("1abc").is_err());
        assert!(validate_collection_name("has-dash").is_err());
        assert!(validate_collection_name(&"a".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }
}
