//! Wire messages of the `vecadmin.v1.CollectionService` RPC service
//!
//! Message layouts mirror what `prost-build` emits for the service
//! definition; conversions to and from the core schema types live at the
//! bottom of this module.

use vecadmin_core::{
    CollectionInfo, CollectionLimits, CollectionSpec, DataType as CoreDataType, Error, FieldInfo,
    FieldSpec, Result as CoreResult,
};

/// Parameter key carrying a vector dimension
pub const DIM_PARAM: &str = "dim";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(enumeration = "ErrorCode", tag = "1")]
    pub error_code: i32,
    #[prost(string, tag = "2")]
    pub reason: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    UnexpectedError = 1,
    ConnectFailed = 2,
    PermissionDenied = 3,
    CollectionNotExists = 4,
    IllegalArgument = 5,
    IllegalRange = 6,
    IllegalDimension = 7,
    IllegalCollectionName = 9,
    MetaFailed = 15,
    CollectionAlreadyExists = 21,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataType {
    Unspecified = 0,
    Bool = 1,
    Int32 = 4,
    Int64 = 5,
    Float = 10,
    Double = 11,
    VectorBinary = 100,
    VectorFloat = 101,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyValuePair {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldSchema {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "DataType", tag = "2")]
    pub data_type: i32,
    #[prost(message, repeated, tag = "3")]
    pub extra_params: Vec<KeyValuePair>,
}

/// Create request and describe reply
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionSchema {
    #[prost(message, optional, tag = "1")]
    pub status: Option<Status>,
    #[prost(string, tag = "2")]
    pub collection_name: String,
    #[prost(message, repeated, tag = "3")]
    pub fields: Vec<FieldSchema>,
    #[prost(int64, tag = "4")]
    pub segment_row_limit: i64,
    #[prost(bool, tag = "5")]
    pub auto_id: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionName {
    #[prost(string, tag = "1")]
    pub collection_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Command {
    #[prost(string, tag = "1")]
    pub cmd: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoolReply {
    #[prost(message, optional, tag = "1")]
    pub status: Option<Status>,
    #[prost(bool, tag = "2")]
    pub bool_reply: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringReply {
    #[prost(message, optional, tag = "1")]
    pub status: Option<Status>,
    #[prost(string, tag = "2")]
    pub string_reply: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionNameList {
    #[prost(message, optional, tag = "1")]
    pub status: Option<Status>,
    #[prost(string, repeated, tag = "2")]
    pub collection_names: Vec<String>,
}

/// Statistics reply; `json_info` holds the statistics document
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionStatsReply {
    #[prost(message, optional, tag = "1")]
    pub status: Option<Status>,
    #[prost(string, tag = "2")]
    pub json_info: String,
}

// ==== Conversions ====

impl Status {
    pub fn success() -> Self {
        Self::with_code(ErrorCode::Success, "")
    }

    pub fn with_code(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            error_code: code as i32,
            reason: reason.into(),
        }
    }
}

impl From<CoreDataType> for DataType {
    fn from(data_type: CoreDataType) -> Self {
        match data_type {
            CoreDataType::Int32 => Self::Int32,
            CoreDataType::Int64 => Self::Int64,
            CoreDataType::Bool => Self::Bool,
            CoreDataType::Float => Self::Float,
            CoreDataType::Double => Self::Double,
            CoreDataType::FloatVector => Self::VectorFloat,
            CoreDataType::BinaryVector => Self::VectorBinary,
        }
    }
}

impl TryFrom<DataType> for CoreDataType {
    type Error = String;

    fn try_from(data_type: DataType) -> Result<Self, Self::Error> {
        match data_type {
            DataType::Int32 => Ok(Self::Int32),
            DataType::Int64 => Ok(Self::Int64),
            DataType::Bool => Ok(Self::Bool),
            DataType::Float => Ok(Self::Float),
            DataType::Double => Ok(Self::Double),
            DataType::VectorFloat => Ok(Self::FloatVector),
            DataType::VectorBinary => Ok(Self::BinaryVector),
            DataType::Unspecified => Err("field has no data type".to_string()),
        }
    }
}

impl FieldSchema {
    pub fn from_spec(field: &FieldSpec) -> Self {
        let extra_params = field
            .dim
            .map(|dim| KeyValuePair {
                key: DIM_PARAM.to_string(),
                value: dim.to_string(),
            })
            .into_iter()
            .collect();

        Self {
            name: field.name.clone(),
            data_type: DataType::from(field.data_type) as i32,
            extra_params,
        }
    }

    /// Decode back into a typed field; the error is a human-readable reason
    pub fn to_field_spec(&self) -> Result<FieldSpec, String> {
        let wire_type = DataType::try_from(self.data_type).map_err(|_| {
            format!(
                "field '{}' has unknown data type {}",
                self.name, self.data_type
            )
        })?;
        let data_type = CoreDataType::try_from(wire_type)
            .map_err(|reason| format!("{reason}: '{}'", self.name))?;

        let dim = match self.extra_params.iter().find(|p| p.key == DIM_PARAM) {
            Some(param) => Some(param.value.parse::<u32>().map_err(|_| {
                format!(
                    "field '{}' has malformed dimension '{}'",
                    self.name, param.value
                )
            })?),
            None => None,
        };

        Ok(FieldSpec {
            name: self.name.clone(),
            data_type,
            dim,
        })
    }
}

impl CollectionSchema {
    /// Build the create request, filling defaults the wire requires
    ///
    /// Fails when the segment_row_limit does not fit the wire's signed field.
    pub fn from_spec(
        name: &str,
        spec: &CollectionSpec,
        limits: &CollectionLimits,
    ) -> CoreResult<Self> {
        let segment_row_limit = spec
            .segment_row_limit()
            .unwrap_or(limits.default_segment_row_limit);
        let segment_row_limit = i64::try_from(segment_row_limit).map_err(|_| {
            Error::validation(format!(
                "segment_row_limit {segment_row_limit} exceeds the maximum of {}",
                i64::MAX
            ))
        })?;

        Ok(Self {
            status: None,
            collection_name: name.to_string(),
            fields: spec.fields().iter().map(FieldSchema::from_spec).collect(),
            segment_row_limit,
            auto_id: spec.auto_id().unwrap_or(true),
        })
    }

    /// Decode a describe reply into the caller-facing description
    pub fn to_info(&self) -> Result<CollectionInfo, String> {
        let fields = self
            .fields
            .iter()
            .map(|f| {
                f.to_field_spec().map(|spec| FieldInfo {
                    name: spec.name,
                    data_type: spec.data_type,
                    dim: spec.dim,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let segment_row_limit = u64::try_from(self.segment_row_limit).map_err(|_| {
            format!(
                "collection '{}' reports negative segment_row_limit {}",
                self.collection_name, self.segment_row_limit
            )
        })?;

        Ok(CollectionInfo {
            name: self.collection_name.clone(),
            auto_id: self.auto_id,
            fields,
            segment_row_limit,
        })
    }
}
