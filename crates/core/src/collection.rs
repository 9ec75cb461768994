//! Server-reported views of existing collections

use crate::schema::DataType;
use serde::{Deserialize, Serialize};

/// Description of an existing collection as reported by the service
///
/// Field order is whatever the service reports; do not assume it matches
/// creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub auto_id: bool,
    pub fields: Vec<FieldInfo>,
    pub segment_row_limit: u64,
}

impl CollectionInfo {
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<u32>,
}

/// Runtime statistics snapshot; may lag the most recent writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub partition_count: u64,
    pub row_count: u64,
    #[serde(default)]
    pub partitions: Vec<PartitionStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStats {
    pub tag: String,
    pub row_count: u64,
    pub segment_count: u64,
}

impl CollectionStats {
    pub fn partition(&self, tag: &str) -> Option<&PartitionStats> {
        self.partitions.iter().find(|p| p.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stats_decode_from_service_document() {
        let document = r#"{
            "partition_count": 1,
            "row_count": 10000,
            "partitions": [
                {"tag": "_default", "row_count": 10000, "segment_count": 1}
            ]
        }"#;

        let stats: CollectionStats = serde_json::from_str(document).unwrap();
        assert_eq!(stats.partition_count, 1);
        assert_eq!(stats.row_count, 10000);
        assert_eq!(
            stats.partition("_default"),
            Some(&PartitionStats {
                tag: "_default".to_string(),
                row_count: 10000,
                segment_count: 1,
            })
        );
    }

    #[test]
    fn test_info_field_lookup() {
        let info = CollectionInfo {
            name: "c".to_string(),
            auto_id: true,
            fields: vec![
                FieldInfo {
                    name: "Vec".to_string(),
                    data_type: DataType::FloatVector,
                    dim: Some(128),
                },
                FieldInfo {
                    name: "Int".to_string(),
                    data_type: DataType::Int64,
                    dim: None,
                },
            ],
            segment_row_limit: 100_000,
        };

        assert_eq!(info.field_names().collect::<Vec<_>>(), vec!["Vec", "Int"]);
        assert_eq!(info.field("Int").map(|f| f.data_type), Some(DataType::Int64));
        assert!(info.field("missing").is_none());
    }
}
