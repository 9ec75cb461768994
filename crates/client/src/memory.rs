//! In-process reference implementation of the collection service
//!
//! Applies the same checks a remote service does and answers with wire
//! replies, so the client's whole pipeline runs without a network. Seeding
//! helpers let tests populate partitions and row counts.

use crate::proto::{
    BoolReply, CollectionName, CollectionNameList, CollectionSchema, CollectionStatsReply,
    Command, ErrorCode, Status, StringReply,
};
use crate::transport::{CollectionTransport, TransportResult};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use vecadmin_core::{
    validate_collection_name, CollectionLimits, CollectionSpec, CollectionStats, Error,
    PartitionStats, Result,
};

/// Tag of the partition every collection starts with
pub const DEFAULT_PARTITION: &str = "_default";

#[derive(Debug, Clone)]
struct StoredCollection {
    schema: CollectionSchema,
    /// (tag, row_count) in creation order
    partitions: Vec<(String, u64)>,
}

impl StoredCollection {
    fn stats(&self) -> CollectionStats {
        let segment_row_limit = u64::try_from(self.schema.segment_row_limit)
            .unwrap_or(1)
            .max(1);

        let partitions: Vec<PartitionStats> = self
            .partitions
            .iter()
            .map(|(tag, rows)| PartitionStats {
                tag: tag.clone(),
                row_count: *rows,
                segment_count: rows.div_ceil(segment_row_limit),
            })
            .collect();

        CollectionStats {
            partition_count: partitions.len() as u64,
            row_count: partitions.iter().map(|p| p.row_count).sum(),
            partitions,
        }
    }
}

/// Collection service held entirely in memory
pub struct InMemoryTransport {
    collections: DashMap<String, StoredCollection>,
    limits: CollectionLimits,
    version: String,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new(CollectionLimits::default())
    }
}

impl InMemoryTransport {
    pub fn new(limits: CollectionLimits) -> Self {
        Self {
            collections: DashMap::new(),
            limits,
            version: format!("vecadmin-memory {}", vecadmin_core::VERSION),
        }
    }

    /// Add an empty partition to an existing collection
    pub fn create_partition(&self, collection: &str, tag: &str) -> Result<()> {
        let mut stored = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Error::not_found(collection))?;

        if stored.partitions.iter().any(|(t, _)| t == tag) {
            return Err(Error::validation(format!(
                "Partition '{tag}' already exists in {collection}"
            )));
        }
        stored.partitions.push((tag.to_string(), 0));
        Ok(())
    }

    /// Record `rows` inserted rows; `partition` defaults to [`DEFAULT_PARTITION`]
    pub fn insert_rows(&self, collection: &str, partition: Option<&str>, rows: u64) -> Result<()> {
        let tag = partition.unwrap_or(DEFAULT_PARTITION);
        let mut stored = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Error::not_found(collection))?;

        let slot = stored
            .partitions
            .iter_mut()
            .find(|(t, _)| t == tag)
            .ok_or_else(|| Error::not_found(format!("{collection}/{tag}")))?;
        slot.1 = slot.1.checked_add(rows).ok_or_else(|| {
            Error::validation(format!(
                "Row count of {collection}/{tag} would overflow adding {rows} rows"
            ))
        })?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Service-side checks on a create request
    fn check_create(&self, request: &CollectionSchema) -> std::result::Result<(), Status> {
        validate_collection_name(&request.collection_name)
            .map_err(|e| Status::with_code(ErrorCode::IllegalCollectionName, e.to_string()))?;

        let mut builder = CollectionSpec::builder();
        for field in &request.fields {
            let spec = field
                .to_field_spec()
                .map_err(|reason| Status::with_code(ErrorCode::IllegalArgument, reason))?;
            builder.field(spec);
        }
        let segment_row_limit = u64::try_from(request.segment_row_limit).map_err(|_| {
            Status::with_code(
                ErrorCode::IllegalArgument,
                format!("segment_row_limit {} is negative", request.segment_row_limit),
            )
        })?;
        builder.segment_row_limit(segment_row_limit);
        builder.auto_id(request.auto_id);

        let spec = builder
            .build()
            .map_err(|e| Status::with_code(ErrorCode::IllegalArgument, e.to_string()))?;
        spec.check_limits(&self.limits)
            .map_err(|e| Status::with_code(ErrorCode::IllegalArgument, e.to_string()))
    }
}

fn not_exists(name: &str) -> Status {
    Status::with_code(
        ErrorCode::CollectionNotExists,
        format!("Collection {name} does not exist"),
    )
}

#[async_trait]
impl CollectionTransport for InMemoryTransport {
    async fn create_collection(&self, request: CollectionSchema) -> TransportResult<Status> {
        if let Err(status) = self.check_create(&request) {
            return Ok(status);
        }

        let name = request.collection_name.clone();
        let status = match self.collections.entry(name.clone()) {
            Entry::Occupied(_) => Status::with_code(
                ErrorCode::CollectionAlreadyExists,
                format!("Collection {name} already exists"),
            ),
            Entry::Vacant(slot) => {
                slot.insert(StoredCollection {
                    schema: CollectionSchema {
                        status: None,
                        ..request
                    },
                    partitions: vec![(DEFAULT_PARTITION.to_string(), 0)],
                });
                debug!("In-memory service created collection {name}");
                Status::success()
            }
        };

        Ok(status)
    }

    async fn drop_collection(&self, request: CollectionName) -> TransportResult<Status> {
        let name = request.collection_name;
        Ok(match self.collections.remove(&name) {
            Some(_) => Status::success(),
            None => not_exists(&name),
        })
    }

    async fn has_collection(&self, request: CollectionName) -> TransportResult<BoolReply> {
        Ok(BoolReply {
            status: Some(Status::success()),
            bool_reply: self.collections.contains_key(&request.collection_name),
        })
    }

    async fn list_collections(&self, _request: Command) -> TransportResult<CollectionNameList> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();

        Ok(CollectionNameList {
            status: Some(Status::success()),
            collection_names: names,
        })
    }

    async fn describe_collection(
        &self,
        request: CollectionName,
    ) -> TransportResult<CollectionSchema> {
        let name = request.collection_name;
        let reply = match self.collections.get(&name) {
            Some(stored) => CollectionSchema {
                status: Some(Status::success()),
                ..stored.schema.clone()
            },
            None => CollectionSchema {
                status: Some(not_exists(&name)),
                ..Default::default()
            },
        };
        Ok(reply)
    }

    async fn collection_stats(
        &self,
        request: CollectionName,
    ) -> TransportResult<CollectionStatsReply> {
        let name = request.collection_name;
        let stats = self.collections.get(&name).map(|stored| stored.stats());

        let reply = match stats {
            Some(stats) => match serde_json::to_string(&stats) {
                Ok(json_info) => CollectionStatsReply {
                    status: Some(Status::success()),
                    json_info,
                },
                Err(e) => CollectionStatsReply {
                    status: Some(Status::with_code(ErrorCode::UnexpectedError, e.to_string())),
                    json_info: String::new(),
                },
            },
            None => CollectionStatsReply {
                status: Some(not_exists(&name)),
                json_info: String::new(),
            },
        };
        Ok(reply)
    }

    async fn server_version(&self, _request: Command) -> TransportResult<StringReply> {
        Ok(StringReply {
            status: Some(Status::success()),
            string_reply: self.version.clone(),
        })
    }
}
