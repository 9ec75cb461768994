//! Test utilities for collection client integration tests

use std::sync::Arc;
use uuid::Uuid;
use vecadmin_client::{CollectionClient, InMemoryTransport, MockTransport};
use vecadmin_core::{CollectionSpec, Config, DataType, FieldSpec};

/// Unique, valid collection name
#[allow(dead_code)]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// Spec with one float vector field and one scalar field
#[allow(dead_code)]
pub fn vector_spec(dim: u32, segment_row_limit: u64) -> CollectionSpec {
    CollectionSpec::builder()
        .field(FieldSpec::vector("embedding", DataType::FloatVector, dim))
        .field(FieldSpec::scalar("age", DataType::Int32))
        .segment_row_limit(segment_row_limit)
        .build()
        .expect("Failed to build test spec")
}

/// Client over a fresh in-memory service; the service handle allows seeding
#[allow(dead_code)]
pub fn memory_client() -> (CollectionClient, Arc<InMemoryTransport>) {
    let config = Config::default();
    let service = Arc::new(InMemoryTransport::new(config.limits.clone()));
    let client = CollectionClient::new(service.clone(), &config);
    (client, service)
}

/// Client over a fault-injecting wrapper of a fresh in-memory service
#[allow(dead_code)]
pub fn mock_client(
    mock: impl FnOnce(Arc<InMemoryTransport>) -> MockTransport,
) -> (CollectionClient, Arc<MockTransport>, Arc<InMemoryTransport>) {
    let config = Config::default();
    let service = Arc::new(InMemoryTransport::new(config.limits.clone()));
    let mock = Arc::new(mock(service.clone()));
    let client = CollectionClient::new(mock.clone(), &config);
    (client, mock, service)
}
