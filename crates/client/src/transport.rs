//! The RPC seam between the client and a collection service

use crate::proto::{
    BoolReply, CollectionName, CollectionNameList, CollectionSchema, CollectionStatsReply,
    Command, Status, StringReply,
};
use async_trait::async_trait;
use thiserror::Error;

pub type TransportResult<T> = std::result::Result<T, TransportFailure>;

/// Raw failure raised by a transport before any normalization
#[derive(Error, Debug)]
pub enum TransportFailure {
    /// The transport gave up waiting for a reply
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The RPC layer reported a status
    #[error("rpc failed: {0}")]
    Status(#[from] tonic::Status),

    /// Anything else the transport raised
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One unary call per collection-administration RPC
///
/// Implementations return wire replies untouched; status interpretation and
/// error normalization belong to [`crate::CollectionClient`].
#[async_trait]
pub trait CollectionTransport: Send + Sync {
    async fn create_collection(&self, request: CollectionSchema) -> TransportResult<Status>;

    async fn drop_collection(&self, request: CollectionName) -> TransportResult<Status>;

    async fn has_collection(&self, request: CollectionName) -> TransportResult<BoolReply>;

    async fn list_collections(&self, request: Command) -> TransportResult<CollectionNameList>;

    async fn describe_collection(
        &self,
        request: CollectionName,
    ) -> TransportResult<CollectionSchema>;

    async fn collection_stats(
        &self,
        request: CollectionName,
    ) -> TransportResult<CollectionStatsReply>;

    async fn server_version(&self, request: Command) -> TransportResult<StringReply>;
}
