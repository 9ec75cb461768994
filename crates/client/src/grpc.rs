//! gRPC transport over a tonic channel

use crate::proto::{
    BoolReply, CollectionName, CollectionNameList, CollectionSchema, CollectionStatsReply,
    Command, Status, StringReply,
};
use crate::transport::{CollectionTransport, TransportFailure, TransportResult};
use async_trait::async_trait;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;
use vecadmin_core::{ConnectionConfig, Error, Result};

const CREATE_COLLECTION: &str = "/vecadmin.v1.CollectionService/CreateCollection";
const DROP_COLLECTION: &str = "/vecadmin.v1.CollectionService/DropCollection";
const HAS_COLLECTION: &str = "/vecadmin.v1.CollectionService/HasCollection";
const LIST_COLLECTIONS: &str = "/vecadmin.v1.CollectionService/ShowCollections";
const DESCRIBE_COLLECTION: &str = "/vecadmin.v1.CollectionService/DescribeCollection";
const COLLECTION_STATS: &str = "/vecadmin.v1.CollectionService/ShowCollectionInfo";
const SERVER_VERSION: &str = "/vecadmin.v1.CollectionService/Cmd";

/// Collection transport backed by one shared, lazily connected channel
#[derive(Clone)]
pub struct GrpcTransport {
    inner: Grpc<Channel>,
}

impl GrpcTransport {
    /// Build the channel without connecting; the first call establishes it
    ///
    /// No request timeout is set on the channel. The deadline belongs to
    /// [`crate::CollectionClient`], which may override it per clone.
    pub fn connect_lazy(config: &ConnectionConfig) -> Result<Self> {
        let url = config.endpoint_url();
        let endpoint = Endpoint::from_shared(url.clone())
            .map_err(|e| Error::config(format!("Invalid endpoint {url}: {e}")))?
            .connect_timeout(config.connect_timeout());

        debug!("Configured gRPC channel to {url}");
        Ok(Self::from_channel(endpoint.connect_lazy()))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    async fn unary<Req, Resp>(&self, path: &'static str, request: Req) -> TransportResult<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        grpc.ready().await.map_err(|e| {
            TransportFailure::Status(tonic::Status::unavailable(format!(
                "Service was not ready: {e}"
            )))
        })?;

        let codec = ProstCodec::<Req, Resp>::default();
        let response = grpc
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static(path),
                codec,
            )
            .await
            .map_err(connect_failure_as_unavailable)?;

        Ok(response.into_inner())
    }
}

/// Connection failures surface from a lazy channel as `Unknown` statuses
/// wrapping an I/O error; report them as `Unavailable`
fn connect_failure_as_unavailable(status: tonic::Status) -> tonic::Status {
    if status.code() != tonic::Code::Unknown {
        return status;
    }

    let mut cause: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(&status);
    while let Some(err) = cause {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return tonic::Status::unavailable(format!("Failed to connect: {io}"));
        }
        cause = err.source();
    }
    status
}

#[async_trait]
impl CollectionTransport for GrpcTransport {
    async fn create_collection(&self, request: CollectionSchema) -> TransportResult<Status> {
        self.unary(CREATE_COLLECTION, request).await
    }

    async fn drop_collection(&self, request: CollectionName) -> TransportResult<Status> {
        self.unary(DROP_COLLECTION, request).await
    }

    async fn has_collection(&self, request: CollectionName) -> TransportResult<BoolReply> {
        self.unary(HAS_COLLECTION, request).await
    }

    async fn list_collections(&self, request: Command) -> TransportResult<CollectionNameList> {
        self.unary(LIST_COLLECTIONS, request).await
    }

    async fn describe_collection(
        &self,
        request: CollectionName,
    ) -> TransportResult<CollectionSchema> {
        self.unary(DESCRIBE_COLLECTION, request).await
    }

    async fn collection_stats(
        &self,
        request: CollectionName,
    ) -> TransportResult<CollectionStatsReply> {
        self.unary(COLLECTION_STATS, request).await
    }

    async fn server_version(&self, request: Command) -> TransportResult<StringReply> {
        self.unary(SERVER_VERSION, request).await
    }
}
