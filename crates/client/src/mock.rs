//! Fault-injecting transport for failure-path testing
use crate::proto::{
    BoolReply, CollectionName, CollectionNameList, CollectionSchema, CollectionStatsReply,
    Command, Status, StringReply,
};
use crate::transport::{CollectionTransport, TransportFailure, TransportResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// RPC an injected fault applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateCollection,
    DropCollection,
    HasCollection,
    ListCollections,
    DescribeCollection,
    CollectionStats,
    ServerVersion,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::CreateCollection,
        Operation::DropCollection,
        Operation::HasCollection,
        Operation::ListCollections,
        Operation::DescribeCollection,
        Operation::CollectionStats,
        Operation::ServerVersion,
    ];
}

/// What a faulted call does instead of (or before) reaching the wrapped transport
#[derive(Debug, Clone)]
pub enum Fault {
    /// Raise a deadline signal
    Timeout,
    /// Raise an RPC status
    Status(tonic::Code, String),
    /// Raise an unclassified failure
    Failure(String),
    /// Stall, then delegate
    Delay(Duration),
}

/// Wraps a transport and injects faults per operation
pub struct MockTransport {
    inner: Arc<dyn CollectionTransport>,
    faults: DashMap<Operation, Fault>,
    calls: DashMap<Operation, usize>,
}

/// Builder for MockTransport
pub struct MockTransportBuilder {
    inner: Arc<dyn CollectionTransport>,
    faults: Vec<(Operation, Fault)>,
}

impl MockTransportBuilder {
    pub fn new(inner: Arc<dyn CollectionTransport>) -> Self {
        Self {
            inner,
            faults: Vec::new(),
        }
    }

    /// Fault one operation
    pub fn fail(mut self, operation: Operation, fault: Fault) -> Self {
        self.faults.push((operation, fault));
        self
    }

    /// Fault every operation
    pub fn fail_all(mut self, fault: Fault) -> Self {
        for operation in Operation::ALL {
            self.faults.push((operation, fault.clone()));
        }
        self
    }

    pub fn build(self) -> MockTransport {
        let transport = MockTransport::new(self.inner);
        for (operation, fault) in self.faults {
            transport.inject(operation, fault);
        }
        transport
    }
}

impl MockTransport {
    pub fn new(inner: Arc<dyn CollectionTransport>) -> Self {
        Self {
            inner,
            faults: DashMap::new(),
            calls: DashMap::new(),
        }
    }

    pub fn builder(inner: Arc<dyn CollectionTransport>) -> MockTransportBuilder {
        MockTransportBuilder::new(inner)
    }

    /// Replace the fault for `operation`
    pub fn inject(&self, operation: Operation, fault: Fault) {
        self.faults.insert(operation, fault);
    }

    /// Remove every injected fault
    pub fn clear(&self) {
        self.faults.clear();
    }

    /// Number of calls that reached this transport for `operation`
    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls.get(&operation).map(|count| *count).unwrap_or(0)
    }

    async fn intercept(&self, operation: Operation) -> TransportResult<()> {
        *self.calls.entry(operation).or_insert(0) += 1;
        let fault = self.faults.get(&operation).map(|f| f.value().clone());

        match fault {
            None => Ok(()),
            Some(Fault::Timeout) => Err(TransportFailure::DeadlineExceeded),
            Some(Fault::Status(code, message)) => {
                Err(TransportFailure::Status(tonic::Status::new(code, message)))
            }
            Some(Fault::Failure(message)) => Err(TransportFailure::Other(anyhow::anyhow!(message))),
            Some(Fault::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl CollectionTransport for MockTransport {
    async fn create_collection(&self, request: CollectionSchema) -> TransportResult<Status> {
        self.intercept(Operation::CreateCollection).await?;
        self.inner.create_collection(request).await
    }

    async fn drop_collection(&self, request: CollectionName) -> TransportResult<Status> {
        self.intercept(Operation::DropCollection).await?;
        self.inner.drop_collection(request).await
    }

    async fn has_collection(&self, request: CollectionName) -> TransportResult<BoolReply> {
        self.intercept(Operation::HasCollection).await?;
        self.inner.has_collection(request).await
    }

    async fn list_collections(&self, request: Command) -> TransportResult<CollectionNameList> {
        self.intercept(Operation::ListCollections).await?;
        self.inner.list_collections(request).await
    }

    async fn describe_collection(
        &self,
        request: CollectionName,
    ) -> TransportResult<CollectionSchema> {
        self.intercept(Operation::DescribeCollection).await?;
        self.inner.describe_collection(request).await
    }

    async fn collection_stats(
        &self,
        request: CollectionName,
    ) -> TransportResult<CollectionStatsReply> {
        self.intercept(Operation::CollectionStats).await?;
        self.inner.collection_stats(request).await
    }

    async fn server_version(&self, request: Command) -> TransportResult<StringReply> {
        self.intercept(Operation::ServerVersion).await?;
        self.inner.server_version(request).await
    }
}
