//! Collection management client
//!
//! Creates, drops, lists and inspects collections on a vector database
//! service. Calls go through a [`CollectionTransport`]; the gRPC transport
//! talks to a remote service and the in-memory transport stands in for one.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod client;
mod factory;
mod grpc;
mod memory;
mod mock;
mod normalize;
pub mod proto;
mod transport;

pub use client::CollectionClient;
pub use factory::create_collection_client;
pub use grpc::GrpcTransport;
pub use memory::{InMemoryTransport, DEFAULT_PARTITION};
pub use mock::{Fault, MockTransport, MockTransportBuilder, Operation};
pub use normalize::ServiceError;
pub use transport::{CollectionTransport, TransportFailure, TransportResult};

// Re-export core types so callers need a single dependency
pub use vecadmin_core::{
    CollectionInfo, CollectionSpec, CollectionStats, Config, DataType, Error, ErrorKind,
    FieldInfo, FieldSpec, PartitionStats, Result,
};

/// RPC status code carried by a transport error
pub fn grpc_code(err: &Error) -> Option<tonic::Code> {
    err.status_code().map(tonic::Code::from_i32)
}
