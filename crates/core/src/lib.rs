//! Core types for the vecadmin collection management client
//!
//! This crate provides the foundational pieces shared by the client and the
//! command-line tool:
//!
//! - **Schema**: collection and field specifications with validation
//! - **Collections**: server-reported collection descriptions and statistics
//! - **Configuration**: connection settings and service limits
//! - **Error handling**: the closed error taxonomy every operation returns
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod collection;
pub mod config;
pub mod error;
pub mod schema;

// Re-export main types for convenience
pub use collection::{CollectionInfo, CollectionStats, FieldInfo, PartitionStats};
pub use config::{CollectionLimits, Config, ConnectionConfig};
pub use error::{BoxError, Error, ErrorKind, Result, ResultExt};
pub use schema::{
    validate_collection_name, CollectionSpec, CollectionSpecBuilder, DataType, FieldSpec,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
