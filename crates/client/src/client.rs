//! Collection management client
//!
//! Every operation runs the same three stages: local validation, a single
//! RPC under the client deadline, and normalization of the outcome into
//! [`vecadmin_core::Error`].

use crate::normalize::{check_status, map_failure, millis};
use crate::proto::{CollectionName, CollectionSchema, Command};
use crate::transport::{CollectionTransport, TransportResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vecadmin_core::{
    validate_collection_name, CollectionInfo, CollectionLimits, CollectionSpec, CollectionStats,
    Config, Error, Result, ResultExt,
};

const VERSION_COMMAND: &str = "version";

/// Client for collection administration over a shared transport
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct CollectionClient {
    transport: Arc<dyn CollectionTransport>,
    limits: CollectionLimits,
    timeout: Duration,
}

impl std::fmt::Debug for CollectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionClient")
            .field("limits", &self.limits)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CollectionClient {
    /// Create a client over an existing transport
    pub fn new(transport: Arc<dyn CollectionTransport>, config: &Config) -> Self {
        Self {
            transport,
            limits: config.limits.clone(),
            timeout: config.connection.timeout(),
        }
    }

    /// A client sharing this connection with a different per-call deadline
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            limits: self.limits.clone(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn limits(&self) -> &CollectionLimits {
        &self.limits
    }

    /// Create a collection named `name` from `spec`
    ///
    /// # Errors
    /// - `Validation` for a bad name or a spec outside the configured limits,
    ///   before any RPC is sent, or when the service rejects the parameters
    /// - `AlreadyExists` when the name is taken, whatever spec it was created with
    /// - `Timeout`, `Transport`, `Unknown` per the normalization rules
    pub async fn create_collection(&self, name: &str, spec: CollectionSpec) -> Result<()> {
        validate_collection_name(name)?;
        spec.check_limits(&self.limits)?;

        let request = CollectionSchema::from_spec(name, &spec, &self.limits)?;
        debug!(
            "Creating collection {name} with {} fields, segment_row_limit {}",
            request.fields.len(),
            request.segment_row_limit
        );

        let status = self
            .call("create_collection", self.transport.create_collection(request))
            .await?;
        check_status("create_collection", name, Some(&status))?;

        info!("Created collection {name}");
        Ok(())
    }

    /// Drop a collection and all of its data
    ///
    /// Dropping a missing collection is a `NotFound` error, not a no-op.
    pub async fn drop_collection(&self, name: &str) -> Result<()> {
        validate_collection_name(name)?;

        let status = self
            .call("drop_collection", self.transport.drop_collection(collection_name(name)))
            .await?;
        check_status("drop_collection", name, Some(&status))?;

        info!("Dropped collection {name}");
        Ok(())
    }

    /// Names of every collection the service knows about
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let reply = self
            .call(
                "list_collections",
                self.transport.list_collections(Command::default()),
            )
            .await?;
        check_status("list_collections", "", reply.status.as_ref())?;

        Ok(reply.collection_names)
    }

    /// Whether a collection exists; absence is not an error
    pub async fn has_collection(&self, name: &str) -> Result<bool> {
        validate_collection_name(name)?;

        let reply = self
            .call("has_collection", self.transport.has_collection(collection_name(name)))
            .await?;
        check_status("has_collection", name, reply.status.as_ref())?;

        Ok(reply.bool_reply)
    }

    /// Fetch the service's description of a collection
    pub async fn describe_collection(&self, name: &str) -> Result<CollectionInfo> {
        validate_collection_name(name)?;

        let reply = self
            .call(
                "describe_collection",
                self.transport.describe_collection(collection_name(name)),
            )
            .await?;
        check_status("describe_collection", name, reply.status.as_ref())?;

        reply.to_info().map_err(|reason| {
            Error::unknown(
                format!("Malformed description of collection {name}"),
                anyhow::anyhow!(reason),
            )
        })
    }

    /// Fetch a statistics snapshot for a collection
    pub async fn collection_stats(&self, name: &str) -> Result<CollectionStats> {
        validate_collection_name(name)?;

        let reply = self
            .call(
                "collection_stats",
                self.transport.collection_stats(collection_name(name)),
            )
            .await?;
        check_status("collection_stats", name, reply.status.as_ref())?;

        serde_json::from_str(&reply.json_info)
            .context(format!("Failed to decode statistics of collection {name}"))
    }

    /// Version string reported by the service
    pub async fn server_version(&self) -> Result<String> {
        let command = Command {
            cmd: VERSION_COMMAND.to_string(),
        };
        let reply = self
            .call("server_version", self.transport.server_version(command))
            .await?;
        check_status("server_version", "", reply.status.as_ref())?;

        Ok(reply.string_reply)
    }

    /// Await one RPC under the client deadline
    async fn call<T, F>(&self, operation: &str, rpc: F) -> Result<T>
    where
        F: Future<Output = TransportResult<T>>,
    {
        let outcome = tokio::time::timeout(self.timeout, rpc).await;

        let err = match outcome {
            Ok(Ok(reply)) => return Ok(reply),
            Ok(Err(failure)) => map_failure(operation, self.timeout, failure),
            Err(_) => Error::timeout(operation, millis(self.timeout)),
        };
        warn!("{operation} failed: {err}");
        Err(err)
    }
}

fn collection_name(name: &str) -> CollectionName {
    CollectionName {
        collection_name: name.to_string(),
    }
}
