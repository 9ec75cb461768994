use crate::client::CollectionClient;
use crate::grpc::GrpcTransport;
use crate::memory::InMemoryTransport;
use crate::transport::CollectionTransport;
use std::sync::Arc;
use tracing::{debug, info};
use vecadmin_core::{Config, Error, Result};

/// Creates a collection client based on configuration.
///
/// The `provider` setting picks the transport: `grpc` opens a lazily
/// connected channel to `host:port`, `memory` serves collections from an
/// in-process store. Clones of the returned client share the transport.
///
/// # Errors
/// Returns a configuration error if the config does not validate or the
/// endpoint cannot be parsed. With `verify_on_connect` set, the first
/// round-trip failure is returned as well.
pub async fn create_collection_client(config: &Config) -> Result<CollectionClient> {
    config.validate()?;

    let transport: Arc<dyn CollectionTransport> = match config.connection.provider.as_str() {
        "grpc" => Arc::new(GrpcTransport::connect_lazy(&config.connection)?),
        "memory" => Arc::new(InMemoryTransport::new(config.limits.clone())),
        other => {
            return Err(Error::config(format!(
                "Unsupported connection provider: {other}"
            )))
        }
    };
    debug!(
        "Created {} transport for {}",
        config.connection.provider,
        config.connection.endpoint_url()
    );

    let client = CollectionClient::new(transport, config);

    if config.connection.verify_on_connect {
        let version = client.server_version().await?;
        info!("Connected to collection service {version}");
    }

    Ok(client)
}
