mod common;

use common::vector_spec;
use vecadmin_client::{create_collection_client, ErrorKind};
use vecadmin_core::Config;

fn memory_config() -> Config {
    let mut config = Config::default();
    config.connection.provider = "memory".to_string();
    config
}

#[tokio::test]
async fn test_factory_creates_memory_client() {
    let client = create_collection_client(&memory_config()).await.unwrap();

    client
        .create_collection("factory", vector_spec(32, 10_000))
        .await
        .unwrap();
    assert_eq!(client.list_collections().await.unwrap(), vec!["factory"]);
}

#[tokio::test]
async fn test_factory_clones_share_state() {
    let client = create_collection_client(&memory_config()).await.unwrap();
    let clone = client.clone();

    client
        .create_collection("shared", vector_spec(32, 10_000))
        .await
        .unwrap();
    assert!(clone.has_collection("shared").await.unwrap());
}

#[tokio::test]
async fn test_factory_applies_configured_timeout() {
    let mut config = memory_config();
    config.connection.timeout_ms = 1234;

    let client = create_collection_client(&config).await.unwrap();
    assert_eq!(client.timeout().as_millis(), 1234);
}

#[tokio::test]
async fn test_factory_verifies_memory_connection() {
    let mut config = memory_config();
    config.connection.verify_on_connect = true;

    assert!(create_collection_client(&config).await.is_ok());
}

#[tokio::test]
async fn test_factory_rejects_unknown_provider() {
    let mut config = Config::default();
    config.connection.provider = "carrier_pigeon".to_string();

    let err = create_collection_client(&config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[tokio::test]
async fn test_factory_rejects_invalid_config() {
    let mut config = memory_config();
    config.connection.timeout_ms = 0;

    let err = create_collection_client(&config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[tokio::test]
async fn test_factory_grpc_connects_lazily() {
    let mut config = Config::default();
    config.connection.host = "127.0.0.1".to_string();
    config.connection.port = 1;

    // No round-trip happens until the first call
    assert!(create_collection_client(&config).await.is_ok());
}
