//! Integration tests against a live blob endpoint (Azurite or a real
//! storage account).
//!
//! Each test reads the connection string from
//! `AZURE_STORAGE_CONNECTION_STRING` and skips when it is not set, so the
//! suite passes in environments without an emulator. To run locally:
//!
//! ```bash
//! npm install -g azurite && azurite --silent &
//! export AZURE_STORAGE_CONNECTION_STRING="DefaultEndpointsProtocol=http;AccountName=devstoreaccount1;AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;BlobEndpoint=http://127.0.0.1:10000/devstoreaccount1;"
//! cargo test --test azurite
//! ```

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use simple_az_blob::{
    AccountConfig, BlobError, ContainerManager, SimpleAzBlobClient, FALLBACK_CONNECTION_VAR,
};
use uuid::Uuid;

const CONTAINER: &str = "simple-az-blob-tests";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Document {
    id: String,
    revision: u32,
    tags: Vec<String>,
}

fn sample_document(revision: u32) -> Document {
    Document {
        id: "doc-1".to_string(),
        revision,
        tags: vec!["alpha".to_string(), "beta".to_string()],
    }
}

fn connection_string() -> Option<String> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    match std::env::var(FALLBACK_CONNECTION_VAR) {
        Ok(conn) => Some(conn),
        Err(_) => {
            eprintln!("skipping: {FALLBACK_CONNECTION_VAR} not set");
            None
        }
    }
}

fn test_client() -> Option<SimpleAzBlobClient> {
    connection_string()
        .map(|conn| SimpleAzBlobClient::with_connection_string("AzuriteTestAccount", conn))
}

#[tokio::test]
async fn object_round_trip() {
    let Some(client) = test_client() else { return };
    let name = format!("roundtrip/{}.json", Uuid::new_v4());
    let doc = sample_document(1);

    client.save_object(CONTAINER, &name, &doc).await.unwrap();
    let loaded: Document = client.get_object(CONTAINER, &name).await.unwrap();
    assert_eq!(loaded, doc);

    client.delete_blob(CONTAINER, &name).await.unwrap();
}

#[tokio::test]
async fn stream_round_trip_is_verbatim() {
    let Some(client) = test_client() else { return };
    let name = format!("streams/{}.bin", Uuid::new_v4());
    let payload = Bytes::from_static(b"\x00\x01\xffraw bytes, not JSON");

    client
        .save_stream(CONTAINER, &name, payload.clone())
        .await
        .unwrap();
    let loaded = client.get_stream(CONTAINER, &name).await.unwrap();
    assert_eq!(loaded, payload);

    client.delete_blob(CONTAINER, &name).await.unwrap();
}

#[tokio::test]
async fn save_overwrites_existing_blob() {
    let Some(client) = test_client() else { return };
    let name = format!("overwrite/{}.json", Uuid::new_v4());

    client
        .save_object(CONTAINER, &name, &sample_document(1))
        .await
        .unwrap();
    client
        .save_object(CONTAINER, &name, &sample_document(2))
        .await
        .unwrap();

    let loaded: Document = client.get_object(CONTAINER, &name).await.unwrap();
    assert_eq!(loaded.revision, 2);

    client.delete_blob(CONTAINER, &name).await.unwrap();
}

#[tokio::test]
async fn delete_is_idempotent() {
    let Some(client) = test_client() else { return };
    let name = format!("delete/{}.json", Uuid::new_v4());

    client
        .save_object(CONTAINER, &name, &sample_document(1))
        .await
        .unwrap();
    client.delete_blob(CONTAINER, &name).await.unwrap();
    // Second delete of the now-missing blob must also succeed.
    client.delete_blob(CONTAINER, &name).await.unwrap();
}

#[tokio::test]
async fn missing_blob_is_not_found() {
    let Some(client) = test_client() else { return };
    let name = format!("missing/{}.json", Uuid::new_v4());

    let err = client.get_stream(CONTAINER, &name).await.unwrap_err();
    assert!(matches!(err, BlobError::NotFound { .. }));

    let err = client
        .get_object::<Document>(CONTAINER, &name)
        .await
        .unwrap_err();
    assert!(matches!(err, BlobError::NotFound { .. }));
}

#[tokio::test]
async fn listing_returns_exactly_the_prefixed_blobs() {
    let Some(client) = test_client() else { return };
    let root = format!("listing-{}", Uuid::new_v4());
    let names: Vec<String> = (0..3).map(|i| format!("{root}/item-{i}.json")).collect();

    for name in &names {
        client
            .save_object(CONTAINER, name, &sample_document(1))
            .await
            .unwrap();
    }

    let mut listed = client
        .list_all_blobs(CONTAINER, Some(&format!("{root}/")))
        .await
        .unwrap();
    listed.sort();
    assert_eq!(listed, names);

    for name in &names {
        client.delete_blob(CONTAINER, name).await.unwrap();
    }
}

#[tokio::test]
async fn hierarchy_emulation_partitions_blobs_and_folders() {
    let Some(client) = test_client() else { return };
    let root = format!("tree-{}", Uuid::new_v4());

    // Layout: {root}/b, {root}/c, {root}/d/e
    client
        .save_object_at(CONTAINER, &root, "b", &sample_document(1))
        .await
        .unwrap();
    client
        .save_object_at(CONTAINER, &root, "c", &sample_document(1))
        .await
        .unwrap();
    client
        .save_object_at(CONTAINER, &format!("{root}/d"), "e", &sample_document(1))
        .await
        .unwrap();

    let prefix = format!("{root}/");
    let mut blobs = client.list_blobs_at_path(CONTAINER, &prefix).await.unwrap();
    blobs.sort();
    assert_eq!(blobs, vec![format!("{root}/b"), format!("{root}/c")]);

    let folders = client
        .list_folders_at_path(CONTAINER, &prefix)
        .await
        .unwrap();
    assert_eq!(folders, vec![format!("{root}/d/")]);

    client.delete_blob_at(CONTAINER, &root, "b").await.unwrap();
    client.delete_blob_at(CONTAINER, &root, "c").await.unwrap();
    client
        .delete_blob_at(CONTAINER, &format!("{root}/d"), "e")
        .await
        .unwrap();
}

#[tokio::test]
async fn container_names_are_case_insensitive() {
    let Some(conn) = connection_string() else { return };
    let manager = Arc::new(ContainerManager::new(AccountConfig::with_connection_string(
        "AzuriteTestAccount",
        conn,
    )));

    // Both spellings resolve to the same remote container; both handles work.
    let upper = manager
        .container_client("Simple-AZ-Blob-Tests")
        .await
        .unwrap();
    let lower = manager.container_client(CONTAINER).await.unwrap();

    let client = SimpleAzBlobClient::new(manager);
    let name = format!("case/{}.json", Uuid::new_v4());
    client
        .save_object("Simple-AZ-Blob-Tests", &name, &sample_document(1))
        .await
        .unwrap();
    let loaded: Document = client.get_object(CONTAINER, &name).await.unwrap();
    assert_eq!(loaded.revision, 1);

    client.delete_blob(CONTAINER, &name).await.unwrap();
    drop((upper, lower));
}

#[tokio::test]
async fn concurrent_first_access_yields_usable_handles() {
    let Some(conn) = connection_string() else { return };
    let manager = Arc::new(ContainerManager::new(AccountConfig::with_connection_string(
        "AzuriteTestAccount",
        conn,
    )));
    // A container name neither task has touched before.
    let container = format!("concurrent-{}", Uuid::new_v4());

    let (a, b) = tokio::join!(
        manager.container_client(&container),
        manager.container_client(&container),
    );
    a.unwrap();
    b.unwrap();

    let client = SimpleAzBlobClient::new(manager);
    client
        .save_object(&container, "probe.json", &sample_document(1))
        .await
        .unwrap();
    client.delete_blob(&container, "probe.json").await.unwrap();
}
