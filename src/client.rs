//! Blob facade
//!
//! [`SimpleAzBlobClient`] exposes save/get/list/delete over named blobs.
//! Every operation resolves a container client through the
//! [`ContainerManager`], performs a single remote call, and adapts the result
//! (JSON codec, path joining, hierarchy filtering). Failures are logged with
//! container/blob context and propagated unchanged; there is no retry or
//! recovery at this layer.
//!
//! Objects and streams are two views of the same blob: the object entry
//! points are the stream entry points plus a JSON codec step.

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::AccountConfig;
use crate::errors::{is_not_found, BlobError, Result};
use crate::manager::ContainerManager;

/// Virtual hierarchy delimiter used by the path-scoped listings
const DELIMITER: &str = "/";

/// How the transport classified a hierarchy listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HierarchyEntry {
    /// A real blob at this level
    Blob,
    /// A virtual sub-folder prefix
    Folder,
}

/// Facade over blob storage for one logical account
pub struct SimpleAzBlobClient {
    manager: Arc<ContainerManager>,
}

impl SimpleAzBlobClient {
    /// Create a facade over an existing manager.
    ///
    /// Facades sharing a manager share its container cache.
    pub fn new(manager: Arc<ContainerManager>) -> Self {
        Self { manager }
    }

    /// Standalone facade with its own manager, bound to an explicit
    /// connection string.
    pub fn with_connection_string(
        account: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self::new(Arc::new(ContainerManager::new(
            AccountConfig::with_connection_string(account, connection_string),
        )))
    }

    /// Serialize `item` to JSON and upload it, overwriting any existing blob.
    pub async fn save_object<T: Serialize>(
        &self,
        container_name: &str,
        blob_name: &str,
        item: &T,
    ) -> Result<()> {
        let payload = serde_json::to_vec(item).map_err(|e| {
            error!(container = container_name, blob = blob_name, error = %e, "object serialization failed");
            BlobError::Serialize {
                path: blob_name.to_string(),
                source: e,
            }
        })?;
        self.save_stream(container_name, blob_name, payload).await
    }

    /// [`save_object`](Self::save_object) with the blob name given as a
    /// folder path plus item name.
    pub async fn save_object_at<T: Serialize>(
        &self,
        container_name: &str,
        path: &str,
        item_name: &str,
        item: &T,
    ) -> Result<()> {
        self.save_object(container_name, &join_blob_path(path, item_name), item)
            .await
    }

    /// Upload raw bytes verbatim, overwriting any existing blob.
    pub async fn save_stream(
        &self,
        container_name: &str,
        blob_name: &str,
        data: impl Into<Bytes>,
    ) -> Result<()> {
        let container = self.manager.container_client(container_name).await?;
        let data = data.into();
        debug!(container = container_name, blob = blob_name, size = data.len(), "uploading blob");

        container
            .blob_client(blob_name)
            .put_block_blob(data)
            .await
            .map_err(|e| {
                error!(container = container_name, blob = blob_name, error = %e, "blob upload failed");
                BlobError::Upload {
                    path: blob_name.to_string(),
                    source: e,
                }
            })?;
        Ok(())
    }

    /// [`save_stream`](Self::save_stream) with the blob name given as a
    /// folder path plus item name.
    pub async fn save_stream_at(
        &self,
        container_name: &str,
        path: &str,
        item_name: &str,
        data: impl Into<Bytes>,
    ) -> Result<()> {
        self.save_stream(container_name, &join_blob_path(path, item_name), data)
            .await
    }

    /// Download a blob and deserialize it from JSON.
    pub async fn get_object<T: DeserializeOwned>(
        &self,
        container_name: &str,
        blob_name: &str,
    ) -> Result<T> {
        let data = self.get_stream(container_name, blob_name).await?;
        serde_json::from_slice(&data).map_err(|e| {
            error!(container = container_name, blob = blob_name, error = %e, "blob deserialization failed");
            BlobError::Deserialize {
                path: blob_name.to_string(),
                source: e,
            }
        })
    }

    /// [`get_object`](Self::get_object) with the blob name given as a folder
    /// path plus item name.
    pub async fn get_object_at<T: DeserializeOwned>(
        &self,
        container_name: &str,
        path: &str,
        item_name: &str,
    ) -> Result<T> {
        self.get_object(container_name, &join_blob_path(path, item_name))
            .await
    }

    /// Download the full content of a blob.
    ///
    /// A missing key fails with [`BlobError::NotFound`]; it never yields an
    /// empty payload silently.
    pub async fn get_stream(&self, container_name: &str, blob_name: &str) -> Result<Bytes> {
        let container = self.manager.container_client(container_name).await?;
        debug!(container = container_name, blob = blob_name, "downloading blob");

        match container.blob_client(blob_name).get_content().await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if is_not_found(&e) => {
                debug!(container = container_name, blob = blob_name, "blob not found");
                Err(BlobError::NotFound {
                    path: blob_name.to_string(),
                })
            }
            Err(e) => {
                error!(container = container_name, blob = blob_name, error = %e, "blob download failed");
                Err(BlobError::Download {
                    path: blob_name.to_string(),
                    source: e,
                })
            }
        }
    }

    /// [`get_stream`](Self::get_stream) with the blob name given as a folder
    /// path plus item name.
    pub async fn get_stream_at(
        &self,
        container_name: &str,
        path: &str,
        item_name: &str,
    ) -> Result<Bytes> {
        self.get_stream(container_name, &join_blob_path(path, item_name))
            .await
    }

    /// List every blob in the container, or only those whose name starts
    /// with `prefix`, draining all server-side pages.
    pub async fn list_all_blobs(
        &self,
        container_name: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<String>> {
        let container = self.manager.container_client(container_name).await?;
        debug!(container = container_name, prefix = prefix.unwrap_or(""), "listing blobs");

        let mut builder = container.list_blobs();
        if let Some(prefix) = prefix {
            builder = builder.prefix(prefix.to_string());
        }

        let mut names = Vec::new();
        let mut pages = builder.into_stream();
        while let Some(page) = pages.try_next().await.map_err(|e| {
            error!(container = container_name, prefix = prefix.unwrap_or(""), error = %e, "blob listing failed");
            BlobError::List {
                container: container_name.to_string(),
                prefix: prefix.unwrap_or("").to_string(),
                source: e,
            }
        })? {
            names.extend(page.blobs.blobs().map(|blob| blob.name.clone()));
        }
        Ok(names)
    }

    /// List the blobs living directly at `path`, excluding anything nested
    /// one or more virtual folders deeper.
    pub async fn list_blobs_at_path(
        &self,
        container_name: &str,
        path: &str,
    ) -> Result<Vec<String>> {
        self.list_hierarchy(container_name, path, HierarchyEntry::Blob)
            .await
    }

    /// List the virtual sub-folders directly under `path`, as
    /// delimiter-terminated prefix strings.
    pub async fn list_folders_at_path(
        &self,
        container_name: &str,
        path: &str,
    ) -> Result<Vec<String>> {
        self.list_hierarchy(container_name, path, HierarchyEntry::Folder)
            .await
    }

    /// One level of directory listing over the flat key space.
    ///
    /// The remote classifies each entry as a blob or a prefix when given a
    /// delimiter; this just filters and forwards that classification.
    async fn list_hierarchy(
        &self,
        container_name: &str,
        path: &str,
        kind: HierarchyEntry,
    ) -> Result<Vec<String>> {
        let container = self.manager.container_client(container_name).await?;
        debug!(container = container_name, path, ?kind, "listing hierarchy level");

        let mut names = Vec::new();
        let mut pages = container
            .list_blobs()
            .prefix(path.to_string())
            .delimiter(DELIMITER.to_string())
            .into_stream();
        while let Some(page) = pages.try_next().await.map_err(|e| {
            error!(container = container_name, path, error = %e, "hierarchy listing failed");
            BlobError::List {
                container: container_name.to_string(),
                prefix: path.to_string(),
                source: e,
            }
        })? {
            match kind {
                HierarchyEntry::Blob => {
                    names.extend(page.blobs.blobs().map(|blob| blob.name.clone()));
                }
                HierarchyEntry::Folder => {
                    names.extend(page.blobs.prefixes().map(|prefix| prefix.name.clone()));
                }
            }
        }
        Ok(names)
    }

    /// Delete a blob. Deleting a blob that does not exist is a success.
    pub async fn delete_blob(&self, container_name: &str, blob_name: &str) -> Result<()> {
        let container = self.manager.container_client(container_name).await?;
        debug!(container = container_name, blob = blob_name, "deleting blob");

        match container.blob_client(blob_name).delete().await {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => {
                debug!(container = container_name, blob = blob_name, "blob already absent");
                Ok(())
            }
            Err(e) => {
                error!(container = container_name, blob = blob_name, error = %e, "blob deletion failed");
                Err(BlobError::Delete {
                    path: blob_name.to_string(),
                    source: e,
                })
            }
        }
    }

    /// [`delete_blob`](Self::delete_blob) with the blob name given as a
    /// folder path plus item name.
    pub async fn delete_blob_at(
        &self,
        container_name: &str,
        path: &str,
        blob_name: &str,
    ) -> Result<()> {
        self.delete_blob(container_name, &join_blob_path(path, blob_name))
            .await
    }
}

/// Join a folder path and an item name into a full blob key.
///
/// Tolerates a trailing delimiter on `path`; always produces exactly one
/// separator between the two parts.
pub(crate) fn join_blob_path(path: &str, name: &str) -> String {
    let trimmed = path.trim_end_matches(DELIMITER);
    if trimmed.is_empty() {
        name.to_string()
    } else {
        format!("{trimmed}{DELIMITER}{name}")
    }
}
