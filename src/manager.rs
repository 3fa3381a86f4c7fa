//! Container client manager
//!
//! Produces ready-to-use [`ContainerClient`] handles for named containers,
//! ensuring the remote container exists on first use and memoizing handles so
//! the setup round trip happens once per distinct container name.
//!
//! The cache is owned by the manager instance, not process-global: two
//! managers share nothing unless the caller shares the manager itself.

use std::collections::HashMap;
use std::sync::RwLock;

use azure_core::error::ErrorKind;
use azure_core::StatusCode;
use azure_storage_blobs::prelude::ContainerClient;
use tracing::{debug, error, info, warn};

use crate::config::{self, AccountConfig};
use crate::errors::{BlobError, Result};

/// Cached container clients for one logical storage account
pub struct ContainerManager {
    config: AccountConfig,
    clients: RwLock<HashMap<String, ContainerClient>>,
}

impl ContainerManager {
    /// Create a manager for the given account
    pub fn new(config: AccountConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Symbolic name of the account this manager targets
    pub fn account(&self) -> &str {
        &self.config.account
    }

    /// Get a client for the named container, creating the remote container
    /// if it does not exist yet.
    ///
    /// Container names are case-insensitive: the name is lowercased before
    /// cache lookup and before any remote call. A handle is cached only once
    /// the existence check succeeds, so a container that failed to provision
    /// is retried on the next call rather than served from the cache.
    ///
    /// Two concurrent first-time callers for the same container may both
    /// issue the idempotent remote create; the first handle stored wins and
    /// both callers receive a usable client.
    pub async fn container_client(&self, container_name: &str) -> Result<ContainerClient> {
        let key = normalize_container_name(container_name);

        if let Some(client) = self
            .clients
            .read()
            .expect("container cache lock poisoned")
            .get(&key)
        {
            return Ok(client.clone());
        }

        let connection_string = self.config.resolve_connection_string()?;
        let client = config::client_builder(&connection_string)?.container_client(key.clone());

        ensure_exists(&client, &key).await?;

        let mut cache = self.clients.write().expect("container cache lock poisoned");
        Ok(cache.entry(key).or_insert(client).clone())
    }
}

/// Lowercase the container name so cache keys and remote names agree
pub(crate) fn normalize_container_name(name: &str) -> String {
    name.to_lowercase()
}

/// One-time remote round trip: create the container unless it already exists.
async fn ensure_exists(client: &ContainerClient, container: &str) -> Result<()> {
    match client.exists().await {
        Ok(true) => {
            debug!(container, "container already exists");
            Ok(())
        }
        Ok(false) => create_container(client, container).await,
        Err(e) => {
            // Existence probe failed; the create call settles it either way.
            warn!(container, error = %e, "container existence check failed, attempting create");
            create_container(client, container).await
        }
    }
}

async fn create_container(client: &ContainerClient, container: &str) -> Result<()> {
    match client.create().await {
        Ok(_) => {
            info!(container, "created container");
            Ok(())
        }
        // A concurrent caller won the race; the container is there.
        Err(e) if is_already_exists(&e) => {
            debug!(container, "container created concurrently");
            Ok(())
        }
        Err(e) => {
            error!(container, error = %e, "failed to create container");
            Err(BlobError::RemoteUnavailable {
                container: container.to_string(),
                source: e,
            })
        }
    }
}

fn is_already_exists(err: &azure_core::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::HttpResponse {
            status: StatusCode::Conflict,
            ..
        }
    )
}
