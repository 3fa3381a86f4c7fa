//! Account configuration and connection-string resolution
//!
//! Supports configuration via:
//! - An explicit connection string handed to the constructor (primary)
//! - Environment variables (secondary)
//! - Optional TOML config file mapping account names to connection strings
//!
//! Each [`AccountConfig`] carries the symbolic name of one logical storage
//! account. The name does double duty: it distinguishes manager instances
//! that target different accounts, and it is the environment variable
//! consulted when no explicit connection string was provided. When neither
//! yields a value, the fixed fallback variable
//! `AZURE_STORAGE_CONNECTION_STRING` is tried last.

use std::collections::HashMap;

use azure_storage::{CloudLocation, StorageCredentials};
use azure_storage_blobs::prelude::ClientBuilder;
use serde::{Deserialize, Serialize};

use crate::errors::{BlobError, Result};

/// Fallback environment variable consulted when the account-named lookup
/// yields nothing.
pub const FALLBACK_CONNECTION_VAR: &str = "AZURE_STORAGE_CONNECTION_STRING";

/// Default port used by Azurite and other local emulators when the blob
/// endpoint omits one.
const DEFAULT_EMULATOR_PORT: u16 = 10000;

/// Connection descriptor for one logical storage account
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Symbolic account name (also the environment lookup key)
    pub account: String,

    /// Explicit connection string; when absent, resolution falls back to
    /// the environment
    pub connection_string: Option<String>,
}

impl AccountConfig {
    /// Descriptor for `account` with no explicit connection string.
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            connection_string: None,
        }
    }

    /// Descriptor with an explicit connection string.
    pub fn with_connection_string(
        account: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            connection_string: Some(connection_string.into()),
        }
    }

    /// Resolve the connection string for this account.
    ///
    /// Precedence: explicit string, then the environment variable named by
    /// the account, then [`FALLBACK_CONNECTION_VAR`].
    pub fn resolve_connection_string(&self) -> Result<String> {
        if let Some(conn) = &self.connection_string {
            return Ok(conn.clone());
        }
        if let Ok(conn) = std::env::var(&self.account) {
            return Ok(conn);
        }
        if let Ok(conn) = std::env::var(FALLBACK_CONNECTION_VAR) {
            return Ok(conn);
        }
        Err(BlobError::ConnectionResolution {
            account: self.account.clone(),
        })
    }
}

/// Multi-account configuration source
///
/// Maps account names to connection strings, typically loaded from a TOML
/// file:
///
/// ```toml
/// [accounts]
/// ArchiveAccount = "DefaultEndpointsProtocol=https;AccountName=archive;AccountKey=...;"
/// HotAccount = "DefaultEndpointsProtocol=https;AccountName=hot;AccountKey=...;"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Account name -> connection string
    #[serde(default)]
    pub accounts: HashMap<String, String>,
}

impl StorageConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StorageConfig =
            toml::from_str(&content).map_err(|e| BlobError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Descriptor for the named account.
    ///
    /// When the file does not mention the account, the descriptor still
    /// resolves through the environment.
    pub fn account(&self, name: &str) -> AccountConfig {
        match self.accounts.get(name) {
            Some(conn) => AccountConfig::with_connection_string(name, conn),
            None => AccountConfig::new(name),
        }
    }
}

/// Extract a `Key=Value` field from a connection string.
fn connection_field<'a>(connection_string: &'a str, key: &str) -> Option<&'a str> {
    connection_string
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix(key).and_then(|rest| rest.strip_prefix('=')))
        .filter(|value| !value.is_empty())
}

/// Build an SDK client builder from a connection string.
///
/// Understands the standard `AccountName`/`AccountKey` pair plus an optional
/// `BlobEndpoint`, which routes to a local emulator such as Azurite instead
/// of the public cloud.
pub(crate) fn client_builder(connection_string: &str) -> Result<ClientBuilder> {
    let account = connection_field(connection_string, "AccountName").ok_or_else(|| {
        BlobError::InvalidConnectionString("missing AccountName".to_string())
    })?;
    let key = connection_field(connection_string, "AccountKey").ok_or_else(|| {
        BlobError::InvalidConnectionString("missing AccountKey".to_string())
    })?;

    let credentials = StorageCredentials::access_key(account.to_string(), key.to_string());

    if let Some(endpoint) = connection_field(connection_string, "BlobEndpoint") {
        let url = azure_core::Url::parse(endpoint)
            .map_err(|e| BlobError::InvalidConnectionString(format!("bad BlobEndpoint: {e}")))?;
        let address = url
            .host_str()
            .ok_or_else(|| {
                BlobError::InvalidConnectionString("BlobEndpoint has no host".to_string())
            })?
            .to_string();
        let port = url.port().unwrap_or(DEFAULT_EMULATOR_PORT);

        tracing::debug!(%address, port, "using custom blob endpoint");
        Ok(ClientBuilder::with_location(
            CloudLocation::Emulator { address, port },
            credentials,
        ))
    } else {
        Ok(ClientBuilder::new(account.to_string(), credentials))
    }
}
