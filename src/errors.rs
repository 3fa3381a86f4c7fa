//! Error types for simple-az-blob
//!
//! Provides structured error handling using thiserror for all error cases
//! encountered by the facade: connection resolution, container provisioning,
//! blob transfer, listing, and the JSON codec.
//!
//! This layer performs no recovery: every transport failure is logged with
//! its container/blob context and returned to the caller unchanged.

use azure_core::error::ErrorKind;
use azure_core::StatusCode;
use thiserror::Error;

/// Main error type for blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    /// No connection string could be resolved for the account
    #[error("no connection string configured for account '{account}'")]
    ConnectionResolution { account: String },

    /// Connection string was present but could not be parsed
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error (configuration file access)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The "create container if not exists" round trip failed
    #[error("container '{container}' unavailable: {source}")]
    RemoteUnavailable {
        container: String,
        #[source]
        source: azure_core::Error,
    },

    /// Blob upload failed
    #[error("failed to upload blob '{path}': {source}")]
    Upload {
        path: String,
        #[source]
        source: azure_core::Error,
    },

    /// Blob download failed for a reason other than a missing key
    #[error("failed to download blob '{path}': {source}")]
    Download {
        path: String,
        #[source]
        source: azure_core::Error,
    },

    /// Requested blob does not exist
    #[error("blob not found: '{path}'")]
    NotFound { path: String },

    /// Listing failed
    #[error("failed to list '{container}/{prefix}': {source}")]
    List {
        container: String,
        prefix: String,
        #[source]
        source: azure_core::Error,
    },

    /// Blob deletion failed (deleting a missing blob is not an error)
    #[error("failed to delete blob '{path}': {source}")]
    Delete {
        path: String,
        #[source]
        source: azure_core::Error,
    },

    /// JSON encoding of an object failed
    #[error("failed to serialize object for blob '{path}': {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON decoding of a downloaded blob failed
    #[error("failed to deserialize blob '{path}': {source}")]
    Deserialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BlobError>;

/// Whether a transport error is the remote reporting a missing blob.
///
/// The SDK surfaces missing keys as an HTTP 404 response; everything else
/// (auth failures, throttling, network errors) is a genuine failure.
pub(crate) fn is_not_found(err: &azure_core::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::HttpResponse {
            status: StatusCode::NotFound,
            ..
        }
    )
}
