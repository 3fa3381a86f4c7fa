//! simple-az-blob: a convenience facade over Azure Blob Storage
//!
//! Exposes save/get/list/delete operations for named blobs (raw byte
//! payloads or JSON-serialized objects) inside named containers, with
//! per-account connection configuration and lazy, cached container clients.
//! All heavy lifting (auth, retries, chunking, pagination) belongs to the
//! Azure SDK crates; this layer adapts results and adds structured logging.
//!
//! # Example
//!
//! ```no_run
//! use simple_az_blob::SimpleAzBlobClient;
//!
//! #[derive(serde::Serialize, serde::Deserialize)]
//! struct Note {
//!     text: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> simple_az_blob::Result<()> {
//!     let conn = std::env::var("AZURE_STORAGE_CONNECTION_STRING").unwrap();
//!     let client = SimpleAzBlobClient::with_connection_string("MyAccount", conn);
//!
//!     client
//!         .save_object("notes", "daily/today.json", &Note { text: "hi".into() })
//!         .await?;
//!     let note: Note = client.get_object("notes", "daily/today.json").await?;
//!     println!("{}", note.text);
//!
//!     client.delete_blob("notes", "daily/today.json").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod manager;

// Re-exports for convenience
pub use client::SimpleAzBlobClient;
pub use config::{AccountConfig, StorageConfig, FALLBACK_CONNECTION_VAR};
pub use errors::{BlobError, Result};
pub use manager::ContainerManager;
