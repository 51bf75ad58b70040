//! Record store abstraction: where archived listings end up.
//!
//! The archive flow only talks to [`RecordStore`]; [`notion::NotionStore`] is
//! the shipped implementation. Tests substitute an in-memory store.

pub mod notion;

use crate::error::ArchiveError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use notion::NotionStore;

/// A document already uploaded, to be attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Files-type property that receives the document.
    pub property: String,
    /// Identifier returned by [`RecordStore::upload_document`].
    pub upload_id: String,
    /// Display name shown in the store.
    pub name: String,
}

/// Fields of a new listing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub title: String,
    pub company: String,
    pub url: String,
    pub attachment: Option<Attachment>,
}

/// Existing record as seen by description enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: String,
    pub name: String,
    /// Empty when the record has no company.
    pub company: String,
    pub has_description: bool,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Type of the named property in the store's schema, `None` if absent.
    async fn files_property_type(&self, name: &str) -> Result<Option<String>, ArchiveError>;

    /// Upload a document and return its upload id.
    async fn upload_document(&self, path: &Path) -> Result<String, ArchiveError>;

    /// Create a record and return its id.
    async fn create_record(&self, record: &NewRecord) -> Result<String, ArchiveError>;

    /// Records eligible for a company description.
    async fn pending_descriptions(&self) -> Result<Vec<RecordSummary>, ArchiveError>;

    async fn set_description(&self, record_id: &str, text: &str) -> Result<(), ArchiveError>;
}
