//! End-to-end flows: archive one listing, enrich existing records.
//!
//! ## Archive
//!
//! ```text
//! RawCapture ─▶ extract ─▶ confirm ─▶ schema ─▶ name ─▶ compress ─▶ upload? ─▶ create record
//! ```
//!
//! The store schema is read before compressing, so a bad token or database
//! id fails before any file is written. Compression is CPU-bound and runs on
//! the blocking pool. The upload step
//! only happens when uploading is enabled, a files property is configured and
//! that property exists in the store with type `files`; otherwise the record
//! is created without an attachment.
//!
//! ## Enrich
//!
//! Walks every record the store reports as pending and fills in a company
//! description where one is missing. A failed update is counted and the walk
//! continues.

use crate::capture::RawCapture;
use crate::config::ArchiveConfig;
use crate::confirm::{confirm_fields, FieldConfirmer};
use crate::error::ArchiveError;
use crate::extract::{extract, ExtractionResult};
use crate::naming::document_filename;
use crate::pipeline::compress::{compress, BoundedDocument};
use crate::progress::ProgressCallback;
use crate::store::{Attachment, NewRecord, RecordStore};
use crate::summarize::Summarizer;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Pause between description updates.
pub const UPDATE_PAUSE: Duration = Duration::from_millis(300);

const FILES_TYPE: &str = "files";

/// What [`archive`] produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    pub record_id: String,
    /// Final (confirmed) title and company with their sources.
    pub fields: ExtractionResult,
    pub document: BoundedDocument,
    /// Upload id when the document was attached to the record.
    pub attachment: Option<String>,
}

impl ArchiveOutcome {
    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn company(&self) -> &str {
        &self.fields.company
    }
}

/// Archive one captured listing into `store`.
pub async fn archive(
    capture: &RawCapture,
    config: &ArchiveConfig,
    confirmer: &mut dyn FieldConfirmer,
    store: &dyn RecordStore,
    progress: ProgressCallback,
) -> Result<ArchiveOutcome, ArchiveError> {
    let extracted = extract(&capture.html, &capture.source_url);
    info!(
        "Detected title {:?} ({:?}), company {:?} ({:?})",
        extracted.title, extracted.title_source, extracted.company, extracted.company_source
    );
    let fields = confirm_fields(extracted, confirmer);
    let files_property = attachment_property(config, store).await?;

    let today = chrono::Local::now().date_naive();
    let out_path = config
        .output_dir
        .join(document_filename(today, &fields.company, &fields.title));

    let document = compress_blocking(capture.bitmap.clone(), out_path, config, progress).await?;

    let attachment = match files_property {
        Some(property) => {
            let upload_id = store.upload_document(&document.path).await?;
            Some(Attachment {
                property,
                upload_id,
                name: document.file_name(),
            })
        }
        None => None,
    };
    let upload_id = attachment.as_ref().map(|a| a.upload_id.clone());

    let record = NewRecord {
        title: fields.title.clone(),
        company: fields.company.clone(),
        url: capture.source_url.clone(),
        attachment,
    };
    let record_id = store.create_record(&record).await?;
    info!("Created record {}", record_id);

    Ok(ArchiveOutcome {
        record_id,
        fields,
        document,
        attachment: upload_id,
    })
}

/// Run [`compress`] on the blocking pool so the runtime thread stays free.
pub async fn compress_blocking(
    bitmap: Vec<u8>,
    out_path: std::path::PathBuf,
    config: &ArchiveConfig,
    progress: ProgressCallback,
) -> Result<BoundedDocument, ArchiveError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || compress(&bitmap, &out_path, &config, progress.as_ref()))
        .await
        .map_err(|e| ArchiveError::Internal(format!("compression task panicked: {e}")))?
}

/// The files property to attach to, if attaching is possible.
async fn attachment_property(
    config: &ArchiveConfig,
    store: &dyn RecordStore,
) -> Result<Option<String>, ArchiveError> {
    if !config.upload_document {
        info!("Upload disabled; record will have no attachment");
        return Ok(None);
    }
    let Some(property) = config.files_property.as_deref() else {
        return Ok(None);
    };
    match store.files_property_type(property).await?.as_deref() {
        Some(FILES_TYPE) => Ok(Some(property.to_string())),
        found => {
            warn!(
                "Not attaching document: property '{}' is {} in this database",
                property,
                found.map_or("missing".to_string(), |t| format!("of type '{t}'"))
            );
            Ok(None)
        }
    }
}

/// Counters from one [`enrich_descriptions`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichStats {
    pub updated: usize,
    pub skipped_no_company: usize,
    pub skipped_has_description: usize,
    pub skipped_no_summary: usize,
    pub failed: usize,
}

impl EnrichStats {
    pub fn inspected(&self) -> usize {
        self.updated
            + self.skipped_no_company
            + self.skipped_has_description
            + self.skipped_no_summary
            + self.failed
    }
}

/// Fill in missing company descriptions across the store.
///
/// Only listing the pending records is fatal; per-record failures are
/// counted in the returned stats.
pub async fn enrich_descriptions(
    store: &dyn RecordStore,
    summarizer: &dyn Summarizer,
) -> Result<EnrichStats, ArchiveError> {
    let records = store.pending_descriptions().await?;
    info!("{} records to inspect", records.len());
    let mut stats = EnrichStats::default();

    for (idx, record) in records.iter().enumerate() {
        let company = record.company.trim();
        if company.is_empty() {
            stats.skipped_no_company += 1;
            continue;
        }
        if record.has_description {
            stats.skipped_has_description += 1;
            continue;
        }

        let Some(description) = summarizer.summarize(company).await else {
            warn!("[{}/{}] No description for {}", idx + 1, records.len(), company);
            stats.skipped_no_summary += 1;
            continue;
        };

        match store.set_description(&record.id, &description).await {
            Ok(()) => {
                info!("[{}/{}] Described {}", idx + 1, records.len(), company);
                stats.updated += 1;
                tokio::time::sleep(UPDATE_PAUSE).await;
            }
            Err(e) => {
                warn!("[{}/{}] Update of {} failed: {}", idx + 1, records.len(), record.id, e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}
