//! Error types for the jobsnap library.
//!
//! Only one error type exists because only one kind of failure is fatal:
//!
//! * [`ArchiveError`]: the capture cannot be turned into a record at all
//!   (unreadable screenshot, unwritable output, record store refusing the
//!   request).
//!
//! Two other conditions are *not* errors:
//!
//! * Extraction never fails. Every cascade step has a fallback and the last
//!   one is derived from the URL host alone.
//! * Missing the byte budget is a soft outcome reported through
//!   [`crate::pipeline::compress::BudgetOutcome`] on the returned document,
//!   so the caller can surface the advisory size without aborting.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the jobsnap library.
#[derive(Debug, Error)]
pub enum ArchiveError {
    // ── Capture errors ────────────────────────────────────────────────────
    /// Saved renderer output was not found at the given path.
    #[error("Capture file not found: '{path}'\nRun the renderer first or check the path.")]
    CaptureNotFound { path: PathBuf },

    /// Saved renderer output exists but could not be read.
    #[error("Failed to read capture file '{path}': {source}")]
    CaptureReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Compression errors ────────────────────────────────────────────────
    /// The screenshot bytes are not a decodable image.
    #[error("Screenshot could not be decoded: {detail}")]
    Encoding { detail: String },

    /// Could not create or write the output document.
    #[error("Failed to write document '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Record store errors ───────────────────────────────────────────────
    /// The record store answered with a non-success status.
    #[error("Record store rejected {operation}: HTTP {status}\n{body}")]
    RecordStore {
        operation: String,
        status: u16,
        body: String,
    },

    /// The record store could not be reached at all.
    #[error("Record store unavailable: {detail}")]
    RecordStoreUnavailable { detail: String },

    // ── Summariser errors ─────────────────────────────────────────────────
    /// The configured LLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<image::ImageError> for ArchiveError {
    fn from(e: image::ImageError) -> Self {
        ArchiveError::Encoding {
            detail: e.to_string(),
        }
    }
}
