//! # jobsnap
//!
//! Archive job listings: a screenshot of the listing becomes a size-bounded
//! single-page PDF, the title and company are guessed from the page HTML, and
//! both land as one record in a Notion database.
//!
//! ## Why this crate?
//!
//! Listings disappear once a position is filled. Keeping a faithful visual
//! copy next to the application record means the posting can still be read
//! before an interview, months later. Full-page screenshots are large, so the
//! compressor walks the image scale down until the PDF fits the store's
//! upload limit. The extractor works on arbitrary career sites by trying
//! structured data first and falling back through progressively weaker page
//! signals.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL
//!  │
//!  ├─ 1. Capture   screenshot + HTML from an external renderer
//!  ├─ 2. Extract   title / company cascade over the HTML
//!  ├─ 3. Confirm   optional human override of both fields
//!  ├─ 4. Compress  PNG → JPEG → 1-page PDF, shrinking until under budget
//!  ├─ 5. Upload    direct upload to the record store (optional)
//!  └─ 6. Record    create the database entry
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobsnap::{archive, AcceptExtracted, ArchiveConfig, NoopProgress, NotionConfig,
//!               NotionStore, PageRenderer, SavedCapture};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let capture = SavedCapture::new("listing.png", "listing.html")
//!         .render("https://example.com/jobs/42")
//!         .await?;
//!     let store = NotionStore::new(NotionConfig::new("secret_…", "database-id"))?;
//!     let config = ArchiveConfig::default();
//!     let outcome = archive(&capture, &config, &mut AcceptExtracted, &store,
//!                           Arc::new(NoopProgress)).await?;
//!     println!("{} at {} → {}", outcome.title(), outcome.company(), outcome.record_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `jobsnap` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! jobsnap = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod capture;
pub mod config;
pub mod confirm;
pub mod error;
pub mod extract;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod store;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use archive::{archive, compress_blocking, enrich_descriptions, ArchiveOutcome, EnrichStats};
pub use capture::{PageRenderer, RawCapture, SavedCapture};
pub use config::{ArchiveConfig, ArchiveConfigBuilder, CompressionBudget, NotionConfig, SummaryConfig};
pub use confirm::{AcceptExtracted, FieldConfirmer, StdinConfirmer};
pub use error::ArchiveError;
pub use extract::{extract, CompanySource, ExtractionResult, TitleSource};
pub use naming::{document_filename, sanitize_for_filename};
pub use pipeline::compress::{compress, compress_file, BoundedDocument, BudgetOutcome};
pub use progress::{CompressionProgress, NoopProgress, ProgressCallback};
pub use store::{NewRecord, NotionStore, RecordStore, RecordSummary};
pub use summarize::{LlmSummarizer, Summarizer};
