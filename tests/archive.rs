//! Archive and enrich flows against in-memory collaborators.

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use jobsnap::confirm::FieldConfirmer;
use jobsnap::{
    archive, compress_blocking, enrich_descriptions, AcceptExtracted, ArchiveConfig, ArchiveError, CompanySource,
    NewRecord, NoopProgress, RawCapture, RecordStore, RecordSummary, Summarizer,
};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

// ── Fakes ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryStore {
    schema: HashMap<String, String>,
    uploads: Mutex<Vec<String>>,
    records: Mutex<Vec<NewRecord>>,
    pending: Vec<RecordSummary>,
    descriptions: Mutex<HashMap<String, String>>,
    failing_ids: Vec<String>,
    schema_unreachable: bool,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn files_property_type(&self, name: &str) -> Result<Option<String>, ArchiveError> {
        if self.schema_unreachable {
            return Err(ArchiveError::RecordStore {
                operation: "read database".into(),
                status: 401,
                body: "unauthorized".into(),
            });
        }
        Ok(self.schema.get(name).cloned())
    }

    async fn upload_document(&self, path: &Path) -> Result<String, ArchiveError> {
        assert!(path.exists(), "upload of missing file {}", path.display());
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(path.display().to_string());
        Ok(format!("up-{}", uploads.len()))
    }

    async fn create_record(&self, record: &NewRecord) -> Result<String, ArchiveError> {
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(format!("page-{}", records.len()))
    }

    async fn pending_descriptions(&self) -> Result<Vec<RecordSummary>, ArchiveError> {
        Ok(self.pending.clone())
    }

    async fn set_description(&self, record_id: &str, text: &str) -> Result<(), ArchiveError> {
        if self.failing_ids.iter().any(|id| id == record_id) {
            return Err(ArchiveError::RecordStore {
                operation: "update page".into(),
                status: 409,
                body: "conflict".into(),
            });
        }
        self.descriptions
            .lock()
            .unwrap()
            .insert(record_id.to_string(), text.to_string());
        Ok(())
    }
}

struct FixedSummarizer;

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(&self, company: &str) -> Option<String> {
        (company != "Mystery").then(|| format!("{company} makes things."))
    }
}

struct Scripted(Vec<&'static str>);

impl FieldConfirmer for Scripted {
    fn confirm(&mut self, _label: &str, current: &str) -> String {
        let next = self.0.remove(0);
        if next.is_empty() {
            current.to_string()
        } else {
            next.to_string()
        }
    }
}

fn capture(html: &str, url: &str) -> RawCapture {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(320, 240, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).unwrap();
    RawCapture {
        bitmap: png.into_inner(),
        html: html.to_string(),
        source_url: url.to_string(),
    }
}

fn files_schema() -> HashMap<String, String> {
    HashMap::from([("Description".to_string(), "files".to_string())])
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

// ── archive ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn archive_uploads_and_attaches() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore {
        schema: files_schema(),
        ..Default::default()
    };
    let config = ArchiveConfig::builder().output_dir(dir.path()).build().unwrap();
    let cap = capture(
        "<head><title>Senior Engineer - Acme | Acme Careers</title></head>",
        "https://jobs.acme.com/42",
    );

    let outcome = archive(&cap, &config, &mut AcceptExtracted, &store, Arc::new(NoopProgress))
        .await
        .unwrap();

    assert_eq!(outcome.record_id, "page-1");
    assert_eq!(outcome.title(), "Senior Engineer");
    assert_eq!(outcome.company(), "Acme");
    assert_eq!(outcome.attachment.as_deref(), Some("up-1"));

    let expected_name = format!("{}-Acme-Senior_Engineer.pdf", today());
    assert_eq!(outcome.document.file_name(), expected_name);
    assert!(outcome.document.path.starts_with(dir.path()));
    assert!(outcome.document.within_budget());

    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "https://jobs.acme.com/42");
    let att = records[0].attachment.as_ref().unwrap();
    assert_eq!(att.property, "Description");
    assert_eq!(att.upload_id, "up-1");
    assert_eq!(att.name, expected_name);
}

#[tokio::test]
async fn archive_without_files_property_skips_upload() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore {
        schema: HashMap::from([("Description".to_string(), "rich_text".to_string())]),
        ..Default::default()
    };
    let config = ArchiveConfig::builder().output_dir(dir.path()).build().unwrap();
    let cap = capture("<h1>Chef</h1>", "https://bistro.example/jobs");

    let outcome = archive(&cap, &config, &mut AcceptExtracted, &store, Arc::new(NoopProgress))
        .await
        .unwrap();

    assert!(outcome.attachment.is_none());
    assert!(store.uploads.lock().unwrap().is_empty());
    assert!(store.records.lock().unwrap()[0].attachment.is_none());
    assert!(outcome.document.path.exists());
}

#[tokio::test]
async fn archive_with_upload_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore {
        schema: files_schema(),
        ..Default::default()
    };
    let config = ArchiveConfig::builder()
        .output_dir(dir.path())
        .upload_document(false)
        .build()
        .unwrap();
    let cap = capture("<h1>Chef</h1>", "https://bistro.example/jobs");

    let outcome = archive(&cap, &config, &mut AcceptExtracted, &store, Arc::new(NoopProgress))
        .await
        .unwrap();
    assert!(outcome.attachment.is_none());
    assert!(store.uploads.lock().unwrap().is_empty());
    assert_eq!(store.records.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn manual_override_reaches_record_and_filename() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::default();
    let config = ArchiveConfig::builder()
        .output_dir(dir.path())
        .upload_document(false)
        .build()
        .unwrap();
    let cap = capture("<h1>Welder</h1>", "https://www.initech.com/careers");
    let mut confirmer = Scripted(vec!["", "Initech / Global"]);

    let outcome = archive(&cap, &config, &mut confirmer, &store, Arc::new(NoopProgress))
        .await
        .unwrap();

    assert_eq!(outcome.company(), "Initech / Global");
    assert_eq!(outcome.fields.company_source, CompanySource::Manual);
    assert_eq!(
        outcome.document.file_name(),
        format!("{}-Initech__Global-Welder.pdf", today())
    );
    assert_eq!(store.records.lock().unwrap()[0].company, "Initech / Global");
}

#[tokio::test]
async fn undecodable_capture_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::default();
    let config = ArchiveConfig::builder().output_dir(dir.path()).build().unwrap();
    let mut cap = capture("<h1>x</h1>", "https://example.com");
    cap.bitmap = b"\x89PNG but truncated".to_vec();

    let err = archive(&cap, &config, &mut AcceptExtracted, &store, Arc::new(NoopProgress))
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Encoding { .. }));
    assert!(store.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn schema_failure_stops_before_compression() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore {
        schema_unreachable: true,
        ..Default::default()
    };
    let config = ArchiveConfig::builder().output_dir(dir.path()).build().unwrap();
    let cap = capture("<h1>Chef</h1>", "https://bistro.example/jobs");

    let err = archive(&cap, &config, &mut AcceptExtracted, &store, Arc::new(NoopProgress))
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiveError::RecordStore { status: 401, .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(store.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn compress_blocking_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dry.pdf");
    let config = ArchiveConfig::default();
    let cap = capture("", "");

    let doc = compress_blocking(cap.bitmap, out.clone(), &config, Arc::new(NoopProgress))
        .await
        .unwrap();
    assert_eq!(doc.path, out);
    assert!(out.exists());
    assert_eq!(doc.width, 800);
}

// ── enrich_descriptions ──────────────────────────────────────────────────────

fn summary(id: &str, company: &str, has_description: bool) -> RecordSummary {
    RecordSummary {
        id: id.into(),
        name: format!("Role {id}"),
        company: company.into(),
        has_description,
    }
}

#[tokio::test]
async fn enrich_counts_every_outcome() {
    let store = MemoryStore {
        pending: vec![
            summary("a", "Acme", false),
            summary("b", "", false),
            summary("c", "Globex", true),
            summary("d", "Mystery", false),
            summary("e", "Initech", false),
        ],
        failing_ids: vec!["e".into()],
        ..Default::default()
    };

    let stats = enrich_descriptions(&store, &FixedSummarizer).await.unwrap();

    assert_eq!(stats.updated, 1);
    assert_eq!(stats.skipped_no_company, 1);
    assert_eq!(stats.skipped_has_description, 1);
    assert_eq!(stats.skipped_no_summary, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.inspected(), 5);

    let descriptions = store.descriptions.lock().unwrap();
    assert_eq!(descriptions.get("a").map(String::as_str), Some("Acme makes things."));
    assert!(!descriptions.contains_key("c"));
}

#[tokio::test]
async fn enrich_with_nothing_pending() {
    let store = MemoryStore::default();
    let stats = enrich_descriptions(&store, &FixedSummarizer).await.unwrap();
    assert_eq!(stats.inspected(), 0);
}
