//! Page capture: the screenshot and HTML of a listing at one point in time.
//!
//! Driving a headless browser is outside this crate. A [`PageRenderer`] only
//! has to hand back the bytes a browser produced; [`SavedCapture`] reads them
//! from files written by any external tool (Playwright, Chrome
//! `--screenshot`, a browser extension, …).

use crate::error::ArchiveError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

const PNG_MAGIC: &[u8] = b"\x89PNG";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Renderer output for one listing URL.
#[derive(Debug, Clone)]
pub struct RawCapture {
    /// Full-page screenshot, encoded (PNG or JPEG).
    pub bitmap: Vec<u8>,
    /// Serialised DOM after rendering.
    pub html: String,
    /// The URL that was rendered.
    pub source_url: String,
}

/// Produces a [`RawCapture`] for a URL.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RawCapture, ArchiveError>;
}

/// A capture already saved to disk as a screenshot file and an HTML file.
#[derive(Debug, Clone)]
pub struct SavedCapture {
    pub screenshot: PathBuf,
    pub html: PathBuf,
}

impl SavedCapture {
    pub fn new(screenshot: impl Into<PathBuf>, html: impl Into<PathBuf>) -> Self {
        Self {
            screenshot: screenshot.into(),
            html: html.into(),
        }
    }
}

#[async_trait]
impl PageRenderer for SavedCapture {
    async fn render(&self, url: &str) -> Result<RawCapture, ArchiveError> {
        let bitmap = read_capture(&self.screenshot).await?;
        if !looks_like_bitmap(&bitmap) {
            return Err(ArchiveError::Encoding {
                detail: format!(
                    "'{}' is not a PNG or JPEG screenshot",
                    self.screenshot.display()
                ),
            });
        }
        let html_bytes = read_capture(&self.html).await?;
        let html = String::from_utf8_lossy(&html_bytes).into_owned();
        debug!(
            "Loaded capture for {}: {} bitmap bytes, {} HTML bytes",
            url,
            bitmap.len(),
            html.len()
        );
        Ok(RawCapture {
            bitmap,
            html,
            source_url: url.to_string(),
        })
    }
}

async fn read_capture(path: &Path) -> Result<Vec<u8>, ArchiveError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ArchiveError::CaptureNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(ArchiveError::CaptureReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Cheap signature check so a wrong path fails before any decoding.
pub fn looks_like_bitmap(bytes: &[u8]) -> bool {
    bytes.starts_with(PNG_MAGIC) || bytes.starts_with(JPEG_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(bytes: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f
    }

    #[test]
    fn bitmap_signatures() {
        assert!(looks_like_bitmap(b"\x89PNG\r\n\x1a\n"));
        assert!(looks_like_bitmap(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!looks_like_bitmap(b"%PDF-1.4"));
        assert!(!looks_like_bitmap(b""));
    }

    #[tokio::test]
    async fn saved_capture_reads_both_files() {
        let png = temp_with(b"\x89PNG\r\n\x1a\nrest");
        let html = temp_with(b"<h1>Role</h1>");
        let capture = SavedCapture::new(png.path(), html.path());

        let raw = capture.render("https://example.com/job").await.unwrap();
        assert_eq!(raw.html, "<h1>Role</h1>");
        assert_eq!(raw.source_url, "https://example.com/job");
        assert!(raw.bitmap.starts_with(PNG_MAGIC));
    }

    #[tokio::test]
    async fn missing_screenshot_is_capture_not_found() {
        let html = temp_with(b"<p/>");
        let capture = SavedCapture::new("/definitely/not/here.png", html.path());
        let err = capture.render("https://example.com").await.unwrap_err();
        assert!(matches!(err, ArchiveError::CaptureNotFound { .. }));
    }

    #[tokio::test]
    async fn non_image_screenshot_is_rejected() {
        let pdf = temp_with(b"%PDF-1.7");
        let html = temp_with(b"<p/>");
        let err = SavedCapture::new(pdf.path(), html.path())
            .render("https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Encoding { .. }));
    }
}
