//! Configuration types for archiving a job listing.
//!
//! Every knob lives in an explicit value that the caller builds once and
//! passes into each component. Nothing below reads the environment; the
//! binary maps environment variables onto these types through clap, so tests
//! can inject any budget they like.
//!
//! [`ArchiveConfig`] is built through [`ArchiveConfigBuilder`], mirroring the
//! builder used for every other multi-field config in this crate.

use crate::error::ArchiveError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Size constraint for the produced document.
///
/// The compressor starts at full scale and multiplies the scale by
/// `scale_step` after every attempt that exceeds `max_bytes`. It stops at the
/// first attempt that fits, at the first attempt whose scale is at or below
/// `min_scale`, or after `max_attempts` attempts, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionBudget {
    /// Maximum acceptable document size in bytes. Default: 5 MiB.
    pub max_bytes: u64,

    /// Width floor in pixels. Downscaling never goes below this width
    /// (or below the original width, whichever is smaller). Default: 800.
    pub min_width_pixels: u32,

    /// Upper bound on encode attempts. Default: 7.
    pub max_attempts: u32,

    /// Factor applied to the scale after an oversized attempt. Default: 0.8.
    pub scale_step: f64,

    /// Scale at or below which an attempt is accepted even when oversized.
    /// Default: 0.4.
    pub min_scale: f64,
}

impl Default for CompressionBudget {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            min_width_pixels: 800,
            max_attempts: 7,
            scale_step: 0.8,
            min_scale: 0.4,
        }
    }
}

impl CompressionBudget {
    /// Budget with `max_bytes` expressed in (binary) megabytes.
    pub fn from_megabytes(mb: f64) -> Self {
        Self {
            max_bytes: (mb.max(0.0) * BYTES_PER_MB) as u64,
            ..Self::default()
        }
    }

    /// Budget ceiling in megabytes, for display.
    pub fn max_megabytes(&self) -> f64 {
        self.max_bytes as f64 / BYTES_PER_MB
    }

    pub(crate) fn validate(&self) -> Result<(), ArchiveError> {
        if self.max_bytes == 0 {
            return Err(ArchiveError::InvalidConfig(
                "max_bytes must be ≥ 1".into(),
            ));
        }
        if self.min_width_pixels == 0 {
            return Err(ArchiveError::InvalidConfig(
                "min_width_pixels must be ≥ 1".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ArchiveError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        if !(self.scale_step > 0.0 && self.scale_step < 1.0) {
            return Err(ArchiveError::InvalidConfig(format!(
                "scale_step must be in (0, 1), got {}",
                self.scale_step
            )));
        }
        if !(self.min_scale > 0.0 && self.min_scale <= 1.0) {
            return Err(ArchiveError::InvalidConfig(format!(
                "min_scale must be in (0, 1], got {}",
                self.min_scale
            )));
        }
        Ok(())
    }
}

/// Configuration for one archive run.
///
/// # Example
/// ```rust
/// use jobsnap::{ArchiveConfig, CompressionBudget};
///
/// let config = ArchiveConfig::builder()
///     .budget(CompressionBudget::from_megabytes(2.0))
///     .jpeg_quality(80)
///     .upload_document(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.budget.max_bytes, 2 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Size constraint for the produced document.
    pub budget: CompressionBudget,

    /// Quality of the lossy intermediate encoding (1–100). Default: 85.
    pub jpeg_quality: u8,

    /// Resolution tag written into the document. Only affects the reported
    /// physical page size, never pixel content. Default: 72.
    pub document_dpi: u32,

    /// Name of the files-type property the document is attached to.
    /// `None` disables attachment. Default: `Some("Description")`.
    pub files_property: Option<String>,

    /// Upload the document to the record store. Default: true.
    pub upload_document: bool,

    /// Directory the document is written to. Default: current directory.
    pub output_dir: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            budget: CompressionBudget::default(),
            jpeg_quality: 85,
            document_dpi: 72,
            files_property: Some("Description".to_string()),
            upload_document: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ArchiveConfig {
    /// Create a new builder for `ArchiveConfig`.
    pub fn builder() -> ArchiveConfigBuilder {
        ArchiveConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ArchiveConfig`].
#[derive(Debug)]
pub struct ArchiveConfigBuilder {
    config: ArchiveConfig,
}

impl ArchiveConfigBuilder {
    pub fn budget(mut self, budget: CompressionBudget) -> Self {
        self.config.budget = budget;
        self
    }

    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.config.budget.max_bytes = bytes;
        self
    }

    pub fn min_width_pixels(mut self, px: u32) -> Self {
        self.config.budget.min_width_pixels = px.max(1);
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.budget.max_attempts = n.max(1);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn document_dpi(mut self, dpi: u32) -> Self {
        self.config.document_dpi = dpi.max(1);
        self
    }

    pub fn files_property(mut self, name: Option<String>) -> Self {
        self.config.files_property = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn upload_document(mut self, v: bool) -> Self {
        self.config.upload_document = v;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ArchiveConfig, ArchiveError> {
        self.config.budget.validate()?;
        if self.config.jpeg_quality == 0 || self.config.jpeg_quality > 100 {
            return Err(ArchiveError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                self.config.jpeg_quality
            )));
        }
        Ok(self.config)
    }
}

/// Connection settings for the Notion record store.
#[derive(Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    pub token: String,
    pub database_id: String,
    /// `Notion-Version` header. Default: "2022-06-28".
    pub api_version: String,
    /// API root, overridable for tests. Default: "https://api.notion.com/v1".
    pub base_url: String,
}

impl NotionConfig {
    pub fn new(token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            database_id: database_id.into(),
            api_version: "2022-06-28".to_string(),
            base_url: "https://api.notion.com/v1".to_string(),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ArchiveError> {
        if self.token.trim().is_empty() || self.database_id.trim().is_empty() {
            return Err(ArchiveError::InvalidConfig(
                "Notion token and database id must both be set".into(),
            ));
        }
        Ok(())
    }
}

// The token never reaches logs.
impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &"<redacted>")
            .field("database_id", &self.database_id)
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Settings for the company-description summariser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// LLM provider name (e.g. "openai", "groq"). `None` auto-detects.
    pub provider_name: Option<String>,
    /// Model identifier. `None` uses the provider default.
    pub model: Option<String>,
    /// Longest description kept, in characters. Default: 400.
    pub max_chars: usize,
    /// Sampling temperature. Default: 0.3.
    pub temperature: f32,
    /// Completion token cap. Default: 256.
    pub max_tokens: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            provider_name: None,
            model: None,
            max_chars: 400,
            temperature: 0.3,
            max_tokens: 256,
        }
    }
}
