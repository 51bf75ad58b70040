//! Size-bounded document compression.
//!
//! ## Search strategy
//!
//! A plain geometric walk, not a binary search: start at full scale, shrink
//! by `scale_step` after each oversized attempt, stop at the first attempt
//! that fits. Screenshots rarely need more than two or three attempts and the
//! walk keeps every attempt's size predictable from its scale.
//!
//! An attempt is accepted when its document fits `max_bytes`, or when its
//! scale is already at or below `min_scale` (further shrinking makes text
//! unreadable). When `max_attempts` runs out first, the last attempt is
//! accepted anyway. The two relaxed cases are reported through
//! [`BudgetOutcome`] rather than silently passed off as success.
//!
//! ## Stages
//!
//! Each attempt composes three pure steps behind [`AttemptEncoder`]:
//! [`resize::resample`] → [`encode::encode_jpeg`] → [`document::wrap_jpeg`].
//! The loop itself only sees `(width, height) → bytes`, so its behaviour can
//! be tested with an encoder whose output size is a plain function of the
//! dimensions.
//!
//! ## Scratch files
//!
//! Attempts live in memory and each one is dropped before the next is
//! produced. Only the accepted attempt touches disk, through a
//! [`tempfile::NamedTempFile`] in the destination directory that is persisted
//! over the final path. Any error before the rename drops (and deletes) the
//! scratch file.

use crate::config::{ArchiveConfig, CompressionBudget};
use crate::error::ArchiveError;
use crate::pipeline::{document, encode, resize};
use crate::progress::CompressionProgress;
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Produces one candidate document at the requested pixel size.
pub trait AttemptEncoder {
    fn encode(&self, width: u32, height: u32) -> Result<Vec<u8>, ArchiveError>;
}

/// The real encoder: Lanczos resample, JPEG, single-page PDF.
pub struct PdfAttemptEncoder {
    source: RgbImage,
    jpeg_quality: u8,
    dpi: u32,
}

impl PdfAttemptEncoder {
    /// Flattens any alpha channel once, up front, so every attempt starts
    /// from the same opaque pixels.
    pub fn new(img: &DynamicImage, jpeg_quality: u8, dpi: u32) -> Self {
        Self {
            source: resize::flatten(img),
            jpeg_quality,
            dpi,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }
}

impl AttemptEncoder for PdfAttemptEncoder {
    fn encode(&self, width: u32, height: u32) -> Result<Vec<u8>, ArchiveError> {
        let resampled = resize::resample(&self.source, width, height);
        let jpeg = encode::encode_jpeg(&resampled, self.jpeg_quality)?;
        drop(resampled);
        document::wrap_jpeg(&jpeg, width, height, self.dpi)
    }
}

/// How the accepted attempt relates to the byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetOutcome {
    /// The document fits `max_bytes`.
    Met,
    /// Still oversized, but the scale reached `min_scale`; shrinking stopped.
    FloorReached,
    /// Still oversized after `max_attempts`; the last attempt was kept.
    AttemptsExhausted,
}

/// One step of the search, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-indexed attempt number.
    pub number: u32,
    pub scale: f64,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
}

/// Encoded bytes chosen by [`search`], not yet written anywhere.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub bytes: Vec<u8>,
    pub attempts: Vec<Attempt>,
    pub outcome: BudgetOutcome,
}

impl SearchResult {
    /// The attempt whose bytes were accepted.
    pub fn accepted(&self) -> Option<&Attempt> {
        self.attempts.last()
    }
}

/// The document produced by the compressor.
///
/// `size_bytes <= budget.max_bytes` holds only when `outcome` is
/// [`BudgetOutcome::Met`]; otherwise the size is advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundedDocument {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub outcome: BudgetOutcome,
    pub attempts: Vec<Attempt>,
}

impl BoundedDocument {
    pub fn within_budget(&self) -> bool {
        self.outcome == BudgetOutcome::Met
    }

    pub fn size_megabytes(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }

    /// File name component of `path`, for display and upload.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Walk the scale down until an attempt is accepted.
///
/// `width` and `height` are the original bitmap dimensions. Terminates after
/// at most `budget.max_attempts` calls to `encoder`.
pub fn search<E: AttemptEncoder + ?Sized>(
    width: u32,
    height: u32,
    budget: &CompressionBudget,
    encoder: &E,
    progress: &dyn CompressionProgress,
) -> Result<SearchResult, ArchiveError> {
    let mut scale = 1.0_f64;
    let mut attempts = Vec::with_capacity(budget.max_attempts as usize);
    let mut last: Option<Vec<u8>> = None;

    for number in 1..=budget.max_attempts {
        let (w, h) = resize::target_dimensions(width, height, scale, budget.min_width_pixels);
        progress.on_attempt(number, w, h);

        // Release the previous attempt before producing the next one.
        drop(last.take());
        let bytes = encoder.encode(w, h)?;
        let size = bytes.len() as u64;
        progress.on_attempt_complete(number, size);
        debug!(
            "Attempt {}: scale {:.3} → {}x{} → {} bytes (budget {})",
            number, scale, w, h, size, budget.max_bytes
        );

        attempts.push(Attempt {
            number,
            scale,
            width: w,
            height: h,
            bytes: size,
        });

        let fits = size <= budget.max_bytes;
        if fits || scale <= budget.min_scale {
            let outcome = if fits {
                BudgetOutcome::Met
            } else {
                BudgetOutcome::FloorReached
            };
            return Ok(SearchResult {
                bytes,
                attempts,
                outcome,
            });
        }

        last = Some(bytes);
        scale *= budget.scale_step;
    }

    let bytes = last.ok_or_else(|| ArchiveError::InvalidConfig("max_attempts must be ≥ 1".into()))?;
    Ok(SearchResult {
        bytes,
        attempts,
        outcome: BudgetOutcome::AttemptsExhausted,
    })
}

/// Compress a decoded bitmap into a size-bounded document at `out_path`.
pub fn compress_image(
    img: &DynamicImage,
    out_path: &Path,
    config: &ArchiveConfig,
    progress: &dyn CompressionProgress,
) -> Result<BoundedDocument, ArchiveError> {
    config.budget.validate()?;
    let encoder = PdfAttemptEncoder::new(img, config.jpeg_quality, config.document_dpi);
    let (width, height) = encoder.dimensions();
    if width == 0 || height == 0 {
        return Err(ArchiveError::Encoding {
            detail: format!("bitmap has no pixels ({width}x{height})"),
        });
    }

    let result = search(width, height, &config.budget, &encoder, progress)?;
    drop(encoder);

    let accepted = result
        .accepted()
        .cloned()
        .ok_or_else(|| ArchiveError::Internal("search returned no attempts".into()))?;
    write_atomically(out_path, &result.bytes)?;

    let doc = BoundedDocument {
        path: out_path.to_path_buf(),
        size_bytes: result.bytes.len() as u64,
        width: accepted.width,
        height: accepted.height,
        scale: accepted.scale,
        outcome: result.outcome,
        attempts: result.attempts,
    };

    match doc.outcome {
        BudgetOutcome::Met => info!(
            "Document {} → {} bytes ({}x{}, {} attempts)",
            doc.path.display(),
            doc.size_bytes,
            doc.width,
            doc.height,
            doc.attempts.len()
        ),
        outcome => warn!(
            "Document {} is {} bytes, over the {} byte budget ({:?})",
            doc.path.display(),
            doc.size_bytes,
            config.budget.max_bytes,
            outcome
        ),
    }
    progress.on_accepted(&doc);
    Ok(doc)
}

/// Decode encoded bitmap bytes (PNG, JPEG) and compress them.
pub fn compress(
    bitmap: &[u8],
    out_path: &Path,
    config: &ArchiveConfig,
    progress: &dyn CompressionProgress,
) -> Result<BoundedDocument, ArchiveError> {
    let img = image::load_from_memory(bitmap)?;
    compress_image(&img, out_path, config, progress)
}

/// Read a screenshot from disk and compress it.
pub fn compress_file(
    bitmap_path: &Path,
    out_path: &Path,
    config: &ArchiveConfig,
    progress: &dyn CompressionProgress,
) -> Result<BoundedDocument, ArchiveError> {
    if !bitmap_path.exists() {
        return Err(ArchiveError::CaptureNotFound {
            path: bitmap_path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(bitmap_path).map_err(|e| ArchiveError::CaptureReadFailed {
        path: bitmap_path.to_path_buf(),
        source: e,
    })?;
    compress(&bytes, out_path, config, progress)
}

/// Write `bytes` to `path` via a scratch file in the same directory.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ArchiveError> {
    let write_err = |e: std::io::Error| ArchiveError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut scratch = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    scratch.write_all(bytes).map_err(write_err)?;
    scratch.flush().map_err(write_err)?;
    scratch.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
