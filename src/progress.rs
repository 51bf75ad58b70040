//! Progress-callback trait for compression attempts.
//!
//! Inject an [`Arc<dyn CompressionProgress>`] into
//! [`crate::pipeline::compress::compress_image`] (or the archive entry points)
//! to observe each attempt as the compressor searches for a scale that fits
//! the byte budget.
//!
//! # Example
//!
//! ```rust
//! use jobsnap::CompressionProgress;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct LastSize(AtomicU64);
//!
//! impl CompressionProgress for LastSize {
//!     fn on_attempt_complete(&self, _attempt: u32, bytes: u64) {
//!         self.0.store(bytes, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::pipeline::compress::BoundedDocument;
use std::sync::Arc;

/// Called by the compressor as it works through its attempts.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Attempts are strictly sequential; no two callbacks
/// run concurrently for the same compression.
pub trait CompressionProgress: Send + Sync {
    /// Called before an attempt is resampled and encoded.
    ///
    /// # Arguments
    /// * `attempt`: 1-indexed attempt number
    /// * `width`, `height`: target pixel dimensions for this attempt
    fn on_attempt(&self, attempt: u32, width: u32, height: u32) {
        let _ = (attempt, width, height);
    }

    /// Called once the attempt's document size is known.
    fn on_attempt_complete(&self, attempt: u32, bytes: u64) {
        let _ = (attempt, bytes);
    }

    /// Called once the accepted document has been written.
    fn on_accepted(&self, document: &BoundedDocument) {
        let _ = document;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl CompressionProgress for NoopProgress {}

/// Convenience alias for a shared progress callback.
pub type ProgressCallback = Arc<dyn CompressionProgress>;
