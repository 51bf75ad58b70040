//! Pipeline stages for turning a screenshot into a size-bounded document.
//!
//! Each submodule implements exactly one transformation step, so every step
//! can be tested against fixed inputs on its own.
//!
//! ## Data Flow
//!
//! ```text
//! bitmap ──▶ resize ──▶ encode ──▶ document ──▶ compress
//! (PNG)      (Lanczos)  (JPEG q85) (1-page PDF)  (size search)
//! ```
//!
//! 1. [`resize`]: target geometry, alpha flattening, resampling
//! 2. [`encode`]: lossy JPEG intermediate, where the size reduction happens
//! 3. [`document`]: wrap the JPEG into a single-page PDF at a fixed DPI tag
//! 4. [`compress`]: the attempt loop that walks the scale down until the
//!    document fits the byte budget

pub mod compress;
pub mod document;
pub mod encode;
pub mod resize;
