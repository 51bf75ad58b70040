//! Lossy intermediate encoding: `RgbImage` → JPEG bytes.
//!
//! The final container compresses rendered pages poorly (Flate on raw pixels
//! barely halves a screenshot), so the real size reduction happens here.
//! The JPEG bytes are embedded verbatim in the document as a `DCTDecode`
//! stream, which means no second decode/encode cycle and no extra loss.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::debug;

/// Encode an opaque image as baseline JPEG at `quality` (1–100).
///
/// Encoding is deterministic: the same pixels and quality always yield the
/// same bytes, which keeps repeated compressions of one capture identical.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder.encode_image(img)?;

    debug!(
        "Encoded {}x{} → {} bytes JPEG (q={})",
        img.width(),
        img.height(),
        buf.len(),
        quality
    );
    Ok(buf)
}
