//! Geometry and resampling for one compression attempt.
//!
//! Screenshots are mostly rendered text, so resampling uses Lanczos3: cheaper
//! filters (nearest, bilinear) alias thin glyph strokes into visible jaggies
//! once the scale drops below ~0.7.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

/// Background the alpha channel is composited onto before lossy encoding.
pub const FLATTEN_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Target dimensions for `scale`, preserving the aspect ratio.
///
/// The width is `max(min_width, round(original_width * scale))`, so a bitmap
/// narrower than `min_width` is widened to it. The height follows the width.
pub fn target_dimensions(width: u32, height: u32, scale: f64, min_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }
    let scaled = (width as f64 * scale).round() as u32;
    let target_w = scaled.max(min_width).max(1);
    let target_h = ((height as f64) * (target_w as f64) / (width as f64)).round() as u32;
    (target_w, target_h.max(1))
}

/// Composite any alpha channel onto an opaque white background.
pub fn flatten(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = px[3] as u32;
        let blend = |c: u8, bg: u8| -> u8 { ((c as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8 };
        out.put_pixel(
            x,
            y,
            Rgb([
                blend(px[0], FLATTEN_BACKGROUND[0]),
                blend(px[1], FLATTEN_BACKGROUND[1]),
                blend(px[2], FLATTEN_BACKGROUND[2]),
            ]),
        );
    }
    out
}

/// Resample to exactly `(width, height)`. Returns a copy when the size is unchanged.
pub fn resample(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Lanczos3)
}
