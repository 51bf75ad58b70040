//! Container wrapping: JPEG bytes → single-page PDF.
//!
//! The page is sized so the image fills it exactly at `dpi` pixels per inch.
//! The resolution only changes the `MediaBox` (physical page size); the image
//! stream is the JPEG as-is.

use crate::error::ArchiveError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// PDF user-space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Wrap a baseline RGB JPEG of `width` × `height` pixels into a one-page PDF.
pub fn wrap_jpeg(jpeg: &[u8], width: u32, height: u32, dpi: u32) -> Result<Vec<u8>, ArchiveError> {
    let (page_w, page_h) = page_size_points(width, height, dpi);

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg.to_vec(),
    );
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    page_w.into(),
                    0.into(),
                    0.into(),
                    page_h.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| ArchiveError::Internal(format!("page content encoding: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::with_capacity(jpeg.len() + 1024);
    doc.save_to(&mut out)
        .map_err(|e| ArchiveError::Internal(format!("PDF serialisation: {e}")))?;
    Ok(out)
}

/// Physical page size in points for a `width` × `height` image at `dpi`.
pub fn page_size_points(width: u32, height: u32, dpi: u32) -> (f32, f32) {
    let factor = POINTS_PER_INCH / dpi.max(1) as f32;
    (width as f32 * factor, height as f32 * factor)
}
