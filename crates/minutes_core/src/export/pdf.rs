//! Page geometry, image-shift pagination and PDF assembly.
//!
//! The bitmap is never cut. Every page embeds the same full-height image,
//! shifted upward so the next page-height band falls inside the page. Text
//! crossing a page boundary is therefore split mid-line.
//!
//! # Invariants
//! - Page one always exists and shows the image at offset 0.
//! - A further page is added while the remaining height is `>= 0`, so an
//!   image exactly one page tall yields a trailing blank page.

use super::raster::Bitmap;
use super::{ExportError, ExportResult};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A4 portrait width in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
/// A4 portrait height in millimetres.
pub const A4_HEIGHT_MM: f64 = 297.0;

const JPEG_QUALITY: u8 = 100;
const POINTS_PER_MM: f64 = 72.0 / 25.4;
const IMAGE_NAME: &str = "Im0";

/// Target page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageGeometry {
    pub const A4: Self = Self {
        width_mm: A4_WIDTH_MM,
        height_mm: A4_HEIGHT_MM,
    };

    /// Height of a `width x height` bitmap scaled to the page width.
    pub fn scaled_image_height(&self, width: u32, height: u32) -> ExportResult<f64> {
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyBitmap);
        }
        Ok(f64::from(height) * self.width_mm / f64::from(width))
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Vertical image offsets (mm from the page top), one per page.
pub fn page_offsets(image_height: f64, page_height: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    if !(page_height > 0.0 && image_height.is_finite()) {
        return offsets;
    }

    let mut remaining = image_height - page_height;
    while remaining >= 0.0 {
        offsets.push(remaining - image_height);
        remaining -= page_height;
    }
    offsets
}

/// Assembled document bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Encodes `bitmap` as JPEG and lays it out over as many pages as needed.
pub fn assemble(bitmap: &Bitmap, geometry: &PageGeometry) -> ExportResult<PaginatedPdf> {
    let image_height = geometry.scaled_image_height(bitmap.width(), bitmap.height())?;
    let offsets = page_offsets(image_height, geometry.height_mm);
    let jpeg = encode_jpeg(bitmap)?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(bitmap.width()),
            "Height" => i64::from(bitmap.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let page_width_pt = (geometry.width_mm * POINTS_PER_MM) as f32;
    let page_height_pt = (geometry.height_mm * POINTS_PER_MM) as f32;
    let image_height_pt = (image_height * POINTS_PER_MM) as f32;

    let mut kids: Vec<Object> = Vec::with_capacity(offsets.len());
    for offset in &offsets {
        // PDF space grows upward from the page bottom.
        let bottom = page_height_pt - (*offset * POINTS_PER_MM) as f32 - image_height_pt;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(page_width_pt),
                        0.into(),
                        0.into(),
                        Object::Real(image_height_pt),
                        0.into(),
                        Object::Real(bottom),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|err| ExportError::Assembly(err.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { IMAGE_NAME => image_id },
            },
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(page_width_pt),
                Object::Real(page_height_pt),
            ],
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| ExportError::Assembly(err.to_string()))?;
    Ok(PaginatedPdf { bytes, page_count })
}

fn encode_jpeg(bitmap: &Bitmap) -> ExportResult<Vec<u8>> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(
            bitmap.as_raw(),
            bitmap.width(),
            bitmap.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|err| ExportError::Encode(err.to_string()))?;
    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::{page_offsets, PageGeometry, A4_HEIGHT_MM};

    #[test]
    fn two_and_a_half_pages_of_image_take_three_pages() {
        let offsets = page_offsets(2.5 * A4_HEIGHT_MM, A4_HEIGHT_MM);
        assert_eq!(offsets.len(), 3);
        assert_eq!(offsets[0], 0.0);
        assert!((offsets[1] + A4_HEIGHT_MM).abs() < 1e-9);
        assert!((offsets[2] + 2.0 * A4_HEIGHT_MM).abs() < 1e-9);
    }

    #[test]
    fn short_image_fits_one_page() {
        assert_eq!(page_offsets(100.0, A4_HEIGHT_MM), vec![0.0]);
    }

    #[test]
    fn exactly_one_page_tall_adds_trailing_page() {
        assert_eq!(page_offsets(A4_HEIGHT_MM, A4_HEIGHT_MM).len(), 2);
    }

    #[test]
    fn scaled_height_preserves_aspect_ratio() {
        let height = PageGeometry::A4.scaled_image_height(1600, 3200).unwrap();
        assert!((height - 420.0).abs() < 1e-9);
        assert!(PageGeometry::A4.scaled_image_height(0, 10).is_err());
    }
}
