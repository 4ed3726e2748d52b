//! PDF document manipulation: page counting, single-page extraction, and
//! raster embedding.
//!
//! Extraction works by cloning the parsed document, deleting every page
//! except the wanted one, then pruning unreachable objects. Shared resources
//! (fonts, images referenced from several pages) survive in each extracted
//! page, at the cost of cloning the object table per page — acceptable for
//! the request-scoped documents this service handles.

use crate::error::ConvertError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

/// Parse a PDF payload. Anything the parser rejects is a codec error.
pub fn load(bytes: &[u8]) -> Result<Document, ConvertError> {
    Document::load_mem(bytes).map_err(ConvertError::codec)
}

/// Number of pages in a parsed document.
pub fn page_count(doc: &Document) -> usize {
    doc.get_pages().len()
}

/// Serialize the single page `page` (1-based) of `doc` as a standalone PDF.
pub fn extract_page(doc: &Document, page: u32) -> Result<Vec<u8>, ConvertError> {
    let mut single = doc.clone();
    let pages = single.get_pages();
    if !pages.contains_key(&page) {
        return Err(ConvertError::codec(format!(
            "page {page} is out of range (document has {} pages)",
            pages.len()
        )));
    }
    let others: Vec<u32> = pages.keys().copied().filter(|&n| n != page).collect();
    single.delete_pages(&others);
    single.prune_objects();

    let mut out = Vec::new();
    single
        .save_to(&mut out)
        .map_err(ConvertError::codec)?;
    debug!(page, len = out.len(), "extracted page");
    Ok(out)
}

/// Geometry and component count read from a JPEG start-of-frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    width: u16,
    height: u16,
    components: u8,
}

/// Walk the JPEG marker segments for the first start-of-frame header.
fn jpeg_frame(jpeg: &[u8]) -> Option<JpegFrame> {
    let mut i = 2; // past SOI
    while i + 4 <= jpeg.len() {
        if jpeg[i] != 0xFF {
            return None;
        }
        let marker = jpeg[i + 1];
        match marker {
            0xFF => i += 1,               // fill byte
            0x01 | 0xD0..=0xD7 => i += 2, // standalone markers
            // SOF0..SOF15, excluding DHT (C4), JPGn (C8), DAC (CC).
            // Layout: marker, length(2), precision(1), height(2), width(2),
            // component count(1).
            0xC0..=0xCF if marker != 0xC4 && marker != 0xC8 && marker != 0xCC => {
                return Some(JpegFrame {
                    height: u16::from_be_bytes([*jpeg.get(i + 5)?, *jpeg.get(i + 6)?]),
                    width: u16::from_be_bytes([*jpeg.get(i + 7)?, *jpeg.get(i + 8)?]),
                    components: *jpeg.get(i + 9)?,
                });
            }
            _ => {
                let len = u16::from_be_bytes([jpeg[i + 2], jpeg[i + 3]]) as usize;
                i += 2 + len;
            }
        }
    }
    None
}

/// Whether a payload is a JPEG that [`compose_jpeg_pdf`] can embed verbatim:
/// grayscale or three-component. CMYK streams must be transcoded first.
pub fn embeddable_jpeg(bytes: &[u8]) -> bool {
    matches!(image::guess_format(bytes), Ok(image::ImageFormat::Jpeg))
        && matches!(jpeg_frame(bytes), Some(f) if f.components == 1 || f.components == 3)
}

/// Build a one-page PDF embedding `jpeg` at its native pixel size, one point
/// per pixel.
///
/// Only JPEG payloads are accepted: the bytes go into the page verbatim under
/// a `DCTDecode` filter, so the PDF viewer does the decoding and the image is
/// never transcoded. Because the stream is embedded undecoded, the declared
/// colour space has to match the frame's component count exactly.
pub fn compose_jpeg_pdf(jpeg: &[u8]) -> Result<Vec<u8>, ConvertError> {
    if image::guess_format(jpeg).map_err(ConvertError::codec)? != image::ImageFormat::Jpeg {
        return Err(ConvertError::codec("expected a JPEG payload"));
    }
    let frame = jpeg_frame(jpeg).ok_or_else(|| ConvertError::codec("JPEG has no frame header"))?;
    let color_space = match frame.components {
        1 => "DeviceGray",
        3 => "DeviceRGB",
        n => {
            return Err(ConvertError::codec(format!(
                "cannot embed a {n}-component JPEG directly"
            )))
        }
    };
    let (width, height) = (u32::from(frame.width), u32::from(frame.height));
    let (w, h) = (width as f32, height as f32);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8i64,
            "Filter" => "DCTDecode",
        },
        jpeg.to_vec(),
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(ConvertError::codec)?,
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(w),
            Object::Real(h),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(ConvertError::codec)?;
    debug!(width, height, len = out.len(), "composed image PDF");
    Ok(out)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use lopdf::StringFormat;

    /// Build a minimal valid PDF with `n` text pages.
    pub fn sample_pdf(n: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for i in 1..=n {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Integer(24)],
                    ),
                    Operation::new(
                        "Td",
                        vec![Object::Integer(100), Object::Integer(700)],
                    ),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Page {i}").into_bytes(),
                            StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => n as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_pdf;
    use super::*;

    #[test]
    fn counts_pages() {
        let doc = load(&sample_pdf(3)).unwrap();
        assert_eq!(page_count(&doc), 3);
    }

    #[test]
    fn extracted_page_is_a_standalone_single_page_pdf() {
        let doc = load(&sample_pdf(3)).unwrap();
        for page in 1..=3u32 {
            let bytes = extract_page(&doc, page).unwrap();
            let single = load(&bytes).unwrap();
            assert_eq!(page_count(&single), 1, "page {page}");
        }
    }

    #[test]
    fn extracting_out_of_range_page_fails() {
        let doc = load(&sample_pdf(2)).unwrap();
        let err = extract_page(&doc, 5).unwrap_err();
        assert!(matches!(err, ConvertError::Codec { .. }));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn malformed_payload_is_a_codec_error() {
        let err = load(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ConvertError::Codec { .. }));
    }

    fn rgb_jpeg() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            30,
            20,
            image::Rgb([10, 120, 200]),
        ));
        crate::codec::raster::encode(&img, crate::codec::raster::RasterFormat::Jpeg {
            quality: 90,
        })
        .unwrap()
    }

    fn luma_jpeg() -> Vec<u8> {
        let img = image::DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            8,
            8,
            image::Luma([128]),
        ));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
        img.write_with_encoder(encoder).unwrap();
        buf
    }

    /// Declared colour space of the document's sole image XObject.
    fn embedded_color_space(doc: &Document) -> Vec<u8> {
        doc.objects
            .values()
            .find_map(|obj| {
                let Object::Stream(s) = obj else { return None };
                if s.dict.get(b"Subtype").ok()?.as_name().ok()? == b"Image" {
                    Some(s.dict.get(b"ColorSpace").ok()?.as_name().ok()?.to_vec())
                } else {
                    None
                }
            })
            .expect("image XObject present")
    }

    #[test]
    fn composed_jpeg_pdf_loads_with_one_page() {
        let pdf = compose_jpeg_pdf(&rgb_jpeg()).unwrap();
        let doc = load(&pdf).unwrap();
        assert_eq!(page_count(&doc), 1);
        assert_eq!(embedded_color_space(&doc), b"DeviceRGB");
    }

    #[test]
    fn grayscale_jpeg_is_declared_as_device_gray() {
        let jpeg = luma_jpeg();
        assert!(embeddable_jpeg(&jpeg));
        let doc = load(&compose_jpeg_pdf(&jpeg).unwrap()).unwrap();
        assert_eq!(embedded_color_space(&doc), b"DeviceGray");
    }

    #[test]
    fn four_component_jpeg_is_rejected() {
        // SOI + SOF0 declaring an 8x8 frame with four components.
        let cmyk = [
            0xFF, 0xD8, // SOI
            0xFF, 0xC0, 0x00, 0x11, 0x08, // SOF0, length 17, precision 8
            0x00, 0x08, 0x00, 0x08, // 8x8
            0x04, // components
            0x01, 0x11, 0x00, 0x02, 0x11, 0x00, 0x03, 0x11, 0x00, 0x04, 0x11, 0x00,
        ];
        assert!(!embeddable_jpeg(&cmyk));
        let err = compose_jpeg_pdf(&cmyk).unwrap_err();
        assert!(err.to_string().contains("4-component"), "got: {err}");
    }

    #[test]
    fn frame_scan_reads_geometry_and_components() {
        let frame = jpeg_frame(&luma_jpeg()).unwrap();
        assert_eq!((frame.width, frame.height, frame.components), (8, 8, 1));
        let frame = jpeg_frame(&rgb_jpeg()).unwrap();
        assert_eq!((frame.width, frame.height, frame.components), (30, 20, 3));
    }

    #[test]
    fn compose_rejects_non_jpeg_payload() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([0, 0, 0]),
        ));
        let png = crate::codec::raster::encode(&img, crate::codec::raster::RasterFormat::Png)
            .unwrap();
        assert!(!embeddable_jpeg(&png));
        let err = compose_jpeg_pdf(&png).unwrap_err();
        assert!(err.to_string().contains("JPEG"));
    }
}
