//! Raster image transforms: decode, re-encode, compress, fit-inside resize.

use crate::config::Dimensions;
use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Target encoding for a raster transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    /// JPEG at the given quality (1–100, validated upstream).
    Jpeg { quality: u8 },
}

/// Decode any supported raster payload (PNG, JPEG, WEBP, GIF).
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ConvertError> {
    image::load_from_memory(bytes).map_err(ConvertError::codec)
}

/// Encode an image into the target format.
///
/// JPEG has no alpha channel, so RGBA inputs are flattened to RGB first;
/// transparent regions come out black, matching what the upstream decoders
/// produce for alpha-less targets.
pub fn encode(img: &DynamicImage, format: RasterFormat) -> Result<Vec<u8>, ConvertError> {
    let mut buf = Vec::new();
    match format {
        RasterFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(ConvertError::codec)?;
        }
        RasterFormat::Jpeg { quality } => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(ConvertError::codec)?;
        }
    }
    debug!(?format, len = buf.len(), "encoded raster");
    Ok(buf)
}

/// Decode + encode in one step: the raster A→B and compress flows.
pub fn reencode(bytes: &[u8], format: RasterFormat) -> Result<Vec<u8>, ConvertError> {
    let img = decode(bytes)?;
    encode(&img, format)
}

/// Scale to fit inside `dims`, preserving aspect ratio.
pub fn resize_to_fit(img: &DynamicImage, dims: Dimensions) -> DynamicImage {
    img.resize(dims.width, dims.height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([200, 30, 30, 255])))
    }

    #[test]
    fn png_round_trips_through_reencode() {
        let png = encode(&sample(8, 8), RasterFormat::Png).unwrap();
        let jpg = reencode(&png, RasterFormat::Jpeg { quality: 90 }).unwrap();
        let back = decode(&jpg).unwrap();
        assert_eq!((back.width(), back.height()), (8, 8));
        assert_eq!(image::guess_format(&jpg).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn jpeg_encoding_flattens_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 0])));
        // Must not error despite the alpha channel.
        let jpg = encode(&img, RasterFormat::Jpeg { quality: 80 }).unwrap();
        assert!(!jpg.is_empty());
    }

    #[test]
    fn lower_quality_produces_smaller_jpeg() {
        // Noise compresses poorly, making the quality difference visible.
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([
                (x * 17 % 251) as u8,
                (y * 31 % 251) as u8,
                ((x + y) * 13 % 251) as u8,
                255,
            ])
        }));
        let hi = encode(&img, RasterFormat::Jpeg { quality: 95 }).unwrap();
        let lo = encode(&img, RasterFormat::Jpeg { quality: 10 }).unwrap();
        assert!(lo.len() < hi.len(), "lo={} hi={}", lo.len(), hi.len());
    }

    #[test]
    fn resize_fits_inside_preserving_aspect() {
        let img = sample(400, 200);
        let out = resize_to_fit(&img, Dimensions { width: 100, height: 100 });
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn corrupt_payload_is_a_codec_error() {
        let err = decode(b"not an image at all").unwrap_err();
        assert!(matches!(err, ConvertError::Codec { .. }));
    }
}
