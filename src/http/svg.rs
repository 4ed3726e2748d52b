//! SVG rasterization handlers.
//!
//! All three accept optional `width`/`height` fields (1–4096, default 1024)
//! describing the fit-inside box; the JPEG-backed targets also take an
//! optional `quality` (default 90).

use super::{read_upload, respond};
use crate::config::{parse_quality, Dimensions};
use crate::convert;
use crate::error::ConvertError;
use axum::extract::Multipart;
use axum::response::Response;

const DEFAULT_SVG_QUALITY: u8 = 90;

pub async fn svg_to_png(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    let dims = Dimensions::from_fields(upload.field("width"), upload.field("height"))?;
    respond(convert::svg_to_png(upload.file, dims).await?).await
}

pub async fn svg_to_jpg(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    let dims = Dimensions::from_fields(upload.field("width"), upload.field("height"))?;
    let quality = parse_quality(upload.field("quality"), DEFAULT_SVG_QUALITY)?;
    respond(convert::svg_to_jpeg(upload.file, dims, quality).await?).await
}

pub async fn svg_to_pdf(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    let dims = Dimensions::from_fields(upload.field("width"), upload.field("height"))?;
    let quality = parse_quality(upload.field("quality"), DEFAULT_SVG_QUALITY)?;
    respond(convert::svg_to_pdf(upload.file, dims, quality).await?).await
}
