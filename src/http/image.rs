//! Raster image conversion handlers.

use super::{read_upload, respond};
use crate::config::parse_quality;
use crate::convert;
use crate::error::ConvertError;
use axum::extract::Multipart;
use axum::response::Response;

const DEFAULT_JPEG_QUALITY: u8 = 80;

pub async fn jpg_to_png(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    respond(convert::image_to_png(upload.file).await?).await
}

pub async fn png_to_jpg(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    let quality = parse_quality(upload.field("quality"), DEFAULT_JPEG_QUALITY)?;
    respond(convert::image_to_jpeg(upload.file, quality).await?).await
}

pub async fn webp_to_png(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    respond(convert::image_to_png(upload.file).await?).await
}

pub async fn compress(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    let quality = parse_quality(upload.field("quality"), DEFAULT_JPEG_QUALITY)?;
    respond(convert::compress_image(upload.file, quality).await?).await
}
