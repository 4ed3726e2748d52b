//! PDF and document conversion handlers.

use super::{read_upload, respond, AppState};
use crate::convert;
use crate::error::ConvertError;
use axum::extract::{Multipart, State};
use axum::response::Response;

pub async fn split(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    respond(convert::split_pdf(upload.file).await?).await
}

pub async fn compress(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    respond(convert::compress_pdf(upload.file, &state.tools).await?).await
}

pub async fn pdf_to_word(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    respond(convert::pdf_to_word(upload.file, &state.tools).await?).await
}

pub async fn word_to_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    respond(convert::word_to_pdf(upload.file, &state.tools).await?).await
}

pub async fn pdf_to_jpg(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    respond(convert::pdf_to_images(upload.file, &state.tools).await?).await
}

pub async fn jpg_to_pdf(multipart: Multipart) -> Result<Response, ConvertError> {
    let upload = read_upload(multipart).await?;
    respond(convert::image_to_pdf(upload.file).await?).await
}
