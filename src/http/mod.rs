//! HTTP surface: routing, multipart intake, and download responses.
//!
//! Handlers stay thin: read the upload, validate options, call one
//! orchestration flow, hand the result to [`respond`]. All error shaping
//! lives on [`ConvertError`]'s `IntoResponse` impl, so a handler body is a
//! straight `?`-chain.
//!
//! Archive downloads are streamed from the scratch-space file rather than
//! buffered: the response body owns the [`ScratchSpace`], so cleanup happens
//! when the stream is dropped — whether the download completed or the client
//! disconnected halfway.

use crate::config::ToolConfig;
use crate::convert::{self, Converted};
use crate::error::ConvertError;
use crate::scratch::ScratchSpace;
use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod image;
pub mod pdf;
pub mod svg;
pub mod tools;

/// Upload cap, applied to the whole multipart body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub tools: Arc<ToolConfig>,
}

impl AppState {
    pub fn new(tools: ToolConfig) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/convert/jpg-to-png", post(image::jpg_to_png))
        .route("/convert/png-to-jpg", post(image::png_to_jpg))
        .route("/convert/webp-to-png", post(image::webp_to_png))
        .route("/image/compress", post(image::compress))
        .route("/convert/svg-to-png", post(svg::svg_to_png))
        .route("/convert/svg-to-jpg", post(svg::svg_to_jpg))
        .route("/convert/svg-to-pdf", post(svg::svg_to_pdf))
        .route("/pdf/split", post(pdf::split))
        .route("/pdf/compress", post(pdf::compress))
        .route("/convert/pdf-to-word", post(pdf::pdf_to_word))
        .route("/convert/word-to-pdf", post(pdf::word_to_pdf))
        .route("/convert/pdf-to-jpg", post(pdf::pdf_to_jpg))
        .route("/convert/jpg-to-pdf", post(pdf::jpg_to_pdf))
        .route("/tools/health", get(tools::tool_health));

    Router::new()
        .route("/health", get(tools::health))
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> ConvertError {
    ConvertError::NotFound("Route not found".into())
}

// ── Multipart intake ─────────────────────────────────────────────────────

/// A parsed multipart upload: the `file` part plus any text option fields.
pub(crate) struct Upload {
    pub file: Vec<u8>,
    fields: HashMap<String, String>,
}

impl Upload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Drain a multipart body into an [`Upload`].
///
/// A missing or empty `file` part is a validation error; so is any transport
/// problem while reading parts (truncated body, oversized upload).
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<Upload, ConvertError> {
    let mut file = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ConvertError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ConvertError::Validation(format!("failed to read upload: {e}")))?;
            file = Some(bytes.to_vec());
        } else if !name.is_empty() {
            let text = field
                .text()
                .await
                .map_err(|e| ConvertError::Validation(format!("failed to read field: {e}")))?;
            fields.insert(name, text);
        }
    }

    match file {
        Some(file) if !file.is_empty() => Ok(Upload { file, fields }),
        _ => Err(ConvertError::Validation("No file uploaded".into())),
    }
}

// ── Download responses ───────────────────────────────────────────────────

/// A zip file streamed from disk; dropping the stream drops the scratch
/// space and with it the file being read.
struct ArchiveStream {
    inner: ReaderStream<tokio::fs::File>,
    _space: ScratchSpace,
}

impl Stream for ArchiveStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

fn attachment(filename: &str) -> (header::HeaderName, String) {
    (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{filename}\""),
    )
}

/// Turn a conversion result into a download response.
pub(crate) async fn respond(out: Converted) -> Result<Response, ConvertError> {
    match out {
        Converted::Single {
            filename,
            content_type,
            bytes,
        } => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                attachment(filename),
            ],
            bytes,
        )
            .into_response()),
        Converted::Archive {
            filename,
            space,
            path,
        } => {
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|e| ConvertError::Infrastructure(e.to_string()))?;
            let len = file
                .metadata()
                .await
                .map_err(|e| ConvertError::Infrastructure(e.to_string()))?
                .len();
            let stream = ArchiveStream {
                inner: ReaderStream::new(file),
                _space: space,
            };
            let (disposition_name, disposition_value) = attachment(filename);
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, convert::ZIP_MIME)
                .header(header::CONTENT_LENGTH, len)
                .header(disposition_name, disposition_value)
                .body(Body::from_stream(stream))
                .map_err(|e| ConvertError::Infrastructure(e.to_string()))
        }
    }
}
