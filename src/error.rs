//! Error types for the fileconv service.
//!
//! A single taxonomy covers every failure mode of a conversion request, and
//! each variant carries exactly the context its HTTP mapping needs:
//!
//! * [`ConvertError::Validation`] — the client sent something malformed; no
//!   filesystem or process resource has been touched yet.
//! * [`ConvertError::Codec`] — an in-process library rejected the payload
//!   (corrupt image, unparseable PDF). The library diagnostic is preserved.
//! * [`ConvertError::ToolUnavailable`] / [`ConvertError::OutputMissing`] —
//!   an external converter could not run, or ran but never produced the
//!   expected output. Both indicate a deployment problem rather than bad
//!   input, so both map to 503, but they stay distinct: "the process failed"
//!   and "the process claimed success but left nothing behind" are debugged
//!   very differently.
//!
//! All errors raised inside a request are translated at one boundary — the
//! [`IntoResponse`] impl — into the `{ "success": false, "message": … }`
//! JSON shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// All errors returned by conversion flows and HTTP handlers.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Client input was malformed or out of range. Raised before any scratch
    /// space is acquired or process spawned.
    #[error("{0}")]
    Validation(String),

    /// An in-process codec rejected the payload.
    #[error("{detail}")]
    Codec { detail: String },

    /// Every candidate executable failed to launch or exited non-zero.
    /// `detail` is the stderr of the last attempted candidate, or a
    /// synthesized exit-code message when it produced none.
    #[error("{tool} failed: {detail}")]
    ToolUnavailable { tool: String, detail: String },

    /// The external tool reported success but the expected output file never
    /// appeared, even after scanning the scratch directory.
    #[error("{tool} produced no {expected} output")]
    OutputMissing { tool: String, expected: String },

    /// Unknown route.
    #[error("{0}")]
    NotFound(String),

    /// Scratch space could not be created, written, or read.
    #[error("scratch space error: {0}")]
    Infrastructure(String),
}

impl ConvertError {
    /// Shorthand for a codec failure wrapping a library diagnostic.
    pub fn codec(detail: impl std::fmt::Display) -> Self {
        Self::Codec {
            detail: detail.to_string(),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Codec { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ToolUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::OutputMissing { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(e: std::io::Error) -> Self {
        Self::Infrastructure(e.to_string())
    }
}

/// JSON error body: `{ "success": false, "message": … }`.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }
        let body = Json(ErrorBody {
            success: false,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let e = ConvertError::Validation("Quality must be between 1-100".into());
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert!(e.to_string().contains("1-100"));
    }

    #[test]
    fn tool_unavailable_maps_to_503_and_names_tool() {
        let e = ConvertError::ToolUnavailable {
            tool: "soffice".into(),
            detail: "exit code 77".into(),
        };
        assert_eq!(e.status(), StatusCode::SERVICE_UNAVAILABLE);
        let msg = e.to_string();
        assert!(msg.contains("soffice"), "got: {msg}");
        assert!(msg.contains("exit code 77"), "got: {msg}");
    }

    #[test]
    fn output_missing_is_distinct_from_tool_unavailable() {
        let missing = ConvertError::OutputMissing {
            tool: "soffice".into(),
            expected: "docx".into(),
        };
        let failed = ConvertError::ToolUnavailable {
            tool: "soffice".into(),
            detail: "boom".into(),
        };
        assert_ne!(missing.to_string(), failed.to_string());
        assert_eq!(missing.status(), failed.status());
    }

    #[test]
    fn codec_preserves_library_diagnostic() {
        let e = ConvertError::codec("Format error decoding Jpeg: invalid SOI");
        assert!(e.to_string().contains("invalid SOI"));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
