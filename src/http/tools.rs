//! Service and tool health handlers.

use super::AppState;
use crate::probe::{self, ToolHealth};
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthBody {
    pub success: bool,
    pub status: &'static str,
}

/// Liveness: the process is up and serving.
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        success: true,
        status: "ok",
    })
}

/// Probe the external converters, freshly on every call. The body is the
/// flat `{ ghostscript, libreoffice, poppler }` availability map.
pub async fn tool_health(State(state): State<AppState>) -> Json<ToolHealth> {
    Json(probe::check(&state.tools).await)
}
