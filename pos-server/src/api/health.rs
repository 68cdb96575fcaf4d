//! Health check route
//!
//! # Response example
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "uptime": "1h2m3s",
//!   "platform": "linux/x86_64",
//!   "printersCount": 2,
//!   "serverTime": "2025-10-14T09:12:44+07:00",
//!   "backend": "cups"
//! }
//! ```

use std::time::Duration;

use axum::{Json, Router, extract::State, routing::get};
use chrono::{Local, SecondsFormat};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime: String,
    /// `<os>/<arch>`
    pub platform: String,
    pub printers_count: usize,
    pub server_time: String,
    /// Active printer backend
    pub backend: &'static str,
}

/// Whole seconds as `1h2m3s` / `2m3s` / `3s`
pub fn format_uptime(uptime: Duration) -> String {
    let secs = (uptime.as_millis() + 500) / 1000;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Liveness plus a printer count; a failing listing reports zero printers
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let printers_count = match state.with_printer(|printer| printer.list_printers()).await {
        Ok(printers) => printers.len(),
        Err(e) => {
            tracing::warn!(error = %e, "Printer listing failed during health check");
            0
        }
    };

    Json(HealthResponse {
        status: "healthy",
        uptime: format_uptime(state.started_at.elapsed()),
        platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
        printers_count,
        server_time: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        backend: state.printer.backend_name(),
    })
}
