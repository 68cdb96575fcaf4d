//! Raw print route
//!
//! ```json
//! POST /print
//! { "printerName": "POS-80", "escpos": "G0BIZWxsbwoKCh1WAA==" }
//! ```

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::core::{Result, ServerError, ServerState};

pub fn router() -> Router<ServerState> {
    Router::new().route("/print", post(print))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    #[serde(default)]
    pub printer_name: String,
    /// Base64 encoded payload
    #[serde(default)]
    pub escpos: String,
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
}

/// Decode the request and hand the bytes to the printer unmodified
///
/// The body is parsed by hand so a missing or wrong `Content-Type` still
/// gets the same validation messages.
pub async fn print(State(state): State<ServerState>, body: Bytes) -> Result<Json<PrintResponse>> {
    let req: PrintRequest =
        serde_json::from_slice(&body).map_err(|_| ServerError::BadRequest("Invalid JSON".into()))?;

    if req.printer_name.is_empty() {
        return Err(ServerError::BadRequest("printerName required".into()));
    }

    let raw = STANDARD
        .decode(req.escpos.as_bytes())
        .map_err(|_| ServerError::BadRequest("Invalid base64".into()))?;

    tracing::info!(printer = %req.printer_name, bytes = raw.len(), "Print request");

    let printer_name = req.printer_name;
    state
        .with_printer(move |printer| printer.submit_raw_bytes(&printer_name, &raw))
        .await?;

    Ok(Json(PrintResponse { success: true }))
}
