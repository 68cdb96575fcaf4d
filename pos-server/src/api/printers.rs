//! Printer listing route

use axum::{Json, Router, extract::State, routing::get};

use crate::core::{Result, ServerState};

pub fn router() -> Router<ServerState> {
    Router::new().route("/printers", get(list_printers))
}

/// `GET /printers` - queue names in the order the OS reports them
pub async fn list_printers(State(state): State<ServerState>) -> Result<Json<Vec<String>>> {
    let printers = state.with_printer(|printer| printer.list_printers()).await?;
    Ok(Json(printers))
}
