//! Test receipt route
//!
//! `GET /test[?printer=NAME]` prints a short canned receipt. Without the
//! query parameter the configured `TEST_PRINTER_NAME` is used.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::core::{Result, ServerState};

const ESC_INIT: [u8; 2] = [0x1B, 0x40];
const ESC_PARTIAL_CUT: [u8; 2] = [0x1B, 0x69];
const FEED_LINES: usize = 3;

const RECEIPT_TEXT: &str = "\
Warung Sederhana
Jl. Slamet Riyadi 12, Solo
================================
TRX-TEST-001   Kasir: Demo
--------------------------------
Teh Manis 2x4000          8000
--------------------------------
Total Item                2
Total                     8000
================================
Test print OK";

pub fn router() -> Router<ServerState> {
    Router::new().route("/test", get(test_print))
}

#[derive(Debug, Deserialize)]
pub struct TestPrintQuery {
    pub printer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestPrintResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub printer: String,
}

/// Initialize, receipt text, feed, partial cut
pub fn test_receipt() -> Vec<u8> {
    let mut data = Vec::with_capacity(RECEIPT_TEXT.len() + 8);
    data.extend_from_slice(&ESC_INIT);
    data.extend_from_slice(RECEIPT_TEXT.as_bytes());
    data.extend(std::iter::repeat_n(0x0A, FEED_LINES));
    data.extend_from_slice(&ESC_PARTIAL_CUT);
    data
}

pub async fn test_print(
    State(state): State<ServerState>,
    Query(query): Query<TestPrintQuery>,
) -> Result<Json<TestPrintResponse>> {
    let printer_name = query
        .printer
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| state.config.test_printer_name.clone());

    let target = printer_name.clone();
    state
        .with_printer(move |printer| printer.submit_raw_bytes(&target, &test_receipt()))
        .await?;

    Ok(Json(TestPrintResponse {
        status: "ok",
        message: "Test print sent to printer",
        printer: printer_name,
    }))
}
