use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use pos_printer::{OsError, PrintError, PrintResult, RawPrinter};
use pos_server::api::build_app;
use pos_server::{Config, ServerState};
use serde_json::Value;
use tower::ServiceExt;

/// Printer double that records submissions
#[derive(Default)]
struct FakePrinter {
    printers: Vec<String>,
    fail: bool,
    delay: Option<Duration>,
    submitted: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakePrinter {
    fn with_printers(names: &[&str]) -> Self {
        Self {
            printers: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl RawPrinter for FakePrinter {
    fn submit_raw_bytes(&self, printer_name: &str, data: &[u8]) -> PrintResult<()> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail {
            return Err(PrintError::HandleOpen {
                printer: printer_name.to_string(),
                source: OsError(1801),
            });
        }
        self.submitted
            .lock()
            .unwrap()
            .push((printer_name.to_string(), data.to_vec()));
        Ok(())
    }

    fn list_printers(&self) -> PrintResult<Vec<String>> {
        if self.fail {
            return Err(PrintError::EnumerationQuery(OsError(1722)));
        }
        Ok(self.printers.clone())
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}

fn test_config() -> Config {
    Config {
        http_host: "127.0.0.1".into(),
        http_port: 0,
        test_printer_name: "POS-80".into(),
        print_timeout_ms: 0,
        log_level: "info".into(),
        log_dir: None,
    }
}

fn app(printer: Arc<FakePrinter>) -> Router {
    app_with_config(printer, test_config())
}

fn app_with_config(printer: Arc<FakePrinter>, config: Config) -> Router {
    build_app(ServerState::new(config, printer))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_print(body: &str) -> Request<Body> {
    Request::post("/print")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_print_sends_decoded_bytes() {
    let printer = Arc::new(FakePrinter::default());

    let (status, body) = send(
        app(printer.clone()),
        post_print(r#"{"printerName":"POS-80","escpos":"G0BIZWxsbwoKCh1WAA=="}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "success": true }));
    let submitted = printer.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].0, "POS-80");
    assert_eq!(submitted[0].1, b"\x1b@Hello\n\n\n\x1dV\x00");
}

#[tokio::test]
async fn test_print_without_content_type() {
    let printer = Arc::new(FakePrinter::default());
    let request = Request::post("/print")
        .body(Body::from(r#"{"printerName":"POS-80","escpos":"AA=="}"#))
        .unwrap();

    let (status, _) = send(app(printer.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(printer.submitted.lock().unwrap()[0].1, vec![0u8]);
}

#[tokio::test]
async fn test_print_invalid_json() {
    let printer = Arc::new(FakePrinter::default());

    let (status, body) = send(app(printer.clone()), post_print("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON");
    assert!(printer.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_print_requires_printer_name() {
    let printer = Arc::new(FakePrinter::default());

    let (status, body) = send(app(printer), post_print(r#"{"escpos":"AA=="}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "printerName required");
}

#[tokio::test]
async fn test_print_invalid_base64() {
    let printer = Arc::new(FakePrinter::default());

    let (status, body) = send(
        app(printer),
        post_print(r#"{"printerName":"POS-80","escpos":"not base64!"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid base64");
}

#[tokio::test]
async fn test_print_backend_error_is_500() {
    let printer = Arc::new(FakePrinter::failing());

    let (status, body) = send(
        app(printer),
        post_print(r#"{"printerName":"Missing","escpos":"AA=="}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "print_error");
    assert!(body["message"].as_str().unwrap().contains("Missing"));
}

#[tokio::test]
async fn test_print_deadline_is_504() {
    let printer = Arc::new(FakePrinter {
        delay: Some(Duration::from_millis(500)),
        ..Default::default()
    });
    let mut config = test_config();
    config.print_timeout_ms = 50;

    let (status, body) = send(
        app_with_config(printer, config),
        post_print(r#"{"printerName":"POS-80","escpos":"AA=="}"#),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "timeout");
}

#[tokio::test]
async fn test_printers_in_order() {
    let printer = Arc::new(FakePrinter::with_printers(&["Foo", "Bar", "Foo"]));

    let (status, body) = send(app(printer), get("/printers")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["Foo", "Bar", "Foo"]));
}

#[tokio::test]
async fn test_printers_empty_list() {
    let printer = Arc::new(FakePrinter::default());

    let (status, body) = send(app(printer), get("/printers")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_printers_backend_error() {
    let printer = Arc::new(FakePrinter::failing());

    let (status, _) = send(app(printer), get("/printers")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_test_print_default_printer() {
    let printer = Arc::new(FakePrinter::default());

    let (status, body) = send(app(printer.clone()), get("/test")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Test print sent to printer");

    let submitted = printer.submitted.lock().unwrap();
    assert_eq!(submitted[0].0, "POS-80");
    assert!(submitted[0].1.starts_with(&[0x1B, 0x40]));
    assert!(submitted[0].1.ends_with(&[0x0A, 0x1B, 0x69]));
}

#[tokio::test]
async fn test_test_print_query_printer() {
    let printer = Arc::new(FakePrinter::default());

    let (status, body) = send(app(printer.clone()), get("/test?printer=Kitchen")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["printer"], "Kitchen");
    assert_eq!(printer.submitted.lock().unwrap()[0].0, "Kitchen");
}

#[tokio::test]
async fn test_test_print_wrong_method() {
    let printer = Arc::new(FakePrinter::default());
    let request = Request::post("/test").body(Body::empty()).unwrap();

    let (status, _) = send(app(printer.clone()), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(printer.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_reports_printers() {
    let printer = Arc::new(FakePrinter::with_printers(&["Foo", "Bar"]));

    let (status, body) = send(app(printer), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["printersCount"], 2);
    assert_eq!(body["backend"], "fake");
    assert!(body["platform"].as_str().unwrap().contains('/'));
    assert!(body["serverTime"].is_string());
    assert!(body["uptime"].as_str().unwrap().ends_with('s'));
}

#[tokio::test]
async fn test_health_survives_listing_failure() {
    let printer = Arc::new(FakePrinter::failing());

    let (status, body) = send(app(printer), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["printersCount"], 0);
}

#[tokio::test]
async fn test_cors_preflight() {
    let printer = Arc::new(FakePrinter::default());
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/print")
        .header(header::ORIGIN, "http://pos.local")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app(printer).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "3600");
}

#[tokio::test]
async fn test_bare_options_answered() {
    let printer = Arc::new(FakePrinter::default());
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/print")
        .header(header::ORIGIN, "http://pos.local")
        .body(Body::empty())
        .unwrap();

    let response = app(printer.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(printer.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cors_header_on_response() {
    let printer = Arc::new(FakePrinter::with_printers(&["Foo"]));
    let request = Request::get("/printers")
        .header(header::ORIGIN, "http://pos.local")
        .body(Body::empty())
        .unwrap();

    let response = app(printer).oneshot(request).await.unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
