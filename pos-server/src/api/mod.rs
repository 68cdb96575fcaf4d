//! HTTP routes
//!
//! | Path | Method | Module |
//! |------|--------|--------|
//! | /print | POST | [`print`] |
//! | /printers | GET | [`printers`] |
//! | /test | GET | [`test_print`] |
//! | /health | GET | [`health`] |

pub mod health;
pub mod print;
pub mod printers;
pub mod test_print;

use std::time::{Duration, Instant};

use axum::{Router, middleware};
use http::{Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// HTTP access log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        "{} {} {} ({} ms)",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );

    response
}

/// Answer any OPTIONS request that is not a CORS preflight
async fn answer_options(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    if *request.method() == Method::OPTIONS {
        return http::Response::new(axum::body::Body::empty());
    }
    next.run(request).await
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

/// Build the router without state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(print::router())
        .merge(printers::router())
        .merge(test_print::router())
        .merge(health::router())
}

/// Build the fully configured application
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        .layer(middleware::from_fn(answer_options))
        .layer(cors_layer())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
}
