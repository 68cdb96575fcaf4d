use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pos_printer::PrintError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    /// Printer backend failure, passed through verbatim
    #[error(transparent)]
    Print(#[from] PrintError),

    #[error("Printer did not respond within {0} ms")]
    Timeout(u64),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ServerError::Print(err) => {
                tracing::error!(error = %err, "Printer call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "print_error", err.to_string())
            }
            ServerError::Timeout(_) => {
                tracing::error!("{}", self);
                (StatusCode::GATEWAY_TIMEOUT, "timeout", self.to_string())
            }
            ServerError::Internal(err) => {
                // Log the cause, hide it from the client
                tracing::error!(error = ?err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_type,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Handler result type alias
pub type Result<T> = std::result::Result<T, ServerError>;
