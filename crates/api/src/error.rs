use std::any::Any;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use greenlight_core::error::CoreError;
use serde::Serialize;

use crate::response::{write_json, Envelope, ResponseError};

/// Message for every 5xx response. Internal details are only logged.
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";

pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";

pub const TIMEOUT_MESSAGE: &str = "the request took too long to process";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] so every failure becomes an enveloped
/// `{"error": ...}` JSON body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `greenlight_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A response envelope could not be serialized.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route or record matches the request.
    #[error("Not found")]
    NotFound,

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    /// The request outlived the configured timeout.
    #[error("Request timed out")]
    RequestTimeout,

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, id, "Record not found");
                    error_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
                }
                CoreError::Validation(errors) => {
                    error_response(StatusCode::UNPROCESSABLE_ENTITY, errors)
                }
                CoreError::EditConflict { entity, id } => {
                    tracing::info!(entity, id, "Edit conflict");
                    error_response(StatusCode::CONFLICT, EDIT_CONFLICT_MESSAGE)
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- Serialization ---
            AppError::Response(err) => {
                tracing::error!(error = %err, "Failed to serialize response");
                server_error_response()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            AppError::NotFound => error_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            AppError::MethodNotAllowed(method) => error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                format!("the {method} method is not supported for this resource"),
            ),
            AppError::RequestTimeout => {
                tracing::warn!("Request timed out");
                error_response(StatusCode::REQUEST_TIMEOUT, TIMEOUT_MESSAGE)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                server_error_response()
            }
        }
    }
}

/// Write `{"error": message}` with `status`.
///
/// Falls back to an empty 500 if the envelope itself cannot be written.
pub fn error_response(status: StatusCode, message: impl Serialize) -> Response {
    match write_json(status, Envelope::new().with("error", message), None) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "Failed to write error response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn server_error_response() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
}

/// Classify a sqlx error into an HTTP response.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Response {
    match err {
        sqlx::Error::RowNotFound => error_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
        sqlx::Error::Database(db_err) => {
            tracing::error!(
                error = %db_err,
                code = db_err.code().as_deref().unwrap_or("unknown"),
                constraint = db_err.constraint().unwrap_or("none"),
                "Database error"
            );
            server_error_response()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            server_error_response()
        }
    }
}

/// Router fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Router fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}

/// Replace the bare 408 produced by the timeout layer with an enveloped one.
pub async fn envelope_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        AppError::RequestTimeout.into_response()
    } else {
        response
    }
}

/// Turn a caught handler panic into an enveloped 500.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = detail, "Handler panicked");
    server_error_response()
}
