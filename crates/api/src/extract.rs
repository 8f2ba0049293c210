//! Request extractors that fail with enveloped [`AppError`]s instead of
//! axum's plain-text rejections.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use greenlight_core::types::DbId;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::{AppError, AppResult};

/// Upper bound on request bodies, enforced by `DefaultBodyLimit` in the router.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// JSON request body decoded with descriptive 400 messages.
///
/// Unlike `axum::Json` this does not insist on a `Content-Type` header.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    AppError::BadRequest(format!(
                        "body must not be larger than {MAX_BODY_BYTES} bytes"
                    ))
                } else {
                    AppError::BadRequest(rejection.body_text())
                }
            })?;
        decode_json(&bytes).map(JsonBody)
    }
}

/// Decode a JSON document, translating serde errors into client-facing text.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> AppResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("body must not be empty".into()));
    }

    serde_json::from_slice(bytes).map_err(|err| {
        let message = match err.classify() {
            Category::Syntax | Category::Eof | Category::Io => format!(
                "body contains badly-formed JSON (at line {} column {})",
                err.line(),
                err.column()
            ),
            Category::Data => match unknown_field(&err.to_string()) {
                Some(field) => format!("body contains unknown key \"{field}\""),
                None => format!("body contains invalid JSON value: {err}"),
            },
        };
        AppError::BadRequest(message)
    })
}

/// Pull the field name out of serde's "unknown field `x`, expected ..." text.
fn unknown_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("unknown field `")?;
    rest.split_once('`').map(|(field, _)| field)
}

/// Parse an `{id}` path segment. Anything that is not a positive integer is
/// reported as not found.
pub fn read_id_param(raw: &str) -> AppResult<DbId> {
    raw.parse::<DbId>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or(AppError::NotFound)
}
