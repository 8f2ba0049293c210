use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{routing::get, Router};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::{write_json, Envelope};
use crate::state::AppState;

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Deployment details reported under `system_info`.
#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub environment: &'static str,
    pub version: &'static str,
}

/// GET /v1/healthcheck -- reports that the service is available.
///
/// Does not touch the database, so it answers even when PostgreSQL is down.
async fn healthcheck(State(state): State<AppState>) -> AppResult<Response> {
    let envelope = Envelope::new().with("status", "available").with(
        "system_info",
        SystemInfo {
            environment: state.config.env.as_str(),
            version: VERSION,
        },
    );
    Ok(write_json(StatusCode::OK, envelope, None)?)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/healthcheck", get(healthcheck))
}
