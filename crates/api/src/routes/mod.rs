pub mod health;
pub mod movies;

use axum::Router;

use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// GET    /v1/healthcheck                 service status
///
/// GET    /v1/movies                      list (title, genres, page, page_size, sort)
/// POST   /v1/movies                      create
/// GET    /v1/movies/{id}                 get_by_id
/// PATCH  /v1/movies/{id}                 update (honours X-Expected-Version)
/// DELETE /v1/movies/{id}                 delete
/// ```
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(movies::router())
}
