//! Route definitions for the `/v1/movies` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::movies;
use crate::state::AppState;

/// Movie routes.
///
/// ```text
/// GET    /v1/movies          -> list
/// POST   /v1/movies          -> create
/// GET    /v1/movies/{id}     -> get_by_id
/// PATCH  /v1/movies/{id}     -> update
/// DELETE /v1/movies/{id}     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/movies", get(movies::list).post(movies::create))
        .route(
            "/v1/movies/{id}",
            get(movies::get_by_id)
                .patch(movies::update)
                .delete(movies::delete),
        )
}
