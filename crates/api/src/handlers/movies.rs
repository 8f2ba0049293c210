//! Handlers for the `/v1/movies` resource.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use greenlight_core::error::CoreError;
use greenlight_core::filters::validate_filters;
use greenlight_core::movie::{validate_movie, Movie};
use greenlight_core::runtime::Runtime;
use greenlight_core::types::DbId;
use greenlight_core::validator::Validator;
use greenlight_db::repositories::MovieRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{read_id_param, JsonBody};
use crate::query::ListMoviesParams;
use crate::response::{write_json, Envelope};
use crate::state::AppState;

/// Optional request header carrying the version the client last saw.
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

const ENTITY: &str = "Movie";

/// Body of `POST /v1/movies`. Missing fields default to zero values and are
/// then reported by validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMovieInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub runtime: Runtime,
    pub genres: Option<Vec<String>>,
}

/// Body of `PATCH /v1/movies/{id}`. Absent or `null` fields keep their
/// stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovieInput {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl UpdateMovieInput {
    fn apply(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = self.genres {
            movie.genres = Some(genres);
        }
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

fn edit_conflict(id: DbId) -> AppError {
    AppError::Core(CoreError::EditConflict { entity: ENTITY, id })
}

fn check_movie(movie: &Movie) -> AppResult<()> {
    let mut v = Validator::new();
    validate_movie(&mut v, movie);
    v.into_result()?;
    Ok(())
}

/// GET /v1/movies
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListMoviesParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let mut v = Validator::new();
    let (search, filters) = params.parse(&mut v);
    validate_filters(&mut v, &filters);
    v.into_result()?;

    let (movies, metadata) = MovieRepo::list(&state.pool, &search, &filters).await?;

    let envelope = Envelope::new()
        .with("movies", &movies)
        .with("metadata", metadata);
    Ok(write_json(StatusCode::OK, envelope, None)?)
}

/// POST /v1/movies
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateMovieInput>,
) -> AppResult<Response> {
    let movie = Movie {
        id: 0,
        created_at: chrono::Utc::now(),
        title: input.title,
        year: input.year,
        runtime: input.runtime,
        genres: input.genres,
        version: 0,
    };
    check_movie(&movie)?;

    let movie = MovieRepo::insert(&state.pool, &movie).await?;
    tracing::info!(movie_id = movie.id, "Movie created");

    let location = HeaderValue::try_from(format!("/v1/movies/{}", movie.id))
        .map_err(|err| AppError::InternalError(err.to_string()))?;
    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location);

    Ok(write_json(
        StatusCode::CREATED,
        Envelope::new().with("movie", &movie),
        Some(headers),
    )?)
}

/// GET /v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let id = read_id_param(&raw_id)?;
    let movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(write_json(
        StatusCode::OK,
        Envelope::new().with("movie", &movie),
        None,
    )?)
}

/// PATCH /v1/movies/{id}
///
/// When the `X-Expected-Version` header is present it must equal the stored
/// version, otherwise the update is refused as an edit conflict.
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    JsonBody(input): JsonBody<UpdateMovieInput>,
) -> AppResult<Response> {
    let id = read_id_param(&raw_id)?;
    let mut movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(expected) = headers.get(EXPECTED_VERSION_HEADER) {
        if expected.to_str().ok() != Some(movie.version.to_string().as_str()) {
            return Err(edit_conflict(id));
        }
    }

    input.apply(&mut movie);
    check_movie(&movie)?;

    // `None` here means another request bumped the version in between.
    let movie = MovieRepo::update(&state.pool, &movie)
        .await?
        .ok_or_else(|| edit_conflict(id))?;
    tracing::info!(movie_id = movie.id, version = movie.version, "Movie updated");

    Ok(write_json(
        StatusCode::OK,
        Envelope::new().with("movie", &movie),
        None,
    )?)
}

/// DELETE /v1/movies/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let id = read_id_param(&raw_id)?;
    if !MovieRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(movie_id = id, "Movie deleted");

    Ok(write_json(
        StatusCode::OK,
        Envelope::new().with("message", "movie successfully deleted"),
        None,
    )?)
}
