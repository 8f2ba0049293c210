//! Repository for the `movies` table.

use greenlight_core::filters::{Filters, Metadata};
use greenlight_core::movie::Movie;
use greenlight_core::types::DbId;
use sqlx::PgPool;

use crate::models::movie::{MovieListQuery, MovieListRow, MovieRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

/// Provides CRUD operations for movies.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a movie, returning the stored row with its assigned `id`,
    /// `created_at` and initial `version`.
    ///
    /// Only `title`, `year`, `runtime` and `genres` are read from `movie`.
    pub async fn insert(pool: &PgPool, movie: &Movie) -> Result<Movie, sqlx::Error> {
        let query = format!(
            "INSERT INTO movies (title, year, runtime, genres)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(movie.genres.as_deref().unwrap_or_default())
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Find a movie by ID. Non-positive IDs never match.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Movie>, sqlx::Error> {
        if id < 1 {
            return Ok(None);
        }
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    /// Overwrite the editable fields of `movie` and bump its version.
    ///
    /// The write only applies if the stored version still equals
    /// `movie.version`. Returns `None` when the row was deleted or changed
    /// since it was read.
    pub async fn update(pool: &PgPool, movie: &Movie) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!(
            "UPDATE movies SET
                title = $1,
                year = $2,
                runtime = $3,
                genres = $4,
                version = version + 1
             WHERE id = $5 AND version = $6
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(movie.genres.as_deref().unwrap_or_default())
            .bind(movie.id)
            .bind(movie.version)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    /// Delete a movie by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        if id < 1 {
            return Ok(false);
        }
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List one page of movies matching `search`, ordered per `filters`.
    ///
    /// `filters` is expected to have passed `validate_filters`; an unknown
    /// sort key falls back to `id`.
    pub async fn list(
        pool: &PgPool,
        search: &MovieListQuery,
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), sqlx::Error> {
        let column = filters.sort_column().unwrap_or("id");
        let direction = filters.sort_direction().as_sql();
        let query = format!(
            "SELECT count(*) OVER() AS total_records, {COLUMNS}
             FROM movies
             WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
               AND (genres @> $2 OR $2 = '{{}}')
             ORDER BY {column} {direction}, id ASC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, MovieListRow>(&query)
            .bind(&search.title)
            .bind(&search.genres)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(pool)
            .await?;

        let total_records = rows.first().map_or(0, |r| r.total_records);
        let metadata = Metadata::calculate(total_records, filters.page, filters.page_size);
        let movies = rows.into_iter().map(|r| r.movie.into()).collect();
        tracing::debug!(total_records, page = filters.page, "Listed movies");

        Ok((movies, metadata))
    }
}
