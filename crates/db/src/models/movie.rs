//! Movie row mapping and list query parameters.

use greenlight_core::movie::Movie;
use greenlight_core::runtime::Runtime;
use greenlight_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `movies` table.
#[derive(Debug, Clone, FromRow)]
pub struct MovieRow {
    pub id: DbId,
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
    pub version: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            year: row.year,
            runtime: Runtime(row.runtime),
            genres: Some(row.genres),
            version: row.version,
        }
    }
}

/// A movie row carrying the window-function total used for pagination.
#[derive(Debug, Clone, FromRow)]
pub struct MovieListRow {
    pub total_records: i64,
    #[sqlx(flatten)]
    pub movie: MovieRow,
}

/// Search criteria for listing movies. Empty values match everything.
#[derive(Debug, Clone, Default)]
pub struct MovieListQuery {
    /// Matched word-by-word against the title, case-insensitive.
    pub title: String,
    /// A movie must carry every listed genre.
    pub genres: Vec<String>,
}
