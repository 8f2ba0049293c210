//! The `Movie` catalog entry and its validation rules.

use chrono::Datelike;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use validator::ValidateLength;

use crate::runtime::Runtime;
use crate::types::{DbId, Timestamp};
use crate::validator::{unique, FieldErrors, Validator};

/// Maximum title length in bytes.
pub const MAX_TITLE_BYTES: usize = 500;

/// Year of the earliest surviving motion picture.
pub const MIN_YEAR: i32 = 1888;

pub const MIN_GENRES: u64 = 1;
pub const MAX_GENRES: u64 = 5;

static NO_GENRES: Vec<String> = Vec::new();

/// A single catalog entry.
///
/// `id`, `created_at` and `version` are owned by the persistence layer.
/// `genres` distinguishes "absent" (`None`) from "present but empty".
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: DbId,
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Option<Vec<String>>,
    /// Optimistic-concurrency token, starts at 1.
    pub version: i32,
}

impl Movie {
    /// Run every movie rule against the current calendar year and return the
    /// failing fields. An empty map means the movie is valid.
    pub fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        validate_movie(&mut v, self);
        v.into_errors()
    }
}

/// Record every rule violation for `movie` in `v`.
pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    validate_movie_at(v, movie, chrono::Utc::now().year());
}

/// Same as [`validate_movie`] with an explicit upper bound for `year`.
///
/// Rules run in a fixed order and never short-circuit, so the message a field
/// ends up with is the first failing rule for that field.
pub fn validate_movie_at(v: &mut Validator, movie: &Movie, current_year: i32) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(movie.year >= MIN_YEAR, "year", "must be greater than 1888");
    v.check(movie.year <= current_year, "year", "must not be in the future");

    v.check(!movie.runtime.is_zero(), "runtime", "must be provided");
    v.check(
        movie.runtime.minutes() > 0,
        "runtime",
        "must be a positive integer",
    );

    let genres = movie.genres.as_ref().unwrap_or(&NO_GENRES);
    v.check(movie.genres.is_some(), "genres", "must be provided");
    v.check(
        genres.validate_length(Some(MIN_GENRES), None, None),
        "genres",
        "must contain at least 1 genre",
    );
    v.check(
        genres.validate_length(None, Some(MAX_GENRES), None),
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(unique(genres), "genres", "must not contain duplicate values");
}

impl Serialize for Movie {
    /// Field-by-field encoding: `created_at` is never written, `year`,
    /// `runtime` and `genres` are omitted when zero or empty.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let genres = self.genres.as_deref().filter(|g| !g.is_empty());
        let len = 3
            + usize::from(self.year != 0)
            + usize::from(!self.runtime.is_zero())
            + usize::from(genres.is_some());

        let mut state = serializer.serialize_struct("Movie", len)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        if self.year != 0 {
            state.serialize_field("year", &self.year)?;
        } else {
            state.skip_field("year")?;
        }
        if self.runtime.is_zero() {
            state.skip_field("runtime")?;
        } else {
            state.serialize_field("runtime", &self.runtime)?;
        }
        match genres {
            Some(genres) => state.serialize_field("genres", genres)?,
            None => state.skip_field("genres")?,
        }
        state.serialize_field("version", &self.version)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const THIS_YEAR: i32 = 2024;

    fn movie(title: &str, year: i32, runtime: i32, genres: Option<&[&str]>) -> Movie {
        Movie {
            id: 1,
            created_at: chrono::Utc::now(),
            title: title.to_string(),
            year,
            runtime: Runtime(runtime),
            genres: genres.map(|g| g.iter().map(|s| s.to_string()).collect()),
            version: 1,
        }
    }

    fn errors_for(m: &Movie) -> FieldErrors {
        let mut v = Validator::new();
        validate_movie_at(&mut v, m, THIS_YEAR);
        v.into_errors()
    }

    fn expected(pairs: &[(&str, &str)]) -> FieldErrors {
        pairs
            .iter()
            .map(|(k, m)| (k.to_string(), m.to_string()))
            .collect()
    }

    // -- Validation --------------------------------------------------------

    #[test]
    fn valid_movie_has_no_errors() {
        let m = movie("Casablanca", 1942, 102, Some(&["drama", "romance"]));
        assert!(errors_for(&m).is_empty());
    }

    #[test]
    fn empty_title_is_reported_once() {
        let m = movie("", 2020, 90, Some(&["drama"]));
        assert_eq!(errors_for(&m), expected(&[("title", "must be provided")]));
    }

    #[test]
    fn title_length_is_measured_in_bytes() {
        let at_limit = movie(&"a".repeat(500), 2020, 90, Some(&["drama"]));
        assert!(errors_for(&at_limit).is_empty());

        // 250 two-byte characters sit exactly on the limit; one more is over.
        let multibyte = movie(&"é".repeat(251), 2020, 90, Some(&["drama"]));
        assert_eq!(
            errors_for(&multibyte),
            expected(&[("title", "must not be more than 500 bytes long")])
        );
    }

    #[test]
    fn year_before_first_film() {
        let m = movie("Up", 1700, 90, Some(&["drama"]));
        assert_eq!(
            errors_for(&m),
            expected(&[("year", "must be greater than 1888")])
        );
    }

    #[test]
    fn zero_year_reports_missing_not_range() {
        let m = movie("Up", 0, 90, Some(&["drama"]));
        assert_eq!(errors_for(&m), expected(&[("year", "must be provided")]));
    }

    #[test]
    fn future_year_is_rejected() {
        let m = movie("Up", THIS_YEAR + 1, 90, Some(&["drama"]));
        assert_eq!(
            errors_for(&m),
            expected(&[("year", "must not be in the future")])
        );
    }

    #[test]
    fn year_range_boundaries_are_inclusive() {
        for year in [MIN_YEAR, 1950, THIS_YEAR] {
            let m = movie("Up", year, 90, Some(&["drama"]));
            assert!(!errors_for(&m).contains_key("year"), "year {year}");
        }
    }

    #[test]
    fn runtime_rules() {
        let zero = movie("Up", 2009, 0, Some(&["animation"]));
        assert_eq!(errors_for(&zero), expected(&[("runtime", "must be provided")]));

        let negative = movie("Up", 2009, -10, Some(&["animation"]));
        assert_eq!(
            errors_for(&negative),
            expected(&[("runtime", "must be a positive integer")])
        );
    }

    #[test]
    fn missing_genres_report_provided_first() {
        let m = movie("Up", 2009, 96, None);
        assert_eq!(errors_for(&m), expected(&[("genres", "must be provided")]));
    }

    #[test]
    fn empty_genres_need_at_least_one() {
        let m = movie("Up", 2009, 96, Some(&[]));
        assert_eq!(
            errors_for(&m),
            expected(&[("genres", "must contain at least 1 genre")])
        );
    }

    #[test]
    fn too_many_genres() {
        let m = movie("Up", 2009, 96, Some(&["a", "b", "c", "d", "e", "f"]));
        assert_eq!(
            errors_for(&m),
            expected(&[("genres", "must not contain more than 5 genres")])
        );
    }

    #[test]
    fn duplicate_genres_reported_for_any_allowed_size() {
        let cases: [&[&str]; 3] = [&["a", "a"], &["a", "b", "a"], &["a", "b", "c", "d", "b"]];
        for genres in cases {
            let m = movie("Up", 2020, 96, Some(genres));
            assert_eq!(
                errors_for(&m),
                expected(&[("genres", "must not contain duplicate values")]),
                "genres {genres:?}"
            );
        }
    }

    #[test]
    fn every_field_accumulates_independently() {
        let m = movie("", 0, 0, None);
        assert_eq!(
            errors_for(&m),
            expected(&[
                ("genres", "must be provided"),
                ("runtime", "must be provided"),
                ("title", "must be provided"),
                ("year", "must be provided"),
            ])
        );
    }

    #[test]
    fn validate_is_idempotent() {
        let m = movie("", 1700, -1, Some(&["x", "x"]));
        assert_eq!(m.validate(), m.validate());
    }

    #[test]
    fn validate_uses_the_current_year() {
        let this_year = chrono::Utc::now().year();
        let m = movie("Up", this_year, 96, Some(&["animation"]));
        assert!(m.validate().is_empty());

        let next = movie("Up", this_year + 1, 96, Some(&["animation"]));
        assert_eq!(
            next.validate(),
            expected(&[("year", "must not be in the future")])
        );
    }

    // -- Serialization -----------------------------------------------------

    #[test]
    fn serializes_every_populated_field_except_created_at() {
        let m = movie("Up", 2009, 97, Some(&["animation", "adventure"]));
        let json = serde_json::to_value(&m).unwrap();

        assert_eq!(
            json,
            json!({
                "id": 1,
                "title": "Up",
                "year": 2009,
                "runtime": "97 mins",
                "genres": ["animation", "adventure"],
                "version": 1,
            })
        );
    }

    #[test]
    fn omits_zero_and_empty_fields() {
        let m = movie("Up", 0, 0, Some(&[]));
        let json = serde_json::to_value(&m).unwrap();

        assert_eq!(json, json!({ "id": 1, "title": "Up", "version": 1 }));
    }

    #[test]
    fn omits_absent_genres() {
        let m = movie("Up", 2009, 97, None);
        let json = serde_json::to_value(&m).unwrap();

        assert!(json.get("genres").is_none());
        assert_eq!(json["runtime"], "97 mins");
    }

    #[test]
    fn preserves_struct_field_order() {
        let m = movie("Up", 2009, 97, Some(&["animation"]));
        let text = serde_json::to_string(&m).unwrap();

        assert_eq!(
            text,
            r#"{"id":1,"title":"Up","year":2009,"runtime":"97 mins","genres":["animation"],"version":1}"#
        );
    }
}
