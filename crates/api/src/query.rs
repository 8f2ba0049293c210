//! Query-string parsing for list endpoints.

use greenlight_core::filters::{Filters, MOVIE_SORT_SAFELIST};
use greenlight_core::validator::Validator;
use greenlight_db::models::movie::MovieListQuery;
use serde::Deserialize;

/// Raw `GET /v1/movies` parameters.
///
/// Everything arrives as text so that malformed integers can be reported as
/// field errors rather than a blanket 400.
#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesParams {
    pub title: Option<String>,
    /// Comma-separated.
    pub genres: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

impl ListMoviesParams {
    /// Split the parameters into search criteria and paging filters,
    /// recording unparseable integers in `v`.
    pub fn parse(self, v: &mut Validator) -> (MovieListQuery, Filters) {
        let defaults = Filters::new(MOVIE_SORT_SAFELIST);

        let search = MovieListQuery {
            title: self.title.unwrap_or_default(),
            genres: read_csv(self.genres.as_deref()),
        };
        let filters = Filters {
            page: read_int(v, self.page.as_deref(), "page", defaults.page),
            page_size: read_int(v, self.page_size.as_deref(), "page_size", defaults.page_size),
            sort: self
                .sort
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.sort),
            sort_safelist: MOVIE_SORT_SAFELIST,
        };

        (search, filters)
    }
}

fn read_csv(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_int(v: &mut Validator, value: Option<&str>, key: &str, default: i64) -> i64 {
    match value {
        None | Some("") => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            v.add_error(key, "must be an integer value");
            default
        }),
    }
}
