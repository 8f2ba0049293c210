//! Response envelope and JSON writer shared by every handler.
//!
//! Every body, success or error, is a single top-level JSON object built
//! from an [`Envelope`], e.g. `{"movie": {...}}` or `{"error": "..."}`.
//! Use [`write_json`] instead of ad-hoc `Json(json!({...}))` so status,
//! headers and body are always produced in the same order.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::{Map, Value};

/// Failure to turn an envelope into its wire form.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// A value could not be represented as JSON.
    #[error("failed to serialize envelope key {key:?}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level JSON object of a response body.
///
/// Values are converted to JSON as they are added. The first value that
/// cannot be converted is remembered and reported by [`write_json`], so a
/// handler can build the envelope fluently and handle failure once.
#[derive(Debug, Default)]
pub struct Envelope {
    entries: Map<String, Value>,
    failure: Option<ResponseError>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` under `key`, replacing any previous value for that key.
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.insert(key, value);
            }
            Err(source) => {
                if self.failure.is_none() {
                    self.failure = Some(ResponseError::Serialization { key, source });
                }
            }
        }
        self
    }

    /// Encode the envelope as indented JSON followed by a newline.
    pub fn into_json_bytes(self) -> Result<Vec<u8>, ResponseError> {
        if let Some(failure) = self.failure {
            return Err(failure);
        }
        let mut body = serde_json::to_vec_pretty(&self.entries).map_err(|source| {
            ResponseError::Serialization {
                key: String::new(),
                source,
            }
        })?;
        body.push(b'\n');
        Ok(body)
    }
}

/// Build a JSON response from `envelope`.
///
/// Headers are fully set before the status and body: caller-supplied
/// `headers` first, then `Content-Type: application/json`. Nothing is
/// produced when serialization fails; the caller must answer with a
/// generic server error instead.
pub fn write_json(
    status: StatusCode,
    envelope: Envelope,
    headers: Option<HeaderMap>,
) -> Result<Response, ResponseError> {
    let body = envelope.into_json_bytes()?;

    let mut response = Response::new(Body::empty());
    if let Some(headers) = headers {
        response.headers_mut().extend(headers);
    }
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *response.status_mut() = status;
    *response.body_mut() = Body::from(body);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::header::LOCATION;
    use greenlight_core::movie::Movie;
    use greenlight_core::runtime::Runtime;
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;

    struct Unrepresentable;

    impl Serialize for Unrepresentable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("unsupported type"))
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn encoded(envelope: Envelope) -> Value {
        serde_json::from_slice(&envelope.into_json_bytes().unwrap()).unwrap()
    }

    #[test]
    fn envelope_collects_values() {
        let envelope = Envelope::new()
            .with("status", "available")
            .with("count", 3);

        assert_eq!(encoded(envelope), json!({ "status": "available", "count": 3 }));
    }

    #[test]
    fn later_value_replaces_earlier_one() {
        let envelope = Envelope::new().with("k", 1).with("k", 2);
        assert_eq!(encoded(envelope), json!({ "k": 2 }));
    }

    #[test]
    fn unrepresentable_value_surfaces_as_serialization_error() {
        let envelope = Envelope::new()
            .with("ok", true)
            .with("bad", Unrepresentable)
            .with("also_bad", Unrepresentable);

        assert_matches!(
            write_json(StatusCode::OK, envelope, None),
            Err(ResponseError::Serialization { key, source }) => {
                assert_eq!(key, "bad");
                assert!(source.to_string().contains("unsupported type"));
            }
        );
    }

    #[tokio::test]
    async fn writes_status_content_type_and_body() {
        let envelope = Envelope::new().with("status", "available");
        let response = write_json(StatusCode::OK, envelope, None).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let text = body_text(response).await;
        assert!(text.ends_with('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({ "status": "available" }));
    }

    #[tokio::test]
    async fn applies_extra_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/v1/movies/7"));

        let response =
            write_json(StatusCode::CREATED, Envelope::new(), Some(headers)).unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[LOCATION], "/v1/movies/7");
        assert_eq!(body_text(response).await, "{}\n");
    }

    #[tokio::test]
    async fn valid_movie_is_written_with_its_present_fields() {
        let movie = Movie {
            id: 12,
            created_at: chrono::Utc::now(),
            title: "Casablanca".into(),
            year: 1942,
            runtime: Runtime(102),
            genres: Some(vec!["drama".into(), "romance".into()]),
            version: 1,
        };
        assert!(movie.validate().is_empty());

        let response =
            write_json(StatusCode::OK, Envelope::new().with("movie", &movie), None).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let parsed: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            parsed,
            json!({
                "movie": {
                    "id": 12,
                    "title": "Casablanca",
                    "year": 1942,
                    "runtime": "102 mins",
                    "genres": ["drama", "romance"],
                    "version": 1
                }
            })
        );
        assert!(parsed["movie"].get("created_at").is_none());
    }

    #[test]
    fn content_type_cannot_be_overridden_by_extra_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let response = write_json(StatusCode::OK, Envelope::new(), Some(headers)).unwrap();

        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }
}
