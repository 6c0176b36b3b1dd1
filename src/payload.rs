use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
};
use bytes::Bytes;
use serde_json::Value;
use url::form_urlencoded;

use crate::error::ApiError;
use crate::models::VideoFields;

const NAME_HELP: &str = "Name of the video is required";
const VIEWS_HELP: &str = "Number of views is required";
const LIKES_HELP: &str = "Number of likes is required";

/// Raw arguments of a `PUT`/`PATCH` request.
///
/// Collected from the query string first, then from a JSON or
/// urlencoded form body; body values win on conflict.
#[derive(Debug, Default)]
pub struct VideoArgs {
    values: HashMap<String, Value>,
}

impl VideoArgs {
    pub fn from_parts(query: Option<&str>, content_type: Option<&str>, body: &[u8]) -> Self {
        let mut values: HashMap<String, Value> = query
            .map(|q| form_pairs(q.as_bytes()))
            .unwrap_or_default();

        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match mime.as_deref() {
            Some("application/json") => {
                // A body that is not a JSON object counts as empty
                if let Ok(object) = serde_json::from_slice::<serde_json::Map<String, Value>>(body) {
                    values.extend(object);
                }
            }
            Some("application/x-www-form-urlencoded") => values.extend(form_pairs(body)),
            _ => {}
        }

        Self { values }
    }

    /// Validate name, views and likes, reporting the first bad field.
    pub fn video_fields(&self) -> Result<VideoFields, ApiError> {
        let name = self.name().ok_or(ApiError::Validation {
            field: "name",
            help: NAME_HELP,
        })?;
        let views = self.count("views").ok_or(ApiError::Validation {
            field: "views",
            help: VIEWS_HELP,
        })?;
        let likes = self.count("likes").ok_or(ApiError::Validation {
            field: "likes",
            help: LIKES_HELP,
        })?;

        Ok(VideoFields { name, views, likes })
    }

    /// The optional source URL; blank counts as absent.
    pub fn youtube_url(&self) -> Option<&str> {
        match self.values.get("youtube_url") {
            Some(Value::String(url)) if !url.trim().is_empty() => Some(url.trim()),
            _ => None,
        }
    }

    fn name(&self) -> Option<String> {
        match self.values.get("name")? {
            Value::String(name) => Some(name.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn count(&self, key: &str) -> Option<i64> {
        let count = match self.values.get(key)? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };

        (count >= 0).then_some(count)
    }
}

fn form_pairs(input: &[u8]) -> HashMap<String, Value> {
    form_urlencoded::parse(input)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

#[async_trait]
impl<S> FromRequest<S> for VideoArgs
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = request.uri().query().map(str::to_string);
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Bytes honours the router's DefaultBodyLimit
        let body = Bytes::from_request(request, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge(rejection.body_text())
            } else {
                ApiError::BadRequest(format!("Failed to read request: {}", rejection.body_text()))
            }
        })?;

        Ok(Self::from_parts(query.as_deref(), content_type.as_deref(), &body))
    }
}
