use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::service::VideoService;

/// A stored video record, as returned by every `/video/{id}` endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

impl Video {
    pub fn new(id: i64, fields: VideoFields) -> Self {
        Self {
            id,
            name: fields.name,
            views: fields.views,
            likes: fields.likes,
        }
    }
}

/// The mutable attributes of a video, replaced as a whole on create and update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFields {
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

/// Title and statistics looked up on YouTube. Never stored on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub views: i64,
    pub likes: i64,
}

impl From<VideoMetadata> for VideoFields {
    fn from(metadata: VideoMetadata) -> Self {
        Self {
            name: metadata.title,
            views: metadata.views,
            likes: metadata.likes,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: VideoService,
    pub config: Config,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
