// YouTube Data API client
// Looks up title and statistics for a single video ID

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::YoutubeConfig;
use crate::models::VideoMetadata;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no video found for id {0}")]
    NotFound(String),

    #[error("YouTube API key is not configured")]
    MissingApiKey,

    #[error("request to YouTube failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed YouTube response: {0}")]
    Malformed(String),
}

/// Source of metadata for a canonical video ID.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<VideoMetadata, FetchError>;
}

pub struct YoutubeClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YoutubeClient {
    pub fn new(config: &YoutubeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MetadataSource for YoutubeClient {
    async fn fetch(&self, video_id: &str) -> Result<VideoMetadata, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;

        debug!("[youtube] Looking up video {}", video_id);

        let response = self
            .http
            .get(format!("{}/videos", self.base_url))
            .query(&[
                ("part", "snippet,statistics"),
                ("id", video_id),
                ("key", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body: VideoListResponse = response.json().await?;
        into_metadata(body, video_id)
    }
}

/// Map the first returned item onto [`VideoMetadata`].
///
/// Absent counts default to zero; a count that is present but not an
/// integer makes the whole lookup fail.
fn into_metadata(body: VideoListResponse, video_id: &str) -> Result<VideoMetadata, FetchError> {
    let item = body
        .items
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::NotFound(video_id.to_string()))?;

    let title = item
        .snippet
        .and_then(|s| s.title)
        .ok_or_else(|| FetchError::Malformed("missing snippet.title".to_string()))?;

    let statistics = item.statistics.unwrap_or_default();

    Ok(VideoMetadata {
        title,
        views: parse_count("viewCount", statistics.view_count)?,
        likes: parse_count("likeCount", statistics.like_count)?,
    })
}

fn parse_count(field: &str, value: Option<Count>) -> Result<i64, FetchError> {
    match value {
        None => Ok(0),
        Some(Count::Number(n)) => Ok(n),
        Some(Count::Text(text)) => text
            .trim()
            .parse()
            .map_err(|_| FetchError::Malformed(format!("{} is not an integer: {:?}", field, text))),
    }
}

// YouTube API response structures
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Option<Snippet>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<Count>,
    #[serde(rename = "likeCount")]
    like_count: Option<Count>,
}

/// The API sends counts as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(i64),
    Text(String),
}
