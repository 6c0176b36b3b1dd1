use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Action, ApiError};
use crate::models::{Video, VideoFields};
use crate::store::{StoreError, VideoStore};
use crate::youtube::MetadataSource;
use crate::youtube_url;

/// Request handling for `/video/{id}`, composed from an injected store and
/// metadata source.
#[derive(Clone)]
pub struct VideoService {
    store: Arc<dyn VideoStore>,
    metadata: Arc<dyn MetadataSource>,
}

impl VideoService {
    pub fn new(store: Arc<dyn VideoStore>, metadata: Arc<dyn MetadataSource>) -> Self {
        Self { store, metadata }
    }

    pub async fn get(&self, id: i64) -> Result<Video, ApiError> {
        self.store
            .get(id)
            .await
            .map_err(|e| ApiError::storage(Action::Read, e))?
            .ok_or(ApiError::NotFound)
    }

    /// Create a video. When `youtube_url` resolves and the lookup succeeds,
    /// the fetched title and counts replace the caller's fields.
    pub async fn create(
        &self,
        id: i64,
        fields: VideoFields,
        youtube_url: Option<&str>,
    ) -> Result<Video, ApiError> {
        let fields = match youtube_url {
            Some(url) => self.lookup(url).await.unwrap_or(fields),
            None => fields,
        };

        self.store.create(id, fields).await.map_err(|e| match e {
            StoreError::AlreadyExists(_) => ApiError::Conflict,
            other => ApiError::storage(Action::Create, other),
        })
    }

    pub async fn update(&self, id: i64, fields: VideoFields) -> Result<Video, ApiError> {
        self.store.update(id, fields).await.map_err(|e| match e {
            StoreError::NotFound(_) => ApiError::NotFound,
            other => ApiError::storage(Action::Update, other),
        })
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.store.delete(id).await.map_err(|e| match e {
            StoreError::NotFound(_) => ApiError::NotFound,
            other => ApiError::storage(Action::Delete, other),
        })
    }

    /// Resolve and fetch; every failure means "keep the caller's fields".
    async fn lookup(&self, url: &str) -> Option<VideoFields> {
        let Some(video_id) = youtube_url::resolve(url) else {
            info!("[youtube] No video id in {:?}, using submitted fields", url);
            return None;
        };

        match self.metadata.fetch(&video_id).await {
            Ok(metadata) => {
                info!(
                    "[youtube] ✅ {} -> {:?} ({} views, {} likes)",
                    video_id, metadata.title, metadata.views, metadata.likes
                );
                Some(metadata.into())
            }
            Err(e) => {
                warn!("[youtube] Lookup for {} failed, using submitted fields: {}", video_id, e);
                None
            }
        }
    }
}
