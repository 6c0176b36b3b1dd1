use crate::{
    error::ApiError,
    models::{AppState, Video},
    payload::VideoArgs,
};
use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;

pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let body_limit = state.config.max_body_size;

    Router::new()
        .route(
            "/video/:id",
            get(get_video)
                .put(put_video)
                .patch(patch_video)
                .delete(delete_video),
        )
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// No video can live under an id that is not a plain run of digits;
/// signs such as `+5` or `-3` are rejected too.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// Fetch one video
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Video>, ApiError> {
    let id = parse_id(&id)?;
    let video = state.service.get(id).await?;
    Ok(Json(video))
}

/// Create a video, optionally filled from a YouTube URL
pub async fn put_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    args: VideoArgs,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let id = parse_id(&id)?;
    let fields = args.video_fields()?;

    let video = state.service.create(id, fields, args.youtube_url()).await?;

    info!("[PUT /video/{}] ✅ Created {:?}", id, video.name);
    Ok((StatusCode::CREATED, Json(video)))
}

/// Replace name, views and likes of an existing video
pub async fn patch_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    args: VideoArgs,
) -> Result<Json<Video>, ApiError> {
    let id = parse_id(&id)?;
    let fields = args.video_fields()?;

    let video = state.service.update(id, fields).await?;

    info!("[PATCH /video/{}] ✅ Updated {:?}", id, video.name);
    Ok(Json(video))
}

pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;

    info!("[DELETE /video/{}] ✅ Deleted", id);
    Ok(StatusCode::NO_CONTENT)
}
