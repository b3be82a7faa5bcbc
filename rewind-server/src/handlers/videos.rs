//! Catalog endpoints backing the progress API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rewind_model::{ApiResponse, Video, VideoID};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    pub duration_seconds: u64,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// List all published videos
pub async fn list_videos_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Video>>>> {
    let videos = state.catalog.list_published().await?;
    Ok(Json(ApiResponse::success(videos)))
}

/// Get one video by id
pub async fn get_video_handler(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Video>>> {
    let video = state
        .catalog
        .lookup(VideoID(video_id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("video not found: {video_id}")))?;
    Ok(Json(ApiResponse::success(video)))
}

/// Register a video with the catalog
pub async fn create_video_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateVideoRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Video>>)> {
    if request.title.trim().is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    if request.duration_seconds == 0 {
        return Err(AppError::bad_request("duration_seconds must be positive"));
    }

    let mut video = Video::new(request.title, request.url, request.duration_seconds);
    video.description = request.description;
    video.thumbnail = request.thumbnail;

    state.catalog.insert(video.clone()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(video))))
}
