//! Watch-progress endpoints
//!
//! Thin translation between HTTP and [`rewind_core::ProgressReducer`]; no
//! interval or metric logic lives here.

use axum::{
    Json,
    extract::{Path, State},
};
use rewind_model::{
    ApiResponse, UpdateProgressRequest, ViewerID, VideoID, ViewerProgressEntry, WatchRecord,
};
use uuid::Uuid;

use crate::errors::AppResult;
use crate::state::AppState;

/// Get a viewer's progress across all videos
///
/// # Response
///
/// Records joined with catalog title/thumbnail/duration, one entry per video
/// the viewer has touched.
pub async fn get_viewer_progress_handler(
    State(state): State<AppState>,
    Path(viewer_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<ViewerProgressEntry>>>> {
    let entries = state.reducer.list_for_viewer(ViewerID(viewer_id)).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// Get a viewer's progress for one video
///
/// Creates the record with default (empty) fields on first access, so the
/// player can always rely on a resume position being present.
///
/// # Response
///
/// - `200 OK` with the watch record
/// - `404 Not Found` when the video is unknown to the catalog
pub async fn get_video_progress_handler(
    State(state): State<AppState>,
    Path((viewer_id, video_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<WatchRecord>>> {
    let record = state
        .reducer
        .get_or_create(ViewerID(viewer_id), VideoID(video_id))
        .await?;
    Ok(Json(ApiResponse::success(record)))
}

/// Apply a progress update
///
/// # Request
///
/// ```json
/// {
///   "intervals": [{ "start": 30, "end": 74 }],
///   "current_time": 74
/// }
/// ```
///
/// Either field may be omitted: intervals alone merge coverage, a bare
/// `current_time` (zero included) is a position-only heartbeat, and an empty
/// body is a no-op.
///
/// # Response
///
/// - `200 OK` with the updated record
/// - `400 Bad Request` when an interval has `end < start` or the video has a
///   zero duration
/// - `404 Not Found` when the video is unknown to the catalog
/// - `409 Conflict` when concurrent writers exhaust the reconciliation
///   retries (transient; clients may simply resend)
pub async fn update_progress_handler(
    State(state): State<AppState>,
    Path((viewer_id, video_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<UpdateProgressRequest>,
) -> AppResult<Json<ApiResponse<WatchRecord>>> {
    let record = state
        .reducer
        .apply_update(ViewerID(viewer_id), VideoID(video_id), update)
        .await?;
    Ok(Json(ApiResponse::success(record)))
}

/// Reset a viewer's progress for one video to creation defaults
///
/// # Response
///
/// - `200 OK` with the cleared record
/// - `404 Not Found` when no record exists yet
pub async fn reset_progress_handler(
    State(state): State<AppState>,
    Path((viewer_id, video_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<WatchRecord>>> {
    let record = state
        .reducer
        .reset(ViewerID(viewer_id), VideoID(video_id))
        .await?;
    Ok(Json(ApiResponse::success(record)))
}
