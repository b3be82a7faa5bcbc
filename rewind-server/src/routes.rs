use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers::{progress, videos};
use crate::state::AppState;

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Catalog endpoints
        .route("/videos", get(videos::list_videos_handler))
        .route("/videos", post(videos::create_video_handler))
        .route("/videos/{video_id}", get(videos::get_video_handler))
        // Watch-progress endpoints
        .route(
            "/progress/{viewer_id}",
            get(progress::get_viewer_progress_handler),
        )
        .route(
            "/progress/{viewer_id}/{video_id}",
            get(progress::get_video_progress_handler),
        )
        .route(
            "/progress/{viewer_id}/{video_id}",
            post(progress::update_progress_handler),
        )
        .route(
            "/progress/{viewer_id}/{video_id}",
            delete(progress::reset_progress_handler),
        )
}

/// Assemble the application router with the `/api/v1` prefix.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", create_v1_router())
        .with_state(state)
}
