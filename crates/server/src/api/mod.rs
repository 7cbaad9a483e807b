pub mod media;
pub mod songs;

use axum::{response::IntoResponse, routing::get, Json, Router};

use crate::state::{AppState, HealthResponse};

/// Song routes are served at the root and again under `/api`, which is where
/// the web player looks for them.
pub fn api_router(state: AppState) -> Router {
    let songs = Router::new()
        .route("/songs", get(songs::list_songs))
        .route("/songs/search", get(songs::search_songs))
        .route("/audio/:hash", get(media::get_audio))
        .route("/image/:hash", get(media::get_image));

    Router::new()
        .route("/health", get(health))
        .merge(songs.clone())
        .nest("/api", songs)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
