use axum::{
    extract::{Path as AxumPath, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use tracing::{debug, warn};

use crate::state::AppState;
use crate::streaming::StreamError;
use crate::utils::json_error_response;

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

pub async fn get_audio(
    State(state): State<AppState>,
    AxumPath(hash): AxumPath<String>,
    headers: HeaderMap,
) -> Response {
    let path = match state.store.resolve(&hash) {
        Ok(path) => path,
        Err(err) => return json_error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };
    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    match state.streamer.serve(&path, range).await {
        Ok(response) => response,
        Err(err) => stream_error_response("audio", &hash, err),
    }
}

pub async fn get_image(
    State(state): State<AppState>,
    AxumPath(hash): AxumPath<String>,
) -> Response {
    let path = match state.store.resolve(&hash) {
        Ok(path) => path,
        Err(err) => return json_error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    match state.streamer.serve_fixed(&path, IMAGE_CONTENT_TYPE).await {
        Ok(response) => response,
        Err(err) => stream_error_response("image", &hash, err),
    }
}

fn stream_error_response(kind: &str, hash: &str, err: StreamError) -> Response {
    match err {
        StreamError::NotFound(path) => {
            debug!("{} {} missing at {}", kind, hash, path.display());
            json_error_response(StatusCode::NOT_FOUND, format!("{} file not found", kind))
        }
        StreamError::Internal(err) => {
            warn!("Failed to serve {} {}: {}", kind, hash, err);
            json_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} read error: {}", kind, err),
            )
        }
    }
}
