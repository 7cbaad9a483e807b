use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::state::{AppState, SearchQuery};

/// Plain records, no index wrapper.
pub async fn list_songs(State(state): State<AppState>) -> Response {
    Json(state.index.records()).into_response()
}

pub async fn search_songs(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Response {
    Json(state.index.search(&params.q)).into_response()
}
