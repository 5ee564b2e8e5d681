use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};

use loft_types::api::SearchQuery;

use crate::{ApiResult, AppState, Auth};

pub async fn notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.notifications(auth.user_id)?))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.search(auth.user_id, &query.query)?))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace_stats()?))
}
