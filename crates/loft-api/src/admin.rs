use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use loft_types::api::PermissionChangeRequest;

use crate::{ApiResult, AppState, Auth};

pub async fn remove_user(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(user_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    state.admin_remove_user(auth.user_id, user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_permission(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(user_id): Path<u64>,
    Json(req): Json<PermissionChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    state.admin_set_permission(auth.user_id, user_id, req.permission_id)?;
    Ok(StatusCode::NO_CONTENT)
}
