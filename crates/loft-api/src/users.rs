use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use loft_types::api::{SetEmailRequest, SetHandleRequest, SetNameRequest};

use crate::{ApiResult, AppState, Auth};

pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.all_users()?))
}

pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.user_profile(user_id)?))
}

pub async fn set_name(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<SetNameRequest>,
) -> ApiResult<impl IntoResponse> {
    state.set_name(auth.user_id, &req.name_first, &req.name_last)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_email(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<impl IntoResponse> {
    state.set_email(auth.user_id, &req.email)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_handle(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<SetHandleRequest>,
) -> ApiResult<impl IntoResponse> {
    state.set_handle(auth.user_id, &req.handle)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.user_stats(auth.user_id)?))
}
