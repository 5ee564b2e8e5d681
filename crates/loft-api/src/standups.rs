use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use loft_types::api::{StandupSendRequest, StandupStartRequest, StandupStartResponse};

use crate::{ApiResult, AppState, Auth};

pub async fn start(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
    Json(req): Json<StandupStartRequest>,
) -> ApiResult<impl IntoResponse> {
    let time_finish = state.start_standup(auth.user_id, channel_id, req.length)?;
    Ok((
        StatusCode::CREATED,
        Json(StandupStartResponse { time_finish }),
    ))
}

pub async fn active(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.standup_active(auth.user_id, channel_id)?))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
    Json(req): Json<StandupSendRequest>,
) -> ApiResult<impl IntoResponse> {
    state.standup_send(auth.user_id, channel_id, &req.message)?;
    Ok(StatusCode::NO_CONTENT)
}
