use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use loft_types::api::{
    EditMessageRequest, ReactRequest, SendMessageResponse, ShareMessageRequest,
};

use crate::{ApiResult, AppState, Auth};

pub async fn edit(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(message_id): Path<u64>,
    Json(req): Json<EditMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    state.edit_message(auth.user_id, message_id, &req.message)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(message_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    state.remove_message(auth.user_id, message_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn share(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<ShareMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id =
        state.share_message(auth.user_id, req.og_message_id, &req.message, req.target)?;
    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse { message_id }),
    ))
}

pub async fn react(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(message_id): Path<u64>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<impl IntoResponse> {
    state.react(auth.user_id, message_id, req.react_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unreact(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path((message_id, react_id)): Path<(u64, u64)>,
) -> ApiResult<impl IntoResponse> {
    state.unreact(auth.user_id, message_id, react_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn pin(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(message_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    state.pin_message(auth.user_id, message_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unpin(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(message_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    state.unpin_message(auth.user_id, message_id)?;
    Ok(StatusCode::NO_CONTENT)
}
