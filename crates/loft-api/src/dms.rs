use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use loft_types::api::{
    DmCreateRequest, DmCreateResponse, MessagesQuery, SendLaterRequest, SendMessageRequest,
    SendMessageResponse,
};
use loft_types::ContainerId;

use crate::{ApiResult, AppState, Auth};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<DmCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let dm_id = state.create_dm(auth.user_id, &req.user_ids)?;
    Ok((StatusCode::CREATED, Json(DmCreateResponse { dm_id })))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.list_dms(auth.user_id)?))
}

pub async fn details(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(dm_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.dm_details(auth.user_id, dm_id)?))
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(dm_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    state.leave_dm(auth.user_id, dm_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(dm_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    state.remove_dm(auth.user_id, dm_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(dm_id): Path<u64>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.get_messages(
        auth.user_id,
        ContainerId::Dm(dm_id),
        query.start,
    )?))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(dm_id): Path<u64>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id = state.send_message(auth.user_id, ContainerId::Dm(dm_id), &req.message)?;
    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse { message_id }),
    ))
}

pub async fn send_later(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(dm_id): Path<u64>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id = state.send_later(
        auth.user_id,
        ContainerId::Dm(dm_id),
        &req.message,
        req.time_sent,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse { message_id }),
    ))
}
