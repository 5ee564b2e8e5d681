use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use loft_types::api::{
    ChannelCreateRequest, ChannelCreateResponse, InviteRequest, MessagesQuery, OwnerRequest,
    SendLaterRequest, SendMessageRequest, SendMessageResponse,
};
use loft_types::ContainerId;

use crate::{ApiResult, AppState, Auth};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<ChannelCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let channel_id = state.create_channel(auth.user_id, &req.name, req.is_public)?;
    Ok((
        StatusCode::CREATED,
        Json(ChannelCreateResponse { channel_id }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.list_channels(auth.user_id)?))
}

pub async fn list_all(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.list_all_channels()?))
}

pub async fn details(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.channel_details(auth.user_id, channel_id)?))
}

pub async fn join(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    state.join_channel(auth.user_id, channel_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn invite(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
    Json(req): Json<InviteRequest>,
) -> ApiResult<impl IntoResponse> {
    state.invite_to_channel(auth.user_id, channel_id, req.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    state.leave_channel(auth.user_id, channel_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_owner(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
    Json(req): Json<OwnerRequest>,
) -> ApiResult<impl IntoResponse> {
    state.add_channel_owner(auth.user_id, channel_id, req.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_owner(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path((channel_id, user_id)): Path<(u64, u64)>,
) -> ApiResult<impl IntoResponse> {
    state.remove_channel_owner(auth.user_id, channel_id, user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.get_messages(
        auth.user_id,
        ContainerId::Channel(channel_id),
        query.start,
    )?))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id =
        state.send_message(auth.user_id, ContainerId::Channel(channel_id), &req.message)?;
    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse { message_id }),
    ))
}

pub async fn send_later(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(channel_id): Path<u64>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id = state.send_later(
        auth.user_id,
        ContainerId::Channel(channel_id),
        &req.message,
        req.time_sent,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse { message_id }),
    ))
}
