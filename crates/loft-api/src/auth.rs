use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use loft_types::api::{LoginRequest, RegisterRequest};

use crate::middleware::bearer_token;
use crate::{ApiResult, AppState};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = state.register(&req.email, &req.password, &req.name_first, &req.name_last)?;
    Ok((StatusCode::CREATED, Json(auth)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = state.login(&req.email, &req.password)?;
    Ok(Json(auth))
}

/// Revokes exactly the presented token; other sessions stay valid.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let token = bearer_token(&headers)?;
    state.logout(token)?;
    Ok(StatusCode::NO_CONTENT)
}
