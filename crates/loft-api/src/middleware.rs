use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use loft_types::LoftError;

use crate::{ApiError, AppState, Auth};

/// The one canonical session-to-identity step. Resolves the Bearer token
/// against the store's session map and stashes the user id for handlers;
/// anything wrong with the credential is an access failure, checked before
/// any handler sees the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = {
        let token = bearer_token(req.headers())?;
        state.resolve_session(token)?
    };
    req.extensions_mut().insert(Auth { user_id });
    Ok(next.run(req).await)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::from(LoftError::access("missing bearer token")))
}
