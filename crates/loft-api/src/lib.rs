pub mod admin;
pub mod auth;
pub mod channels;
pub mod dms;
pub mod messages;
pub mod middleware;
pub mod standups;
pub mod users;
pub mod workspace;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use loft_types::api::ErrorResponse;
use loft_types::LoftError;

pub type AppState = Arc<loft_store::Store>;

/// Identity resolved by the auth middleware; every protected handler reads
/// it from request extensions.
#[derive(Debug, Clone, Copy)]
pub struct Auth {
    pub user_id: u64,
}

/// Boundary translation of domain errors: Input -> 400, Access -> 403,
/// Internal -> 500. Nothing else leaks through.
pub struct ApiError(LoftError);

impl From<LoftError> for ApiError {
    fn from(err: LoftError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            LoftError::Input(m) => (StatusCode::BAD_REQUEST, m),
            LoftError::Access(m) => (StatusCode::FORBIDDEN, m),
            LoftError::Internal(e) => {
                error!("internal error: {e:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
