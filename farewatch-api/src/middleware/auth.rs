use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Scheduler-facing auth: the run triggers carry a static bearer token
/// compared against config. There are no per-user sessions here.
pub async fn trigger_auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    // 2. Constant token comparison against config
    if token != state.auth.trigger_token {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}
