use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::app::AppState;
use crate::db::USERS_COLLECTION;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Admin stage: requires the authentication stage to have already run.
/// Looks the caller up in the users collection by email on every request
/// (no caching) and fails 403 unless the stored role is "admin".
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("authentication required before admin check"))?;

    let user = state
        .gateway
        .collection(USERS_COLLECTION)
        .find_one_by("email", &auth_user.email)
        .await
        .map_err(|e| {
            tracing::error!("role lookup failed for '{}': {}", auth_user.email, e);
            ApiError::internal_server_error("Failed to verify role")
        })?;

    if !has_admin_role(user.as_ref()) {
        tracing::warn!("admin access denied for '{}'", auth_user.email);
        return Err(ApiError::forbidden("forbidden access"));
    }

    Ok(next.run(request).await)
}

/// A caller is admin only if a stored user document says so; token claims
/// alone are never trusted for the elevated role.
fn has_admin_role(user: Option<&Value>) -> bool {
    user.and_then(|doc| doc.get("role"))
        .and_then(Value::as_str)
        .map(|role| role == "admin")
        .unwrap_or(false)
}
