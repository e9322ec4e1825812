use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /api/protected - returns the decoded identity when the bearer
/// token is valid; the auth middleware has already rejected everything
/// else.
pub async fn whoami(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "message": "Access granted",
        "user": { "email": user.email, "role": user.role }
    }))
}

/// GET /api/admin - reachable only through the composed auth + admin
/// chain; confirms the caller holds the elevated role.
pub async fn admin(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({ "admin": true, "email": user.email }))
}
