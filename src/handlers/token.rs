use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// POST /jwt - issue a bearer token for the submitted user object.
///
/// Only the standardized minimal claims `{email, role}` are embedded,
/// never the full submitted body.
pub async fn issue(
    State(state): State<AppState>,
    Json(user): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let email = user
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("email is required"))?;
    let role = user.get("role").and_then(Value::as_str);

    let token = state.tokens.issue(email, role)?;
    Ok(Json(json!({ "token": token })))
}
