use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::db::{GatewayError, USERS_COLLECTION};
use crate::error::ApiError;

/// GET /api/users - list registered users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let users = state.gateway.collection(USERS_COLLECTION).find_all().await?;
    Ok(Json(users))
}

/// POST /api/users - register a new user.
///
/// Email is the natural key; uniqueness is enforced by the storage layer's
/// unique index, so concurrent duplicate registrations resolve atomically
/// to one 201 and one 409.
pub async fn register(
    State(state): State<AppState>,
    Json(user): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = user
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("email is required"))?
        .to_string();
    let role = user.get("role").and_then(Value::as_str).map(str::to_string);

    let id = match state
        .gateway
        .collection(USERS_COLLECTION)
        .insert_unique("email", user)
        .await
    {
        Ok(id) => id,
        Err(GatewayError::DuplicateKey(_)) => {
            return Err(ApiError::conflict("User Already Exists"));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.tokens.issue(&email, role.as_deref())?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "insertedId": id, "token": token })),
    ))
}
