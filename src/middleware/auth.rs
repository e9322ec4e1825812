use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::Claims;
use crate::error::ApiError;

/// Authenticated identity extracted from a verified bearer token and
/// attached to the request for downstream handlers.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: String,
    pub role: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Authentication stage: requires `Authorization: Bearer <token>`. A
/// missing header or failed verification fails with the same generic 401;
/// on success the decoded identity is inserted into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?.to_string();
    let claims = state.tokens.verify(&token)?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("unauthorized access"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("unauthorized access"))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("unauthorized access"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthorized("unauthorized access"));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_bearer_scheme() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert!(extract_bearer(&headers_with("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer(&headers_with("Bearer ")).is_err());
        assert!(extract_bearer(&headers_with("abc.def.ghi")).is_err());
    }
}
