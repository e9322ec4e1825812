// Router-level tests for the auth gate and public surface. These drive
// the real router with oneshot requests; none of the paths exercised
// here reach the database, so the gateway pool is built lazily.
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use portfolio_api::app::{app, AppState};
use portfolio_api::config::{AppConfig, DatabaseConfig, SecurityConfig, ServerConfig};
use portfolio_api::db::Gateway;

fn test_app() -> Router {
    let config = AppConfig {
        server: ServerConfig { port: 5000 },
        database: DatabaseConfig {
            // Never connected to; lazy pool only.
            url: "postgres://postgres@127.0.0.1:1/unused".to_string(),
            max_connections: 1,
            connect_timeout_secs: 1,
        },
        security: SecurityConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_ttl_secs: 3600,
        },
    };
    let gateway = Gateway::connect_lazy(&config.database).expect("lazy pool");
    app(AppState::new(config, gateway))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize")))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn liveness_returns_text() {
    let response = test_app().oneshot(get("/")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(text.contains("Portfolio is running"));
}

#[tokio::test]
async fn protected_requires_bearer_token() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(get("/api/protected"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "unauthorized access");

    // Wrong scheme
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/protected")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let response = app
        .oneshot(get_with_bearer("/api/protected", "not.a.token"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn issued_token_grants_protected_access() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/jwt",
            &json!({ "email": "ada@example.com", "role": "admin" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["token"].as_str().expect("token string").to_string();

    let response = app
        .oneshot(get_with_bearer("/api/protected", &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Access granted");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn token_issuance_requires_email() {
    let response = test_app()
        .oneshot(post_json("/jwt", &json!({ "role": "admin" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_route_requires_authentication_first() {
    let response = test_app()
        .oneshot(get("/api/admin"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_resource_is_not_routed() {
    let response = test_app()
        .oneshot(get("/api/nonexistent"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_rejects_submissions() {
    let response = test_app()
        .oneshot(post_json("/api/stats", &json!({ "visitors": 1 })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn contact_has_no_item_routes() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/api/contact/00000000-0000-0000-0000-000000000000")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
