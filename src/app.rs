use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::db::Gateway;
use crate::handlers;
use crate::handlers::resources::ResourceKind;
use crate::middleware::{require_admin, require_auth};

/// Everything handlers need, constructed once at startup and injected
/// into the router. No ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Gateway,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: AppConfig, gateway: Gateway) -> Self {
        let tokens = TokenService::new(&config.security);
        Self {
            config: Arc::new(config),
            gateway,
            tokens,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/jwt", post(handlers::token::issue))
        .route(
            "/api/users",
            get(handlers::users::list).post(handlers::users::register),
        )
        // Bearer-gated probes
        .merge(protected_routes(state.clone()))
        .with_state(state.clone());

    // Resource collections, each with its handle bound at registration
    for kind in ResourceKind::ALL {
        router = router.merge(handlers::resources::routes(&state.gateway, kind));
    }

    // Global middleware
    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn protected_routes(state: AppState) -> Router<AppState> {
    // Two-stage gate: require_auth wraps both routes, require_admin only
    // the admin probe.
    let admin = Router::new()
        .route("/api/admin", get(handlers::protected::admin))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    Router::new()
        .route("/api/protected", get(handlers::protected::whoami))
        .merge(admin)
        .route_layer(axum::middleware::from_fn_with_state(state, require_auth))
}

/// GET / - liveness text
async fn root(State(state): State<AppState>) -> String {
    format!("Portfolio is running on port {}", state.config.server.port)
}

/// GET /health - pings the document store
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.gateway.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded" })),
            )
        }
    }
}
