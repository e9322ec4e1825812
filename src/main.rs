use portfolio_api::app::{app, AppState};
use portfolio_api::config::AppConfig;
use portfolio_api::db::Gateway;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let port = config.server.port;

    // A gateway that cannot connect is fatal; exit instead of serving
    // with broken routes.
    let gateway = match Gateway::connect(&config.database).await {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!("failed to connect to document store: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(config, gateway);
    let bind_addr = format!("0.0.0.0:{}", port);

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Portfolio is running on port {}", port);

    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}
