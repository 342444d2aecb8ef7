mod app;
mod auth;
mod config;
mod error;
mod market;
mod prices;
mod state;
mod store;
mod users;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "kuyumcu=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    if config.jwt.is_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using the development placeholder");
    }

    let app_state = AppState::init(config)?;

    if users::repo::ensure_admin(app_state.store.as_ref(), &app_state.config.admin).await? {
        tracing::info!(username = %app_state.config.admin.username, "bootstrap admin ready");
    }

    tracing::info!(
        ttl_ms = app_state.market.ttl().as_millis() as u64,
        db_file = %app_state.config.db_file.display(),
        "market cache and store configured"
    );

    let config = app_state.config.clone();
    let app = app::build_app(app_state)?;
    app::serve(app, &config).await
}
