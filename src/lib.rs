pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{
    config::Settings,
    state::{AppState, Repositories},
    telemetry,
};
use crate::services::judge::Judge0Client;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;
    if settings.security().key_generated {
        tracing::warn!(
            "SECRET_KEY is not set; using a locally generated key, tokens signed elsewhere will be rejected"
        );
    }

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let judge = Judge0Client::from_settings(&settings)?;
    tracing::info!(
        judge_base_url = %settings.judge().base_url,
        rapidapi = settings.judge().uses_rapidapi(),
        timeout_seconds = settings.judge().request_timeout_seconds,
        "Judge client configured"
    );

    let repositories = Repositories::postgres(db_pool.clone());
    let state = AppState::new(settings, db_pool, repositories, Arc::new(judge));

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Procode grading API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}
