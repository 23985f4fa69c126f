//! RYZE API 服务入口

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ryze_adapter_postgres::{MigrationManager, PostgresConfig, PostgresHealthCheck, create_pool};
use ryze_api::api::{AppState, Repositories, RouterOptions, build_router};
use ryze_api::infrastructure::migrations;
use ryze_auth_core::TokenService;
use ryze_common::{RetryConfig, with_retry};
use ryze_config::AppConfig;
use secrecy::ExposeSecret;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // 加载配置
    let config = AppConfig::load("config").context("Failed to load configuration")?;

    ryze_telemetry::init(&config.telemetry.log_level, config.telemetry.json)?;
    let metrics = ryze_telemetry::init_metrics()?;

    info!(app = %config.app_name, env = %config.app_env, "Starting RYZE API");

    // 数据库连接，启动阶段对瞬时错误重试
    let pg_config = PostgresConfig::new(config.database.url.expose_secret().clone())
        .with_max_connections(config.database.max_connections)
        .with_min_connections(config.database.min_connections)
        .with_connect_timeout(Duration::from_secs(config.database.connect_timeout_secs));
    let pool = with_retry(&RetryConfig::default(), "create_pool", || create_pool(&pg_config))
        .await
        .context("Failed to connect to PostgreSQL")?;

    if config.database.run_migrations {
        let result = MigrationManager::new(pool.clone())
            .migrate(&migrations::all())
            .await
            .context("Failed to run migrations")?;
        info!(
            applied = result.applied_count(),
            skipped = result.skipped.len(),
            "Migrations complete"
        );
    }

    if config.runbooks.execution_enabled {
        warn!("Runbook execution is enabled, commands run on this host");
    }

    let tokens = TokenService::new(
        config.jwt.secret.expose_secret(),
        config.jwt.expires_in,
        config.jwt.refresh_expires_in,
        config.jwt.issuer.clone(),
        config.jwt.audience.clone(),
    );

    let state = AppState::new(
        Repositories::postgres(pool.clone()),
        tokens,
        &config.runbooks,
        metrics,
    )
    .with_health_check(Arc::new(PostgresHealthCheck::new(pool)));

    let app = build_router(
        state,
        &RouterOptions {
            cors: config.cors.clone(),
            body_limit_bytes: config.server.body_limit_bytes,
            production: config.is_production(),
        },
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
