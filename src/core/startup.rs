use crate::core::config::Config;
use crate::core::routes::build_router;
use crate::core::state::AppState;
use crate::stores::pool::PoolManager;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// Open the pool, check connectivity and make sure the schema exists
pub async fn prepare_store(config: &Config) -> Result<PoolManager> {
    let pool = PoolManager::connect(&config.database)
        .await
        .context("Failed to open database pool")?;

    pool.verify()
        .await
        .context("Database connectivity check failed")?;

    if let Err(e) = pool.create_schema().await {
        error!(error = %e, "Failed to create users table");
        pool.close().await;
        return Err(e).context("Failed to create schema");
    }

    info!(
        host = %config.database.host,
        database = %config.database.name,
        "Database initialized"
    );

    Ok(pool)
}

/// Boot the service and serve until a shutdown signal arrives
pub async fn run(config: Config) -> Result<()> {
    info!(
        port = config.server.port,
        environment = %config.app.environment,
        version = %config.app.version,
        log_dir = %config.logging.dir.display(),
        "User service starting"
    );

    let pool = prepare_store(&config).await?;

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            pool.close().await;
            return Err(e).context(format!("Failed to bind TCP listener to {}", addr));
        }
    };

    let port = config.server.port;
    let environment = config.app.environment.clone();
    let state = AppState::new(config, Arc::new(pool.clone()));
    let app = build_router(Arc::new(state));

    info!(
        address = %addr,
        port,
        environment = %environment,
        health = %format!("http://localhost:{}/health", port),
        api = %format!("http://localhost:{}/api/users", port),
        "Server started"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error");

    pool.close().await;
    info!("Shutdown complete");

    served
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Server shutdown requested (SIGINT)");
        },
        _ = terminate => {
            info!("Server shutdown requested (SIGTERM)");
        },
    }
}
