pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod telemetry;

use axum::Router;
use crate::config::{Config, RunMode};
use crate::db::Database;
use crate::routes::AppState;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// Full HTTP application with middleware, ready to serve or drive with `oneshot`
pub fn app(state: AppState) -> Router {
    routes::routes(state)
        .layer(CatchPanicLayer::custom(routes::panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Open the pool according to the run mode.
///
/// Standalone startup fails when the database is unreachable; managed
/// startup logs the failure and continues with a lazily-connecting pool.
pub async fn init_database(config: &Config) -> anyhow::Result<Database> {
    match Database::connect(config).await {
        Ok(db) => Ok(db),
        Err(e) if config.run_mode == RunMode::Managed => {
            tracing::error!(
                "Failed to initialize database pool, continuing in managed mode: {:?}",
                e
            );
            Ok(Database::connect_lazy(config))
        }
        Err(e) => {
            tracing::error!("Failed to start application due to database connection issues");
            Err(e)
        }
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    telemetry::init_tracing(&config.log_filter(), config.log_format);

    tracing::info!(
        db_host = %config.db_host,
        db_name = %config.db_name,
        port = config.port,
        debug = config.debug,
        run_mode = ?config.run_mode,
        "Starting product catalog API"
    );

    let db = init_database(&config).await?;
    let app = app(AppState::new(db.clone()));

    let addr = config.bind_addr()?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, starting shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting shutdown"),
    }
}
