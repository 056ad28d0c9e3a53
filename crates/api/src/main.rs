use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use txroutine_infra::{AppConfig, DatabaseKind, InMemoryRepository, PostgresRepository, Repository};
use txroutine_service::TransactionService;

/// HTTP service recording accounts and signed card transactions
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// Path to a JSON config file. Without it, `APP_*` environment variables are used
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AppConfig::from_env().context("failed to load configuration")?,
    };

    txroutine_observability::init(&config.logging)?;
    if let Some(path) = &args.config {
        tracing::info!(path = %path.display(), "loaded configuration from file");
    }

    let mut postgres = None;
    let repo: Arc<dyn Repository> = match config.database.kind {
        DatabaseKind::Memory => Arc::new(InMemoryRepository::new()),
        DatabaseKind::Postgres => {
            let pg = Arc::new(
                PostgresRepository::connect(&config.database)
                    .await
                    .context("failed to initialise postgres repository")?,
            );
            postgres = Some(pg.clone());
            pg
        }
    };
    tracing::info!(backend = ?config.database.kind, "storage backend ready");

    let service = TransactionService::new(repo);
    let app = txroutine_api::app::build_app(service, config.server.request_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pg) = postgres {
        pg.close().await;
        tracing::info!("postgres connection closed");
    }

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down server");
}
