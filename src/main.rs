//! Mosaik Discovery Engine
//!
//! A read-only recommendation service for the Mosaik platform.
//!
//! # Architecture
//!
//! - **Discovery Engine**: graph-traversal account suggestions, hashtag
//!   trends and personalized feeds, recomputed per request
//! - **API Server**: REST endpoints for frontend consumption
//!
//! # Graceful Shutdown
//!
//! The service handles SIGTERM and SIGINT signals, ensuring:
//! - In-flight requests complete
//! - Database connections are closed cleanly

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mosaik::{api, Config, Database, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with structured logging
    init_tracing();

    info!("═══════════════════════════════════════════════════════════════");
    info!("  🚀 Mosaik Discovery Engine v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════════════════════════");

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("✅ Configuration loaded and validated");

    // Initialize database connection pool
    let db = Database::new(&config.database).await?;
    info!("✅ Database connection pool established");

    // Spawn API server
    info!("🌐 Starting API server on port {}...", config.api.port);
    let server = tokio::spawn(api::start_server(db.pool().clone(), config.clone()));

    info!(
        "  📡 API: http://{}:{}  (health: /health)",
        config.api.host, config.api.port
    );

    // Wait for shutdown signal or server exit
    tokio::select! {
        _ = shutdown_signal() => {
            info!("📴 Shutdown signal received");
        }
        result = server => {
            match result {
                Ok(Ok(())) => info!("API server exited"),
                Ok(Err(e)) => error!("API server error: {:?}", e),
                Err(e) => error!("API server task failed: {:?}", e),
            }
        }
    }

    // Cleanup resources
    info!("🛑 Initiating graceful shutdown...");
    db.close().await;

    info!("👋 Mosaik Discovery Engine stopped gracefully");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Default log levels
        EnvFilter::new("mosaik_discovery=debug,mosaik=debug,tower_http=debug,sqlx=warn,info")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .init();
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
