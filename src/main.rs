//! # Marketplace Reports
//!
//! HTTP service computing the operations-dashboard analytics report for a
//! food-delivery marketplace.
//!
//! ## Architecture
//!
//! - Axum handles HTTP routing and request/response lifecycle
//! - SQLx reads the order, vendor and customer documents from PostgreSQL
//! - A JSON snapshot can stand in for the database (`REPORT_SNAPSHOT_PATH`)
//! - The reporting engine runs one synchronous pass per request

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use marketplace_reports::config::AppConfig;
use marketplace_reports::create_app;
use marketplace_reports::db::{MemoryRecordSource, PgRecordSource, SharedSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketplace_reports=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting marketplace reports service");
    let config = AppConfig::from_env();

    let source: SharedSource = match &config.snapshot_path {
        Some(path) => {
            let source = MemoryRecordSource::from_snapshot_file(path).await?;
            info!("Serving records from snapshot {}", path.display());
            Arc::new(source)
        }
        None => {
            let app_db = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            info!("Connected to application database");

            sqlx::migrate!("./migrations").run(&app_db).await?;
            info!("Application migrations complete");

            Arc::new(PgRecordSource::new(app_db))
        }
    };

    info!(
        window_days = config.report.window_days,
        utc_offset = %config.report.utc_offset,
        filter_by_window = config.report.filter_by_window,
        "Report settings loaded"
    );

    let app = create_app(source, config.report);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
