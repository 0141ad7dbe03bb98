//! # Marketplace Reports Library
//!
//! Exposes the Axum router, the record sources and the reporting engine so
//! integration tests can drive the service in-process.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod reporting;
pub mod routes;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::ReportSettings;
use db::SharedSource;

/// State shared with every handler.
#[derive(Clone)]
pub struct AppState {
    pub source: SharedSource,
    pub settings: ReportSettings,
}

/// Build the Axum router with all route modules and middleware.
///
/// The caller chooses the record source. This function does NOT start a server.
pub fn create_app(source: SharedSource, settings: ReportSettings) -> Router {
    Router::new()
        .merge(routes::reports::router())
        .merge(routes::health::router())
        .layer(Extension(AppState { source, settings }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
