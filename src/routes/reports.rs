//! Marketplace analytics report route.
//!
//! GET /reports/analytics - Aggregate every order into the dashboard report

use std::time::Instant;

use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use tracing::{info, warn};

use crate::db::fetch_collections;
use crate::error::ReportError;
use crate::models::{ApiResponse, RecordSet};
use crate::reporting::{generate_report, Report};
use crate::AppState;

/// Build the reports router.
pub fn router() -> Router {
    Router::new().route("/reports/analytics", get(get_analytics_report))
}

/// Fetch the order, vendor and customer collections and compute the report.
///
/// A fetch failure fails the request; there is no partial report. Malformed
/// records are defaulted and never fail the request.
async fn get_analytics_report(
    Extension(state): Extension<AppState>,
) -> Result<Json<ApiResponse<Report>>, ReportError> {
    let collections = fetch_collections(state.source.as_ref()).await?;
    let options = state.settings.options_at(Utc::now());

    let started = Instant::now();
    let (report, stats) = tokio::task::spawn_blocking(move || {
        let records = RecordSet::ingest(&collections);
        generate_report(&records, &options)
    })
    .await
    .map_err(|e| ReportError::Internal(format!("aggregation task aborted: {e}")))?;

    if stats.missing_timestamp > 0 {
        warn!(
            "Skipped {} orders without a parseable creation time",
            stats.missing_timestamp
        );
    }
    if stats.outside_window > 0 {
        info!(
            "Excluded {} orders outside {} to {}",
            stats.outside_window, options.date_range.start, options.date_range.end
        );
    }
    info!(
        eligible_orders = stats.eligible_orders,
        vendors = report.revenue_by_vendor.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Analytics report generated"
    );

    Ok(Json(ApiResponse::ok(report)))
}
