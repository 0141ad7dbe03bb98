//! Reporting aggregation engine.
//!
//! The pipeline is a pure function of its inputs:
//!
//! 1. [`lookup`] builds id to display-name maps.
//! 2. [`engine`] makes one pass over the orders, filling the buckets.
//! 3. [`assemble`] derives rates and averages, ranks, truncates and zero-fills.
//!
//! Each call owns its buckets, so concurrent report requests never share
//! state.

pub mod assemble;
pub mod bucket;
pub mod engine;
pub mod lookup;
pub mod normalize;
pub mod report;

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::models::RecordSet;
use engine::{Aggregation, PassStats};
use lookup::Lookups;

pub use report::{DateRange, Report};

/// Inputs to a report run besides the records themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Echoed in the report. Only restricts the orders aggregated when
    /// `filter_by_window` is set.
    pub date_range: DateRange,
    /// Offset used to place orders into hours, weekdays and days.
    pub utc_offset: FixedOffset,
    pub filter_by_window: bool,
}

impl ReportOptions {
    /// UTC bucketing, no window filtering.
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            utc_offset: Utc.fix(),
            filter_by_window: false,
        }
    }

    /// A window of `days` days ending on the local date of `now`.
    pub fn trailing(now: DateTime<Utc>, days: u32, utc_offset: FixedOffset) -> Self {
        let today = now.with_timezone(&utc_offset).date_naive();
        Self {
            date_range: DateRange::trailing(today, days),
            utc_offset,
            filter_by_window: false,
        }
    }

    pub fn with_window_filter(mut self, enabled: bool) -> Self {
        self.filter_by_window = enabled;
        self
    }
}

/// Compute the full report over `records`.
pub fn generate_report(records: &RecordSet, options: &ReportOptions) -> (Report, PassStats) {
    let lookups = Lookups::build(&records.vendors, &records.customers);
    let aggregation = Aggregation::run(&records.orders, &lookups, options);
    let report = assemble::assemble(&aggregation, records.customer_documents, options);
    (report, aggregation.stats)
}
