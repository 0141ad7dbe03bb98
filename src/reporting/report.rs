//! Output shape of the analytics report.
//!
//! Field names serialize in camelCase to match what the dashboard consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The complete analytics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub revenue_by_vendor: Vec<VendorRevenue>,
    pub revenue_by_area: Vec<AreaRevenue>,
    pub peak_hours: Vec<HourlyDemand>,
    pub orders_by_day_of_week: Vec<WeekdayDemand>,
    pub customer_retention: CustomerRetention,
    pub delivery_time_analysis: DeliveryTimeAnalysis,
    pub cancellation_analysis: CancellationAnalysis,
    pub date_range: DateRange,
}

/// Reporting window, start and end inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days leading up to and including `end`.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_days(chrono::Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

// ============================================================================
// Revenue
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRevenue {
    pub vendor_id: String,
    pub vendor_name: String,
    pub total_revenue: f64,
    pub total_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
    pub average_order_value: i64,
    pub cancellation_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRevenue {
    pub area: String,
    pub pincode: String,
    pub total_revenue: f64,
    pub order_count: u64,
    pub average_order_value: i64,
}

// ============================================================================
// Demand histograms
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyDemand {
    pub hour: u32,
    pub label: String,
    pub order_count: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayDemand {
    pub day: String,
    pub day_index: u32,
    pub order_count: u64,
    pub revenue: f64,
}

// ============================================================================
// Customers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRetention {
    /// Size of the customer collection, including customers with no orders.
    pub total_customers: usize,
    pub customers_with_orders: u64,
    pub new_customers: u64,
    pub returning_customers: u64,
    pub retention_rate: f64,
    pub average_orders_per_customer: f64,
    pub cohorts: RetentionCohorts,
    pub top_customers: Vec<TopCustomer>,
}

/// Customers bucketed by completed-order count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionCohorts {
    pub one_order: u64,
    pub two_to_five: u64,
    pub six_to_ten: u64,
    pub more_than_ten: u64,
}

impl RetentionCohorts {
    pub fn total(&self) -> u64 {
        self.one_order + self.two_to_five + self.six_to_ten + self.more_than_ten
    }

    pub fn returning(&self) -> u64 {
        self.two_to_five + self.six_to_ten + self.more_than_ten
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub customer_id: String,
    pub customer_name: String,
    pub total_orders: u64,
    pub total_spent: i64,
    /// `YYYY-MM-DD` or `"N/A"`.
    pub last_order_date: String,
}

// ============================================================================
// Delivery times
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTimeAnalysis {
    pub average_delivery_time: i64,
    pub min_delivery_time: i64,
    pub max_delivery_time: i64,
    pub total_deliveries: usize,
    pub by_vendor: Vec<VendorDeliveryTime>,
    pub by_area: Vec<AreaDeliveryTime>,
    pub time_ranges: Vec<DeliveryTimeRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDeliveryTime {
    pub vendor_id: String,
    pub vendor_name: String,
    pub average_time: i64,
    pub delivery_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaDeliveryTime {
    pub area: String,
    pub average_time: i64,
    pub delivery_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTimeRange {
    pub range: String,
    pub count: usize,
    pub percentage: f64,
}

// ============================================================================
// Cancellations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationAnalysis {
    pub total_cancellations: u64,
    pub total_orders: u64,
    pub cancellation_rate: f64,
    pub by_reason: Vec<CancellationReason>,
    pub by_vendor: Vec<VendorCancellations>,
    pub by_hour: Vec<HourlyCancellations>,
    pub trend: Vec<DailyCancellations>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationReason {
    pub reason: String,
    pub count: u64,
    /// Share of all cancellations.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCancellations {
    pub vendor_id: String,
    pub vendor_name: String,
    pub cancellations: u64,
    pub total_orders: u64,
    pub cancellation_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyCancellations {
    pub hour: u32,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCancellations {
    pub date: NaiveDate,
    pub cancellations: u64,
    pub total_orders: u64,
    pub cancellation_rate: f64,
}
