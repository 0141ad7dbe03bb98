//! # Aggregation Engine
//!
//! One pass over the order collection feeding every report dimension at once.
//!
//! ## Per-order flow
//!
//! 1. Orders without a parseable `createdAt` are skipped entirely.
//! 2. With window filtering enabled, orders created outside the date range
//!    are skipped as well.
//! 3. Every remaining order counts toward its vendor's and its day's totals.
//! 4. Completed orders (Delivered/Completed) feed revenue, demand histograms,
//!    customer history and delivery-time samples.
//! 5. Cancelled orders feed the cancellation counters.
//!
//! All updates are sums, counts or maxima, so arrival order only affects the
//! first-observation order used for tie-breaking.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

use super::bucket::Bucket;
use super::lookup::Lookups;
use super::normalize::{extract_area, extract_pincode};
use super::ReportOptions;
use crate::models::{Order, UNKNOWN_CUSTOMER, UNKNOWN_VENDOR};

/// Delivery durations at or beyond this many minutes are treated as bad data.
pub const MAX_DELIVERY_MINUTES: i64 = 300;

pub const NOT_SPECIFIED_REASON: &str = "Not Specified";

#[derive(Debug, Clone, Default)]
pub struct VendorTotals {
    pub name: String,
    pub total_revenue: f64,
    pub total_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AreaTotals {
    pub area: String,
    pub pincode: String,
    pub total_revenue: f64,
    pub order_count: u64,
}

/// Completed-order count and revenue for one hour or weekday slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlotTotals {
    pub order_count: u64,
    pub revenue: f64,
}

impl SlotTotals {
    fn add(&mut self, revenue: f64) {
        self.order_count += 1;
        self.revenue += revenue;
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomerTotals {
    pub name: String,
    pub order_count: u64,
    pub total_spent: f64,
    pub last_order_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTotals {
    pub total_orders: u64,
    pub cancelled_orders: u64,
}

/// Bookkeeping about the pass itself, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub eligible_orders: u64,
    pub missing_timestamp: u64,
    pub outside_window: u64,
}

/// Raw buckets produced by one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub stats: PassStats,
    pub vendors: Bucket<VendorTotals>,
    pub areas: Bucket<AreaTotals>,
    pub hours: [SlotTotals; 24],
    /// Indexed 0 = Sunday through 6 = Saturday.
    pub weekdays: [SlotTotals; 7],
    pub customers: Bucket<CustomerTotals>,
    pub delivery_samples: Vec<i64>,
    pub vendor_delivery: Bucket<Vec<i64>>,
    pub area_delivery: Bucket<Vec<i64>>,
    pub total_cancellations: u64,
    pub cancellation_reasons: Bucket<u64>,
    pub cancellations_by_hour: [u64; 24],
    pub days: BTreeMap<NaiveDate, DayTotals>,
}

impl Aggregation {
    /// Run the pass over `orders`.
    pub fn run(orders: &[Order], lookups: &Lookups, options: &ReportOptions) -> Self {
        let mut aggregation = Self::default();
        for order in orders {
            aggregation.observe(order, lookups, options);
        }
        aggregation
    }

    fn observe(&mut self, order: &Order, lookups: &Lookups, options: &ReportOptions) {
        let Some(created_at) = order.created_at else {
            self.stats.missing_timestamp += 1;
            return;
        };
        let local = created_at.with_timezone(&options.utc_offset);
        let day = local.date_naive();
        if options.filter_by_window && !options.date_range.contains(day) {
            self.stats.outside_window += 1;
            return;
        }
        self.stats.eligible_orders += 1;

        let vendor_name = lookups
            .vendors
            .get(&order.vendor_id)
            .or(order.vendor_name.as_deref())
            .unwrap_or(UNKNOWN_VENDOR);
        let vendor = self
            .vendors
            .get_or_create(&order.vendor_id, || VendorTotals {
                name: vendor_name.to_string(),
                ..Default::default()
            });
        vendor.total_orders += 1;
        let daily = self.days.entry(day).or_default();
        daily.total_orders += 1;

        let hour = local.hour() as usize;

        if order.status.is_completed() {
            vendor.total_revenue += order.total;
            vendor.completed_orders += 1;
            let weekday = local.weekday().num_days_from_sunday() as usize;
            self.record_completed(order, created_at, hour, weekday, lookups);
        } else if order.status.is_cancelled() {
            vendor.cancelled_orders += 1;
            daily.cancelled_orders += 1;
            self.record_cancelled(order, hour);
        }
    }

    fn record_completed(
        &mut self,
        order: &Order,
        created_at: DateTime<Utc>,
        hour: usize,
        weekday: usize,
        lookups: &Lookups,
    ) {
        let area = extract_area(&order.delivery_address);
        let pincode = extract_pincode(&order.delivery_address);
        let area_totals = self
            .areas
            .get_or_create(&format!("{area}|{pincode}"), || AreaTotals {
                area: area.clone(),
                pincode: pincode.clone(),
                ..Default::default()
            });
        area_totals.total_revenue += order.total;
        area_totals.order_count += 1;

        self.hours[hour].add(order.total);
        self.weekdays[weekday].add(order.total);

        let customer_name = lookups
            .customers
            .get(&order.customer_id)
            .or(order.customer_name.as_deref())
            .unwrap_or(UNKNOWN_CUSTOMER);
        let customer = self
            .customers
            .get_or_create(&order.customer_id, || CustomerTotals {
                name: customer_name.to_string(),
                ..Default::default()
            });
        customer.order_count += 1;
        customer.total_spent += order.total;
        customer.last_order_at = customer.last_order_at.max(Some(created_at));

        if let Some(minutes) = order
            .delivered_at
            .map(|delivered_at| (delivered_at - created_at).num_minutes())
            .filter(|&minutes| is_plausible_delivery(minutes))
        {
            self.delivery_samples.push(minutes);
            self.vendor_delivery
                .get_or_create(&order.vendor_id, Vec::new)
                .push(minutes);
            self.area_delivery
                .get_or_create(&area, Vec::new)
                .push(minutes);
        }
    }

    fn record_cancelled(&mut self, order: &Order, hour: usize) {
        self.total_cancellations += 1;
        let reason = order
            .cancellation_reason
            .as_deref()
            .unwrap_or(NOT_SPECIFIED_REASON);
        *self.cancellation_reasons.get_or_create(reason, || 0) += 1;
        self.cancellations_by_hour[hour] += 1;
    }
}

/// Durations of zero or less, or of five hours and more, are discarded.
pub fn is_plausible_delivery(minutes: i64) -> bool {
    minutes > 0 && minutes < MAX_DELIVERY_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use crate::reporting::DateRange;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn options() -> ReportOptions {
        ReportOptions::new(DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        ))
    }

    fn order(status: OrderStatus, created: Option<DateTime<Utc>>) -> Order {
        Order {
            id: "O".into(),
            vendor_id: "V1".into(),
            vendor_name: None,
            customer_id: "C1".into(),
            customer_name: None,
            status,
            total: 100.0,
            delivery_address: "1 Road, Indiranagar, 560038".into(),
            created_at: created,
            delivered_at: None,
            cancellation_reason: None,
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, h, 0, 0).unwrap()
    }

    #[test]
    fn skips_orders_without_creation_time() {
        let orders = vec![order(OrderStatus::Delivered, None), order(OrderStatus::Delivered, Some(at(9)))];
        let agg = Aggregation::run(&orders, &Lookups::default(), &options());
        assert_eq!(agg.stats.missing_timestamp, 1);
        assert_eq!(agg.stats.eligible_orders, 1);
        assert_eq!(agg.vendors.get("V1").unwrap().total_orders, 1);
    }

    #[test]
    fn other_statuses_only_count_toward_totals() {
        let orders = vec![order(OrderStatus::Preparing, Some(at(9)))];
        let agg = Aggregation::run(&orders, &Lookups::default(), &options());
        let vendor = agg.vendors.get("V1").unwrap();
        assert_eq!((vendor.total_orders, vendor.completed_orders, vendor.cancelled_orders), (1, 0, 0));
        assert!(agg.areas.is_empty());
        assert!(agg.customers.is_empty());
        assert_eq!(agg.total_cancellations, 0);
        assert_eq!(agg.days.values().next().unwrap().total_orders, 1);
    }

    #[test]
    fn discards_implausible_delivery_durations() {
        let mut orders = Vec::new();
        for minutes in [0, -5, 25, 299, 300, 1000] {
            let mut o = order(OrderStatus::Delivered, Some(at(12)));
            o.delivered_at = Some(at(12) + Duration::minutes(minutes));
            orders.push(o);
        }
        let agg = Aggregation::run(&orders, &Lookups::default(), &options());
        assert_eq!(agg.delivery_samples, vec![25, 299]);
        assert_eq!(agg.vendors.get("V1").unwrap().completed_orders, 6);
        assert_eq!(agg.area_delivery.get("Indiranagar"), Some(&vec![25, 299]));
    }

    #[test]
    fn local_offset_moves_hour_and_weekday() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let mut opts = options();
        opts.utc_offset = ist;
        // 2024-01-06 20:00 UTC is Sunday 01:30 in UTC+05:30.
        let created = Utc.with_ymd_and_hms(2024, 1, 6, 20, 0, 0).unwrap();
        let agg = Aggregation::run(&[order(OrderStatus::Completed, Some(created))], &Lookups::default(), &opts);
        assert_eq!(agg.hours[1].order_count, 1);
        assert_eq!(agg.weekdays[0].order_count, 1);
        assert!(agg.days.contains_key(&NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()));
    }

    #[test]
    fn window_filter_excludes_out_of_range_orders() {
        let mut opts = options();
        opts.filter_by_window = true;
        let outside = Utc.with_ymd_and_hms(2023, 12, 31, 10, 0, 0).unwrap();
        let orders = vec![order(OrderStatus::Delivered, Some(outside)), order(OrderStatus::Delivered, Some(at(10)))];
        let agg = Aggregation::run(&orders, &Lookups::default(), &opts);
        assert_eq!(agg.stats.outside_window, 1);
        assert_eq!(agg.stats.eligible_orders, 1);
    }

    #[test]
    fn customer_keeps_latest_order_time() {
        let orders = vec![
            order(OrderStatus::Delivered, Some(at(15))),
            order(OrderStatus::Delivered, Some(at(8))),
        ];
        let agg = Aggregation::run(&orders, &Lookups::default(), &options());
        let customer = agg.customers.get("C1").unwrap();
        assert_eq!(customer.order_count, 2);
        assert_eq!(customer.last_order_at, Some(at(15)));
        assert_eq!(customer.name, UNKNOWN_CUSTOMER);
    }
}
