//! Turns raw aggregation buckets into the report shape.

use chrono::FixedOffset;

use super::engine::{Aggregation, SlotTotals};
use super::normalize::hour_label;
use super::report::*;
use super::ReportOptions;

pub const TOP_VENDORS: usize = 20;
pub const TOP_AREAS: usize = 15;
pub const TOP_CUSTOMERS: usize = 10;
pub const TOP_DELIVERY_VENDORS: usize = 10;
pub const TOP_DELIVERY_AREAS: usize = 10;
pub const TOP_CANCELLING_VENDORS: usize = 10;
pub const TREND_DAYS: usize = 30;

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Delivery-time histogram ranges as `(label, lower bound, upper bound)`.
/// Lower bounds are inclusive, upper bounds exclusive.
const DELIVERY_RANGES: [(&str, i64, Option<i64>); 5] = [
    ("0-15", 0, Some(15)),
    ("15-30", 15, Some(30)),
    ("30-45", 30, Some(45)),
    ("45-60", 45, Some(60)),
    ("60+", 60, None),
];

/// `part / whole` as a percentage with one decimal; 0 when `whole` is 0.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

/// `total / count` rounded to a whole unit; 0 when `count` is 0.
pub fn whole_average(total: f64, count: u64) -> i64 {
    if count == 0 {
        return 0;
    }
    (total / count as f64).round() as i64
}

fn sample_average(samples: &[i64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<i64>() as f64 / samples.len() as f64
}

pub fn assemble(aggregation: &Aggregation, total_customers: usize, options: &ReportOptions) -> Report {
    Report {
        revenue_by_vendor: vendor_revenue(aggregation),
        revenue_by_area: area_revenue(aggregation),
        peak_hours: peak_hours(&aggregation.hours),
        orders_by_day_of_week: weekday_demand(&aggregation.weekdays),
        customer_retention: customer_retention(aggregation, total_customers, options.utc_offset),
        delivery_time_analysis: delivery_time_analysis(aggregation),
        cancellation_analysis: cancellation_analysis(aggregation),
        date_range: options.date_range,
    }
}

fn vendor_revenue(aggregation: &Aggregation) -> Vec<VendorRevenue> {
    let mut rows: Vec<VendorRevenue> = aggregation
        .vendors
        .iter()
        .map(|(id, v)| VendorRevenue {
            vendor_id: id.to_string(),
            vendor_name: v.name.clone(),
            total_revenue: v.total_revenue,
            total_orders: v.total_orders,
            completed_orders: v.completed_orders,
            cancelled_orders: v.cancelled_orders,
            average_order_value: whole_average(v.total_revenue, v.completed_orders),
            cancellation_rate: percentage(v.cancelled_orders, v.total_orders),
        })
        .collect();
    rows.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    rows.truncate(TOP_VENDORS);
    rows
}

fn area_revenue(aggregation: &Aggregation) -> Vec<AreaRevenue> {
    let mut rows: Vec<AreaRevenue> = aggregation
        .areas
        .iter()
        .map(|(_, a)| AreaRevenue {
            area: a.area.clone(),
            pincode: a.pincode.clone(),
            total_revenue: a.total_revenue,
            order_count: a.order_count,
            average_order_value: whole_average(a.total_revenue, a.order_count),
        })
        .collect();
    rows.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    rows.truncate(TOP_AREAS);
    rows
}

fn peak_hours(hours: &[SlotTotals; 24]) -> Vec<HourlyDemand> {
    hours
        .iter()
        .enumerate()
        .map(|(hour, slot)| HourlyDemand {
            hour: hour as u32,
            label: hour_label(hour),
            order_count: slot.order_count,
            revenue: slot.revenue,
        })
        .collect()
}

fn weekday_demand(weekdays: &[SlotTotals; 7]) -> Vec<WeekdayDemand> {
    weekdays
        .iter()
        .zip(WEEKDAYS)
        .enumerate()
        .map(|(index, (slot, day))| WeekdayDemand {
            day: day.to_string(),
            day_index: index as u32,
            order_count: slot.order_count,
            revenue: slot.revenue,
        })
        .collect()
}

fn customer_retention(
    aggregation: &Aggregation,
    total_customers: usize,
    utc_offset: FixedOffset,
) -> CustomerRetention {
    let mut cohorts = RetentionCohorts::default();
    let mut order_sum = 0;
    for (_, customer) in aggregation.customers.iter() {
        order_sum += customer.order_count;
        match customer.order_count {
            0 => {}
            1 => cohorts.one_order += 1,
            2..=5 => cohorts.two_to_five += 1,
            6..=10 => cohorts.six_to_ten += 1,
            _ => cohorts.more_than_ten += 1,
        }
    }

    let with_orders = cohorts.total();
    let returning = cohorts.returning();
    let average_orders_per_customer = if with_orders == 0 {
        0.0
    } else {
        (order_sum as f64 / with_orders as f64 * 10.0).round() / 10.0
    };

    let mut ranked: Vec<_> = aggregation.customers.iter().collect();
    ranked.sort_by(|(_, a), (_, b)| b.order_count.cmp(&a.order_count));
    let top_customers = ranked
        .into_iter()
        .take(TOP_CUSTOMERS)
        .map(|(id, c)| TopCustomer {
            customer_id: id.to_string(),
            customer_name: c.name.clone(),
            total_orders: c.order_count,
            total_spent: c.total_spent.round() as i64,
            last_order_date: c
                .last_order_at
                .map(|at| at.with_timezone(&utc_offset).date_naive().to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();

    CustomerRetention {
        total_customers,
        customers_with_orders: with_orders,
        new_customers: with_orders - returning,
        returning_customers: returning,
        retention_rate: percentage(returning, with_orders),
        average_orders_per_customer,
        cohorts,
        top_customers,
    }
}

fn delivery_time_analysis(aggregation: &Aggregation) -> DeliveryTimeAnalysis {
    let samples = &aggregation.delivery_samples;
    let population = samples.len() as u64;

    let mut by_vendor: Vec<(f64, VendorDeliveryTime)> = aggregation
        .vendor_delivery
        .iter()
        .map(|(id, times)| {
            let average = sample_average(times);
            let vendor_name = aggregation
                .vendors
                .get(id)
                .map(|v| v.name.clone())
                .unwrap_or_default();
            (
                average,
                VendorDeliveryTime {
                    vendor_id: id.to_string(),
                    vendor_name,
                    average_time: average.round() as i64,
                    delivery_count: times.len(),
                },
            )
        })
        .collect();
    by_vendor.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    let mut by_area: Vec<AreaDeliveryTime> = aggregation
        .area_delivery
        .iter()
        .map(|(area, times)| AreaDeliveryTime {
            area: area.to_string(),
            average_time: sample_average(times).round() as i64,
            delivery_count: times.len(),
        })
        .collect();
    by_area.sort_by(|a, b| b.delivery_count.cmp(&a.delivery_count));
    by_area.truncate(TOP_DELIVERY_AREAS);

    let time_ranges = DELIVERY_RANGES
        .iter()
        .map(|&(label, lower, upper)| {
            let count = samples
                .iter()
                .filter(|&&m| m >= lower && upper.map_or(true, |u| m < u))
                .count();
            DeliveryTimeRange {
                range: label.to_string(),
                count,
                percentage: percentage(count as u64, population),
            }
        })
        .collect();

    DeliveryTimeAnalysis {
        average_delivery_time: sample_average(samples).round() as i64,
        min_delivery_time: samples.iter().copied().min().unwrap_or(0),
        max_delivery_time: samples.iter().copied().max().unwrap_or(0),
        total_deliveries: samples.len(),
        by_vendor: by_vendor
            .into_iter()
            .take(TOP_DELIVERY_VENDORS)
            .map(|(_, row)| row)
            .collect(),
        by_area,
        time_ranges,
    }
}

fn cancellation_analysis(aggregation: &Aggregation) -> CancellationAnalysis {
    let total_orders = aggregation.stats.eligible_orders;
    let total_cancellations = aggregation.total_cancellations;

    let mut by_reason: Vec<CancellationReason> = aggregation
        .cancellation_reasons
        .iter()
        .map(|(reason, &count)| CancellationReason {
            reason: reason.to_string(),
            count,
            percentage: percentage(count, total_cancellations),
        })
        .collect();
    by_reason.sort_by(|a, b| b.count.cmp(&a.count));

    let mut by_vendor: Vec<VendorCancellations> = aggregation
        .vendors
        .iter()
        .filter(|(_, v)| v.cancelled_orders > 0)
        .map(|(id, v)| VendorCancellations {
            vendor_id: id.to_string(),
            vendor_name: v.name.clone(),
            cancellations: v.cancelled_orders,
            total_orders: v.total_orders,
            cancellation_rate: percentage(v.cancelled_orders, v.total_orders),
        })
        .collect();
    by_vendor.sort_by(|a, b| b.cancellations.cmp(&a.cancellations));
    by_vendor.truncate(TOP_CANCELLING_VENDORS);

    let by_hour = aggregation
        .cancellations_by_hour
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourlyCancellations {
            hour: hour as u32,
            label: hour_label(hour),
            count,
        })
        .collect();

    let skip = aggregation.days.len().saturating_sub(TREND_DAYS);
    let trend = aggregation
        .days
        .iter()
        .skip(skip)
        .map(|(&date, day)| DailyCancellations {
            date,
            cancellations: day.cancelled_orders,
            total_orders: day.total_orders,
            cancellation_rate: percentage(day.cancelled_orders, day.total_orders),
        })
        .collect();

    CancellationAnalysis {
        total_cancellations,
        total_orders,
        cancellation_rate: percentage(total_cancellations, total_orders),
        by_reason,
        by_vendor,
        by_hour,
        trend,
    }
}
