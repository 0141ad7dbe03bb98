//! Domain models for the reporting service.
//!
//! Records reach the service as loosely-typed JSON documents. The structs here
//! are the typed view the aggregation works on: every field is read once at
//! ingestion, coerced where possible and defaulted otherwise, so nothing
//! downstream has to second-guess the shape of a document.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::db::Collections;
use crate::reporting::normalize::parse_timestamp;

/// Stand-in id for orders that do not name a vendor or customer.
pub const UNKNOWN_ID: &str = "unknown";
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

// ============================================================================
// Field coercion
// ============================================================================

/// First non-blank string (or number rendered as a string) under any of `keys`.
fn field_str(doc: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match doc.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Non-negative finite amount; numeric strings are accepted.
fn field_amount(doc: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .find_map(|key| match doc.get(*key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .unwrap_or(0.0)
}

fn field_timestamp(doc: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| doc.get(*key).and_then(parse_timestamp))
}

// ============================================================================
// Orders
// ============================================================================

/// Lifecycle status of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Preparing,
    SentForDelivery,
    Delivered,
    Completed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// Delivered and Completed are the only statuses that count as revenue.
    pub fn is_completed(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "preparing" => OrderStatus::Preparing,
            "sentfordelivery" | "sent for delivery" | "sent_for_delivery" => {
                OrderStatus::SentForDelivery
            }
            "delivered" => OrderStatus::Delivered,
            "completed" => OrderStatus::Completed,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s.trim().to_string()),
        }
    }
}

/// An order as seen by the aggregation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub vendor_id: String,
    /// Vendor name denormalized onto the order, if the writer stored one.
    pub vendor_name: Option<String>,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub total: f64,
    pub delivery_address: String,
    pub created_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

impl Order {
    pub fn from_document(doc: &Value) -> Self {
        Self {
            id: field_str(doc, &["id", "_id", "orderId"]).unwrap_or_default(),
            vendor_id: field_str(doc, &["vendorId", "vendor_id"])
                .unwrap_or_else(|| UNKNOWN_ID.to_string()),
            vendor_name: field_str(doc, &["vendorName", "shopName"]),
            customer_id: field_str(doc, &["customerId", "customer_id"])
                .unwrap_or_else(|| UNKNOWN_ID.to_string()),
            customer_name: field_str(doc, &["customerName"]),
            status: field_str(doc, &["status"])
                .map(|s| OrderStatus::from(s.as_str()))
                .unwrap_or_else(|| OrderStatus::Other(String::new())),
            total: field_amount(doc, &["total", "totalAmount"]),
            delivery_address: field_str(doc, &["deliveryAddress", "delivery_address", "address"])
                .unwrap_or_default(),
            created_at: field_timestamp(doc, &["createdAt", "created_at"]),
            delivered_at: field_timestamp(doc, &["deliveredAt", "delivered_at"]),
            cancellation_reason: field_str(
                doc,
                &["cancellationReason", "cancelReason", "cancellation_reason"],
            ),
        }
    }
}

// ============================================================================
// Vendors and customers
// ============================================================================

/// A vendor (restaurant or shop) on the marketplace.
#[derive(Debug, Clone, PartialEq)]
pub struct Vendor {
    pub id: String,
    pub shop_name: Option<String>,
    pub full_name: Option<String>,
}

impl Vendor {
    /// Documents without an id cannot be looked up and are dropped.
    pub fn from_document(doc: &Value) -> Option<Self> {
        Some(Self {
            id: field_str(doc, &["id", "_id", "uid"])?,
            shop_name: field_str(doc, &["shopName"]),
            full_name: field_str(doc, &["fullName"]),
        })
    }

    pub fn display_name(&self) -> &str {
        self.shop_name
            .as_deref()
            .or(self.full_name.as_deref())
            .unwrap_or(UNKNOWN_VENDOR)
    }
}

/// A customer account.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: String,
    pub full_name: Option<String>,
    pub name: Option<String>,
}

impl Customer {
    pub fn from_document(doc: &Value) -> Option<Self> {
        Some(Self {
            id: field_str(doc, &["id", "_id", "uid"])?,
            full_name: field_str(doc, &["fullName"]),
            name: field_str(doc, &["name"]),
        })
    }

    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(UNKNOWN_CUSTOMER)
    }
}

/// The three typed collections one report is computed from.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub orders: Vec<Order>,
    pub vendors: Vec<Vendor>,
    pub customers: Vec<Customer>,
    /// Raw size of the customer collection, id-less documents included.
    pub customer_documents: usize,
}

impl RecordSet {
    pub fn ingest(collections: &Collections) -> Self {
        let vendors: Vec<Vendor> = collections
            .vendors
            .iter()
            .filter_map(Vendor::from_document)
            .collect();
        let customers: Vec<Customer> = collections
            .customers
            .iter()
            .filter_map(Customer::from_document)
            .collect();

        let dropped = (collections.vendors.len() - vendors.len())
            + (collections.customers.len() - customers.len());
        if dropped > 0 {
            debug!("Ignoring {} vendor/customer documents without an id", dropped);
        }

        Self {
            orders: collections.orders.iter().map(Order::from_document).collect(),
            vendors,
            customers,
            customer_documents: collections.customers.len(),
        }
    }
}

// ============================================================================
// Response Models
// ============================================================================

/// Response envelope shared by every endpoint.
///
/// Success carries `data`, failure carries `error`; the other field is omitted.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}
