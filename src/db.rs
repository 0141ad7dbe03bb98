//! Record sources for the reporting service.
//!
//! The engine reads three collections of untyped documents. In production they
//! live in PostgreSQL as JSONB document tables; tests and local demos serve them
//! from memory or from a JSON snapshot file.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use crate::error::SourceError;

/// Type alias for the application database pool.
pub type AppDb = PgPool;

/// Shareable handle to whichever source the app was started with.
pub type SharedSource = Arc<dyn RecordSource>;

/// The three raw collections a report is computed from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collections {
    #[serde(default)]
    pub orders: Vec<Value>,
    #[serde(default)]
    pub vendors: Vec<Value>,
    #[serde(default)]
    pub customers: Vec<Value>,
}

/// Read access to the order, vendor and customer collections.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_orders(&self) -> Result<Vec<Value>, SourceError>;
    async fn fetch_vendors(&self) -> Result<Vec<Value>, SourceError>;
    async fn fetch_customers(&self) -> Result<Vec<Value>, SourceError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Fetch all three collections concurrently. Any failure fails the whole fetch.
pub async fn fetch_collections(source: &dyn RecordSource) -> Result<Collections, SourceError> {
    let (orders, vendors, customers) = tokio::try_join!(
        source.fetch_orders(),
        source.fetch_vendors(),
        source.fetch_customers(),
    )?;
    debug!(
        source = source.name(),
        orders = orders.len(),
        vendors = vendors.len(),
        customers = customers.len(),
        "Fetched record collections"
    );
    Ok(Collections {
        orders,
        vendors,
        customers,
    })
}

// ============================================================================
// PostgreSQL
// ============================================================================

const ORDERS_QUERY: &str = "SELECT doc FROM orders ORDER BY seq";
const VENDORS_QUERY: &str = "SELECT doc FROM vendors ORDER BY seq";
const CUSTOMERS_QUERY: &str = "SELECT doc FROM customers ORDER BY seq";

/// Documents stored in the `orders`, `vendors` and `customers` JSONB tables.
#[derive(Debug, Clone)]
pub struct PgRecordSource {
    pool: AppDb,
}

impl PgRecordSource {
    pub fn new(pool: AppDb) -> Self {
        Self { pool }
    }

    async fn fetch_documents(&self, query: &'static str) -> Result<Vec<Value>, SourceError> {
        let rows: Vec<(Value,)> = sqlx::query_as(query).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(doc,)| doc).collect())
    }
}

#[async_trait]
impl RecordSource for PgRecordSource {
    async fn fetch_orders(&self) -> Result<Vec<Value>, SourceError> {
        self.fetch_documents(ORDERS_QUERY).await
    }

    async fn fetch_vendors(&self) -> Result<Vec<Value>, SourceError> {
        self.fetch_documents(VENDORS_QUERY).await
    }

    async fn fetch_customers(&self) -> Result<Vec<Value>, SourceError> {
        self.fetch_documents(CUSTOMERS_QUERY).await
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Collections held in memory, optionally loaded from a snapshot file shaped
/// like `{"orders": [...], "vendors": [...], "customers": [...]}`.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    collections: Collections,
}

impl MemoryRecordSource {
    pub fn new(collections: Collections) -> Self {
        Self { collections }
    }

    pub async fn from_snapshot_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| SourceError::SnapshotIo {
                path: display.clone(),
                source,
            })?;
        let collections = serde_json::from_slice(&bytes)
            .map_err(|source| SourceError::SnapshotFormat {
                path: display,
                source,
            })?;
        Ok(Self { collections })
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn fetch_orders(&self) -> Result<Vec<Value>, SourceError> {
        Ok(self.collections.orders.clone())
    }

    async fn fetch_vendors(&self) -> Result<Vec<Value>, SourceError> {
        Ok(self.collections.vendors.clone())
    }

    async fn fetch_customers(&self) -> Result<Vec<Value>, SourceError> {
        Ok(self.collections.customers.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
