//! HTTP route modules for the reporting service.
//!
//! - `reports`: analytics report over the full order collection
//! - `health`: liveness probe

pub mod health;
pub mod reports;
