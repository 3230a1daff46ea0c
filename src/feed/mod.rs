//! Tick source abstraction: where quote updates come from.
//!
//! The strategy core consumes normalized ticks one at a time and knows
//! nothing about acquisition. Implementations here own all network IO,
//! retries, and credential handling.

use crate::domain::RawMbp1;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::BoxStream;
use std::fmt;
use thiserror::Error;

pub mod databento;
pub mod mock;

pub use databento::DatabentoSource;
pub use mock::MockTickSource;

/// Source of raw MBP-1 rows for a single instrument.
///
/// Both delivery modes share one ordering contract: rows arrive one at a
/// time in non-decreasing `ts_recv` order. Implementations must handle
/// retry/backoff and rate limiting themselves; malformed rows must be
/// rejected here, before they can reach the core.
#[async_trait]
pub trait TickSource: Send + Sync + fmt::Debug {
    /// Fetch all rows for a bounded historical range (inclusive dates),
    /// ordered by `ts_recv`.
    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawMbp1>, FeedError>;

    /// Subscribe to live rows, delivered one at a time in `ts_recv` order.
    fn subscribe(&self, symbol: &str) -> BoxStream<'static, Result<RawMbp1, FeedError>>;
}

/// Error type for tick source operations.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// Network error (e.g., connection timeout, DNS failure).
    #[error("Network error: {0}")]
    Network(String),
    /// HTTP error (e.g., 5xx server error).
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    /// Malformed row or response body.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Rate limit exceeded after retries.
    #[error("Rate limited")]
    RateLimited,
    /// Other error.
    #[error("Error: {0}")]
    Other(String),
}
