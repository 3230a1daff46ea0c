//! Mock tick source for testing without network calls.

use super::{FeedError, TickSource};
use crate::domain::RawMbp1;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, BoxStream, StreamExt};

/// Mock tick source that replays predefined rows.
#[derive(Debug, Clone, Default)]
pub struct MockTickSource {
    ticks: Vec<RawMbp1>,
}

impl MockTickSource {
    /// Create a new mock tick source with no rows.
    pub fn new() -> Self {
        Self { ticks: Vec::new() }
    }

    /// Add a single row.
    pub fn with_tick(mut self, tick: RawMbp1) -> Self {
        self.ticks.push(tick);
        self
    }

    /// Add multiple rows.
    pub fn with_ticks(mut self, ticks: Vec<RawMbp1>) -> Self {
        self.ticks.extend(ticks);
        self
    }
}

#[async_trait]
impl TickSource for MockTickSource {
    async fn fetch_range(
        &self,
        _symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawMbp1>, FeedError> {
        let start_ns = date_floor_ns(start);
        let end_ns = date_floor_ns(end + chrono::Days::new(1));

        let mut rows: Vec<RawMbp1> = self
            .ticks
            .iter()
            .filter(|t| t.ts_recv >= start_ns && t.ts_recv < end_ns)
            .copied()
            .collect();
        rows.sort_by_key(|t| t.ts_recv);
        Ok(rows)
    }

    fn subscribe(&self, _symbol: &str) -> BoxStream<'static, Result<RawMbp1, FeedError>> {
        let mut rows = self.ticks.clone();
        rows.sort_by_key(|t| t.ts_recv);
        stream::iter(rows.into_iter().map(Ok)).boxed()
    }
}

fn date_floor_ns(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
        .timestamp_nanos_opt()
        .expect("test dates fit in i64 nanoseconds")
}
