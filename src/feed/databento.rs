//! Databento historical API client and polling live subscription.

use super::{FeedError, TickSource};
use crate::domain::RawMbp1;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::NaiveDate;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const GET_RANGE_PATH: &str = "/v0/timeseries.get_range";
const SCHEMA: &str = "mbp-1";

/// Tick source backed by the Databento timeseries API.
///
/// Historical mode is a single bounded range query. Live mode is an
/// incremental poll of the same endpoint behind an advancing `ts_recv`
/// watermark, which satisfies the core's only delivery contract: one row
/// at a time, in non-decreasing `ts_recv` order.
#[derive(Clone)]
pub struct DatabentoSource {
    client: Client,
    base_url: String,
    api_key: String,
    dataset: String,
    stype_in: String,
    poll_interval: Duration,
}

impl fmt::Debug for DatabentoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The API key is credential material; keep it out of logs.
        f.debug_struct("DatabentoSource")
            .field("base_url", &self.base_url)
            .field("dataset", &self.dataset)
            .field("stype_in", &self.stype_in)
            .finish_non_exhaustive()
    }
}

impl DatabentoSource {
    /// Create a new source. The API key is injected here and nowhere else.
    pub fn new(base_url: String, api_key: String, dataset: String, stype_in: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            dataset,
            stype_in,
            poll_interval: Duration::from_millis(500),
        }
    }

    /// Override the live polling interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn get_range_raw(&self, query: &[(&str, String)]) -> Result<String, FeedError> {
        let url = format!("{}{}", self.base_url, GET_RANGE_PATH);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(&url)
                .basic_auth(&self.api_key, Some(""))
                .query(query)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(FeedError::Network(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(FeedError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(FeedError::Http {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(FeedError::Http {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .text()
                .await
                .map_err(|e| backoff::Error::permanent(FeedError::Parse(e.to_string())))
        })
        .await
    }

    /// Parse a JSON-lines response body, rejecting malformed rows here so
    /// they never reach the core.
    fn parse_body(body: &str) -> Vec<RawMbp1> {
        let mut rows = Vec::new();
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            let value: serde_json::Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Failed to parse feed line: {}", e);
                    continue;
                }
            };
            match parse_row(&value) {
                Ok(row) => rows.push(row),
                Err(e) => warn!("Rejecting malformed row: {}", e),
            }
        }
        rows.sort_by_key(|r| r.ts_recv);
        rows
    }

    /// Fetch rows strictly after the given receive-time watermark.
    async fn fetch_since(&self, symbol: &str, after_ns: i64) -> Result<Vec<RawMbp1>, FeedError> {
        let query = [
            ("dataset", self.dataset.clone()),
            ("symbols", symbol.to_string()),
            ("schema", SCHEMA.to_string()),
            ("stype_in", self.stype_in.clone()),
            ("encoding", "json".to_string()),
            ("start", (after_ns + 1).to_string()),
        ];
        let body = self.get_range_raw(&query).await?;
        Ok(Self::parse_body(&body)
            .into_iter()
            .filter(|r| r.ts_recv > after_ns)
            .collect())
    }
}

#[async_trait]
impl TickSource for DatabentoSource {
    async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawMbp1>, FeedError> {
        debug!(
            symbol,
            dataset = %self.dataset,
            %start,
            %end,
            "fetching historical range"
        );

        let query = [
            ("dataset", self.dataset.clone()),
            ("symbols", symbol.to_string()),
            ("schema", SCHEMA.to_string()),
            ("stype_in", self.stype_in.clone()),
            ("encoding", "json".to_string()),
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.format("%Y-%m-%d").to_string()),
        ];
        let body = self.get_range_raw(&query).await?;
        Ok(Self::parse_body(&body))
    }

    fn subscribe(&self, symbol: &str) -> BoxStream<'static, Result<RawMbp1, FeedError>> {
        struct PollState {
            source: DatabentoSource,
            symbol: String,
            watermark: i64,
            pending: VecDeque<RawMbp1>,
        }

        let state = PollState {
            source: self.clone(),
            symbol: symbol.to_string(),
            watermark: chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0),
            pending: VecDeque::new(),
        };

        stream::unfold(state, |mut st| async move {
            loop {
                if let Some(row) = st.pending.pop_front() {
                    return Some((Ok(row), st));
                }
                match st.source.fetch_since(&st.symbol, st.watermark).await {
                    Ok(rows) => {
                        for row in rows {
                            st.watermark = st.watermark.max(row.ts_recv);
                            st.pending.push_back(row);
                        }
                        if st.pending.is_empty() {
                            tokio::time::sleep(st.source.poll_interval).await;
                        }
                    }
                    Err(e) => return Some((Err(e), st)),
                }
            }
        })
        .boxed()
    }
}

/// Parse one MBP-1 row. Prices and timestamps may arrive as JSON numbers
/// or decimal strings depending on the encoder.
fn parse_row(value: &serde_json::Value) -> Result<RawMbp1, FeedError> {
    let ts_recv = field_i64(value, "ts_recv")?;

    let level = value
        .get("levels")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| FeedError::Parse("Missing levels[0]".to_string()))?;

    let bid_px = field_i64(level, "bid_px")?;
    let ask_px = field_i64(level, "ask_px")?;
    let bid_sz = field_u32(level, "bid_sz")?;
    let ask_sz = field_u32(level, "ask_sz")?;

    Ok(RawMbp1 {
        ts_recv,
        bid_px,
        ask_px,
        bid_sz,
        ask_sz,
    })
}

fn field_i64(value: &serde_json::Value, name: &str) -> Result<i64, FeedError> {
    let field = value
        .get(name)
        .ok_or_else(|| FeedError::Parse(format!("Missing {} field", name)))?;
    field
        .as_i64()
        .or_else(|| field.as_str().and_then(|s| s.parse::<i64>().ok()))
        .ok_or_else(|| FeedError::Parse(format!("Invalid {}: {}", name, field)))
}

fn field_u32(value: &serde_json::Value, name: &str) -> Result<u32, FeedError> {
    let raw = field_i64(value, name)?;
    u32::try_from(raw).map_err(|_| FeedError::Parse(format!("Invalid {}: {}", name, raw)))
}
