//! Strategy runner: feeds raw rows through normalization into the ledger.

use crate::config::StrategyConfig;
use crate::domain::{Decimal, QuoteTick, RawMbp1, ResultRecord};
use crate::engine::LedgerState;
use crate::feed::{FeedError, TickSource};
use chrono::NaiveDate;
use futures::{Stream, StreamExt};
use std::fmt;
use tracing::info;

/// One strategy run over one instrument.
///
/// Owns the ledger state exclusively; running two instruments means two
/// `Strategy` values driven by two independent loops. Both run modes feed
/// every raw row through the same normalization step before the ledger
/// sees it.
#[derive(Debug)]
pub struct Strategy {
    config: StrategyConfig,
    ledger: LedgerState,
    ticks_seen: u64,
    ticks_skipped: u64,
}

impl Strategy {
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            ledger: LedgerState::new(),
            ticks_seen: 0,
            ticks_skipped: 0,
        }
    }

    /// Normalize one raw row and run the per-tick update.
    ///
    /// Returns the appended record, or `None` when the tick was skipped
    /// for a one-sided book.
    pub fn on_raw(&mut self, raw: &RawMbp1) -> Option<&ResultRecord> {
        self.ticks_seen += 1;
        let tick = QuoteTick::from_raw(raw);
        if self.ledger.update(&self.config, &tick).is_none() {
            self.ticks_skipped += 1;
            return None;
        }
        self.ledger.results().last()
    }

    /// Replay a bounded historical range from the given source.
    pub async fn run_historical(
        &mut self,
        source: &dyn TickSource,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RunSummary, FeedError> {
        let rows = source.fetch_range(symbol, start, end).await?;
        info!(symbol, rows = rows.len(), "replaying historical range");

        for raw in &rows {
            self.on_raw(raw);
        }
        Ok(self.summary())
    }

    /// Consume a live row stream until it ends or fails.
    ///
    /// Each update completes synchronously between stream items, so
    /// cancelling the returned future (e.g., on ctrl-c) can only land
    /// between ticks and never leaves the ledger partially updated.
    pub async fn run_live<S>(&mut self, stream: S) -> Result<RunSummary, FeedError>
    where
        S: Stream<Item = Result<RawMbp1, FeedError>>,
    {
        futures::pin_mut!(stream);
        while let Some(item) = stream.next().await {
            let raw = item?;
            self.on_raw(&raw);
        }
        info!("live stream ended");
        Ok(self.summary())
    }

    /// Aggregate figures for the run so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks_seen: self.ticks_seen,
            ticks_skipped: self.ticks_skipped,
            trade_count: self.ledger.trade_count(),
            final_position: self.ledger.position,
            realized_profit: self.ledger.realized_profit(),
            fees: self.ledger.fees_total,
            pnl: self
                .ledger
                .results()
                .last()
                .map(|r| r.pnl)
                .unwrap_or_else(Decimal::zero),
        }
    }

    /// The ledger owned by this run.
    pub fn ledger(&self) -> &LedgerState {
        &self.ledger
    }

    /// Consume the run and take the result log.
    pub fn into_results(self) -> Vec<ResultRecord> {
        self.ledger.into_results()
    }
}

/// End-of-run aggregates; the typed form of the figures the strategy
/// reports when a run finishes or is interrupted.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks_seen: u64,
    pub ticks_skipped: u64,
    pub trade_count: u32,
    pub final_position: i32,
    /// Sells received minus buys paid, in price points.
    pub realized_profit: Decimal,
    pub fees: Decimal,
    /// Mark-to-market equity after the last accepted tick.
    pub pnl: Decimal,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ticks: {} ({} skipped)",
            self.ticks_seen, self.ticks_skipped
        )?;
        writeln!(
            f,
            "trades: {} (final position {})",
            self.trade_count, self.final_position
        )?;
        writeln!(f, "realized profit: {}", self.realized_profit)?;
        writeln!(f, "fees: {}", self.fees)?;
        write!(f, "pnl: {}", self.pnl)
    }
}
