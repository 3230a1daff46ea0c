//! Position and PnL ledger: the stateful core of the strategy.

use crate::config::StrategyConfig;
use crate::domain::{Decimal, QuoteTick, ResultRecord, Side};
use crate::engine::signal;
use tracing::debug;

/// Mutable strategy state for a single instrument run.
///
/// One value per run, owned exclusively by the processing loop. Running two
/// instruments means two independent `LedgerState` values with no cross-talk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerState {
    /// Current position in contract units, always within
    /// `[-position_max, +position_max]`.
    pub position: i32,
    /// Number of long contract sides filled (non-decreasing).
    pub buy_qty: u32,
    /// Number of short contract sides filled (non-decreasing).
    pub sell_qty: u32,
    /// Sum of per-contract prices paid on actual buys.
    pub real_buy_total: Decimal,
    /// Sum of per-contract prices received on actual sells.
    pub real_sell_total: Decimal,
    /// Cost to flatten the current short at the current ask. Recomputed
    /// from scratch every tick, never accumulated.
    pub theo_buy_total: Decimal,
    /// Proceeds from flattening the current long at the current bid.
    /// Recomputed from scratch every tick, never accumulated.
    pub theo_sell_total: Decimal,
    /// Sum of fees over every filled side (non-decreasing).
    pub fees_total: Decimal,

    // Append-only; one record per accepted tick.
    results: Vec<ResultRecord>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single tick: evaluate, decide, mark, account, record.
    ///
    /// Returns the appended record, or `None` when the tick had a zero bid
    /// or ask size, in which case no state changed and nothing was recorded.
    /// Each call completes fully before the next tick is considered; the
    /// step order below is load-bearing because the theoretical mark and
    /// PnL read state written by the decision in the same call.
    pub fn update(&mut self, cfg: &StrategyConfig, tick: &QuoteTick) -> Option<&ResultRecord> {
        let skew = signal::evaluate(tick.bid_sz, tick.ask_sz)?;

        if let Some(side) = self.decide(cfg, skew) {
            self.apply_fill(cfg, side, tick);
            debug!(
                side = %side,
                skew,
                position = self.position,
                "skew trade"
            );
        }

        self.mark_to_market(tick);
        let pnl = self.pnl(cfg);

        self.results.push(ResultRecord {
            ts_recv: tick.ts_recv,
            bid_px: tick.bid_px,
            ask_px: tick.ask_px,
            skew,
            position: self.position,
            trade_count: self.trade_count(),
            fees: self.fees_total,
            pnl,
        });
        self.results.last()
    }

    /// Decide the side to trade, if any.
    ///
    /// Branches are mutually exclusive and checked in priority order; a
    /// signal exactly at the threshold never trades (strict inequality),
    /// and a position already at the limit holds. At most one contract
    /// changes hands per tick regardless of signal magnitude.
    fn decide(&self, cfg: &StrategyConfig, skew: f64) -> Option<Side> {
        if skew > cfg.skew_threshold && self.position < cfg.position_max {
            Some(Side::Buy)
        } else if skew < -cfg.skew_threshold && self.position > -cfg.position_max {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// Apply a one-contract fill at the touch: buys cross the ask, sells
    /// cross the bid. Fill prices assume zero latency; in practice they
    /// will likely be worse.
    fn apply_fill(&mut self, cfg: &StrategyConfig, side: Side, tick: &QuoteTick) {
        match side {
            Side::Buy => {
                self.position += 1;
                self.buy_qty += 1;
                self.real_buy_total += tick.ask_px;
            }
            Side::Sell => {
                self.position -= 1;
                self.sell_qty += 1;
                self.real_sell_total += tick.bid_px;
            }
        }
        self.fees_total += cfg.fees_per_side();
    }

    /// Recompute the cost/proceeds of flattening the open position at the
    /// current quote. At most one of the two totals is ever non-zero, and
    /// both are zero when flat.
    fn mark_to_market(&mut self, tick: &QuoteTick) {
        if self.position == 0 {
            self.theo_buy_total = Decimal::zero();
            self.theo_sell_total = Decimal::zero();
        } else if self.position > 0 {
            self.theo_sell_total = tick.bid_px * Decimal::from_int(self.position as i64);
            self.theo_buy_total = Decimal::zero();
        } else {
            self.theo_buy_total = tick.ask_px * Decimal::from_int(-self.position as i64);
            self.theo_sell_total = Decimal::zero();
        }
    }

    /// Mark-to-market equity: realized profit on closed portions plus
    /// unrealized profit on the open position, net of fees.
    fn pnl(&self, cfg: &StrategyConfig) -> Decimal {
        cfg.point_value
            * (self.real_sell_total + self.theo_sell_total
                - self.real_buy_total
                - self.theo_buy_total)
            - self.fees_total
    }

    /// Cumulative filled sides.
    pub fn trade_count(&self) -> u32 {
        self.buy_qty + self.sell_qty
    }

    /// Final realized profit, in price points: sells received minus buys paid.
    pub fn realized_profit(&self) -> Decimal {
        self.real_sell_total - self.real_buy_total
    }

    /// The append-only result log, one record per accepted tick.
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Consume the ledger and take the result log.
    pub fn into_results(self) -> Vec<ResultRecord> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TsRecv;

    fn cfg() -> StrategyConfig {
        StrategyConfig::new(
            0.1,
            Decimal::from_str_exact("50").unwrap(),
            Decimal::from_str_exact("0.39").unwrap(),
            Decimal::from_str_exact("0.05").unwrap(),
            10,
        )
        .unwrap()
    }

    fn tick(ts: i64, bid: &str, ask: &str, bid_sz: u32, ask_sz: u32) -> QuoteTick {
        QuoteTick {
            ts_recv: TsRecv::new(ts),
            bid_px: Decimal::from_str_exact(bid).unwrap(),
            ask_px: Decimal::from_str_exact(ask).unwrap(),
            bid_sz,
            ask_sz,
        }
    }

    #[test]
    fn test_buy_crosses_the_ask() {
        let cfg = cfg();
        let mut ledger = LedgerState::new();
        let record = ledger
            .update(&cfg, &tick(1, "4500.00", "4500.25", 100, 10))
            .cloned()
            .expect("two-sided tick must produce a record");

        assert_eq!(record.skew, 1.0);
        assert_eq!(record.position, 1);
        assert_eq!(ledger.buy_qty, 1);
        assert_eq!(ledger.sell_qty, 0);
        assert_eq!(
            ledger.real_buy_total,
            Decimal::from_str_exact("4500.25").unwrap()
        );
        assert_eq!(ledger.fees_total, cfg.fees_per_side());
    }

    #[test]
    fn test_sell_crosses_the_bid() {
        let cfg = cfg();
        let mut ledger = LedgerState::new();
        ledger.update(&cfg, &tick(1, "4500.00", "4500.25", 10, 100));

        assert_eq!(ledger.position, -1);
        assert_eq!(ledger.sell_qty, 1);
        assert_eq!(
            ledger.real_sell_total,
            Decimal::from_str_exact("4500.00").unwrap()
        );
    }

    #[test]
    fn test_hold_changes_nothing_but_the_mark() {
        let cfg = cfg();
        let mut ledger = LedgerState::new();
        ledger.update(&cfg, &tick(1, "4500.00", "4500.25", 100, 10));
        let fees_before = ledger.fees_total;

        // Balanced book: skew == 0, hold; theoretical sell marks the long.
        ledger.update(&cfg, &tick(2, "4500.00", "4500.25", 1, 1));
        assert_eq!(ledger.position, 1);
        assert_eq!(ledger.buy_qty, 1);
        assert_eq!(ledger.fees_total, fees_before);
        assert_eq!(
            ledger.theo_sell_total,
            Decimal::from_str_exact("4500.00").unwrap()
        );
        assert!(ledger.theo_buy_total.is_zero());
    }

    #[test]
    fn test_zero_size_skip_leaves_state_untouched() {
        let cfg = cfg();
        let mut ledger = LedgerState::new();
        ledger.update(&cfg, &tick(1, "4500.00", "4500.25", 100, 10));
        let before = ledger.clone();

        assert!(ledger
            .update(&cfg, &tick(2, "4500.00", "4500.25", 0, 10))
            .is_none());
        assert!(ledger
            .update(&cfg, &tick(3, "4500.00", "4500.25", 10, 0))
            .is_none());
        assert_eq!(ledger, before);
        assert_eq!(ledger.results().len(), 1);
    }

    #[test]
    fn test_position_cap_blocks_further_buys() {
        let cfg = cfg();
        let mut ledger = LedgerState::new();
        for i in 0..15 {
            ledger.update(&cfg, &tick(i, "4500.00", "4500.25", 100, 10));
        }
        assert_eq!(ledger.position, cfg.position_max);
        assert_eq!(ledger.buy_qty, 10);
        // Capped ticks still record: theoretical/PnL recompute happens.
        assert_eq!(ledger.results().len(), 15);
    }

    #[test]
    fn test_threshold_boundary_never_trades() {
        // skew_threshold = 1.0 and a 10:1 book gives skew == 1.0 exactly;
        // strict inequality means hold.
        let cfg = StrategyConfig::new(
            1.0,
            Decimal::from_str_exact("50").unwrap(),
            Decimal::from_str_exact("0.39").unwrap(),
            Decimal::from_str_exact("0.05").unwrap(),
            10,
        )
        .unwrap();
        let mut ledger = LedgerState::new();
        for i in 0..8 {
            let (b, a) = if i % 2 == 0 { (100, 10) } else { (10, 100) };
            ledger.update(&cfg, &tick(i, "4500.00", "4500.25", b, a));
        }
        assert_eq!(ledger.position, 0);
        assert_eq!(ledger.trade_count(), 0);
        assert!(ledger.fees_total.is_zero());
    }

    #[test]
    fn test_theoretical_totals_mutually_exclusive() {
        let cfg = cfg();
        let mut ledger = LedgerState::new();
        let ticks = [
            (1, 100, 10),  // buy
            (2, 10, 100),  // sell back to flat
            (3, 10, 100),  // sell, short
            (4, 1, 1),     // hold
        ];
        for (ts, b, a) in ticks {
            ledger.update(&cfg, &tick(ts, "4500.00", "4500.25", b, a));
            assert!(
                ledger.theo_buy_total.is_zero() || ledger.theo_sell_total.is_zero(),
                "theoretical totals must never both be non-zero"
            );
            if ledger.position == 0 {
                assert!(ledger.theo_buy_total.is_zero());
                assert!(ledger.theo_sell_total.is_zero());
            }
        }
        assert_eq!(ledger.position, -1);
        assert_eq!(
            ledger.theo_buy_total,
            Decimal::from_str_exact("4500.25").unwrap()
        );
    }

    #[test]
    fn test_pnl_is_point_value_weighted_net_of_fees() {
        let cfg = cfg();
        let mut ledger = LedgerState::new();
        // Buy at 4500.25, then mark the long against a 4501.00 bid.
        ledger.update(&cfg, &tick(1, "4500.00", "4500.25", 100, 10));
        let record = ledger
            .update(&cfg, &tick(2, "4501.00", "4501.25", 1, 1))
            .cloned()
            .unwrap();

        // 50 * (4501.00 - 4500.25) - 0.44 = 37.50 - 0.44
        assert_eq!(record.pnl, Decimal::from_str_exact("37.06").unwrap());
    }
}
