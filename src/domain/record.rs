//! Fixed-shape per-tick result record.

use crate::domain::{Decimal, TsRecv};
use serde::{Deserialize, Serialize};

/// The immutable record appended to the result log after each accepted tick.
///
/// Captures the post-update ledger state plus the tick fields that produced
/// it. Created once at the end of `LedgerState::update` and never mutated;
/// skipped ticks produce no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Receive timestamp of the tick.
    pub ts_recv: TsRecv,
    /// Best bid at the tick.
    pub bid_px: Decimal,
    /// Best ask at the tick.
    pub ask_px: Decimal,
    /// Skew signal value (log10 bid/ask size ratio).
    pub skew: f64,
    /// Position after the decision, in contract units.
    pub position: i32,
    /// Cumulative filled sides (buys + sells).
    pub trade_count: u32,
    /// Cumulative fees paid.
    pub fees: Decimal,
    /// Mark-to-market equity after fees.
    pub pnl: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_flat() {
        let record = ResultRecord {
            ts_recv: TsRecv::new(1_000),
            bid_px: Decimal::from_str_exact("4500").unwrap(),
            ask_px: Decimal::from_str_exact("4500.25").unwrap(),
            skew: 1.0,
            position: 1,
            trade_count: 1,
            fees: Decimal::from_str_exact("0.44").unwrap(),
            pnl: Decimal::from_str_exact("-12.94").unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["ts_recv"], 1_000);
        assert_eq!(json["position"], 1);
        assert_eq!(json["trade_count"], 1);
        assert!(json["pnl"].is_number());
    }
}
