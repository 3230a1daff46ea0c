//! Top-of-book quote types: the raw MBP-1 wire row and the normalized tick.

use crate::domain::{Decimal, TsRecv};
use serde::{Deserialize, Serialize};

/// A raw MBP-1 (market-by-price, top level) row as delivered by the feed.
///
/// Prices are fixed-point integers with 1e-9 scale, the encoding used on
/// the wire. Both the historical and live paths produce this shape; neither
/// hands it to the core directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMbp1 {
    /// Gateway receive timestamp, nanoseconds since Unix epoch.
    pub ts_recv: i64,
    /// Best bid price, integer multiples of 1e-9.
    pub bid_px: i64,
    /// Best ask price, integer multiples of 1e-9.
    pub ask_px: i64,
    /// Size resting at the best bid.
    pub bid_sz: u32,
    /// Size resting at the best ask.
    pub ask_sz: u32,
}

/// A normalized top-of-book quote update, the core's sole input.
///
/// `ask_px >= bid_px` is assumed but not enforced; ticks arrive strictly
/// ordered by `ts_recv` and are never reordered or buffered by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTick {
    /// Opaque ordering key copied from the wire row.
    pub ts_recv: TsRecv,
    /// Best bid price.
    pub bid_px: Decimal,
    /// Best ask price.
    pub ask_px: Decimal,
    /// Size resting at the best bid.
    pub bid_sz: u32,
    /// Size resting at the best ask.
    pub ask_sz: u32,
}

impl QuoteTick {
    /// Normalize a raw wire row into an exact-price tick.
    ///
    /// This is the single normalization step shared by the historical and
    /// live paths; feed implementations must not bypass it.
    pub fn from_raw(raw: &RawMbp1) -> Self {
        QuoteTick {
            ts_recv: TsRecv::new(raw.ts_recv),
            bid_px: Decimal::from_fixed_1e9(raw.bid_px),
            ask_px: Decimal::from_fixed_1e9(raw.ask_px),
            bid_sz: raw.bid_sz,
            ask_sz: raw.ask_sz,
        }
    }

    /// Returns true if either side of the book is empty.
    pub fn is_one_sided(&self) -> bool {
        self.bid_sz == 0 || self.ask_sz == 0
    }
}
