//! Book-skew signal evaluator.

/// Evaluate the directional skew of the top of book.
///
/// Returns `log10(bid_sz) - log10(ask_sz)`: positive when bid depth
/// dominates (buy pressure), negative when ask depth dominates. Returns
/// `None` when either size is zero; no feature is defined for a one-sided
/// or empty book, and the caller must not trade or account on such a tick.
///
/// Pure function, no stored state.
pub fn evaluate(bid_sz: u32, ask_sz: u32) -> Option<f64> {
    if bid_sz == 0 || ask_sz == 0 {
        return None;
    }
    Some((bid_sz as f64).log10() - (ask_sz as f64).log10())
}
