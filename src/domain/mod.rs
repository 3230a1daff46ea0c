//! Domain types for the skew strategy.
//!
//! This module provides:
//! - Exact numeric handling via the Decimal wrapper
//! - Domain primitives: TsRecv, Symbol, Side
//! - The raw MBP-1 wire row and its normalized QuoteTick form
//! - The fixed-shape per-tick ResultRecord

pub mod decimal;
pub mod primitives;
pub mod record;
pub mod tick;

pub use decimal::Decimal;
pub use primitives::{Side, Symbol, TsRecv};
pub use record::ResultRecord;
pub use tick::{QuoteTick, RawMbp1};
