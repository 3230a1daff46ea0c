pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod feed;
pub mod report;
pub mod strategy;

pub use config::{Config, RunMode, StrategyConfig};
pub use domain::{Decimal, QuoteTick, RawMbp1, ResultRecord, Side, Symbol, TsRecv};
pub use engine::LedgerState;
pub use error::AppError;
pub use feed::{DatabentoSource, FeedError, MockTickSource, TickSource};
pub use strategy::{RunSummary, Strategy};
