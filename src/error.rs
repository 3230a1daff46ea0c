use crate::config::ConfigError;
use crate::feed::FeedError;
use thiserror::Error;

/// Top-level error for the binary and report layer.
///
/// The strategy core has no error path of its own beyond the zero-size
/// skip; everything here originates in configuration, the feed, or output.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
