use crate::domain::{Decimal, Symbol};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

/// Full runtime configuration: validated core parameters plus the feed
/// collaborator's parameters. Credential material is deliberately absent;
/// see [`load_api_key`].
#[derive(Debug, Clone)]
pub struct Config {
    pub strategy: StrategyConfig,
    pub feed: FeedConfig,
    pub run_mode: RunMode,
}

/// Core strategy parameters, immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Signal magnitude that must be exceeded (strictly) to act.
    pub skew_threshold: f64,
    /// Currency value of one point of price movement per contract.
    pub point_value: Decimal,
    /// Venue fee charged per filled side.
    pub venue_fees_per_side: Decimal,
    /// Clearing fee charged per filled side.
    pub clearing_fees_per_side: Decimal,
    /// Inclusive bound on absolute position size.
    pub position_max: i32,
}

impl StrategyConfig {
    /// Build a validated strategy config.
    ///
    /// # Errors
    /// Rejects `position_max < 1`, negative or non-finite `skew_threshold`,
    /// and negative fees.
    pub fn new(
        skew_threshold: f64,
        point_value: Decimal,
        venue_fees_per_side: Decimal,
        clearing_fees_per_side: Decimal,
        position_max: i32,
    ) -> Result<Self, ConfigError> {
        if !skew_threshold.is_finite() || skew_threshold < 0.0 {
            return Err(ConfigError::InvalidValue(
                "SKEW_THRESHOLD".to_string(),
                "must be a finite value >= 0".to_string(),
            ));
        }
        if position_max < 1 {
            return Err(ConfigError::InvalidValue(
                "POSITION_MAX".to_string(),
                "must be >= 1".to_string(),
            ));
        }
        if venue_fees_per_side.is_negative() || clearing_fees_per_side.is_negative() {
            return Err(ConfigError::InvalidValue(
                "FEES_PER_SIDE".to_string(),
                "fees must be >= 0".to_string(),
            ));
        }
        Ok(StrategyConfig {
            skew_threshold,
            point_value,
            venue_fees_per_side,
            clearing_fees_per_side,
            position_max,
        })
    }

    /// Total cost charged per filled side.
    pub fn fees_per_side(&self) -> Decimal {
        self.venue_fees_per_side + self.clearing_fees_per_side
    }
}

/// Parameters of the external tick source.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub dataset: String,
    pub symbol: Symbol,
    pub stype_in: String,
    pub base_url: String,
    /// Start of the historical range (inclusive).
    pub start: NaiveDate,
    /// End of the historical range (inclusive).
    pub end: NaiveDate,
}

/// Where ticks come from for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Bounded range replay from the historical API.
    Historical,
    /// Open-ended live subscription.
    Live,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("Secrets file unreadable: {0}")]
    SecretsUnreadable(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let skew_threshold = parse_with_default(&env_map, "SKEW_THRESHOLD", "0.1", |s| {
            s.parse::<f64>().ok()
        })?;
        let point_value = parse_with_default(&env_map, "POINT_VALUE", "50", |s| {
            Decimal::from_str_exact(s).ok()
        })?;
        let venue_fees = parse_with_default(&env_map, "VENUE_FEES_PER_SIDE", "0.39", |s| {
            Decimal::from_str_exact(s).ok()
        })?;
        let clearing_fees = parse_with_default(&env_map, "CLEARING_FEES_PER_SIDE", "0.05", |s| {
            Decimal::from_str_exact(s).ok()
        })?;
        let position_max = parse_with_default(&env_map, "POSITION_MAX", "10", |s| {
            s.parse::<i32>().ok()
        })?;

        let strategy = StrategyConfig::new(
            skew_threshold,
            point_value,
            venue_fees,
            clearing_fees,
            position_max,
        )?;

        let run_mode = match env_map
            .get("RUN_MODE")
            .map(|s| s.as_str())
            .unwrap_or("historical")
        {
            "historical" => RunMode::Historical,
            "live" => RunMode::Live,
            other => {
                return Err(ConfigError::InvalidValue(
                    "RUN_MODE".to_string(),
                    format!("must be historical or live, got {}", other),
                ))
            }
        };

        let feed = FeedConfig {
            dataset: env_map
                .get("DATASET")
                .cloned()
                .unwrap_or_else(|| "GLBX.MDP3".to_string()),
            symbol: Symbol::new(
                env_map
                    .get("SYMBOL")
                    .cloned()
                    .unwrap_or_else(|| "ES.c.0".to_string()),
            ),
            stype_in: env_map
                .get("STYPE_IN")
                .cloned()
                .unwrap_or_else(|| "continuous".to_string()),
            base_url: env_map
                .get("FEED_BASE_URL")
                .cloned()
                .unwrap_or_else(|| "https://hist.databento.com".to_string()),
            start: parse_with_default(&env_map, "START_DATE", "2023-08-25", |s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
            })?,
            end: parse_with_default(&env_map, "END_DATE", "2023-10-10", |s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
            })?,
        };

        Ok(Config {
            strategy,
            feed,
            run_mode,
        })
    }
}

fn parse_with_default<T>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    let raw = env_map.get(key).map(|s| s.as_str()).unwrap_or(default);
    parse(raw).ok_or_else(|| {
        ConfigError::InvalidValue(key.to_string(), format!("could not parse {:?}", raw))
    })
}

/// Load the feed API key from the environment, falling back to a
/// `KEY=value` secrets file.
///
/// The key is injected into the feed source only; the strategy core never
/// reads credential material.
pub fn load_api_key(env_map: &HashMap<String, String>) -> Result<String, ConfigError> {
    if let Some(key) = env_map.get("DATABENTO_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    let path = env_map
        .get("SECRETS_PATH")
        .map(|s| s.as_str())
        .unwrap_or(".secrets");
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::SecretsUnreadable(format!("{}: {}", path, e)))?;

    content
        .lines()
        .find_map(|line| line.split_once('=').map(|(_, v)| v.trim().to_string()))
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnv("DATABENTO_API_KEY".to_string()))
}
