use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::market::PriceObservation;

pub mod yahoo;

/// Closed set of fetch failures. Transport, HTTP, and decode faults are all
/// folded into `Failed` at the call site; callers never see a raw client
/// error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no rows returned for {symbol}")]
    NoData { symbol: String },

    #[error("only {rows} trading-day row(s) for {symbol}; need at least 2")]
    InsufficientHistory { symbol: String, rows: usize },

    #[error("market data request failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Daily closing prices for `symbol` between `start` and `end`, oldest
    /// first, with at least two trading-day rows.
    async fn fetch_recent_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceObservation, FetchError>;
}
