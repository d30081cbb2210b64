pub mod static_feed;

use crate::errors::EngineResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of spot prices and close histories for an underlying.
/// Implementations own their transport; the pricing core only sees these calls.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn spot_price(&self, symbol: &str) -> EngineResult<f64>;

    /// The most recent `observations` daily closes, oldest first.
    async fn price_history(&self, symbol: &str, observations: usize) -> EngineResult<Vec<f64>>;
}

/// Calendar source used to turn an expiry date into time to expiry.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Pinned date for reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
