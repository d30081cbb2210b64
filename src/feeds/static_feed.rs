use crate::errors::{EngineError, EngineResult};
use crate::feeds::MarketDataProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// In-memory close histories keyed by symbol.
///
/// File format (JSON):
/// {
///   "AAPL": [189.3, 190.1, 188.7, ...],
///   "MSFT": [402.0, 405.5, ...]
/// }
///
/// Closes are oldest first. The spot price is the latest close.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    closes: HashMap<String, Vec<f64>>,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, closes: Vec<f64>) -> Self {
        self.closes.insert(normalize(symbol), closes);
        self
    }

    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        let parsed: HashMap<String, Vec<f64>> = serde_json::from_str(raw)?;
        let closes = parsed
            .into_iter()
            .map(|(symbol, series)| (normalize(&symbol), series))
            .collect();
        Ok(Self { closes })
    }

    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::DataFetch(format!("read {}: {e}", path.display()))
        })?;
        let feed = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            symbols = feed.closes.len(),
            "loaded price histories"
        );
        Ok(feed)
    }

    fn series(&self, symbol: &str) -> EngineResult<&[f64]> {
        self.closes
            .get(&normalize(symbol))
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::DataFetch(format!("no price history for {symbol}")))
    }
}

#[async_trait]
impl MarketDataProvider for StaticFeed {
    async fn spot_price(&self, symbol: &str) -> EngineResult<f64> {
        let price = self
            .series(symbol)?
            .last()
            .copied()
            .ok_or_else(|| EngineError::DataFetch(format!("empty price history for {symbol}")))?;

        if price <= 0.0 || !price.is_finite() {
            return Err(EngineError::DataFetch(format!("invalid spot for {symbol}: {price}")));
        }
        Ok(price)
    }

    async fn price_history(&self, symbol: &str, observations: usize) -> EngineResult<Vec<f64>> {
        let series = self.series(symbol)?;
        let start = series.len().saturating_sub(observations);
        Ok(series[start..].to_vec())
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}
