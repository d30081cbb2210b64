use crate::errors::{EngineError, EngineResult};
use statrs::statistics::Statistics;

/// Trading days per year used to annualize daily return volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Chronological close prices. At least two observations, all positive.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(closes: Vec<f64>) -> EngineResult<Self> {
        if closes.len() < 2 {
            return Err(EngineError::InsufficientHistory { len: closes.len() });
        }
        if let Some((idx, &bad)) = closes
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(EngineError::Domain(format!(
                "close price at index {idx} must be positive, got {bad}"
            )));
        }
        Ok(Self { closes })
    }

    /// Number of closes, always at least two.
    #[inline]
    pub fn observations(&self) -> usize {
        self.closes.len()
    }

    /// Most recent close.
    #[inline]
    pub fn last(&self) -> f64 {
        self.closes[self.closes.len() - 1]
    }

    /// Simple one-period returns (p_i - p_{i-1}) / p_{i-1}.
    pub fn simple_returns(&self) -> Vec<f64> {
        self.closes
            .windows(2)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect()
    }
}

/// Annualized historical volatility: sample standard deviation of simple
/// returns scaled by sqrt(252).
pub fn historical_volatility(series: &PriceSeries) -> f64 {
    let returns = series.simple_returns();
    if returns.len() < 2 {
        // A single return has no dispersion.
        return 0.0;
    }
    returns.iter().std_dev() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Validate raw closes and estimate volatility in one step.
pub fn estimate_from_closes(closes: &[f64]) -> EngineResult<f64> {
    let series = PriceSeries::new(closes.to_vec())?;
    let sigma = historical_volatility(&series);
    tracing::debug!(observations = series.observations(), sigma, "historical volatility estimated");
    Ok(sigma)
}
