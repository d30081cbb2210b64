use crate::errors::{EngineError, EngineResult};
use crate::models::volatility::TRADING_DAYS_PER_YEAR;
use chrono::NaiveDate;

/// Raw pricing request as handed over by a transport layer.
///
/// {
///   "underlying": "AAPL",
///   "strikePrice": "190",
///   "expiryDate": "2025-06-20",
///   "riskFreeRate": 4.5
/// }
///
/// Numeric fields arrive either as JSON numbers or as strings.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    pub underlying: String,
    #[serde(alias = "strike_price")]
    pub strike_price: NumericField,
    #[serde(alias = "expiry_date")]
    pub expiry_date: String,
    /// Annual rate in percent (4.5 = 4.5%)
    #[serde(alias = "risk_free_rate")]
    pub risk_free_rate: NumericField,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    fn parse(&self, field: &str) -> EngineResult<f64> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(raw) => raw.trim().parse::<f64>().map_err(|_| {
                EngineError::InvalidRequest(format!("{field}: '{raw}' is not a number"))
            })?,
        };
        if !value.is_finite() {
            return Err(EngineError::InvalidRequest(format!("{field}: must be finite")));
        }
        Ok(value)
    }
}

/// Request fields after parsing. Rate is a decimal.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub underlying: String,
    pub strike: f64,
    pub expiry: NaiveDate,
    pub rate: f64,
}

impl PricingRequest {
    pub fn validate(&self) -> EngineResult<ValidatedRequest> {
        let underlying = self.underlying.trim();
        if underlying.is_empty() {
            return Err(EngineError::InvalidRequest("underlying: must not be empty".into()));
        }

        let strike = self.strike_price.parse("strikePrice")?;
        if strike <= 0.0 {
            return Err(EngineError::InvalidRequest(format!(
                "strikePrice: must be positive, got {strike}"
            )));
        }

        let expiry = NaiveDate::parse_from_str(self.expiry_date.trim(), "%Y-%m-%d")?;
        let rate_pct = self.risk_free_rate.parse("riskFreeRate")?;

        Ok(ValidatedRequest {
            underlying: underlying.to_string(),
            strike,
            expiry,
            rate: rate_pct / 100.0,
        })
    }
}

/// Days from `today` to `expiry` over 252, the trading-day year used for
/// volatility annualization. Past expiries are rejected.
pub fn years_to_expiry(expiry: NaiveDate, today: NaiveDate) -> EngineResult<f64> {
    let days = (expiry - today).num_days();
    if days < 0 {
        return Err(EngineError::Domain(format!(
            "expiry {expiry} is {} day(s) before {today}",
            -days
        )));
    }
    Ok(days as f64 / TRADING_DAYS_PER_YEAR)
}
