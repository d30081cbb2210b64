pub mod volatility;
pub mod black_scholes;
pub mod binomial;
pub mod trinomial;
pub mod monte_carlo;

use crate::errors::{EngineError, EngineResult};
use std::str::FromStr;

/// All pricing models implement this trait.
/// price() must be a pure function of its inputs, except for the explicit
/// random source the Monte Carlo model owns per call.
/// Send + Sync required for use across tokio blocking tasks.
pub trait PricingModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Price one side of a European option.
    fn price(&self, params: &PricingParams, side: OptionSide) -> EngineResult<f64>;

    /// Price both sides. Models that share work between sides override this.
    fn price_pair(&self, params: &PricingParams) -> SidePrices {
        SidePrices {
            call: self.price(params, OptionSide::Call),
            put: self.price(params, OptionSide::Put),
        }
    }
}

/// Call and put outcomes of a single model, each failing independently.
#[derive(Debug, Clone, PartialEq)]
pub struct SidePrices {
    pub call: EngineResult<f64>,
    pub put: EngineResult<f64>,
}

impl SidePrices {
    /// Same error on both sides (e.g. a worker task that never returned).
    pub fn failed(err: EngineError) -> Self {
        Self { call: Err(err.clone()), put: Err(err) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSide {
    Call,
    Put,
}

impl OptionSide {
    /// Exercise value of the option at `spot`.
    #[inline]
    pub fn payoff(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionSide {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            _ => Err(EngineError::InvalidOptionType(s.to_string())),
        }
    }
}

/// Market inputs shared by every model. Stack-allocated, Copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingParams {
    /// Spot price
    pub spot: f64,
    pub strike: f64,
    /// Time to expiry in years
    pub ttl_years: f64,
    /// Annualized risk-free rate as a decimal (0.05 = 5%)
    pub rate: f64,
    /// Annualized volatility as a decimal
    pub sigma: f64,
}

impl PricingParams {
    pub fn new(spot: f64, strike: f64, ttl_years: f64, rate: f64, sigma: f64) -> EngineResult<Self> {
        if !(spot.is_finite() && spot > 0.0) {
            return Err(EngineError::Domain(format!("spot must be positive, got {spot}")));
        }
        if !(strike.is_finite() && strike > 0.0) {
            return Err(EngineError::Domain(format!("strike must be positive, got {strike}")));
        }
        if !ttl_years.is_finite() || ttl_years < 0.0 {
            return Err(EngineError::Domain(format!(
                "time to expiry must be non-negative, got {ttl_years}"
            )));
        }
        if !rate.is_finite() {
            return Err(EngineError::Domain(format!("rate must be finite, got {rate}")));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(EngineError::Domain(format!(
                "volatility must be non-negative, got {sigma}"
            )));
        }
        Ok(Self { spot, strike, ttl_years, rate, sigma })
    }

    /// True when there is no time value or no uncertainty left to price.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.ttl_years == 0.0 || self.sigma == 0.0
    }

    #[inline]
    pub fn discount(&self) -> f64 {
        (-self.rate * self.ttl_years).exp()
    }

    /// Value of the option when the terminal price is known with certainty:
    /// the spot against the discounted strike. At expiry this is the plain
    /// intrinsic value.
    #[inline]
    pub fn deterministic_value(&self, side: OptionSide) -> f64 {
        if self.ttl_years == 0.0 {
            return side.payoff(self.spot, self.strike);
        }
        side.payoff(self.spot, self.strike * self.discount())
    }
}
