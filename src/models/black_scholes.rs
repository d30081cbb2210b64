use crate::errors::EngineResult;
use crate::models::{OptionSide, PricingModel, PricingParams, SidePrices};
use statrs::distribution::{ContinuousCDF, Normal};

/// Black-Scholes closed-form European pricing.
///
/// call = S * Phi(d1) - K * e^{-rT} * Phi(d2)
/// put  = K * e^{-rT} * Phi(-d2) - S * Phi(-d1)
///
/// where d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// and d2 = d1 - sigma * sqrt(T).
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        let normal = Normal::new(0.0, 1.0).unwrap_or_else(|_| Normal::standard());
        Self { normal }
    }

    /// Both sides from a single d1/d2 evaluation.
    pub fn call_put(&self, params: &PricingParams) -> (f64, f64) {
        if params.is_degenerate() {
            return (
                params.deterministic_value(OptionSide::Call),
                params.deterministic_value(OptionSide::Put),
            );
        }

        let sigma_sqrt_t = params.sigma * params.ttl_years.sqrt();
        let d1 = ((params.spot / params.strike).ln()
            + (params.rate + 0.5 * params.sigma * params.sigma) * params.ttl_years)
            / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;
        let pv_strike = params.strike * params.discount();

        let call = params.spot * self.normal.cdf(d1) - pv_strike * self.normal.cdf(d2);
        let put = pv_strike * self.normal.cdf(-d2) - params.spot * self.normal.cdf(-d1);
        (call, put)
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingModel for BlackScholes {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn price(&self, params: &PricingParams, side: OptionSide) -> EngineResult<f64> {
        let (call, put) = self.call_put(params);
        Ok(match side {
            OptionSide::Call => call,
            OptionSide::Put => put,
        })
    }

    fn price_pair(&self, params: &PricingParams) -> SidePrices {
        let (call, put) = self.call_put(params);
        SidePrices { call: Ok(call), put: Ok(put) }
    }
}
