use crate::config::MAX_LATTICE_STEPS;
use crate::errors::{EngineError, EngineResult};
use crate::models::{OptionSide, PricingModel, PricingParams};

pub const DEFAULT_TRINOMIAL_STEPS: usize = 1000;

/// Tolerance for round-off around the [0, 1] probability bounds.
const PROB_EPS: f64 = 1e-12;

/// Recombining trinomial tree (Boyle-style half-step matching).
///
/// up = e^{sigma*sqrt(2dt)}, down = 1/up
/// p_up   = ((e^{(r-q)dt/2} - e^{-sigma*sqrt(dt/2)}) / (e^{sigma*sqrt(dt/2)} - e^{-sigma*sqrt(dt/2)}))^2
/// p_down = ((e^{sigma*sqrt(dt/2)} - e^{(r-q)dt/2}) / (e^{sigma*sqrt(dt/2)} - e^{-sigma*sqrt(dt/2)}))^2
/// p_mid  = 1 - p_up - p_down
///
/// Terminal layer has 2n+1 nodes ordered from lowest to highest price, node m
/// at S * e^{sigma*sqrt(2dt)*(m-n)}. The
/// rollback reuses that buffer; layer k occupies its first 2k+1 slots.
///
/// Probabilities outside [0, 1] are rejected rather than clamped.
#[derive(Debug, Clone, Copy)]
pub struct TrinomialTree {
    pub steps: usize,
    /// Continuous dividend yield. Zero for every caller in this crate.
    pub dividend_yield: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrinomialProbabilities {
    pub up: f64,
    pub mid: f64,
    pub down: f64,
}

impl TrinomialTree {
    pub fn new(steps: usize) -> Self {
        Self { steps, dividend_yield: 0.0 }
    }

    pub fn with_dividend_yield(mut self, q: f64) -> Self {
        self.dividend_yield = q;
        self
    }

    /// Branch probabilities for one time step of length `dt`.
    pub fn probabilities(&self, params: &PricingParams, dt: f64) -> EngineResult<TrinomialProbabilities> {
        let drift_half = ((params.rate - self.dividend_yield) * dt / 2.0).exp();
        let up_half = (params.sigma * (dt / 2.0).sqrt()).exp();
        let down_half = 1.0 / up_half;
        let width = up_half - down_half;

        if width.abs() <= 1e-14 {
            return Err(EngineError::Domain(
                "trinomial half-step spread is degenerate".into(),
            ));
        }

        let up = ((drift_half - down_half) / width).powi(2);
        let down = ((up_half - drift_half) / width).powi(2);
        let mid = 1.0 - up - down;

        for (label, p) in [("up", up), ("mid", mid), ("down", down)] {
            if !p.is_finite() || p < -PROB_EPS || p > 1.0 + PROB_EPS {
                return Err(EngineError::Domain(format!(
                    "trinomial {label} probability {p} outside [0, 1] (sigma={}, dt={dt})",
                    params.sigma
                )));
            }
        }

        Ok(TrinomialProbabilities { up, mid, down })
    }
}

impl Default for TrinomialTree {
    fn default() -> Self {
        Self::new(DEFAULT_TRINOMIAL_STEPS)
    }
}

impl PricingModel for TrinomialTree {
    #[inline]
    fn name(&self) -> &'static str {
        "Trinomial"
    }

    fn price(&self, params: &PricingParams, side: OptionSide) -> EngineResult<f64> {
        if params.is_degenerate() {
            return Ok(params.deterministic_value(side));
        }
        if self.steps == 0 || self.steps > MAX_LATTICE_STEPS {
            return Err(EngineError::Domain(format!(
                "trinomial steps {} outside 1..={MAX_LATTICE_STEPS}",
                self.steps
            )));
        }

        let n = self.steps;
        let dt = params.ttl_years / n as f64;
        let probs = self.probabilities(params, dt)?;

        let log_step = params.sigma * (2.0 * dt).sqrt();
        let growth = (params.rate * dt).exp();

        let mut values: Vec<f64> = (0..=2 * n)
            .map(|m| {
                let moves = m as f64 - n as f64;
                let st = params.spot * (log_step * moves).exp();
                side.payoff(st, params.strike)
            })
            .collect();

        for k in (0..n).rev() {
            for m in 0..=2 * k {
                values[m] = (probs.up * values[m + 2]
                    + probs.mid * values[m + 1]
                    + probs.down * values[m])
                    / growth;
            }
        }

        let root = values[0];
        if !root.is_finite() {
            return Err(EngineError::Domain(format!(
                "trinomial {side} value is not finite: terminal prices overflow (sigma={}, T={}, steps={n})",
                params.sigma, params.ttl_years
            )));
        }
        Ok(root)
    }
}
