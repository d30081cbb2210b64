use crate::config::MAX_LATTICE_STEPS;
use crate::errors::{EngineError, EngineResult};
use crate::models::{OptionSide, PricingModel, PricingParams, SidePrices};

pub const DEFAULT_BINOMIAL_STEPS: usize = 1000;

/// Cox-Ross-Rubinstein recombining binomial tree.
///
/// u = e^{sigma*sqrt(dt)}, d = 1/u, p = (e^{r*dt} - d) / (u - d)
///
/// Terminal node i (number of down moves) holds S * u^(n-i) * d^i, built as
/// S * e^{sigma*sqrt(dt)*(n-2i)}.
/// Backward induction V[i] = e^{-r*dt} * (p*V[i] + (1-p)*V[i+1]) runs in a
/// single buffer of n+1 values that is overwritten in place step by step.
#[derive(Debug, Clone, Copy)]
pub struct CrrBinomial {
    pub steps: usize,
}

/// Lattice constants for one (params, steps) pair.
#[derive(Debug, Clone, Copy)]
struct Lattice {
    /// sigma * sqrt(dt), the log-price move per step
    log_step: f64,
    /// Discounted up/down transition weights
    disc_p: f64,
    disc_q: f64,
}

impl CrrBinomial {
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }

    fn lattice(&self, params: &PricingParams) -> EngineResult<Lattice> {
        if self.steps == 0 || self.steps > MAX_LATTICE_STEPS {
            return Err(EngineError::Domain(format!(
                "binomial steps {} outside 1..={MAX_LATTICE_STEPS}",
                self.steps
            )));
        }

        let dt = params.ttl_years / self.steps as f64;
        let log_step = params.sigma * dt.sqrt();
        let up = log_step.exp();
        let down = 1.0 / up;
        let p = ((params.rate * dt).exp() - down) / (up - down);

        if !p.is_finite() || p <= 0.0 || p >= 1.0 {
            return Err(EngineError::Domain(format!(
                "binomial risk-neutral probability {p} outside (0, 1)"
            )));
        }

        let disc = (-params.rate * dt).exp();
        Ok(Lattice { log_step, disc_p: disc * p, disc_q: disc * (1.0 - p) })
    }

    fn roll_back(
        &self,
        params: &PricingParams,
        lattice: &Lattice,
        side: OptionSide,
    ) -> EngineResult<f64> {
        let n = self.steps;
        let mut values: Vec<f64> = (0..=n)
            .map(|i| {
                let moves = n as f64 - 2.0 * i as f64;
                let st = params.spot * (lattice.log_step * moves).exp();
                side.payoff(st, params.strike)
            })
            .collect();

        for j in (0..n).rev() {
            for i in 0..=j {
                values[i] = lattice.disc_p * values[i] + lattice.disc_q * values[i + 1];
            }
        }

        let root = values[0];
        if !root.is_finite() {
            return Err(EngineError::Domain(format!(
                "binomial {side} value is not finite: terminal prices overflow (sigma={}, T={}, steps={n})",
                params.sigma, params.ttl_years
            )));
        }
        Ok(root)
    }
}

impl Default for CrrBinomial {
    fn default() -> Self {
        Self::new(DEFAULT_BINOMIAL_STEPS)
    }
}

impl PricingModel for CrrBinomial {
    #[inline]
    fn name(&self) -> &'static str {
        "Binomial"
    }

    fn price(&self, params: &PricingParams, side: OptionSide) -> EngineResult<f64> {
        if params.is_degenerate() {
            return Ok(params.deterministic_value(side));
        }
        let lattice = self.lattice(params)?;
        self.roll_back(params, &lattice, side)
    }

    fn price_pair(&self, params: &PricingParams) -> SidePrices {
        if params.is_degenerate() {
            return SidePrices {
                call: Ok(params.deterministic_value(OptionSide::Call)),
                put: Ok(params.deterministic_value(OptionSide::Put)),
            };
        }
        match self.lattice(params) {
            Ok(lattice) => SidePrices {
                call: self.roll_back(params, &lattice, OptionSide::Call),
                put: self.roll_back(params, &lattice, OptionSide::Put),
            },
            Err(e) => SidePrices::failed(e),
        }
    }
}
