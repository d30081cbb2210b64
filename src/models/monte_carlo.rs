use crate::errors::{EngineError, EngineResult};
use crate::models::{OptionSide, PricingModel, PricingParams, SidePrices};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

pub const DEFAULT_SIMULATIONS: usize = 50_000;

/// Monte Carlo European pricing from the closed-form GBM terminal law.
///
/// S_T = S * exp((r - sigma^2/2)*T + sigma*sqrt(T)*Z),  Z ~ N(0, 1)
/// price = e^{-rT} * mean(payoff(S_T))
///
/// No path discretisation: the payoff depends on S_T only.
#[derive(Debug, Clone, Copy)]
pub struct MonteCarlo {
    pub simulations: usize,
    /// Seed for the per-call generator. None draws fresh OS entropy.
    pub seed: Option<u64>,
}

/// Discounted sample mean and its standard error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McEstimate {
    pub price: f64,
    pub std_error: f64,
}

impl MonteCarlo {
    pub fn new(simulations: usize) -> Self {
        Self { simulations, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fresh generator owned by a single pricing call.
    pub fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Price one side drawing normals from `rng`.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        params: &PricingParams,
        side: OptionSide,
        rng: &mut R,
    ) -> EngineResult<McEstimate> {
        if params.is_degenerate() {
            return Ok(McEstimate { price: params.deterministic_value(side), std_error: 0.0 });
        }
        if self.simulations == 0 {
            return Err(EngineError::Domain("simulation count must be > 0".into()));
        }

        let t = params.ttl_years;
        let drift = (params.rate - 0.5 * params.sigma * params.sigma) * t;
        let vol = params.sigma * t.sqrt();

        // Welford running mean/variance of undiscounted payoffs.
        let mut mean = 0.0_f64;
        let mut m2 = 0.0_f64;
        for i in 0..self.simulations {
            let z: f64 = StandardNormal.sample(&mut *rng);
            let st = params.spot * (drift + vol * z).exp();
            let payoff = side.payoff(st, params.strike);
            let delta = payoff - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (payoff - mean);
        }

        let n = self.simulations as f64;
        let disc = params.discount();
        let std_error = if self.simulations > 1 {
            disc * (m2 / (n - 1.0)).sqrt() / n.sqrt()
        } else {
            f64::INFINITY
        };

        if !mean.is_finite() {
            return Err(EngineError::Model(format!(
                "monte carlo mean payoff is not finite (sigma={}, T={t})",
                params.sigma
            )));
        }

        Ok(McEstimate { price: disc * mean, std_error })
    }
}

impl Default for MonteCarlo {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATIONS)
    }
}

impl PricingModel for MonteCarlo {
    #[inline]
    fn name(&self) -> &'static str {
        "Monte Carlo"
    }

    fn price(&self, params: &PricingParams, side: OptionSide) -> EngineResult<f64> {
        let mut rng = self.make_rng();
        self.estimate(params, side, &mut rng).map(|e| e.price)
    }

    /// Call then put from one generator, so the two sides use independent draws.
    fn price_pair(&self, params: &PricingParams) -> SidePrices {
        let mut rng = self.make_rng();
        SidePrices {
            call: self.estimate(params, OptionSide::Call, &mut rng).map(|e| e.price),
            put: self.estimate(params, OptionSide::Put, &mut rng).map(|e| e.price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::black_scholes::BlackScholes;
    use approx::assert_relative_eq;

    fn params(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> PricingParams {
        PricingParams::new(s, k, t, r, sigma).unwrap()
    }

    #[test]
    fn test_reference_within_one_percent() {
        let model = MonteCarlo::new(500_000).with_seed(7);
        let pair = model.price_pair(&params(100.0, 100.0, 1.0, 0.05, 0.2));
        assert_relative_eq!(pair.call.unwrap(), 10.4506, max_relative = 1e-2);
        assert_relative_eq!(pair.put.unwrap(), 5.5735, max_relative = 1e-2);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let p = params(100.0, 95.0, 0.5, 0.02, 0.3);
        let a = MonteCarlo::new(20_000).with_seed(42).price(&p, OptionSide::Put).unwrap();
        let b = MonteCarlo::new(20_000).with_seed(42).price(&p, OptionSide::Put).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_different_seeds_differ() {
        let p = params(100.0, 95.0, 0.5, 0.02, 0.3);
        let a = MonteCarlo::new(5_000).with_seed(1).price(&p, OptionSide::Call).unwrap();
        let b = MonteCarlo::new(5_000).with_seed(2).price(&p, OptionSide::Call).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_error_shrinks_and_brackets_analytic() {
        let p = params(100.0, 110.0, 1.0, 0.03, 0.25);
        let (bs_call, _) = BlackScholes::new().call_put(&p);

        let mut rng = StdRng::seed_from_u64(2024);
        let small = MonteCarlo::new(1_000).estimate(&p, OptionSide::Call, &mut rng).unwrap();
        let large = MonteCarlo::new(1_000_000).estimate(&p, OptionSide::Call, &mut rng).unwrap();

        // Standard error scales as 1/sqrt(n): 1000x more draws, ~31.6x smaller.
        let ratio = small.std_error / large.std_error;
        assert!(ratio > 20.0 && ratio < 45.0, "ratio={ratio}");
        assert!(
            (large.price - bs_call).abs() < 5.0 * large.std_error,
            "mc={} bs={bs_call} se={}",
            large.price,
            large.std_error
        );
    }

    #[test]
    fn test_expired_is_exact_intrinsic() {
        let model = MonteCarlo::default().with_seed(3);
        let p = params(100.0, 80.0, 0.0, 0.05, 0.4);
        assert_eq!(model.price(&p, OptionSide::Call), Ok(20.0));
        assert_eq!(model.price(&p, OptionSide::Put), Ok(0.0));
    }

    #[test]
    fn test_zero_vol_matches_analytic() {
        let p = params(100.0, 100.0, 1.0, 0.05, 0.0);
        let (bs_call, bs_put) = BlackScholes::new().call_put(&p);
        let pair = MonteCarlo::default().price_pair(&p);
        assert_eq!(pair.call, Ok(bs_call));
        assert_eq!(pair.put, Ok(bs_put));
    }

    #[test]
    fn test_zero_simulations_rejected() {
        let p = params(100.0, 100.0, 1.0, 0.05, 0.2);
        let mut rng = StdRng::seed_from_u64(0);
        let res = MonteCarlo::new(0).estimate(&p, OptionSide::Call, &mut rng);
        assert!(matches!(res, Err(EngineError::Domain(_))));
    }
}
