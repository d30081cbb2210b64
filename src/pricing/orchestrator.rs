use crate::config::AppConfig;
use crate::errors::{EngineError, EngineResult};
use crate::feeds::{Clock, MarketDataProvider};
use crate::models::binomial::CrrBinomial;
use crate::models::black_scholes::BlackScholes;
use crate::models::monte_carlo::MonteCarlo;
use crate::models::trinomial::TrinomialTree;
use crate::models::volatility::estimate_from_closes;
use crate::models::{PricingModel, PricingParams, SidePrices};
use crate::pricing::request::{years_to_expiry, PricingRequest};
use crate::pricing::result::PricingResult;
use std::sync::Arc;

/// Runs one request through volatility estimation and all four models.
///
/// Request, market-data and history failures abort the cycle. Anything a
/// single model raises stays in that model's slot of the result.
///
/// Holds no mutable state; one instance can serve concurrent requests.
pub struct PricingOrchestrator {
    black_scholes: Arc<dyn PricingModel>,
    binomial: Arc<dyn PricingModel>,
    monte_carlo: Arc<dyn PricingModel>,
    trinomial: Arc<dyn PricingModel>,
    history_observations: usize,
}

impl PricingOrchestrator {
    pub fn new(config: &AppConfig) -> EngineResult<Self> {
        config.validate()?;

        let mut monte_carlo = MonteCarlo::new(config.mc_simulations);
        if let Some(seed) = config.mc_seed {
            monte_carlo = monte_carlo.with_seed(seed);
        }

        Ok(Self {
            black_scholes: Arc::new(BlackScholes::new()),
            binomial: Arc::new(CrrBinomial::new(config.binomial_steps)),
            monte_carlo: Arc::new(monte_carlo),
            trinomial: Arc::new(TrinomialTree::new(config.trinomial_steps)),
            history_observations: config.history_observations,
        })
    }

    /// Price a raw request end to end.
    pub async fn price_request(
        &self,
        request: &PricingRequest,
        market: &dyn MarketDataProvider,
        clock: &dyn Clock,
    ) -> EngineResult<PricingResult> {
        let req = request.validate()?;
        tracing::info!(
            underlying = %req.underlying,
            strike = req.strike,
            expiry = %req.expiry,
            rate = req.rate,
            "pricing request"
        );

        let spot = market.spot_price(&req.underlying).await?;
        let closes = market
            .price_history(&req.underlying, self.history_observations)
            .await?;
        let sigma = estimate_from_closes(&closes)?;
        let ttl_years = years_to_expiry(req.expiry, clock.today())?;

        let params = PricingParams::new(spot, req.strike, ttl_years, req.rate, sigma)?;
        tracing::debug!(
            spot,
            ttl_years,
            sigma,
            observations = closes.len(),
            "pricing inputs resolved"
        );

        Ok(self.price_params(params).await)
    }

    /// Run all four models concurrently on blocking workers and join them.
    pub async fn price_params(&self, params: PricingParams) -> PricingResult {
        let (black_scholes, binomial, monte_carlo, trinomial) = tokio::join!(
            run_model(self.black_scholes.clone(), params),
            run_model(self.binomial.clone(), params),
            run_model(self.monte_carlo.clone(), params),
            run_model(self.trinomial.clone(), params),
        );

        let result = PricingResult {
            black_scholes,
            binomial,
            monte_carlo,
            trinomial,
            sigma: params.sigma,
            params,
        };

        for (model, side, err) in result.failures() {
            tracing::warn!(model, side = %side, error = %err, "model failed, other results kept");
        }

        result
    }
}

async fn run_model(model: Arc<dyn PricingModel>, params: PricingParams) -> SidePrices {
    let name = model.name();
    let started = std::time::Instant::now();

    match tokio::task::spawn_blocking(move || model.price_pair(&params)).await {
        Ok(prices) => {
            tracing::debug!(
                model = name,
                elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
                "model priced"
            );
            prices
        }
        Err(e) => SidePrices::failed(EngineError::Model(format!("{name} worker failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::static_feed::StaticFeed;
    use crate::feeds::FixedClock;
    use crate::pricing::request::NumericField;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    /// Roughly 1% daily moves around 100.
    fn history() -> Vec<f64> {
        vec![
            100.0, 101.0, 99.8, 101.2, 100.5, 102.0, 101.1, 100.2, 101.7, 102.4, 101.0, 102.2,
            103.0, 101.9, 102.8, 103.5, 102.6, 103.9, 103.1, 104.0,
        ]
    }

    fn feed() -> StaticFeed {
        StaticFeed::new().with_series("TEST", history())
    }

    fn config() -> AppConfig {
        AppConfig {
            binomial_steps: 500,
            trinomial_steps: 500,
            mc_simulations: 100_000,
            mc_seed: Some(11),
            ..AppConfig::default()
        }
    }

    fn request(strike: &str, days: i64, rate_pct: f64) -> PricingRequest {
        PricingRequest {
            underlying: "test".into(),
            strike_price: NumericField::Text(strike.into()),
            expiry_date: (today() + chrono::Duration::days(days)).format("%Y-%m-%d").to_string(),
            risk_free_rate: NumericField::Number(rate_pct),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_all_models_agree() {
        let orch = PricingOrchestrator::new(&config()).unwrap();
        let result = orch
            .price_request(&request("104", 126, 5.0), &feed(), &FixedClock(today()))
            .await
            .unwrap();

        assert!(result.is_complete(), "failures: {:?}", result.failures());
        assert_eq!(result.params.spot, 104.0);
        assert_eq!(result.params.ttl_years, 0.5);
        assert!((result.params.rate - 0.05).abs() < 1e-15);

        let expected_sigma = estimate_from_closes(&history()).unwrap();
        assert_eq!(result.sigma, expected_sigma);
        assert!((result.historical_volatility() - expected_sigma * 100.0).abs() < 1e-12);

        let (bs_call, bs_put) = BlackScholes::new().call_put(&result.params);
        assert_eq!(result.black_scholes.call, Ok(bs_call));
        assert_eq!(result.black_scholes.put, Ok(bs_put));

        for (prices, tol) in [
            (&result.binomial, 0.01),
            (&result.trinomial, 0.01),
            (&result.monte_carlo, 0.03),
        ] {
            let call = *prices.call.as_ref().unwrap();
            let put = *prices.put.as_ref().unwrap();
            assert!((call - bs_call).abs() / bs_call < tol, "call {call} vs {bs_call}");
            assert!((put - bs_put).abs() / bs_put < tol, "put {put} vs {bs_put}");
        }
    }

    #[tokio::test]
    async fn test_seeded_runs_are_identical() {
        let orch = PricingOrchestrator::new(&config()).unwrap();
        let clock = FixedClock(today());
        let a = orch.price_request(&request("100", 60, 3.0), &feed(), &clock).await.unwrap();
        let b = orch.price_request(&request("100", 60, 3.0), &feed(), &clock).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_one_failing_model_keeps_the_rest() {
        // A single trinomial step cannot absorb a 50% drift at this vol;
        // the finer binomial lattice still can.
        let cfg = AppConfig { trinomial_steps: 1, ..config() };
        let orch = PricingOrchestrator::new(&cfg).unwrap();
        let result = orch
            .price_request(&request("100", 252, 50.0), &feed(), &FixedClock(today()))
            .await
            .unwrap();

        assert!(matches!(result.trinomial.call, Err(EngineError::Domain(_))));
        assert!(matches!(result.trinomial.put, Err(EngineError::Domain(_))));
        assert!(result.black_scholes.call.is_ok());
        assert!(result.binomial.put.is_ok());
        assert!(result.monte_carlo.call.is_ok());

        let response = result.to_response();
        assert!(response.call_price_trinomial.is_none());
        assert!(response.call_price_bs.is_some());
        assert_eq!(response.errors.len(), 2);
    }

    #[tokio::test]
    async fn test_expiry_today_prices_intrinsic_everywhere() {
        let orch = PricingOrchestrator::new(&config()).unwrap();
        let result = orch
            .price_request(&request("100", 0, 5.0), &feed(), &FixedClock(today()))
            .await
            .unwrap();

        for prices in [&result.black_scholes, &result.binomial, &result.monte_carlo, &result.trinomial] {
            assert_eq!(prices.call, Ok(4.0));
            assert_eq!(prices.put, Ok(0.0));
        }
    }

    #[tokio::test]
    async fn test_malformed_request_is_fatal() {
        let orch = PricingOrchestrator::new(&config()).unwrap();
        let err = orch
            .price_request(&request("ten", 30, 5.0), &feed(), &FixedClock(today()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_fatal() {
        let orch = PricingOrchestrator::new(&config()).unwrap();
        let err = orch
            .price_request(&request("100", 30, 5.0), &StaticFeed::new(), &FixedClock(today()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DataFetch(_)));
    }

    #[tokio::test]
    async fn test_short_history_is_fatal() {
        let orch = PricingOrchestrator::new(&config()).unwrap();
        let feed = StaticFeed::new().with_series("TEST", vec![100.0]);
        let err = orch
            .price_request(&request("100", 30, 5.0), &feed, &FixedClock(today()))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::InsufficientHistory { len: 1 });
    }

    #[tokio::test]
    async fn test_past_expiry_is_fatal() {
        let orch = PricingOrchestrator::new(&config()).unwrap();
        let err = orch
            .price_request(&request("100", -5, 5.0), &feed(), &FixedClock(today()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Domain(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = AppConfig { trinomial_steps: 0, ..AppConfig::default() };
        assert!(matches!(PricingOrchestrator::new(&cfg), Err(EngineError::Config(_))));
    }
}
