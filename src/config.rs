use crate::errors::{EngineError, EngineResult};
use std::path::PathBuf;

/// Upper bound on lattice depth. Both trees are O(n^2) in time.
pub const MAX_LATTICE_STEPS: usize = 20_000;

/// Upper bound on Monte Carlo draws per option side.
pub const MAX_SIMULATIONS: usize = 5_000_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub binomial_steps: usize,
    pub trinomial_steps: usize,
    pub mc_simulations: usize,
    /// Fixed seed for reproducible Monte Carlo runs; fresh entropy when unset.
    pub mc_seed: Option<u64>,
    pub history_observations: usize,
    pub market_data_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            binomial_steps: 1000,
            trinomial_steps: 1000,
            mc_simulations: 50_000,
            mc_seed: None,
            history_observations: 90,
            market_data_path: PathBuf::from("data/prices.json"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();

        let binomial_steps = parse_var("BINOMIAL_STEPS", &env_var_or("BINOMIAL_STEPS", "1000"))?;
        let trinomial_steps =
            parse_var("TRINOMIAL_STEPS", &env_var_or("TRINOMIAL_STEPS", "1000"))?;
        let mc_simulations = parse_var("MC_SIMULATIONS", &env_var_or("MC_SIMULATIONS", "50000"))?;
        let history_observations = parse_var(
            "HISTORY_OBSERVATIONS",
            &env_var_or("HISTORY_OBSERVATIONS", "90"),
        )?;

        let mc_seed = match std::env::var("MC_SEED") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_var("MC_SEED", &raw)?),
            _ => None,
        };

        let cfg = Self {
            binomial_steps,
            trinomial_steps,
            mc_simulations,
            mc_seed,
            history_observations,
            market_data_path: PathBuf::from(env_var_or("MARKET_DATA_PATH", "data/prices.json")),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject step and simulation counts that would make latency unbounded.
    pub fn validate(&self) -> EngineResult<()> {
        check_range("BINOMIAL_STEPS", self.binomial_steps, 1, MAX_LATTICE_STEPS)?;
        check_range("TRINOMIAL_STEPS", self.trinomial_steps, 1, MAX_LATTICE_STEPS)?;
        check_range("MC_SIMULATIONS", self.mc_simulations, 1, MAX_SIMULATIONS)?;
        if self.history_observations < 2 {
            return Err(EngineError::Config(format!(
                "HISTORY_OBSERVATIONS: {} is below the minimum of 2",
                self.history_observations
            )));
        }
        Ok(())
    }
}

fn check_range(key: &str, value: usize, min: usize, max: usize) -> EngineResult<()> {
    if value < min || value > max {
        return Err(EngineError::Config(format!(
            "{key}: {value} outside allowed range {min}..={max}"
        )));
    }
    Ok(())
}

fn parse_var<T>(key: &str, raw: &str) -> EngineResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| EngineError::Config(format!("{key}: {e}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
