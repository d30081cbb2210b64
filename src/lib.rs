//! European option pricing core.
//!
//! Estimates historical volatility from a close-price series and prices calls
//! and puts under Black-Scholes, a CRR binomial tree, a trinomial tree and
//! Monte Carlo. [`pricing::PricingOrchestrator`] ties them together for one
//! request; market data and the calendar come in through [`feeds`].

pub mod config;
pub mod errors;
pub mod feeds;
pub mod models;
pub mod pricing;
