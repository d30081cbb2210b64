use rusty_pricer::config::AppConfig;
use rusty_pricer::errors::{EngineError, EngineResult};
use rusty_pricer::feeds::static_feed::StaticFeed;
use rusty_pricer::feeds::SystemClock;
use rusty_pricer::pricing::{ErrorResponse, PricingOrchestrator, PricingRequest};
use std::io::Read;

/// Reads one pricing request (JSON) from stdin, prices it against the local
/// price-history file and writes the response JSON to stdout.
#[tokio::main]
async fn main() {
    // Structured logging on stderr so stdout carries only the response
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("rusty_pricer starting");

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    match run(&cfg).await {
        Ok(body) => println!("{body}"),
        Err(e) => {
            tracing::error!(kind = e.kind(), "pricing failed: {e}");
            println!("{}", ErrorResponse::from(&e).to_json());
            std::process::exit(2);
        }
    }
}

async fn run(cfg: &AppConfig) -> EngineResult<String> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|e| EngineError::InvalidRequest(format!("stdin: {e}")))?;
    let request: PricingRequest = serde_json::from_str(&raw)
        .map_err(|e| EngineError::InvalidRequest(format!("body: {e}")))?;

    let feed = StaticFeed::from_json_file(&cfg.market_data_path)?;
    let orchestrator = PricingOrchestrator::new(cfg)?;

    let result = orchestrator
        .price_request(&request, &feed, &SystemClock)
        .await?;

    tracing::info!(
        underlying = %request.underlying,
        hv_pct = result.historical_volatility(),
        complete = result.is_complete(),
        "pricing done"
    );

    Ok(serde_json::to_string_pretty(&result.to_response())?)
}
