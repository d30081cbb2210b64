use crate::errors::EngineError;
use crate::models::{OptionSide, PricingParams, SidePrices};
use std::collections::BTreeMap;

/// Outcome of one pricing cycle. Each model's call and put succeed or fail
/// on their own; a failed model never blanks out the others.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult {
    pub black_scholes: SidePrices,
    pub binomial: SidePrices,
    pub monte_carlo: SidePrices,
    pub trinomial: SidePrices,
    /// Annualized sigma as a decimal
    pub sigma: f64,
    /// Inputs every model was priced with
    pub params: PricingParams,
}

impl PricingResult {
    /// Historical volatility in percent.
    #[inline]
    pub fn historical_volatility(&self) -> f64 {
        self.sigma * 100.0
    }

    fn slots(&self) -> [(&'static str, &SidePrices); 4] {
        [
            ("blackScholes", &self.black_scholes),
            ("binomial", &self.binomial),
            ("monteCarlo", &self.monte_carlo),
            ("trinomial", &self.trinomial),
        ]
    }

    /// Every failed (model, side) pair.
    pub fn failures(&self) -> Vec<(&'static str, OptionSide, &EngineError)> {
        let mut out = Vec::new();
        for (model, prices) in self.slots() {
            if let Err(e) = &prices.call {
                out.push((model, OptionSide::Call, e));
            }
            if let Err(e) = &prices.put {
                out.push((model, OptionSide::Put, e));
            }
        }
        out
    }

    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn to_response(&self) -> PricingResponse {
        let errors = self
            .failures()
            .into_iter()
            .map(|(model, side, e)| (format!("{model}.{side}"), e.to_string()))
            .collect();

        PricingResponse {
            call_price_bs: self.black_scholes.call.as_ref().ok().copied(),
            put_price_bs: self.black_scholes.put.as_ref().ok().copied(),
            call_price_binomial: self.binomial.call.as_ref().ok().copied(),
            put_price_binomial: self.binomial.put.as_ref().ok().copied(),
            call_price_mc: self.monte_carlo.call.as_ref().ok().copied(),
            put_price_mc: self.monte_carlo.put.as_ref().ok().copied(),
            call_price_trinomial: self.trinomial.call.as_ref().ok().copied(),
            put_price_trinomial: self.trinomial.put.as_ref().ok().copied(),
            hv: self.historical_volatility(),
            errors,
        }
    }
}

/// Wire shape of a pricing result. A price is null only when its model
/// failed; the reason is listed under `errors` keyed by "model.side".
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PricingResponse {
    #[serde(rename = "callPriceBS")]
    pub call_price_bs: Option<f64>,
    #[serde(rename = "putPriceBS")]
    pub put_price_bs: Option<f64>,
    #[serde(rename = "callPriceBinomial")]
    pub call_price_binomial: Option<f64>,
    #[serde(rename = "putPriceBinomial")]
    pub put_price_binomial: Option<f64>,
    #[serde(rename = "callPriceMC")]
    pub call_price_mc: Option<f64>,
    #[serde(rename = "putPriceMC")]
    pub put_price_mc: Option<f64>,
    #[serde(rename = "callPriceTrinomial")]
    pub call_price_trinomial: Option<f64>,
    #[serde(rename = "putPriceTrinomial")]
    pub put_price_trinomial: Option<f64>,
    #[serde(rename = "HV")]
    pub hv: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

/// Payload for a request that could not be priced at all.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

impl ErrorResponse {
    /// Wire JSON; the error text is escaped even if serialization fails.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            serde_json::json!({ "error": self.error, "kind": self.kind }).to_string()
        })
    }
}

impl From<&EngineError> for ErrorResponse {
    fn from(e: &EngineError) -> Self {
        Self { error: e.to_string(), kind: e.kind() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(trinomial: SidePrices) -> PricingResult {
        PricingResult {
            black_scholes: SidePrices { call: Ok(10.45), put: Ok(5.57) },
            binomial: SidePrices { call: Ok(10.44), put: Ok(5.56) },
            monte_carlo: SidePrices { call: Ok(10.5), put: Ok(5.6) },
            trinomial,
            sigma: 0.2,
            params: PricingParams::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap(),
        }
    }

    #[test]
    fn test_complete_response_shape() {
        let result = sample(SidePrices { call: Ok(10.449), put: Ok(5.572) });
        assert!(result.is_complete());

        let json = serde_json::to_value(result.to_response()).unwrap();
        assert_eq!(json["callPriceBS"], 10.45);
        assert_eq!(json["putPriceTrinomial"], 5.572);
        assert!((json["HV"].as_f64().unwrap() - 20.0).abs() < 1e-12);
        assert!(json.get("errors").is_none(), "no errors key when all models priced");
    }

    #[test]
    fn test_failed_model_is_null_with_reason() {
        let result = sample(SidePrices::failed(EngineError::Domain("bad probability".into())));
        assert_eq!(result.failures().len(), 2);

        let json = serde_json::to_value(result.to_response()).unwrap();
        assert!(json["callPriceTrinomial"].is_null());
        assert!(json["putPriceTrinomial"].is_null());
        assert_eq!(json["callPriceBinomial"], 10.44);
        assert_eq!(json["errors"]["trinomial.call"], "domain error: bad probability");
        assert_eq!(json["errors"]["trinomial.put"], "domain error: bad probability");
    }

    #[test]
    fn test_error_response_kind() {
        let resp = ErrorResponse::from(&EngineError::InsufficientHistory { len: 1 });
        assert_eq!(resp.kind, "insufficient_history");
        assert!(resp.error.contains("1 observation"));
    }

    #[test]
    fn test_error_json_escapes_quotes() {
        let err = EngineError::DataFetch(r#"no history for "BTC\USD""#.into());
        let body = ErrorResponse::from(&err).to_json();
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["error"], err.to_string());
        assert_eq!(v["kind"], err.kind());
    }
}
