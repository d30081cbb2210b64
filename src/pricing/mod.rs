pub mod orchestrator;
pub mod request;
pub mod result;

pub use orchestrator::PricingOrchestrator;
pub use request::{PricingRequest, ValidatedRequest};
pub use result::{ErrorResponse, PricingResponse, PricingResult};
