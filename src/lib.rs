pub mod config;
pub mod error;
pub mod pipeline;
pub mod predictor;
pub mod spec;
pub mod validator;

pub use config::EstimatorConfig;
pub use error::PriceLensError;
pub use pipeline::{estimate, EstimateOutcome};
pub use predictor::{PredictionClient, PredictionRequest, PredictionResult};
pub use spec::LaptopSpec;
pub use validator::{LlmSpecValidator, SpecValidationPort, ValidationVerdict};
