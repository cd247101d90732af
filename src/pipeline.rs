//! Orchestration of the validate-then-predict flow.
//!
//! One submission is one call to [`estimate`]: strictly sequential, at most
//! one validation call followed conditionally by at most one prediction
//! call. The pipeline holds no state between calls — concurrent submissions
//! run as fully independent pipelines.

use tracing::info;

use crate::error::PriceLensError;
use crate::predictor::{PredictionClient, PredictionResult};
use crate::spec::LaptopSpec;
use crate::validator::SpecValidationPort;

/// Outcome of a single estimation run.
///
/// A rejected specification is a normal outcome, not an error: the verdict
/// short-circuits the pipeline before the prediction call is made.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateOutcome {
    Priced(PredictionResult),
    Rejected { reason: String },
}

/// Run the two-stage pipeline for one specification.
///
/// Errors from either stage surface here unchanged; this is the single seam
/// where callers convert them to user-facing messages.
pub async fn estimate(
    validator: &dyn SpecValidationPort,
    predictor: &PredictionClient,
    spec: &LaptopSpec,
) -> Result<EstimateOutcome, PriceLensError> {
    let verdict = validator.validate(spec).await?;

    if !verdict.is_valid {
        let reason = verdict
            .reason
            .unwrap_or_else(|| "Invalid specifications provided.".to_string());
        info!("Specification rejected: {}", reason);
        return Ok(EstimateOutcome::Rejected { reason });
    }

    let result = predictor.predict(spec).await?;
    Ok(EstimateOutcome::Priced(result))
}
