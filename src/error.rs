use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceLensError {
    #[error("Spec error: {0}")]
    Spec(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation service error: {0}")]
    Validation(String),

    #[error("Prediction service error: {0}")]
    Prediction(String),
}

impl From<PriceLensError> for String {
    fn from(err: PriceLensError) -> Self {
        err.to_string()
    }
}
