//! Runtime configuration: prediction endpoint, AI provider/model, API keys.
//!
//! Everything resolves from environment variables with production defaults;
//! API keys additionally fall back to the OS keychain so they never need to
//! live in shell profiles.

use keyring::Entry;
use tracing::{info, warn};
use url::Url;

use crate::error::PriceLensError;

/// Production prediction endpoint.
pub const DEFAULT_PREDICTION_URL: &str =
    "https://laptop-price-prediction-api-1004676663046.us-central1.run.app/predict";

const DEFAULT_PROVIDER: &str = "claude";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const KEYRING_USER: &str = "pricelens";

#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    pub prediction_url: String,
    pub provider: String,
    pub model: String,
}

impl EstimatorConfig {
    /// Resolve configuration from `PRICELENS_PREDICTION_URL`,
    /// `PRICELENS_AI_PROVIDER` and `PRICELENS_AI_MODEL`, with production
    /// defaults for anything unset. The endpoint must be a valid URL.
    pub fn from_env() -> Result<Self, PriceLensError> {
        let prediction_url = env_or("PRICELENS_PREDICTION_URL", DEFAULT_PREDICTION_URL);
        Url::parse(&prediction_url).map_err(|e| {
            PriceLensError::Config(format!(
                "Invalid prediction endpoint URL '{}': {}",
                prediction_url, e
            ))
        })?;

        Ok(Self {
            prediction_url,
            provider: env_or("PRICELENS_AI_PROVIDER", DEFAULT_PROVIDER),
            model: env_or("PRICELENS_AI_MODEL", DEFAULT_MODEL),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Map a provider name to its keychain service entry.
fn keyring_service(provider: &str) -> Result<&'static str, String> {
    match provider {
        "claude" => Ok("pricelens-claude-api"),
        "openai" => Ok("pricelens-openai-api"),
        "kimi" => Ok("pricelens-kimi-api"),
        "openrouter" => Ok("pricelens-openrouter-api"),
        _ => Err(format!(
            "Unknown AI provider: '{}'. Supported: claude, openai, kimi, openrouter",
            provider
        )),
    }
}

/// Resolve the API key for a provider: `PRICELENS_API_KEY` first, then the
/// OS keychain. A missing key is a hard error — validation cannot run
/// without the completion service.
pub fn resolve_api_key(provider: &str) -> Result<String, PriceLensError> {
    if let Ok(key) = std::env::var("PRICELENS_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    let service = keyring_service(provider).map_err(PriceLensError::Config)?;
    let entry = Entry::new(service, KEYRING_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", service, e);
        PriceLensError::Config(e.to_string())
    })?;
    match entry.get_password() {
        Ok(key) => Ok(key),
        Err(keyring::Error::NoEntry) => Err(PriceLensError::Config(format!(
            "No API key configured for '{}'. Set PRICELENS_API_KEY or run `pricelens set-key {}`.",
            provider, provider
        ))),
        Err(e) => Err(PriceLensError::Config(format!(
            "Failed to read API key for '{}': {}",
            provider, e
        ))),
    }
}

/// Store an API key in the system keychain.
pub fn set_api_key(provider: &str, key: &str) -> Result<(), PriceLensError> {
    info!("Setting API key for provider: {}", provider);
    let service = keyring_service(provider).map_err(PriceLensError::Config)?;
    let entry = Entry::new(service, KEYRING_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", service, e);
        PriceLensError::Config(e.to_string())
    })?;
    entry.set_password(key).map_err(|e| {
        warn!("Failed to set password for {}: {}", service, e);
        PriceLensError::Config(e.to_string())
    })
}

/// Remove an API key from the system keychain.
pub fn delete_api_key(provider: &str) -> Result<(), PriceLensError> {
    info!("Deleting API key for provider: {}", provider);
    let service = keyring_service(provider).map_err(PriceLensError::Config)?;
    let entry = Entry::new(service, KEYRING_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", service, e);
        PriceLensError::Config(e.to_string())
    })?;
    entry.delete_credential().map_err(|e| {
        warn!("Failed to delete credential for {}: {}", service, e);
        PriceLensError::Config(e.to_string())
    })
}
