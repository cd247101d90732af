use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use pricelens::config::{self, EstimatorConfig};
use pricelens::pipeline::{estimate, EstimateOutcome};
use pricelens::predictor::PredictionClient;
use pricelens::spec::{catalog, LaptopSpec};
use pricelens::validator::LlmSpecValidator;

#[derive(Parser)]
#[command(name = "pricelens", about = "AI-validated laptop price estimation", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the price of a laptop specification
    Estimate {
        /// Path to a TOML file describing the laptop specification
        #[arg(long)]
        spec: PathBuf,
        /// Override the prediction endpoint URL
        #[arg(long)]
        endpoint: Option<String>,
        /// Override the AI provider (claude, openai, kimi, openrouter)
        #[arg(long)]
        provider: Option<String>,
        /// Override the AI model
        #[arg(long)]
        model: Option<String>,
        /// Skip the AI plausibility check and call the prediction endpoint directly
        #[arg(long)]
        skip_validation: bool,
    },
    /// Store an API key for a provider in the system keychain
    SetKey { provider: String, key: String },
    /// Remove a provider's API key from the system keychain
    DeleteKey { provider: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Estimate {
            spec,
            endpoint,
            provider,
            model,
            skip_validation,
        } => run_estimate(spec, endpoint, provider, model, skip_validation).await,
        Command::SetKey { provider, key } => {
            config::set_api_key(&provider, &key)?;
            println!("API key stored for '{}'.", provider);
            Ok(())
        }
        Command::DeleteKey { provider } => {
            config::delete_api_key(&provider)?;
            println!("API key removed for '{}'.", provider);
            Ok(())
        }
    }
}

async fn run_estimate(
    spec_path: PathBuf,
    endpoint: Option<String>,
    provider: Option<String>,
    model: Option<String>,
    skip_validation: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(&spec_path)
        .with_context(|| format!("Failed to read spec file {}", spec_path.display()))?;
    let spec: LaptopSpec = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse spec file {}", spec_path.display()))?;

    // Out-of-set dropdown values are advisory only; the pipeline proceeds.
    for w in catalog::check_spec(&spec) {
        warn!("{} (field: {}, value: {})", w.message, w.field, w.value);
    }

    let mut cfg = EstimatorConfig::from_env()?;
    if let Some(endpoint) = endpoint {
        cfg.prediction_url = endpoint;
    }
    if let Some(provider) = provider {
        cfg.provider = provider;
    }
    if let Some(model) = model {
        cfg.model = model;
    }

    let predictor = PredictionClient::new(&cfg.prediction_url)?;

    if skip_validation {
        let result = predictor.predict(&spec).await?;
        println!("Estimated price: {:.2}", result.predicted_price);
        return Ok(());
    }

    let api_key = config::resolve_api_key(&cfg.provider)?;
    let validator = LlmSpecValidator::new(&cfg.provider, &cfg.model, api_key);

    match estimate(&validator, &predictor, &spec).await? {
        EstimateOutcome::Priced(result) => {
            println!("Estimated price: {:.2}", result.predicted_price);
        }
        EstimateOutcome::Rejected { reason } => {
            println!("Specification rejected: {}", reason);
        }
    }
    Ok(())
}
