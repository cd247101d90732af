//! Client for the external price prediction endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::PriceLensError;
use crate::spec::metrics::{derive_ppi, derive_resolution_category, round2, ResolutionCategory};
use crate::spec::{parse_resolution, LaptopSpec};

/// Fixed-key request payload for the prediction endpoint.
/// The PascalCase key names, the 0/1 flags, and the derived fields are part
/// of the wire contract — the model server rejects anything else.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionRequest {
    pub company: String,
    pub type_name: String,
    pub inches: f64,
    pub ram: f64,
    pub op_sys: String,
    pub weight: f64,
    pub has_ips_panel: u8,
    pub has_touch_screen: u8,
    pub res_width: u32,
    pub res_height: u32,
    pub res_category: ResolutionCategory,
    pub ppi: f64,
    pub ssd: f64,
    pub hdd: f64,
    pub flash: f64,
    pub hybrid: f64,
    pub cpu_category: String,
    pub cpu_speed_ghz: f64,
    pub gpu_category: String,
}

impl PredictionRequest {
    /// Assemble the payload from a raw spec: parse the resolution string and
    /// derive the display metrics the model expects.
    pub fn from_spec(spec: &LaptopSpec) -> Result<Self, PriceLensError> {
        let (res_width, res_height) =
            parse_resolution(&spec.screen_resolution).map_err(PriceLensError::Spec)?;

        Ok(Self {
            company: spec.company.clone(),
            type_name: spec.type_name.clone(),
            inches: spec.inches,
            ram: spec.ram,
            op_sys: spec.os.clone(),
            weight: spec.weight,
            has_ips_panel: spec.ips_panel as u8,
            has_touch_screen: spec.touchscreen as u8,
            res_width,
            res_height,
            res_category: derive_resolution_category(res_width, res_height),
            ppi: derive_ppi(res_width, res_height, spec.inches),
            ssd: spec.ssd,
            hdd: spec.hdd,
            flash: spec.flash,
            hybrid: spec.hybrid,
            cpu_category: spec.cpu_category.clone(),
            cpu_speed_ghz: spec.cpu_speed_ghz,
            gpu_category: spec.gpu_category.clone(),
        })
    }
}

/// The numeric price returned by the endpoint, rounded to 2 decimals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub predicted_price: f64,
}

/// Client for the prediction endpoint. One POST per call, 30-second
/// timeout, no retries — a submission either gets its price or fails.
pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PriceLensError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PriceLensError::Prediction(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// POST the spec to the prediction endpoint and return the price.
    pub async fn predict(&self, spec: &LaptopSpec) -> Result<PredictionResult, PriceLensError> {
        let payload = PredictionRequest::from_spec(spec)?;

        info!(
            "Requesting price prediction for '{} {}' from {}",
            spec.company, spec.type_name, self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = if e.is_timeout() {
                    format!("Prediction API timeout after 30s for {}", self.endpoint)
                } else {
                    format!("Prediction API request failed: {}", e)
                };
                error!("{}", msg);
                PriceLensError::Prediction(msg)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            let msg = format!(
                "Prediction API request failed with status {}: {}",
                status.as_u16(),
                truncate_for_log(&body, 1024)
            );
            error!("{}", msg);
            return Err(PriceLensError::Prediction(msg));
        }

        let body_text = response.text().await.map_err(|e| {
            PriceLensError::Prediction(format!("Failed to read prediction response body: {}", e))
        })?;

        let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
            let msg = format!(
                "Failed to parse prediction response as JSON: {}. Raw response (first 500 chars): {}",
                e,
                truncate_for_log(&body_text, 500)
            );
            error!("{}", msg);
            PriceLensError::Prediction(msg)
        })?;

        let price = resp_json["predicted_price"].as_f64().ok_or_else(|| {
            let msg = format!(
                "Prediction response missing numeric 'predicted_price' field. Raw response (first 500 chars): {}",
                truncate_for_log(&body_text, 500)
            );
            error!("{}", msg);
            PriceLensError::Prediction(msg)
        })?;

        let result = PredictionResult {
            predicted_price: round2(price),
        };
        info!(
            "Received prediction for '{} {}': {:.2}",
            spec.company, spec.type_name, result.predicted_price
        );
        Ok(result)
    }
}

fn truncate_for_log(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
