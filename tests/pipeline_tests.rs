//! End-to-end tests for the validate-then-predict pipeline against mocked
//! services: a stubbed validation port for pipeline sequencing, and wiremock
//! servers for the prediction endpoint and the completion providers.

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricelens::error::PriceLensError;
use pricelens::pipeline::{estimate, EstimateOutcome};
use pricelens::predictor::{PredictionClient, PredictionResult};
use pricelens::spec::LaptopSpec;
use pricelens::validator::{LlmSpecValidator, SpecValidationPort, ValidationVerdict};

struct StubValidator {
    verdict: ValidationVerdict,
}

impl StubValidator {
    fn accepting() -> Self {
        Self {
            verdict: ValidationVerdict {
                is_valid: true,
                reason: None,
            },
        }
    }

    fn rejecting(reason: &str) -> Self {
        Self {
            verdict: ValidationVerdict {
                is_valid: false,
                reason: Some(reason.to_string()),
            },
        }
    }
}

#[async_trait]
impl SpecValidationPort for StubValidator {
    async fn validate(&self, _spec: &LaptopSpec) -> Result<ValidationVerdict, PriceLensError> {
        Ok(self.verdict.clone())
    }
}

fn sample_spec() -> LaptopSpec {
    LaptopSpec {
        company: "Dell".to_string(),
        type_name: "Notebook".to_string(),
        os: "Windows 10".to_string(),
        screen_resolution: "1920x1080".to_string(),
        ips_panel: true,
        touchscreen: false,
        weight: 1.8,
        inches: 15.6,
        ram: 8.0,
        cpu_category: "Intel Core i5".to_string(),
        cpu_speed_ghz: 2.5,
        gpu_category: "Intel Mid-End".to_string(),
        ssd: 256.0,
        hdd: 0.0,
        flash: 0.0,
        hybrid: 0.0,
    }
}

async fn prediction_client(server: &MockServer) -> PredictionClient {
    PredictionClient::new(format!("{}/predict", server.uri())).unwrap()
}

// ==================== prediction endpoint ====================

#[tokio::test]
async fn predicted_price_is_rounded_to_two_decimals() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"predicted_price": 799.456})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = estimate(
        &StubValidator::accepting(),
        &prediction_client(&server).await,
        &sample_spec(),
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        EstimateOutcome::Priced(PredictionResult {
            predicted_price: 799.46
        })
    );
}

#[tokio::test]
async fn prediction_payload_carries_derived_metrics_and_exact_keys() {
    let server = MockServer::start().await;
    // sqrt(1920^2 + 1080^2) / 15.6 = 141.21, 1920x1080 classifies as Mid
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_partial_json(json!({
            "Company": "Dell",
            "TypeName": "Notebook",
            "Inches": 15.6,
            "Ram": 8.0,
            "OpSys": "Windows 10",
            "Weight": 1.8,
            "HasIpsPanel": 1,
            "HasTouchScreen": 0,
            "ResWidth": 1920,
            "ResHeight": 1080,
            "ResCategory": "Mid",
            "Ppi": 141.21,
            "Ssd": 256.0,
            "Hdd": 0.0,
            "Flash": 0.0,
            "Hybrid": 0.0,
            "CpuCategory": "Intel Core i5",
            "CpuSpeedGhz": 2.5,
            "GpuCategory": "Intel Mid-End"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"predicted_price": 650.0})))
        .expect(1)
        .mount(&server)
        .await;

    let result = prediction_client(&server)
        .await
        .predict(&sample_spec())
        .await
        .unwrap();
    assert_eq!(result.predicted_price, 650.0);
}

#[tokio::test]
async fn prediction_http_error_embeds_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
        .mount(&server)
        .await;

    let err = prediction_client(&server)
        .await
        .predict(&sample_spec())
        .await
        .unwrap_err();

    match err {
        PriceLensError::Prediction(msg) => {
            assert!(msg.contains("500"), "missing status code: {}", msg);
            assert!(msg.contains("server error"), "missing body: {}", msg);
        }
        other => panic!("expected Prediction error, got {:?}", other),
    }
}

#[tokio::test]
async fn prediction_wrong_field_name_is_schema_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price": 500})))
        .mount(&server)
        .await;

    let err = prediction_client(&server)
        .await
        .predict(&sample_spec())
        .await
        .unwrap_err();

    match err {
        PriceLensError::Prediction(msg) => {
            assert!(msg.contains("predicted_price"), "unexpected error: {}", msg)
        }
        other => panic!("expected Prediction error, got {:?}", other),
    }
}

#[tokio::test]
async fn prediction_non_numeric_price_is_schema_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"predicted_price": "799.46"})),
        )
        .mount(&server)
        .await;

    let err = prediction_client(&server)
        .await
        .predict(&sample_spec())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("predicted_price"));
}

// ==================== pipeline sequencing ====================

#[tokio::test]
async fn rejected_spec_never_calls_prediction_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"predicted_price": 999.0})))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = estimate(
        &StubValidator::rejecting("A 0.5 kg laptop cannot carry an Nvidia High-End GPU."),
        &prediction_client(&server).await,
        &sample_spec(),
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        EstimateOutcome::Rejected {
            reason: "A 0.5 kg laptop cannot carry an Nvidia High-End GPU.".to_string()
        }
    );
    // MockServer verifies expect(0) on drop
}

#[tokio::test]
async fn malformed_resolution_fails_before_any_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"predicted_price": 999.0})))
        .expect(0)
        .mount(&server)
        .await;

    let mut spec = sample_spec();
    spec.screen_resolution = "19201080".to_string();

    let err = estimate(
        &StubValidator::accepting(),
        &prediction_client(&server).await,
        &spec,
    )
    .await
    .unwrap_err();

    match err {
        PriceLensError::Spec(msg) => assert!(msg.contains("19201080")),
        other => panic!("expected Spec error, got {:?}", other),
    }
}

// ==================== LLM validator against mocked providers ====================

fn claude_response(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "model": "claude-sonnet-4-20250514",
        "stop_reason": "end_turn"
    })
}

fn openai_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-01",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn claude_validator_parses_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(claude_response(
            r#"{"isValid": false, "reason": "Apple laptops cannot run Windows 10."}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let validator = LlmSpecValidator::new("claude", "claude-sonnet-4-20250514", "test-key")
        .with_base_url(server.uri());
    let verdict = validator.validate(&sample_spec()).await.unwrap();

    assert!(!verdict.is_valid);
    assert_eq!(
        verdict.reason.as_deref(),
        Some("Apple laptops cannot run Windows 10.")
    );
}

#[tokio::test]
async fn claude_validator_accepts_fenced_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(claude_response(
            "```json\n{\"isValid\": true, \"reason\": null}\n```",
        )))
        .mount(&server)
        .await;

    let validator =
        LlmSpecValidator::new("claude", "model", "test-key").with_base_url(server.uri());
    let verdict = validator.validate(&sample_spec()).await.unwrap();
    assert!(verdict.is_valid);
    assert_eq!(verdict.reason, None);
}

#[tokio::test]
async fn openai_validator_parses_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_response(
            r#"{"isValid": true, "reason": null}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let validator =
        LlmSpecValidator::new("openai", "gpt-4o", "test-key").with_base_url(server.uri());
    let verdict = validator.validate(&sample_spec()).await.unwrap();
    assert!(verdict.is_valid);
}

#[tokio::test]
async fn validator_http_error_embeds_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .mount(&server)
        .await;

    let validator = LlmSpecValidator::new("claude", "model", "bad-key").with_base_url(server.uri());
    let err = validator.validate(&sample_spec()).await.unwrap_err();

    match err {
        PriceLensError::Validation(msg) => {
            assert!(msg.contains("401"), "missing status: {}", msg);
            assert!(msg.contains("invalid x-api-key"), "missing body: {}", msg);
        }
        other => panic!("expected Validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn validator_malformed_output_is_hard_error() {
    // A response that parses as a wrapper but not as a verdict must fail;
    // no default verdict is synthesized.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(claude_response("the spec looks plausible to me")),
        )
        .mount(&server)
        .await;

    let validator = LlmSpecValidator::new("claude", "model", "test-key").with_base_url(server.uri());
    let err = validator.validate(&sample_spec()).await.unwrap_err();
    assert!(matches!(err, PriceLensError::Validation(_)));
}

#[tokio::test]
async fn validator_prompt_embeds_spec_fields() {
    // The outbound request body must carry the user's values inside the prompt
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(claude_response(r#"{"isValid": true, "reason": null}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let validator = LlmSpecValidator::new("claude", "model", "test-key").with_base_url(server.uri());
    validator.validate(&sample_spec()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Dell"));
    assert!(prompt.contains("1920x1080"));
    assert!(prompt.contains("Intel Core i5"));
}
