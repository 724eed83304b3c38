//! Enhancement step against a mocked Ollama-compatible service.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::prompt::{Enhancer, GenerationRequest, Model, PromptEngine, StatLevels};

const BASE: &str = "masterpiece, best quality, (female elf:1.3), (towering:1.2), lithe, silver hair";

fn keywords() -> Vec<String> {
    vec!["towering".to_string(), "lithe".to_string()]
}

async fn mount_tags(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": [] })))
        .mount(server)
        .await;
}

async fn mount_generate(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn enhancer(server: &MockServer) -> Enhancer {
    Enhancer::new(server.uri(), "llama3.2")
        .with_timeouts(Duration::from_millis(500), Duration::from_millis(500))
}

#[tokio::test]
async fn test_accepts_faithful_rewrite() {
    let server = MockServer::start().await;
    mount_tags(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({ "model": "llama3.2", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "masterpiece, female elf, towering and lithe, silver hair"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rewritten = enhancer(&server).enhance(BASE, Model::Sdxl, &keywords()).await;
    assert_eq!(
        rewritten.as_deref(),
        Some("masterpiece, female elf, towering and lithe, silver hair")
    );
}

#[tokio::test]
async fn test_rejects_rewrite_missing_keywords() {
    let server = MockServer::start().await;
    mount_tags(&server).await;
    mount_generate(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "a graceful elf in a quiet moonlit forest"
        })),
    )
    .await;

    assert!(enhancer(&server).enhance(BASE, Model::Sdxl, &keywords()).await.is_none());
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let server = MockServer::start().await;
    mount_tags(&server).await;
    mount_generate(&server, ResponseTemplate::new(500).set_body_string("model not loaded")).await;

    assert!(enhancer(&server).enhance(BASE, Model::Flux, &keywords()).await.is_none());
}

#[tokio::test]
async fn test_malformed_body_falls_back() {
    let server = MockServer::start().await;
    mount_tags(&server).await;
    mount_generate(&server, ResponseTemplate::new(200).set_body_string("not json")).await;

    assert!(enhancer(&server).enhance(BASE, Model::Sdxl, &keywords()).await.is_none());
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = MockServer::start().await;
    mount_tags(&server).await;
    mount_generate(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({
                "response": "masterpiece, female elf, towering and lithe, silver hair"
            }))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    assert!(enhancer(&server).enhance(BASE, Model::Sdxl, &keywords()).await.is_none());
}

#[tokio::test]
async fn test_unreachable_probe_skips_generation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let enhancer = enhancer(&server);
    assert!(!enhancer.is_available().await);
    assert!(enhancer.enhance(BASE, Model::Sdxl, &keywords()).await.is_none());
}

#[tokio::test]
async fn test_engine_keeps_deterministic_prompt_on_failure() {
    let server = MockServer::start().await;
    mount_tags(&server).await;
    mount_generate(&server, ResponseTemplate::new(500)).await;

    let engine = PromptEngine::default();
    let request = GenerationRequest::new(StatLevels::default(), Model::Sdxl).select("race", "elf");
    let result = engine
        .generate_enhanced(&request, &mut StdRng::seed_from_u64(3), &enhancer(&server))
        .await;

    assert!(!result.used_ai);
    assert!(result.ai_enhanced.is_none());
    assert!(!result.prompt.is_empty());
    assert_eq!(result.effective_prompt(), result.prompt);
}
