//! Enhancement Step
//!
//! Best-effort rewrite of a finished prompt by a local Ollama-compatible
//! service. One attempt per call, no retry. Every failure (unreachable
//! host, timeout, bad status, malformed body, failed gate) is logged at
//! debug level and turned into `None`; callers keep the deterministic
//! prompt.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::budget::estimate_tokens;
use super::error::{PromptError, Result};
use super::types::Model;
use crate::config::EnhancementConfig;

/// Minimum trimmed length of an acceptable rewrite.
pub const MIN_ENHANCED_CHARS: usize = 20;

/// Fraction of stat-derived keywords a rewrite must keep.
pub const KEYWORD_COVERAGE: f64 = 0.6;

/// Rewrite may exceed the dialect's token limit by at most this factor.
pub const TOKEN_LIMIT_SLACK: f64 = 1.1;

/// Rewrite may be at most this many times longer than the input.
pub const MAX_LENGTH_RATIO: f64 = 1.5;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Client for the optional rewrite step.
#[derive(Debug, Clone)]
pub struct Enhancer {
    host: String,
    model: String,
    probe_timeout: Duration,
    request_timeout: Duration,
    temperature: f32,
    client: Client,
}

impl Enhancer {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self::from_config(&EnhancementConfig {
            host: host.into(),
            model: model.into(),
            ..EnhancementConfig::default()
        })
    }

    pub fn from_config(config: &EnhancementConfig) -> Self {
        Self {
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            temperature: config.temperature,
            client: Client::new(),
        }
    }

    pub fn with_timeouts(mut self, probe: Duration, request: Duration) -> Self {
        self.probe_timeout = probe;
        self.request_timeout = request;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Rewrite `base_prompt` for `model`, or `None` on any failure.
    pub async fn enhance(&self, base_prompt: &str, model: Model, keywords: &[String]) -> Option<String> {
        match self.try_enhance(base_prompt, model, keywords).await {
            Ok(text) => {
                debug!(chars = text.len(), "Enhancement accepted");
                Some(text)
            }
            Err(e) => {
                debug!(error = %e, "Enhancement skipped");
                None
            }
        }
    }

    async fn try_enhance(&self, base_prompt: &str, model: Model, keywords: &[String]) -> Result<String> {
        self.probe().await?;
        let candidate = self.generate(base_prompt, model).await?;
        check_gates(&candidate, base_prompt, model, keywords)?;
        Ok(candidate)
    }

    /// Whether the service answers `GET /api/tags` within the probe timeout.
    pub async fn is_available(&self) -> bool {
        self.probe().await.is_ok()
    }

    async fn probe(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.host);
        let resp = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, "probe"))?;

        if !resp.status().is_success() {
            return Err(PromptError::Unavailable {
                host: self.host.clone(),
            });
        }
        Ok(())
    }

    async fn generate(&self, base_prompt: &str, model: Model) -> Result<String> {
        let url = format!("{}/api/generate", self.host);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": base_prompt,
            "system": rewrite_instructions(model),
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": model.token_limit() * 2,
            }
        });

        let resp = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, "generate"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(PromptError::Api { status, message });
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| PromptError::InvalidResponse(e.to_string()))?;

        parsed
            .response
            .map(|text| text.trim().to_string())
            .ok_or_else(|| PromptError::InvalidResponse("Missing response field".to_string()))
    }

    fn map_send_error(&self, error: reqwest::Error, operation: &str) -> PromptError {
        if error.is_timeout() {
            PromptError::Timeout {
                operation: operation.to_string(),
            }
        } else if error.is_connect() {
            PromptError::Unavailable {
                host: self.host.clone(),
            }
        } else {
            PromptError::Http(error)
        }
    }
}

/// System instructions sent with the rewrite request.
pub fn rewrite_instructions(model: Model) -> String {
    let style = if model.is_narrative() {
        "Rewrite it as flowing descriptive prose in a few sentences."
    } else if model == Model::Pony {
        "Keep it as comma-separated tags. Never use parentheses or numeric weights."
    } else if model == Model::Illustrious {
        "Keep it as comma-separated tags without any weight markup."
    } else {
        "Keep it as comma-separated tags and preserve any existing weight syntax."
    };
    format!(
        "You refine text-to-image prompts for {}. {style} Preserve every physical trait, \
         keep the character's identity first, do not invent new equipment and stay under {} tokens. \
         Reply with the prompt only.",
        model.display_name(),
        model.token_limit()
    )
}

/// Accept or reject a rewrite. Gates run in order and the first failure
/// wins: length, keyword coverage, token ceiling, growth ratio.
pub fn check_gates(candidate: &str, base_prompt: &str, model: Model, keywords: &[String]) -> Result<()> {
    let candidate = candidate.trim();
    if candidate.chars().count() < MIN_ENHANCED_CHARS {
        return Err(PromptError::GateRejected {
            gate: "length",
            reason: format!("{} characters", candidate.chars().count()),
        });
    }

    let wanted: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if !wanted.is_empty() {
        let lower = candidate.to_lowercase();
        let present = wanted.iter().filter(|k| lower.contains(k.as_str())).count();
        if (present as f64) < wanted.len() as f64 * KEYWORD_COVERAGE {
            return Err(PromptError::GateRejected {
                gate: "keyword",
                reason: format!("{present} of {} keywords present", wanted.len()),
            });
        }
    }

    let tokens = estimate_tokens(candidate);
    let ceiling = model.token_limit() as f64 * TOKEN_LIMIT_SLACK;
    if tokens as f64 > ceiling {
        return Err(PromptError::GateRejected {
            gate: "token",
            reason: format!("{tokens} tokens exceeds {ceiling:.0}"),
        });
    }

    let max_len = base_prompt.trim().chars().count() as f64 * MAX_LENGTH_RATIO;
    if candidate.chars().count() as f64 > max_len {
        return Err(PromptError::GateRejected {
            gate: "growth",
            reason: format!("{} characters exceeds {max_len:.0}", candidate.chars().count()),
        });
    }

    Ok(())
}
