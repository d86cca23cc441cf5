//! Cloud LLM provider backed by the Anthropic Messages API

use super::{
    CloudPricing, GenerationRequest, GenerationResult, LlmProvider, ProviderError, ProviderKind,
    TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Configuration for the cloud provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudProviderConfig {
    /// Anthropic API key
    pub api_key: String,
    /// Base URL (default: https://api.anthropic.com/v1)
    pub base_url: String,
    /// Model to use
    pub model: String,
    /// Value of the `anthropic-version` header
    pub api_version: String,
    /// Prices used to report per-call cost
    pub pricing: CloudPricing,
}

impl Default for CloudProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_version: "2023-06-01".to_string(),
            pricing: CloudPricing::STANDARD,
        }
    }
}

/// Paid cloud provider; availability means "credential configured"
pub struct CloudProvider {
    config: CloudProviderConfig,
    client: Client,
}

impl CloudProvider {
    pub fn new(config: CloudProviderConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [{
                "role": "user",
                "content": request.prompt
            }],
        });

        if let Some(system) = &request.system_prompt {
            body["system"] = json!(system);
        }

        if let Some(fields) = body.as_object_mut() {
            for (key, value) in &request.extra {
                fields.insert(key.clone(), value.clone());
            }
        }

        body
    }
}

#[async_trait]
impl LlmProvider for CloudProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cloud
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, ProviderError> {
        let body = self.build_body(&request);
        debug!(model = %self.config.model, "Sending messages request to Anthropic");

        let response = self
            .client
            .post(format!("{}/messages", self.config.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: ProviderKind::Cloud,
                status: status.as_u16(),
                body: error,
            });
        }

        let json: Value = response.json().await?;

        let content = json["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: ProviderKind::Cloud,
                message: "No text content block".to_string(),
            })?;

        let usage =
            TokenUsage::from_json(&json["usage"]["input_tokens"], &json["usage"]["output_tokens"]);

        Ok(GenerationResult {
            content,
            provider: ProviderKind::Cloud,
            model: json["model"].as_str().unwrap_or(&self.config.model).to_string(),
            cost: self.config.pricing.cost_of(&usage),
            usage,
            fallback: false,
        })
    }
}
