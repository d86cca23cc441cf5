//! Local LLM provider backed by an Ollama server

use super::{GenerationRequest, GenerationResult, LlmProvider, ProviderError, ProviderKind, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Configuration for the local provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalProviderConfig {
    /// Ollama server URL
    pub url: String,
    /// Model to use (e.g., "llama3.2", "qwen2.5-coder", "sqlcoder")
    pub model: String,
}

impl Default for LocalProviderConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        }
    }
}

/// Local LLM provider using Ollama
pub struct LocalProvider {
    config: LocalProviderConfig,
    client: Client,
}

impl LocalProvider {
    pub fn new(config: LocalProviderConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens
            }
        });

        if let Some(sys) = &request.system_prompt {
            body["system"] = json!(sys);
        }

        if let Some(options) = body["options"].as_object_mut() {
            for (key, value) in &request.extra {
                options.insert(key.clone(), value.clone());
            }
        }

        body
    }
}

#[async_trait]
impl LlmProvider for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.endpoint("/api/tags"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, ProviderError> {
        let body = self.build_body(&request);
        debug!(model = %self.config.model, "Sending generate request to Ollama");

        let response = self
            .client
            .post(self.endpoint("/api/generate"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Connection {
                provider: ProviderKind::Local,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: ProviderKind::Local,
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await?;

        let content = json["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: ProviderKind::Local,
                message: "No response field".to_string(),
            })?;

        let usage = TokenUsage::from_json(&json["prompt_eval_count"], &json["eval_count"]);

        Ok(GenerationResult {
            content,
            provider: ProviderKind::Local,
            model: json["model"].as_str().unwrap_or(&self.config.model).to_string(),
            usage,
            cost: 0.0,
            fallback: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> LocalProvider {
        LocalProvider::new(LocalProviderConfig {
            url: server.uri(),
            model: "llama3.2".to_string(),
        })
    }

    #[test]
    fn test_body_merges_extra_options() {
        let provider = LocalProvider::new(LocalProviderConfig::default());
        let mut request = GenerationRequest::new("count orders").with_system("You write SQL");
        request.extra.insert("top_k".to_string(), json!(20));

        let body = provider.build_body(&request);
        assert_eq!(body["system"], "You write SQL");
        assert_eq!(body["options"]["num_predict"], 1000);
        assert_eq!(body["options"]["top_k"], 20);
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn test_available_when_tags_respond() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&server)
            .await;

        assert!(provider_for(&server).is_available().await);
    }

    #[tokio::test]
    async fn test_unavailable_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(!provider_for(&server).is_available().await);
    }

    #[tokio::test]
    async fn test_generate_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3.2", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2",
                "response": "SELECT COUNT(*) FROM orders;",
                "prompt_eval_count": 12,
                "eval_count": 8
            })))
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .generate(GenerationRequest::new("count orders"))
            .await
            .unwrap();

        assert_eq!(result.content, "SELECT COUNT(*) FROM orders;");
        assert_eq!(result.provider, ProviderKind::Local);
        assert_eq!(result.usage.total_tokens, 20);
        assert_eq!(result.cost, 0.0);
    }

    #[tokio::test]
    async fn test_generate_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(GenerationRequest::new("count orders"))
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model not loaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
