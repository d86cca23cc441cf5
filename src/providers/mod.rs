//! LLM provider handles used by the router
//!
//! Exactly two provider kinds exist: a local inference server (Ollama) that is
//! free but may be down, and a paid cloud API (Anthropic) gated on a configured
//! credential. Both satisfy the same [`LlmProvider`] contract.

mod cloud;
mod local;
mod usage;

pub use cloud::{CloudProvider, CloudProviderConfig};
pub use local::{LocalProvider, LocalProviderConfig};
pub use usage::{CloudPricing, TokenUsage};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to connect to {provider} provider: {message}")]
    Connection {
        provider: ProviderKind,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} provider returned status {status}: {body}")]
    Api {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider} provider: {message}")]
    InvalidResponse {
        provider: ProviderKind,
        message: String,
    },
}

/// The two provider kinds the router chooses between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Self-hosted model server; free, availability varies
    Local,
    /// Paid third-party API; available whenever a credential is configured
    Cloud,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Cloud => "cloud",
        }
    }

    /// Whether `is_available()` reflects live health that must be polled
    /// before every attempt. Cloud availability is configuration only.
    pub fn polls_health(&self) -> bool {
        matches!(self, ProviderKind::Local)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown provider: {0}")]
pub struct ParseProviderKindError(pub String);

impl FromStr for ProviderKind {
    type Err = ParseProviderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "ollama" => Ok(ProviderKind::Local),
            "cloud" | "claude" | "anthropic" => Ok(ProviderKind::Cloud),
            _ => Err(ParseProviderKindError(s.to_string())),
        }
    }
}

/// Parameters for a single generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Provider-specific options passed through untouched
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 1000,
            temperature: 0.7,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }
}

/// Result of a successful generation, with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// The generated text
    pub content: String,

    /// Provider that produced the content
    pub provider: ProviderKind,

    /// Model identifier reported by the provider
    pub model: String,

    /// Token usage statistics
    pub usage: TokenUsage,

    /// Cost in USD. Always 0 for the local provider.
    pub cost: f64,

    /// Set by the router when a lower-priority candidate answered
    #[serde(default)]
    pub fallback: bool,
}

impl GenerationResult {
    pub fn tokens(&self) -> u32 {
        self.usage.total_tokens
    }
}

/// Capability set every provider handle exposes to the router
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Which of the two provider kinds this handle is
    fn kind(&self) -> ProviderKind;

    /// Model identifier used for generation
    fn model(&self) -> &str;

    /// Check whether the provider can currently take a request
    async fn is_available(&self) -> bool;

    /// Generate a completion
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, ProviderError>;
}
