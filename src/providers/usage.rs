//! Token usage and cloud pricing

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub input_tokens: u32,
    /// Tokens in the response
    pub output_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }

    /// Read counts from response JSON. Missing values count as zero and
    /// oversized ones saturate at `u32::MAX`.
    pub(crate) fn from_json(input: &Value, output: &Value) -> Self {
        Self::new(json_count(input), json_count(output))
    }
}

fn json_count(value: &Value) -> u32 {
    value
        .as_u64()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Per-million-token prices for the cloud provider, in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl CloudPricing {
    /// Sonnet-class pricing
    pub const STANDARD: CloudPricing = CloudPricing {
        input_per_million: 3.0,
        output_per_million: 15.0,
    };

    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_per_million / 1_000_000.0)
            + (output_tokens as f64 * self.output_per_million / 1_000_000.0)
    }

    pub fn cost_of(&self, usage: &TokenUsage) -> f64 {
        self.cost(usage.input_tokens as u64, usage.output_tokens as u64)
    }
}

impl Default for CloudPricing {
    fn default() -> Self {
        Self::STANDARD
    }
}
