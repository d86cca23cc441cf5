//! Cost estimation per provider for a token budget

use crate::providers::{CloudPricing, ProviderKind};
use crate::routing::{policy, TaskCategory};
use serde::{Deserialize, Serialize};

/// Share of an estimated token budget assumed to be prompt input, in fifths
const INPUT_FIFTHS: u64 = 2;
/// Share assumed to be generated output, in fifths
const OUTPUT_FIFTHS: u64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Always zero; the local provider is free
    pub local_cost: f64,
    /// Cloud cost in USD, rounded to 6 decimal places
    pub cloud_cost: f64,
    /// Preferred provider per the policy table, regardless of cost
    pub recommended_provider: ProviderKind,
    pub task_category: TaskCategory,
}

/// Estimate what a request of `estimated_tokens` would cost on each provider.
///
/// The budget is split 40% input / 60% output (floored) and priced at the
/// standard cloud rates.
pub fn estimate(task_category: TaskCategory, estimated_tokens: u64) -> CostEstimate {
    let input_tokens = fifths_of(estimated_tokens, INPUT_FIFTHS);
    let output_tokens = fifths_of(estimated_tokens, OUTPUT_FIFTHS);
    let cloud_cost = CloudPricing::STANDARD.cost(input_tokens, output_tokens);

    CostEstimate {
        local_cost: 0.0,
        cloud_cost: round_micro(cloud_cost),
        recommended_provider: policy::routing_class(task_category).preferred(),
        task_category,
    }
}

/// Floor of `tokens * fifths / 5`, computed without overflow
fn fifths_of(tokens: u64, fifths: u64) -> u64 {
    (u128::from(tokens) * u128::from(fifths) / 5) as u64
}

fn round_micro(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
