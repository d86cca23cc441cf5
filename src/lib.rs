//! HybridRouter - Route BI assistant LLM requests between local and cloud models
//!
//! This library decides, per request, whether a natural-language
//! business-intelligence task runs on a free local model (Ollama) or a paid
//! cloud model (Anthropic), falling back automatically when one fails.
//!
//! ## Key Features
//!
//! - **Policy Routing**: Static task-category table picks local-first or cloud-first
//! - **Automatic Fallback**: Unavailable or failing providers fall through to the other
//! - **Forced Providers**: Explicit override that bypasses the fallback chain
//! - **Cost Estimation**: Per-provider cost for a token budget
//! - **Complexity Analysis**: Keyword heuristic recommending a task category

pub mod complexity;
pub mod config;
pub mod cost;
pub mod metrics;
pub mod providers;
pub mod routing;
pub mod tui;

pub use complexity::{Complexity, ComplexityAnalysis, ComplexityAnalyzer, ComplexityIndicators};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use cost::CostEstimate;
pub use metrics::{MetricsSummary, MetricsTracker};
pub use providers::{
    CloudProvider, GenerationRequest, GenerationResult, LlmProvider, LocalProvider,
    ProviderError, ProviderKind, TokenUsage,
};
pub use routing::{
    ProviderSlot, ProviderStatus, RouteRequest, Router, RouterStatus, RoutingClass, RoutingError,
    TaskCategory, TaskInput,
};
