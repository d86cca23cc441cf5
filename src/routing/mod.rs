//! Routing engine with policy-ordered fallback
//!
//! The router owns at most one handle per provider kind and decides, per
//! request, which to call:
//! - A forced provider is attempted alone, with no fallback
//! - Otherwise the policy table orders the two kinds for the task category
//! - Candidates are tried strictly in order; absent or unhealthy ones are
//!   skipped, failed calls fall through to the next candidate
//!
//! The router holds no per-call mutable state and is meant to be shared
//! behind an `Arc` by every request handler.

pub mod policy;
mod task;

pub use policy::{RoutingClass, POLICY_TABLE};
pub use task::{ParseTaskCategoryError, TaskCategory, TaskInput};

use crate::complexity::{ComplexityAnalysis, ComplexityAnalyzer};
use crate::config::Config;
use crate::cost::{self, CostEstimate};
use crate::providers::{
    CloudProvider, CloudProviderConfig, GenerationRequest, GenerationResult, LlmProvider,
    LocalProvider, LocalProviderConfig, ProviderError, ProviderKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Unknown provider requested: {0}")]
    UnknownProviderRequested(String),

    #[error("{0} provider not available")]
    ProviderUnavailable(ProviderKind),

    #[error(transparent)]
    ProviderCallFailure(#[from] ProviderError),

    #[error("No LLM available for task {task}")]
    NoProviderAvailable {
        task: TaskCategory,
        /// Failure of the last candidate that was actually called
        source: Option<ProviderError>,
    },
}

/// A request to route to one of the providers
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub prompt: String,
    pub task: TaskInput,
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Raw provider name; bypasses the fallback chain when set
    pub force_provider: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RouteRequest {
    pub fn new(prompt: impl Into<String>, task: impl Into<TaskInput>) -> Self {
        Self {
            prompt: prompt.into(),
            task: task.into(),
            system_prompt: None,
            max_tokens: 1000,
            temperature: 0.7,
            force_provider: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn force_provider(mut self, provider: impl Into<String>) -> Self {
        self.force_provider = Some(provider.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    fn generation_request(&self) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.clone(),
            system_prompt: self.system_prompt.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            extra: self.extra.clone(),
        }
    }
}

/// One provider position in the router: configuration facts plus the handle
/// if one was constructed
pub struct ProviderSlot {
    enabled: bool,
    model: String,
    handle: Option<Arc<dyn LlmProvider>>,
}

impl ProviderSlot {
    pub fn active(handle: Arc<dyn LlmProvider>) -> Self {
        Self {
            enabled: true,
            model: handle.model().to_string(),
            handle: Some(handle),
        }
    }

    pub fn inactive(enabled: bool, model: impl Into<String>) -> Self {
        Self {
            enabled,
            model: model.into(),
            handle: None,
        }
    }

    pub fn handle(&self) -> Option<&Arc<dyn LlmProvider>> {
        self.handle.as_ref()
    }

    async fn status(&self) -> ProviderStatus {
        let available = match &self.handle {
            Some(handle) => handle.is_available().await,
            None => false,
        };
        ProviderStatus {
            enabled: self.enabled,
            available,
            model: self.model.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub enabled: bool,
    pub available: bool,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterStatus {
    pub local: ProviderStatus,
    pub cloud: ProviderStatus,
}

impl RouterStatus {
    pub fn any_available(&self) -> bool {
        self.local.available || self.cloud.available
    }
}

/// Routes generation requests between the local and cloud providers
pub struct Router {
    local: ProviderSlot,
    cloud: ProviderSlot,
    analyzer: ComplexityAnalyzer,
}

impl Router {
    pub fn new(local: ProviderSlot, cloud: ProviderSlot) -> Self {
        Self {
            local,
            cloud,
            analyzer: ComplexityAnalyzer::default(),
        }
    }

    /// Build both provider handles from configuration
    pub fn from_config(config: &Config) -> Self {
        let local = if config.local.enabled {
            ProviderSlot::active(Arc::new(LocalProvider::new(LocalProviderConfig {
                url: config.local.url.clone(),
                model: config.local.model.clone(),
            })))
        } else {
            ProviderSlot::inactive(false, config.local.model.clone())
        };

        let cloud = match config.cloud_api_key().filter(|_| config.cloud.enabled) {
            Some(api_key) => ProviderSlot::active(Arc::new(CloudProvider::new(CloudProviderConfig {
                api_key,
                base_url: config.cloud.base_url.clone(),
                model: config.cloud.model.clone(),
                api_version: config.cloud.anthropic_version.clone(),
                ..Default::default()
            }))),
            None => ProviderSlot::inactive(false, config.cloud.model.clone()),
        };

        Self::new(local, cloud)
    }

    pub fn with_analyzer(mut self, analyzer: ComplexityAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    fn slot(&self, kind: ProviderKind) -> &ProviderSlot {
        match kind {
            ProviderKind::Local => &self.local,
            ProviderKind::Cloud => &self.cloud,
        }
    }

    /// Handle for `kind` if it exists and, for live-health providers, is up
    /// right now. Health is never cached between calls.
    async fn usable(&self, kind: ProviderKind) -> Result<&Arc<dyn LlmProvider>, Unusable> {
        let handle = self.slot(kind).handle().ok_or(Unusable::NotConfigured)?;
        if kind.polls_health() && !handle.is_available().await {
            return Err(Unusable::Unhealthy);
        }
        Ok(handle)
    }

    /// Log provider health once at startup
    pub async fn probe(&self) {
        if let Some(local) = self.local.handle() {
            if local.is_available().await {
                info!("Local provider initialized ({})", self.local.model);
            } else {
                warn!("Local provider not reachable, will use cloud fallback");
            }
        } else {
            info!("Local provider disabled");
        }

        if self.cloud.handle().is_some() {
            info!("Cloud provider initialized ({})", self.cloud.model);
        } else {
            info!("Cloud provider not configured");
        }

        if !self.status().await.any_available() {
            error!("No LLM providers available!");
        }
    }

    /// Route a request to a provider, falling back per the policy table
    pub async fn route(&self, request: RouteRequest) -> Result<GenerationResult, RoutingError> {
        let task = request.task.classify();
        info!("Routing task: {}", task);

        let generation = request.generation_request();

        if let Some(name) = &request.force_provider {
            let kind: ProviderKind = name
                .parse()
                .map_err(|_| RoutingError::UnknownProviderRequested(name.clone()))?;
            return self.route_forced(kind, generation).await;
        }

        let mut last_failure = None;

        for (position, kind) in policy::candidates(task).into_iter().enumerate() {
            let provider = match self.usable(kind).await {
                Ok(provider) => provider,
                Err(Unusable::NotConfigured) => {
                    debug!("Skipping {} provider for {}: not configured", kind, task);
                    continue;
                }
                Err(Unusable::Unhealthy) => {
                    warn!("Skipping {} provider for {}: not reachable", kind, task);
                    continue;
                }
            };

            if position == 0 {
                info!("Routing {} to {} provider", task, kind);
            } else {
                info!("Falling back to {} provider for {}", kind, task);
            }

            match provider.generate(generation.clone()).await {
                Ok(result) => return Ok(stamp(result, kind, position > 0)),
                Err(e) => {
                    warn!("{} provider failed for {}: {}", kind, task, e);
                    last_failure = Some(e);
                }
            }
        }

        Err(RoutingError::NoProviderAvailable {
            task,
            source: last_failure,
        })
    }

    async fn route_forced(
        &self,
        kind: ProviderKind,
        generation: GenerationRequest,
    ) -> Result<GenerationResult, RoutingError> {
        let provider = self
            .usable(kind)
            .await
            .map_err(|_| RoutingError::ProviderUnavailable(kind))?;

        info!("Forced routing to {} provider", kind);
        let result = provider.generate(generation).await?;
        Ok(stamp(result, kind, false))
    }

    /// Snapshot of provider configuration and current availability
    pub async fn status(&self) -> RouterStatus {
        RouterStatus {
            local: self.local.status().await,
            cloud: self.cloud.status().await,
        }
    }

    pub fn estimate_cost(&self, task: impl Into<TaskInput>, estimated_tokens: u64) -> CostEstimate {
        cost::estimate(task.into().classify(), estimated_tokens)
    }

    pub fn analyze_query_complexity(&self, query: &str) -> ComplexityAnalysis {
        self.analyzer.analyze(query)
    }
}

/// Why a candidate was passed over without calling `generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unusable {
    /// No handle was constructed; a steady configuration state
    NotConfigured,
    /// Handle exists but its live health check failed
    Unhealthy,
}

/// Apply router-owned provenance to a provider result
fn stamp(mut result: GenerationResult, kind: ProviderKind, fallback: bool) -> GenerationResult {
    result.provider = kind;
    result.fallback = fallback;
    if kind == ProviderKind::Local {
        result.cost = 0.0;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complexity::{Complexity, ComplexityIndicators};
    use crate::providers::TokenUsage;
    use async_trait::async_trait;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockProvider {
        kind: ProviderKind,
        available: AtomicBool,
        fail: bool,
        reported_cost: f64,
        calls: AtomicUsize,
        health_checks: AtomicUsize,
    }

    impl MockProvider {
        fn new(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                available: AtomicBool::new(true),
                fail: false,
                reported_cost: 0.25,
                calls: AtomicUsize::new(0),
                health_checks: AtomicUsize::new(0),
            })
        }

        fn failing(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                available: AtomicBool::new(true),
                fail: true,
                reported_cost: 0.0,
                calls: AtomicUsize::new(0),
                health_checks: AtomicUsize::new(0),
            })
        }

        fn set_available(&self, available: bool) {
            self.available.store(available, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn model(&self) -> &str {
            match self.kind {
                ProviderKind::Local => "mock-local",
                ProviderKind::Cloud => "mock-cloud",
            }
        }

        async fn is_available(&self) -> bool {
            self.health_checks.fetch_add(1, Ordering::SeqCst);
            self.available.load(Ordering::SeqCst)
        }

        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Api {
                    provider: self.kind,
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(GenerationResult {
                content: format!("{} says: {}", self.kind, request.prompt),
                provider: self.kind,
                model: self.model().to_string(),
                usage: TokenUsage::new(10, 20),
                cost: self.reported_cost,
                fallback: false,
            })
        }
    }

    fn router(local: Option<Arc<MockProvider>>, cloud: Option<Arc<MockProvider>>) -> Router {
        let slot = |p: Option<Arc<MockProvider>>, model: &str| match p {
            Some(p) => ProviderSlot::active(p),
            None => ProviderSlot::inactive(false, model),
        };
        Router::new(slot(local, "mock-local"), slot(cloud, "mock-cloud"))
    }

    #[tokio::test]
    async fn test_local_first_uses_local_and_zeroes_cost() {
        let local = MockProvider::new(ProviderKind::Local);
        let cloud = MockProvider::new(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let result = router
            .route(RouteRequest::new("count orders", TaskCategory::SimpleQuery))
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderKind::Local);
        assert_eq!(result.cost, 0.0);
        assert!(!result.fallback);
        assert_eq!(cloud.calls(), 0);
    }

    #[tokio::test]
    async fn test_local_failure_falls_back_to_cloud() {
        let local = MockProvider::failing(ProviderKind::Local);
        let cloud = MockProvider::new(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let result = router
            .route(RouteRequest::new("count orders", TaskCategory::Validation))
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderKind::Cloud);
        assert!(result.cost >= 0.0);
        assert_eq!(result.cost, 0.25);
        assert!(result.fallback);
        assert_eq!(local.calls(), 1);
        assert_eq!(cloud.calls(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_local_is_skipped_without_generate() {
        let local = MockProvider::new(ProviderKind::Local);
        local.set_available(false);
        let cloud = MockProvider::new(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let result = router
            .route(RouteRequest::new("extract dates", TaskCategory::EntityExtraction))
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderKind::Cloud);
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn test_cloud_first_prefers_cloud() {
        let local = MockProvider::new(ProviderKind::Local);
        let cloud = MockProvider::new(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let result = router
            .route(RouteRequest::new("summarize Q3", TaskCategory::Summary))
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderKind::Cloud);
        assert_eq!(result.cost, 0.25);
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn test_cloud_first_falls_back_to_local_when_cloud_missing() {
        let local = MockProvider::new(ProviderKind::Local);
        let router = router(Some(local.clone()), None);

        let result = router
            .route(RouteRequest::new("explain this", "explanation"))
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderKind::Local);
        assert_eq!(result.cost, 0.0);
        assert!(result.fallback);
    }

    #[tokio::test]
    async fn test_forced_local_unavailable_never_calls_cloud() {
        let local = MockProvider::new(ProviderKind::Local);
        local.set_available(false);
        let cloud = MockProvider::new(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let err = router
            .route(RouteRequest::new("count orders", TaskCategory::SimpleQuery).force_provider("local"))
            .await
            .unwrap_err();

        assert!(matches!(err, RoutingError::ProviderUnavailable(ProviderKind::Local)));
        assert_eq!(cloud.calls(), 0);
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn test_forced_failure_propagates_without_fallback() {
        let local = MockProvider::new(ProviderKind::Local);
        let cloud = MockProvider::failing(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let err = router
            .route(RouteRequest::new("count orders", TaskCategory::SimpleQuery).force_provider("Claude"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RoutingError::ProviderCallFailure(ProviderError::Api { status: 500, .. })
        ));
        assert_eq!(cloud.calls(), 1);
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn test_forced_local_stamps_zero_cost() {
        let local = MockProvider::new(ProviderKind::Local);
        let router = router(Some(local), None);

        let result = router
            .route(RouteRequest::new("summarize", TaskCategory::Summary).force_provider("ollama"))
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderKind::Local);
        assert_eq!(result.cost, 0.0);
        assert!(!result.fallback);
    }

    #[tokio::test]
    async fn test_unknown_forced_provider() {
        let local = MockProvider::new(ProviderKind::Local);
        let router = router(Some(local.clone()), None);

        let err = router
            .route(RouteRequest::new("hi", TaskCategory::SimpleQuery).force_provider("gpt-4"))
            .await
            .unwrap_err();

        assert!(matches!(err, RoutingError::UnknownProviderRequested(ref name) if name == "gpt-4"));
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_provider_configured() {
        let router = router(None, None);

        let err = router
            .route(RouteRequest::new("hi", TaskCategory::SimpleQuery))
            .await
            .unwrap_err();

        match err {
            RoutingError::NoProviderAvailable { task, source } => {
                assert_eq!(task, TaskCategory::SimpleQuery);
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_all_candidates_fail_once_each() {
        let local = MockProvider::failing(ProviderKind::Local);
        let cloud = MockProvider::failing(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let err = router
            .route(RouteRequest::new("hi", TaskCategory::ComplexQuery))
            .await
            .unwrap_err();

        assert!(matches!(err, RoutingError::NoProviderAvailable { .. }));
        assert!(err.source().is_some());
        assert_eq!(local.calls(), 1);
        assert_eq!(cloud.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_task_routes_as_simple_query() {
        let local = MockProvider::new(ProviderKind::Local);
        let cloud = MockProvider::new(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let result = router
            .route(RouteRequest::new("hi", "definitely-not-a-task"))
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderKind::Local);
        assert_eq!(cloud.calls(), 0);
    }

    #[tokio::test]
    async fn test_local_health_checked_on_every_route() {
        let local = MockProvider::new(ProviderKind::Local);
        let cloud = MockProvider::new(ProviderKind::Cloud);
        let router = router(Some(local.clone()), Some(cloud.clone()));

        let request = RouteRequest::new("hi", TaskCategory::SimpleQuery);
        router.route(request.clone()).await.unwrap();

        local.set_available(false);
        let result = router.route(request).await.unwrap();

        assert_eq!(result.provider, ProviderKind::Cloud);
        assert_eq!(local.health_checks.load(Ordering::SeqCst), 2);
        assert_eq!(cloud.health_checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_is_idempotent() {
        let local = MockProvider::new(ProviderKind::Local);
        let router = router(Some(local.clone()), None);

        let first = router.status().await;
        let second = router.status().await;
        assert_eq!(first, second);
        assert!(first.local.enabled && first.local.available);
        assert_eq!(first.local.model, "mock-local");
        assert!(!first.cloud.enabled && !first.cloud.available);

        local.set_available(false);
        assert!(!router.status().await.local.available);
    }

    #[tokio::test]
    async fn test_concurrent_routes_share_router() {
        let local = MockProvider::new(ProviderKind::Local);
        let cloud = MockProvider::new(ProviderKind::Cloud);
        let router = Arc::new(router(Some(local.clone()), Some(cloud.clone())));

        let mut handles = Vec::new();
        for i in 0..16 {
            let router = Arc::clone(&router);
            let task = if i % 2 == 0 {
                TaskCategory::SimpleQuery
            } else {
                TaskCategory::Synthesis
            };
            handles.push(tokio::spawn(async move {
                router.route(RouteRequest::new(format!("q{i}"), task)).await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(local.calls(), 8);
        assert_eq!(cloud.calls(), 8);
    }

    #[test]
    fn test_estimate_and_analyze_delegate() {
        let router = router(None, None);

        let estimate = router.estimate_cost("simple-query", 1000);
        assert_eq!(estimate.cloud_cost, 0.0102);
        assert_eq!(estimate.recommended_provider, ProviderKind::Local);

        let estimate = router.estimate_cost("bogus", 1000);
        assert_eq!(estimate.task_category, TaskCategory::SimpleQuery);

        let analysis = router.analyze_query_complexity("show me total revenue by region");
        assert_eq!(analysis.complexity, Complexity::Medium);
    }

    #[tokio::test]
    async fn test_usable_distinguishes_missing_from_unhealthy() {
        let local = MockProvider::new(ProviderKind::Local);
        local.set_available(false);
        let router = router(Some(local.clone()), None);

        assert_eq!(
            router.usable(ProviderKind::Cloud).await.err(),
            Some(Unusable::NotConfigured)
        );
        assert_eq!(
            router.usable(ProviderKind::Local).await.err(),
            Some(Unusable::Unhealthy)
        );

        local.set_available(true);
        assert!(router.usable(ProviderKind::Local).await.is_ok());
    }

    #[test]
    fn test_custom_analyzer_changes_recommendation() {
        let query = "weekly cohort retention";
        let router = router(None, None);
        assert_eq!(router.analyze_query_complexity(query).complexity, Complexity::Low);

        let router = router.with_analyzer(ComplexityAnalyzer::new(ComplexityIndicators {
            complex: vec!["cohort".to_string(), "retention".to_string()],
            medium: vec![],
        }));
        let analysis = router.analyze_query_complexity(query);
        assert_eq!(analysis.complexity, Complexity::High);
        assert_eq!(analysis.recommended_task_category, TaskCategory::ComplexQuery);
        assert_eq!(analysis.recommended_provider, ProviderKind::Cloud);
    }

    #[test]
    fn test_status_blocking() {
        let router = router(MockProvider::new(ProviderKind::Local).into(), None);
        let status = tokio_test::block_on(router.status());
        assert!(status.any_available());
    }
}
