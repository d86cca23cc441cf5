//! Heuristic query complexity analysis
//!
//! Counts case-insensitive keyword hits from two indicator lists and maps the
//! counts to a complexity label plus a recommended task category. The result
//! is advisory: callers decide whether to route with the recommendation.

use crate::providers::ProviderKind;
use crate::routing::TaskCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phrases suggesting multi-table or analytical SQL
pub const COMPLEX_INDICATORS: &[&str] = &[
    "join",
    "subquery",
    "having",
    "window function",
    "partition",
    "case when",
    "union",
    "intersect",
    "complex",
    "nested",
    "multiple tables",
    "across",
    "compare",
    "trend",
    "forecast",
];

/// Phrases suggesting grouping, ordering or aggregation
pub const MEDIUM_INDICATORS: &[&str] = &[
    "group by",
    "order by",
    "filter",
    "aggregate",
    "sum",
    "count",
    "average",
    "total",
    "by region",
    "by month",
    "top",
    "bottom",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Classify indicator counts. Rules are evaluated in order.
    pub fn from_counts(complex_count: usize, medium_count: usize) -> Self {
        if complex_count >= 2 || (complex_count >= 1 && medium_count >= 2) {
            Complexity::High
        } else if medium_count >= 2 || complex_count >= 1 {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }

    /// Medium and high both map to complex-query; only the label differs.
    pub fn recommended_task(&self) -> TaskCategory {
        match self {
            Complexity::Low => TaskCategory::SimpleQuery,
            Complexity::Medium | Complexity::High => TaskCategory::ComplexQuery,
        }
    }

    pub fn recommended_provider(&self) -> ProviderKind {
        match self {
            Complexity::Low => ProviderKind::Local,
            Complexity::Medium | Complexity::High => ProviderKind::Cloud,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        };
        f.write_str(label)
    }
}

/// Keyword vocabulary used by the analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityIndicators {
    pub complex: Vec<String>,
    pub medium: Vec<String>,
}

impl Default for ComplexityIndicators {
    fn default() -> Self {
        Self {
            complex: COMPLEX_INDICATORS.iter().map(|s| s.to_string()).collect(),
            medium: MEDIUM_INDICATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityAnalysis {
    pub complexity: Complexity,
    pub recommended_task_category: TaskCategory,
    pub complex_count: usize,
    pub medium_count: usize,
    pub recommended_provider: ProviderKind,
}

#[derive(Debug, Clone, Default)]
pub struct ComplexityAnalyzer {
    indicators: ComplexityIndicators,
}

impl ComplexityAnalyzer {
    pub fn new(indicators: ComplexityIndicators) -> Self {
        let lower = |list: Vec<String>| list.into_iter().map(|s| s.to_lowercase()).collect();
        Self {
            indicators: ComplexityIndicators {
                complex: lower(indicators.complex),
                medium: lower(indicators.medium),
            },
        }
    }

    pub fn indicators(&self) -> &ComplexityIndicators {
        &self.indicators
    }

    pub fn analyze(&self, query: &str) -> ComplexityAnalysis {
        let query = query.to_lowercase();
        let complex_count = count_hits(&query, &self.indicators.complex);
        let medium_count = count_hits(&query, &self.indicators.medium);
        let complexity = Complexity::from_counts(complex_count, medium_count);

        ComplexityAnalysis {
            complexity,
            recommended_task_category: complexity.recommended_task(),
            complex_count,
            medium_count,
            recommended_provider: complexity.recommended_provider(),
        }
    }
}

/// Number of indicators that occur anywhere in `text` (each counted once)
fn count_hits(text: &str, indicators: &[String]) -> usize {
    indicators
        .iter()
        .filter(|indicator| text.contains(indicator.as_str()))
        .count()
}
