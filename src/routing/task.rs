//! Task categories and classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Kind of LLM-backed operation being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    SimpleQuery,
    ComplexQuery,
    IntentClassification,
    EntityExtraction,
    Synthesis,
    Summary,
    Explanation,
    Validation,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 8] = [
        TaskCategory::SimpleQuery,
        TaskCategory::ComplexQuery,
        TaskCategory::IntentClassification,
        TaskCategory::EntityExtraction,
        TaskCategory::Synthesis,
        TaskCategory::Summary,
        TaskCategory::Explanation,
        TaskCategory::Validation,
    ];

    /// Category used when a raw task string cannot be parsed
    pub const DEFAULT: TaskCategory = TaskCategory::SimpleQuery;

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::SimpleQuery => "simple-query",
            TaskCategory::ComplexQuery => "complex-query",
            TaskCategory::IntentClassification => "intent-classification",
            TaskCategory::EntityExtraction => "entity-extraction",
            TaskCategory::Synthesis => "synthesis",
            TaskCategory::Summary => "summary",
            TaskCategory::Explanation => "explanation",
            TaskCategory::Validation => "validation",
        }
    }

    /// Parse a raw task string, falling back to [`TaskCategory::DEFAULT`].
    ///
    /// Routing must never block on a malformed category, so unknown input is
    /// logged at debug level and replaced instead of rejected.
    // TODO: revisit whether unknown categories should be rejected at the API edge instead
    pub fn classify(raw: &str) -> TaskCategory {
        match raw.parse() {
            Ok(category) => category,
            Err(err) => {
                debug!("{}, defaulting to {}", err, TaskCategory::DEFAULT);
                TaskCategory::DEFAULT
            }
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown task category: {0}")]
pub struct ParseTaskCategoryError(pub String);

impl FromStr for TaskCategory {
    type Err = ParseTaskCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let category = match normalized.as_str() {
            "simple-query" | "simple-sql" => TaskCategory::SimpleQuery,
            "complex-query" | "complex-sql" => TaskCategory::ComplexQuery,
            "intent-classification" => TaskCategory::IntentClassification,
            "entity-extraction" => TaskCategory::EntityExtraction,
            "synthesis" | "rag-synthesis" => TaskCategory::Synthesis,
            "summary" | "executive-summary" => TaskCategory::Summary,
            "explanation" => TaskCategory::Explanation,
            "validation" => TaskCategory::Validation,
            _ => return Err(ParseTaskCategoryError(s.to_string())),
        };
        Ok(category)
    }
}

/// A task category as supplied by a caller: already typed, or a raw token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInput {
    Typed(TaskCategory),
    Raw(String),
}

impl TaskInput {
    /// Normalize into a category. Never fails.
    pub fn classify(&self) -> TaskCategory {
        match self {
            TaskInput::Typed(category) => *category,
            TaskInput::Raw(raw) => TaskCategory::classify(raw),
        }
    }
}

impl Default for TaskInput {
    fn default() -> Self {
        TaskInput::Typed(TaskCategory::DEFAULT)
    }
}

impl From<TaskCategory> for TaskInput {
    fn from(category: TaskCategory) -> Self {
        TaskInput::Typed(category)
    }
}

impl From<&str> for TaskInput {
    fn from(raw: &str) -> Self {
        TaskInput::Raw(raw.to_string())
    }
}

impl From<String> for TaskInput {
    fn from(raw: String) -> Self {
        TaskInput::Raw(raw)
    }
}
