//! Static routing policy: which provider each task category tries first

use super::TaskCategory;
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};

/// Provider ordering class for a task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingClass {
    /// Cheap or simple work: try local, fall back to cloud
    LocalFirst,
    /// Work needing stronger reasoning: try cloud, fall back to local
    CloudFirst,
}

impl RoutingClass {
    /// Ordered candidate list for this class
    pub fn candidates(&self) -> [ProviderKind; 2] {
        match self {
            RoutingClass::LocalFirst => [ProviderKind::Local, ProviderKind::Cloud],
            RoutingClass::CloudFirst => [ProviderKind::Cloud, ProviderKind::Local],
        }
    }

    /// Provider at the head of the ordering
    pub fn preferred(&self) -> ProviderKind {
        self.candidates()[0]
    }
}

/// Every task category mapped to exactly one ordering class
pub const POLICY_TABLE: [(TaskCategory, RoutingClass); 8] = [
    (TaskCategory::SimpleQuery, RoutingClass::LocalFirst),
    (TaskCategory::IntentClassification, RoutingClass::LocalFirst),
    (TaskCategory::EntityExtraction, RoutingClass::LocalFirst),
    (TaskCategory::Validation, RoutingClass::LocalFirst),
    (TaskCategory::ComplexQuery, RoutingClass::CloudFirst),
    (TaskCategory::Synthesis, RoutingClass::CloudFirst),
    (TaskCategory::Summary, RoutingClass::CloudFirst),
    (TaskCategory::Explanation, RoutingClass::CloudFirst),
];

/// Look up the ordering class of a category.
///
/// Categories missing from the table are treated as cloud-first; the table
/// tests guarantee that never happens.
pub fn routing_class(category: TaskCategory) -> RoutingClass {
    POLICY_TABLE
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, class)| *class)
        .unwrap_or(RoutingClass::CloudFirst)
}

/// Ordered list of providers to attempt for a category
pub fn candidates(category: TaskCategory) -> [ProviderKind; 2] {
    routing_class(category).candidates()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_exhaustive_and_disjoint() {
        let local: HashSet<_> = POLICY_TABLE
            .iter()
            .filter(|(_, class)| *class == RoutingClass::LocalFirst)
            .map(|(c, _)| *c)
            .collect();
        let cloud: HashSet<_> = POLICY_TABLE
            .iter()
            .filter(|(_, class)| *class == RoutingClass::CloudFirst)
            .map(|(c, _)| *c)
            .collect();

        assert!(local.is_disjoint(&cloud));

        let all: HashSet<_> = TaskCategory::ALL.into_iter().collect();
        let union: HashSet<_> = local.union(&cloud).copied().collect();
        assert_eq!(union, all);

        // No category listed twice
        assert_eq!(POLICY_TABLE.len(), all.len());
    }

    #[test]
    fn test_local_first_categories() {
        for category in [
            TaskCategory::SimpleQuery,
            TaskCategory::IntentClassification,
            TaskCategory::EntityExtraction,
            TaskCategory::Validation,
        ] {
            assert_eq!(routing_class(category), RoutingClass::LocalFirst);
            assert_eq!(candidates(category), [ProviderKind::Local, ProviderKind::Cloud]);
        }
    }

    #[test]
    fn test_cloud_first_categories() {
        for category in [
            TaskCategory::ComplexQuery,
            TaskCategory::Synthesis,
            TaskCategory::Summary,
            TaskCategory::Explanation,
        ] {
            assert_eq!(routing_class(category), RoutingClass::CloudFirst);
            assert_eq!(routing_class(category).preferred(), ProviderKind::Cloud);
        }
    }
}
