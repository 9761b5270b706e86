//! Intent - Classification categories and the result envelope
//!
//! Every classification produces the same `ClassificationResult` shape;
//! only the contents of `attributes` depend on the category.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute keys carried in `ClassificationResult::attributes`
pub mod keys {
    pub const REQUEST_TYPE: &str = "requestType";
    pub const POLICY_AREA: &str = "policyArea";
    pub const DATA_TYPE: &str = "dataType";
    pub const REQUIRED_TABLES: &str = "requiredTables";
    pub const SECURITY_LEVEL: &str = "securityLevel";
    pub const SECURITY_RISK: &str = "securityRisk";
    pub const COMPLEXITY: &str = "complexity";
    pub const TARGET: &str = "target";
    pub const CATEGORY: &str = "category";
}

/// Category-specific secondary fields, ordered by key
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Classification outcome, listed in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Salutation plus an actionable request
    GreetingWithRequest,
    /// Salutation only
    GreetingSimple,
    /// Question about an HR policy
    PolicyQuery,
    /// Request for the caller's own HR data
    PersonalDataQuery,
    /// Request for someone else's data
    UnauthorizedAccess,
    /// Not an HR topic
    OutOfScope,
    /// Nothing matched; needs clarification
    Ambiguous,
}

impl Category {
    /// All categories in priority order
    pub const ALL: [Category; 7] = [
        Category::GreetingWithRequest,
        Category::GreetingSimple,
        Category::PolicyQuery,
        Category::PersonalDataQuery,
        Category::UnauthorizedAccess,
        Category::OutOfScope,
        Category::Ambiguous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GreetingWithRequest => "greeting_with_request",
            Category::GreetingSimple => "greeting_simple",
            Category::PolicyQuery => "policy_query",
            Category::PersonalDataQuery => "personal_data_query",
            Category::UnauthorizedAccess => "unauthorized_access",
            Category::OutOfScope => "out_of_scope",
            Category::Ambiguous => "ambiguous",
        }
    }

    /// Whether the caller should ask the user to rephrase
    pub fn needs_clarification(&self) -> bool {
        matches!(self, Category::Ambiguous)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of classifying one utterance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub category: Category,
    /// Fixed per category (0.0 - 1.0)
    pub confidence: f32,
    pub reasoning: String,
    #[serde(default)]
    pub attributes: Attributes,
    /// Wall-clock time spent classifying. Advisory only; never route on it.
    #[serde(default)]
    pub processing_time_ms: u64,
}

impl ClassificationResult {
    /// String attribute by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    /// The data sources a personal data query may read
    pub fn required_tables(&self) -> Option<Vec<&str>> {
        self.attributes
            .get(keys::REQUIRED_TABLES)
            .and_then(|v| v.as_array())
            .map(|tables| tables.iter().filter_map(|t| t.as_str()).collect())
    }

    /// Compare everything except the advisory timing field
    pub fn same_outcome(&self, other: &ClassificationResult) -> bool {
        self.category == other.category
            && self.confidence == other.confidence
            && self.reasoning == other.reasoning
            && self.attributes == other.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(category: Category, processing_time_ms: u64) -> ClassificationResult {
        let mut attributes = Attributes::new();
        attributes.insert(
            keys::REQUIRED_TABLES.to_string(),
            serde_json::json!(["leave_balances", "leave_types"]),
        );
        attributes.insert(keys::DATA_TYPE.to_string(), "leave_balance".into());
        ClassificationResult {
            category,
            confidence: 0.9,
            reasoning: "test".to_string(),
            attributes,
            processing_time_ms,
        }
    }

    #[test]
    fn test_priority_order() {
        assert!(Category::GreetingWithRequest < Category::GreetingSimple);
        assert!(Category::PersonalDataQuery < Category::UnauthorizedAccess);
        assert_eq!(Category::ALL.last(), Some(&Category::Ambiguous));
        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
    }

    #[test]
    fn test_only_ambiguous_needs_clarification() {
        for category in Category::ALL {
            assert_eq!(
                category.needs_clarification(),
                category == Category::Ambiguous,
                "{}",
                category
            );
        }
    }

    #[test]
    fn test_same_outcome_ignores_timing() {
        let a = result(Category::PersonalDataQuery, 1);
        let b = result(Category::PersonalDataQuery, 250);
        assert!(a.same_outcome(&b));
        assert!(!a.same_outcome(&result(Category::PolicyQuery, 1)));
    }

    #[test]
    fn test_attribute_accessors() {
        let r = result(Category::PersonalDataQuery, 0);
        assert_eq!(r.attribute(keys::DATA_TYPE), Some("leave_balance"));
        assert_eq!(r.attribute(keys::POLICY_AREA), None);
        assert_eq!(
            r.required_tables(),
            Some(vec!["leave_balances", "leave_types"])
        );
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(result(Category::OutOfScope, 3)).unwrap();
        assert_eq!(json["category"], "OutOfScope");
        assert_eq!(json["processingTimeMs"], 3);
        assert_eq!(json["attributes"]["dataType"], "leave_balance");
    }
}
