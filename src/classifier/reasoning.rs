//! Confidence and reasoning per category
//!
//! Confidence values are fixed constants. This table is the only place they
//! are defined.

use crate::intent::{keys, Attributes, Category};

/// Confidence assigned when nothing matched
pub const AMBIGUOUS_CONFIDENCE: f32 = 0.60;

pub fn confidence(category: Category) -> f32 {
    match category {
        Category::GreetingWithRequest => 0.90,
        Category::GreetingSimple => 0.95,
        Category::PolicyQuery => 0.85,
        Category::PersonalDataQuery => 0.90,
        Category::UnauthorizedAccess => 0.95,
        Category::OutOfScope => 0.90,
        Category::Ambiguous => AMBIGUOUS_CONFIDENCE,
    }
}

fn attr<'a>(attributes: &'a Attributes, key: &str) -> &'a str {
    attributes
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
}

/// Human-readable justification, filled from the extracted attributes
pub fn reasoning(category: Category, attributes: &Attributes) -> String {
    match category {
        Category::GreetingWithRequest => format!(
            "Greeting followed by a {} request",
            attr(attributes, keys::REQUEST_TYPE)
        ),
        Category::GreetingSimple => "Simple greeting without an actionable request".to_string(),
        Category::PolicyQuery => format!(
            "Policy question about {}",
            attr(attributes, keys::POLICY_AREA)
        ),
        Category::PersonalDataQuery => format!(
            "Request for the user's own {}",
            attr(attributes, keys::DATA_TYPE)
        ),
        Category::UnauthorizedAccess => "Request targets another employee's data".to_string(),
        Category::OutOfScope => format!(
            "Question about {} is outside HR scope",
            attr(attributes, keys::CATEGORY)
        ),
        Category::Ambiguous => "No known pattern matched; clarification needed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_range_and_ambiguous_lowest() {
        for category in Category::ALL {
            let c = confidence(category);
            assert!((0.0..=1.0).contains(&c));
            if category != Category::Ambiguous {
                assert!(c > AMBIGUOUS_CONFIDENCE);
            }
        }
        assert_eq!(confidence(Category::Ambiguous), 0.60);
    }

    #[test]
    fn test_reasoning_uses_attributes() {
        let mut attributes = Attributes::new();
        attributes.insert(keys::POLICY_AREA.to_string(), "leave_policies".into());
        assert_eq!(
            reasoning(Category::PolicyQuery, &attributes),
            "Policy question about leave_policies"
        );
    }

    #[test]
    fn test_reasoning_missing_attribute() {
        assert_eq!(
            reasoning(Category::PolicyQuery, &Attributes::new()),
            "Policy question about unknown"
        );
    }
}
