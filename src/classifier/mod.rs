//! Classifier - Rule-based intent classification for HR assistant requests
//!
//! Category predicates run in a fixed order and the first match wins:
//!
//! 1. greeting with request
//! 2. simple greeting
//! 3. policy query
//! 4. unauthorized access (checked before personal data so that a message
//!    matching both resolves to the restrictive category)
//! 5. personal data query
//! 6. out of scope
//! 7. ambiguous (fallback)
//!
//! The winning category's extractors then fill in the attributes. Calls are
//! pure apart from logging: no I/O, and the user context is only read.

pub mod extract;
pub mod reasoning;

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info_span, warn};

use crate::context::{ClassificationRequest, RequestError, UserContext};
use crate::intent::{keys, Attributes, Category, ClassificationResult};
use crate::patterns::{normalize, CompiledPatterns, PatternError};
use crate::registry::PatternRegistry;

pub fn is_greeting(patterns: &CompiledPatterns, message: &str) -> bool {
    patterns.greetings.contains_any(message)
}

pub fn has_request(patterns: &CompiledPatterns, message: &str) -> bool {
    patterns.request_indicators.contains_any(message)
}

pub fn is_policy_query(patterns: &CompiledPatterns, message: &str) -> bool {
    patterns.policy_keywords.contains_any(message)
}

pub fn is_personal_data_query(patterns: &CompiledPatterns, message: &str) -> bool {
    patterns.personal_data_indicators.contains_any(message)
}

pub fn is_unauthorized_access(patterns: &CompiledPatterns, message: &str) -> bool {
    patterns.unauthorized_access.matches_any(message)
}

pub fn is_out_of_scope(patterns: &CompiledPatterns, message: &str) -> bool {
    patterns.out_of_scope_keywords.contains_any(message)
        || patterns.arithmetic.matches_any(message)
}

/// Pick the category for an already normalized message
pub fn categorize(patterns: &CompiledPatterns, message: &str) -> Category {
    if is_greeting(patterns, message) {
        return if has_request(patterns, message) {
            Category::GreetingWithRequest
        } else {
            Category::GreetingSimple
        };
    }
    if is_policy_query(patterns, message) {
        return Category::PolicyQuery;
    }
    if is_unauthorized_access(patterns, message) {
        if is_personal_data_query(patterns, message) {
            debug!("Message matches both self and third-party patterns, treating as unauthorized");
        }
        return Category::UnauthorizedAccess;
    }
    if is_personal_data_query(patterns, message) {
        return Category::PersonalDataQuery;
    }
    if is_out_of_scope(patterns, message) {
        return Category::OutOfScope;
    }
    Category::Ambiguous
}

fn insert(attributes: &mut Attributes, key: &str, value: impl Into<Value>) {
    attributes.insert(key.to_string(), value.into());
}

/// Run the extractors that belong to `category`
pub fn extract_attributes(
    patterns: &CompiledPatterns,
    category: Category,
    message: &str,
) -> Attributes {
    let mut attributes = Attributes::new();
    match category {
        Category::GreetingWithRequest => {
            insert(&mut attributes, keys::REQUEST_TYPE, extract::request_type(patterns, message));
            insert(&mut attributes, keys::COMPLEXITY, extract::complexity(patterns, message));
        }
        Category::PolicyQuery => {
            insert(&mut attributes, keys::POLICY_AREA, extract::policy_area(patterns, message));
            insert(&mut attributes, keys::COMPLEXITY, extract::complexity(patterns, message));
        }
        Category::PersonalDataQuery => {
            insert(&mut attributes, keys::DATA_TYPE, extract::data_type(patterns, message));
            insert(
                &mut attributes,
                keys::REQUIRED_TABLES,
                extract::required_tables(patterns, message),
            );
            insert(
                &mut attributes,
                keys::SECURITY_LEVEL,
                extract::security_level(patterns, message),
            );
            insert(&mut attributes, keys::COMPLEXITY, extract::complexity(patterns, message));
        }
        Category::UnauthorizedAccess => {
            insert(&mut attributes, keys::SECURITY_RISK, "high");
            insert(&mut attributes, keys::DATA_TYPE, extract::data_type(patterns, message));
            if let Some(target) = extract::target(patterns, message) {
                insert(&mut attributes, keys::TARGET, target);
            }
        }
        Category::OutOfScope => {
            insert(
                &mut attributes,
                keys::CATEGORY,
                extract::out_of_scope_category(patterns, message),
            );
        }
        Category::GreetingSimple | Category::Ambiguous => {}
    }
    attributes
}

/// Classify a message against a fixed set of patterns
pub fn classify_with(patterns: &CompiledPatterns, message: &str) -> ClassificationResult {
    let started = Instant::now();
    let normalized = normalize(message);

    let category = categorize(patterns, &normalized);
    let attributes = extract_attributes(patterns, category, &normalized);
    let reasoning = reasoning::reasoning(category, &attributes);

    ClassificationResult {
        category,
        confidence: reasoning::confidence(category),
        reasoning,
        attributes,
        processing_time_ms: started.elapsed().as_millis() as u64,
    }
}

/// Classifies user messages using the registry's active pattern tables
#[derive(Clone, Debug)]
pub struct IntentClassifier {
    registry: PatternRegistry,
}

impl IntentClassifier {
    pub fn new(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    /// Classifier over the built-in tables
    pub fn with_defaults() -> Result<Self, PatternError> {
        Ok(Self::new(PatternRegistry::builtin()?))
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Classify one message on behalf of `user`.
    ///
    /// Fails only when the caller's preconditions are not met; any
    /// non-empty message gets a category.
    pub fn classify(
        &self,
        message: &str,
        user: &UserContext,
    ) -> Result<ClassificationResult, RequestError> {
        let request = ClassificationRequest::new(message, user.clone());
        self.classify_request(&request)
    }

    pub fn classify_request(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResult, RequestError> {
        let span = info_span!(
            "classify",
            request_id = %uuid::Uuid::new_v4(),
            user_id = %request.user_context.user_id,
            role = %request.user_context.role,
            input_len = request.message.len(),
        );
        let _guard = span.enter();

        if let Err(e) = request.validate() {
            warn!(error = %e, "Rejected classification request");
            return Err(e);
        }

        let snapshot = self.registry.current();
        let result = classify_with(&snapshot.patterns, &request.message);
        debug!(
            category = %result.category,
            confidence = result.confidence,
            patterns_version = snapshot.version,
            "Message classified"
        );
        Ok(result)
    }
}
