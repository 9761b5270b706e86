//! Policy Layer - Routing decisions for classified requests
//!
//! Turns a `ClassificationResult` into what the caller should do next.
//! Personal data is only ever fetched for the caller's own employee record
//! and only from the tables the classifier listed; requests for anyone
//! else's data are denied and recorded as security events.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::UserContext;
use crate::events::SecurityEvent;
use crate::intent::{keys, Category, ClassificationResult};

/// What the caller should do with a classified request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Reply directly, nothing to look up
    Respond { message: String },
    /// Hand off to the HR assistant for an answer on `topic`
    Assist { topic: String, message: String },
    /// Read the caller's own data from the listed tables
    FetchOwnData {
        employee_id: String,
        tables: Vec<String>,
        sensitive: bool,
    },
    /// Refuse the request
    Deny {
        reason: String,
        event: SecurityEvent,
    },
    /// Politely decline a non-HR question
    Decline { message: String },
    /// Ask the user to rephrase
    Clarify { message: String },
}

impl RouteDecision {
    /// Text to show the user
    pub fn reply(&self) -> String {
        match self {
            RouteDecision::Respond { message }
            | RouteDecision::Assist { message, .. }
            | RouteDecision::Decline { message }
            | RouteDecision::Clarify { message } => message.clone(),
            RouteDecision::FetchOwnData { tables, .. } => {
                format!("Looking up your records ({}).", tables.join(", "))
            }
            RouteDecision::Deny { reason, .. } => reason.clone(),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, RouteDecision::Deny { .. })
    }
}

/// Routing configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Name the assistant introduces itself with
    pub assistant_name: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            assistant_name: "HR Assistant".to_string(),
        }
    }
}

/// Routes classification results to handlers
#[derive(Clone, Debug)]
pub struct RoutingPolicy {
    config: RoutingConfig,
}

impl RoutingPolicy {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RoutingConfig::default())
    }

    /// Decide how to handle a classified request from `user`
    pub fn route(&self, result: &ClassificationResult, user: &UserContext) -> RouteDecision {
        debug!(category = %result.category, user_id = %user.user_id, "Routing request");

        match result.category {
            Category::GreetingSimple => RouteDecision::Respond {
                message: format!(
                    "Hello {}! I'm your {}. How can I help you today?",
                    user.display_name(),
                    self.config.assistant_name
                ),
            },
            Category::GreetingWithRequest => {
                let topic = result
                    .attribute(keys::REQUEST_TYPE)
                    .unwrap_or("general_hr")
                    .to_string();
                RouteDecision::Assist {
                    message: format!(
                        "Hello {}! Let me help you with that {} request.",
                        user.display_name(),
                        topic.replace('_', " ")
                    ),
                    topic,
                }
            }
            Category::PolicyQuery => {
                let topic = result
                    .attribute(keys::POLICY_AREA)
                    .unwrap_or("general_policies")
                    .to_string();
                RouteDecision::Assist {
                    message: format!("Here is what our {} say.", topic.replace('_', " ")),
                    topic,
                }
            }
            Category::PersonalDataQuery => self.route_personal_data(result, user),
            Category::UnauthorizedAccess => self.deny_unauthorized(result, user),
            Category::OutOfScope => {
                let topic = result.attribute(keys::CATEGORY).unwrap_or("general_knowledge");
                RouteDecision::Decline {
                    message: format!(
                        "I can only help with HR topics like leave, attendance, payroll \
                         and policies. Questions about {} are outside what I can answer.",
                        topic.replace('_', " ")
                    ),
                }
            }
            Category::Ambiguous => RouteDecision::Clarify {
                message: "I'm not sure what you need. Could you rephrase? For example: \
                          \"What is my leave balance?\" or \"Explain the leave policy.\""
                    .to_string(),
            },
        }
    }

    fn route_personal_data(
        &self,
        result: &ClassificationResult,
        user: &UserContext,
    ) -> RouteDecision {
        let Some(employee_id) = user.employee_id.clone().filter(|id| !id.trim().is_empty()) else {
            let event = SecurityEvent::MissingEmployeeLink {
                user_id: user.user_id.clone(),
                role: user.role,
                timestamp: Utc::now(),
            };
            warn!(user_id = %event.user_id(), "Personal data query without an employee record");
            return RouteDecision::Deny {
                reason: "Your account is not linked to an employee record.".to_string(),
                event,
            };
        };

        let tables: Vec<String> = result
            .required_tables()
            .filter(|tables| !tables.is_empty())
            .map(|tables| tables.into_iter().map(str::to_string).collect())
            .unwrap_or_else(|| vec![crate::classifier::extract::FALLBACK_TABLE.to_string()]);

        RouteDecision::FetchOwnData {
            employee_id,
            tables,
            sensitive: result.attribute(keys::SECURITY_LEVEL) == Some("sensitive"),
        }
    }

    fn deny_unauthorized(
        &self,
        result: &ClassificationResult,
        user: &UserContext,
    ) -> RouteDecision {
        let event = SecurityEvent::UnauthorizedAccessAttempt {
            user_id: user.user_id.clone(),
            role: user.role,
            target: result.attribute(keys::TARGET).map(str::to_string),
            data_type: result.attribute(keys::DATA_TYPE).map(str::to_string),
            timestamp: Utc::now(),
        };
        warn!(
            user_id = %event.user_id(),
            role = %user.role,
            target = ?result.attribute(keys::TARGET),
            "Unauthorized data access attempt"
        );
        RouteDecision::Deny {
            reason: "I can only share your own HR information. \
                     Requests about other employees' data are not permitted."
                .to_string(),
            event,
        }
    }
}
