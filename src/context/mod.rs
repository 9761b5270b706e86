//! Context - Who is asking, and what they asked
//!
//! The classifier reads the user context but never mutates or stores it.
//! Caller preconditions (non-empty message, identity fields) are checked
//! here, before classification starts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for requests rejected before classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("user context is missing {0}")]
    MissingField(&'static str),

    #[error("unknown role '{0}' (expected admin, manager or employee)")]
    UnknownRole(String),
}

/// Role of the person talking to the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Employee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(RequestError::UnknownRole(other.to_string())),
        }
    }
}

/// Identity of the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: String,
    pub role: Role,
    /// Absent for accounts that are not linked to an employee record
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
}

impl UserContext {
    pub fn new(user_id: &str, role: Role) -> Self {
        Self {
            user_id: user_id.to_string(),
            role,
            employee_id: None,
            employee_name: None,
        }
    }

    pub fn with_employee(mut self, employee_id: &str, employee_name: &str) -> Self {
        self.employee_id = Some(employee_id.to_string());
        self.employee_name = Some(employee_name.to_string());
        self
    }

    /// Name to address the user by
    pub fn display_name(&self) -> &str {
        self.employee_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.user_id)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.user_id.trim().is_empty() {
            return Err(RequestError::MissingField("userId"));
        }
        Ok(())
    }
}

/// One utterance plus the context it was sent in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRequest {
    pub message: String,
    pub user_context: UserContext,
}

impl ClassificationRequest {
    pub fn new(message: &str, user_context: UserContext) -> Self {
        Self {
            message: message.to_string(),
            user_context,
        }
    }

    /// Check caller preconditions
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.message.trim().is_empty() {
            return Err(RequestError::EmptyMessage);
        }
        self.user_context.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> UserContext {
        UserContext::new("u-1", Role::Employee).with_employee("E001", "Priya Sharma")
    }

    #[test]
    fn test_whitespace_message_rejected() {
        let request = ClassificationRequest::new("   \n\t", test_user());
        assert_eq!(request.validate(), Err(RequestError::EmptyMessage));
    }

    #[test]
    fn test_missing_user_id_rejected() {
        let request = ClassificationRequest::new("hello", UserContext::new(" ", Role::Admin));
        assert_eq!(
            request.validate(),
            Err(RequestError::MissingField("userId"))
        );
    }

    #[test]
    fn test_valid_request() {
        let request = ClassificationRequest::new("hello", test_user());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Manager".parse::<Role>(), Ok(Role::Manager));
        assert_eq!(" admin ".parse::<Role>(), Ok(Role::Admin));
        assert!(matches!(
            "intern".parse::<Role>(),
            Err(RequestError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_display_name_falls_back_to_user_id() {
        assert_eq!(test_user().display_name(), "Priya Sharma");
        assert_eq!(UserContext::new("u-2", Role::Employee).display_name(), "u-2");
    }

    #[test]
    fn test_user_context_json_shape() {
        let json = serde_json::to_value(test_user()).unwrap();
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["role"], "employee");
        assert_eq!(json["employeeId"], "E001");
    }
}
