use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecurityEvent {
    /// A user asked for data that belongs to someone else
    UnauthorizedAccessAttempt {
        user_id: String,
        role: Role,
        /// Name captured from the message, if any
        target: Option<String>,
        data_type: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// A personal data query arrived from an account with no employee record
    MissingEmployeeLink {
        user_id: String,
        role: Role,
        timestamp: DateTime<Utc>,
    },
}

impl SecurityEvent {
    pub fn user_id(&self) -> &str {
        match self {
            SecurityEvent::UnauthorizedAccessAttempt { user_id, .. }
            | SecurityEvent::MissingEmployeeLink { user_id, .. } => user_id,
        }
    }
}
