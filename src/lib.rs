//! HR Intent - Classification and routing for HR assistant requests
//!
//! Classifies a free-text message from an employee into one of a fixed set
//! of categories, extracts the attributes downstream handlers need, and
//! decides how the request should be routed:
//! - Pattern tables (keywords and regexes), loadable from TOML
//! - Rule-based classification with a fixed priority order
//! - Attribute extraction (request type, policy area, required tables, ...)
//! - Routing policy that scopes personal data to the caller and refuses
//!   requests for other people's data

pub mod classifier;
pub mod config;
pub mod context;
pub mod events;
pub mod intent;
pub mod patterns;
pub mod policy;
pub mod registry;

pub use classifier::IntentClassifier;
pub use context::{ClassificationRequest, RequestError, Role, UserContext};
pub use intent::{Category, ClassificationResult};
pub use policy::{RouteDecision, RoutingPolicy};
pub use registry::PatternRegistry;
