//! Configuration for the intent classifier

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::context::Role;
use crate::policy::RoutingConfig;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentConfig {
    /// TOML file with pattern tables (built-in tables when unset)
    #[serde(default)]
    pub patterns_path: Option<String>,

    /// Reload the pattern file when it changes
    #[serde(default)]
    pub watch_patterns: bool,

    /// Role assumed by the CLI when none is given
    #[serde(default)]
    pub default_role: Role,

    /// Print the routing reply next to the classification
    #[serde(default = "default_true")]
    pub include_replies: bool,

    #[serde(default)]
    pub routing: RoutingConfig,
}

fn default_true() -> bool {
    true
}

fn default_patterns_path() -> Option<String> {
    dirs::config_dir().map(|p| {
        p.join("hr-intent/patterns.toml")
            .to_string_lossy()
            .to_string()
    })
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            patterns_path: None,
            watch_patterns: false,
            default_role: Role::Employee,
            include_replies: true,
            routing: RoutingConfig::default(),
        }
    }
}

impl IntentConfig {
    /// Load configuration from file, with environment variable overrides
    pub fn load(path: &str, dev_mode: bool) -> Result<Self> {
        let mut config = if std::path::Path::new(path).exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(patterns) = std::env::var("HR_INTENT_PATTERNS") {
            config.patterns_path = Some(patterns);
        }
        if let Ok(watch) = std::env::var("HR_INTENT_WATCH") {
            config.watch_patterns = matches!(watch.trim(), "1" | "true" | "yes");
        }
        if let Ok(role) = std::env::var("HR_INTENT_ROLE") {
            config.default_role = role.parse()?;
        }

        // Dev mode adjustments
        if dev_mode {
            if config.patterns_path.is_none() {
                config.patterns_path = Some("./hr-intent-patterns.toml".to_string());
            }
            config.watch_patterns = true;
        }

        Ok(config)
    }

    /// Pattern file to use, if one exists on disk
    pub fn resolved_patterns_path(&self) -> Option<String> {
        self.patterns_path
            .clone()
            .or_else(default_patterns_path)
            .filter(|p| std::path::Path::new(p).exists())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = IntentConfig::load("/nonexistent/hr-intent.toml", false).unwrap();
        assert!(config.include_replies);
        assert_eq!(config.routing.assistant_name, "HR Assistant");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_role = "manager"
include_replies = false

[routing]
assistant_name = "PeopleBot"
"#,
        )
        .unwrap();

        let config = IntentConfig::load(path.to_str().unwrap(), false).unwrap();
        assert_eq!(config.default_role, Role::Manager);
        assert!(!config.include_replies);
        assert_eq!(config.routing.assistant_name, "PeopleBot");
    }

    #[test]
    fn test_dev_mode_enables_watching() {
        let config = IntentConfig::load("/nonexistent/hr-intent.toml", true).unwrap();
        assert!(config.watch_patterns);
        assert!(config.patterns_path.is_some());
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let config = IntentConfig {
            default_role: Role::Admin,
            ..Default::default()
        };
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = IntentConfig::load(path.to_str().unwrap(), false).unwrap();
        assert_eq!(loaded.default_role, Role::Admin);
    }
}
