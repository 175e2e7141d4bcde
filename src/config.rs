//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sql-review.toml` in current directory
//! 4. `~/.config/sql-review/config.toml`
//! 5. Default values
//!
//! An explicit `--config` path replaces steps 3 and 4.
//!
//! # Configuration File Format
//!
//! ```toml
//! engine = "mysql"               # mysql, postgres
//! default_database = "app"
//!
//! [[rules]]
//! type = "statement.insert.must-specify-column"
//! level = "error"
//!
//! [[rules]]
//! type = "naming.table"
//! level = "warning"
//! payload = { format = "^[a-z]+(_[a-z]+)*$", maxLength = 64 }
//! ```
//!
//! When no `[[rules]]` are configured every built-in rule of the engine runs
//! at its default level.
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQL_REVIEW_ENGINE` | Engine name |
//! | `SQL_REVIEW_DATABASE` | Default database for resource resolution |
//! | `SQL_REVIEW_CONFIG` | Configuration file, same as `--config` |

use std::{
    env, fs,
    path::{Path, PathBuf}
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    advisor::{Registry, RuleConfig},
    error::{AppResult, config_error},
    parser::Engine
};

pub const ENGINE_ENV: &str = "SQL_REVIEW_ENGINE";
pub const DATABASE_ENV: &str = "SQL_REVIEW_DATABASE";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine:           Option<Engine>,
    #[serde(default)]
    pub default_database: Option<String>,
    /// Rules to run, in order
    #[serde(default)]
    pub rules:            Vec<RuleConfig>
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sql-review.toml)
    /// 3. Config file in home directory (~/.config/sql-review/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        Self::load_from(None)
    }

    /// Same as [`load`](Self::load), with `path` replacing file discovery.
    pub fn load_from(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::discover()?
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn discover() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-review")
                .join("config.toml");
            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        // Current directory overrides home config
        let local_config = PathBuf::from(".sql-review.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        Ok(config)
    }

    /// Read one TOML configuration file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), rules = config.rules.len(), "config loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    /// Override fields from environment variables looked up with `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>
    {
        if let Some(engine) = lookup(ENGINE_ENV) {
            self.engine = Some(
                engine
                    .parse()
                    .map_err(|e: String| config_error(format!("{}: {}", ENGINE_ENV, e)))?
            );
        }
        if let Some(database) = lookup(DATABASE_ENV) {
            self.default_database = Some(database);
        }
        Ok(())
    }

    /// Configured rules, or the registry's defaults for `engine`.
    pub fn rules_for(&self, engine: Engine, registry: &Registry) -> Vec<RuleConfig> {
        if self.rules.is_empty() {
            registry.default_rules(engine)
        } else {
            self.rules.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{RuleLevel, RuleType};

    #[test]
    fn test_from_toml_reads_rules() {
        let config = Config::from_toml(
            r#"
engine = "postgres"
default_database = "app"

[[rules]]
type = "naming.table"
level = "error"
payload = { format = "^[a-z_]+$", maxLength = 32 }
"#
        )
        .unwrap();
        assert_eq!(config.engine, Some(Engine::Postgres));
        assert_eq!(config.default_database.as_deref(), Some("app"));
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].rule_type, RuleType::NamingTable);
        assert_eq!(config.rules[0].level, RuleLevel::Error);
        assert_eq!(
            config.rules[0].payload.as_ref().and_then(|p| p.get("maxLength")),
            Some(&serde_json::json!(32))
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            engine: Some(Engine::MySql),
            ..Default::default()
        };
        config
            .apply_env(|key| match key {
                ENGINE_ENV => Some("pg".to_string()),
                DATABASE_ENV => Some("ops".to_string()),
                _ => None
            })
            .unwrap();
        assert_eq!(config.engine, Some(Engine::Postgres));
        assert_eq!(config.default_database.as_deref(), Some("ops"));
    }

    #[test]
    fn test_bad_env_engine_is_error() {
        let mut config = Config::default();
        assert!(
            config
                .apply_env(|key| (key == ENGINE_ENV).then(|| "oracle".to_string()))
                .is_err()
        );
    }

    #[test]
    fn test_unknown_rule_type_is_rejected() {
        assert!(Config::from_toml("[[rules]]\ntype = \"statement.nope\"\n").is_err());
    }
}
