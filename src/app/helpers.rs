//! Helper functions for CLI operations.
//!
//! This module provides utility functions used by the command runners for
//! reading input, resolving engine and rule settings against configuration,
//! and calculating exit codes.

use std::{
    fs::read_to_string,
    io::{self, Read}
};

use super::convert::{convert_engine, convert_format};
use crate::{
    advisor::{Registry, RuleConfig, RuleLevel, RuleReport, RuleType, Status},
    cli::{EngineArg, Format},
    config::Config,
    error::{AppResult, file_read_error},
    output::OutputOptions,
    parser::Engine
};

/// Calculates the process exit code based on advice statuses.
///
/// - `0` - Only success advice
/// - `1` - At least one warning present
/// - `2` - At least one error present
///
/// # Example
///
/// ```
/// use sql_review::app::calculate_exit_code;
///
/// assert_eq!(calculate_exit_code(&[]), 0);
/// ```
pub fn calculate_exit_code(reports: &[RuleReport]) -> i32 {
    match reports.iter().map(RuleReport::status).max() {
        Some(Status::Error) => 2,
        Some(Status::Warning) => 1,
        Some(Status::Success) | None => 0
    }
}

/// Reads SQL text from a file or stdin.
///
/// # Errors
///
/// Returns an error if the file cannot be read or stdin fails.
pub fn read_sql_input(path: &str) -> AppResult<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        read_to_string(path).map_err(|e| file_read_error(path, e))
    }
}

/// Creates output options from CLI parameters.
pub fn create_output_options(format: Format, no_color: bool) -> OutputOptions {
    OutputOptions {
        format:  convert_format(format),
        colored: !no_color
    }
}

/// Engine from the command line, else configuration, else MySQL.
pub fn effective_engine(arg: Option<EngineArg>, config: &Config) -> Engine {
    arg.map(convert_engine)
        .or(config.engine)
        .unwrap_or_default()
}

/// Database from the command line, else configuration, else empty.
pub fn effective_database(arg: Option<String>, config: &Config) -> String {
    arg.or_else(|| config.default_database.clone())
        .unwrap_or_default()
}

/// Rules to run for the check command.
///
/// A single `--rule` replaces the configured set. Its payload is taken
/// from the configuration when the file configures the same rule.
pub fn effective_rules(
    rule: Option<RuleType>,
    level: Option<RuleLevel>,
    engine: Engine,
    config: &Config,
    registry: &Registry
) -> Vec<RuleConfig> {
    match rule {
        Some(rule) => {
            let configured = config.rules.iter().find(|r| r.rule_type == rule);
            let mut selected = RuleConfig::new(rule, level.unwrap_or(rule.default_level()));
            selected.payload = configured.and_then(|r| r.payload.clone());
            vec![selected]
        }
        None => config.rules_for(engine, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{Advice, Status};

    fn report(status: Status) -> RuleReport {
        let mut advice = Advice::ok();
        advice.status = status;
        RuleReport {
            engine: Engine::MySql,
            rule: RuleType::StatementNoSelectAll,
            level: RuleLevel::Warning,
            advice: vec![advice]
        }
    }

    #[test]
    fn test_calculate_exit_code_success_only() {
        assert_eq!(calculate_exit_code(&[report(Status::Success)]), 0);
    }

    #[test]
    fn test_calculate_exit_code_warning() {
        assert_eq!(calculate_exit_code(&[report(Status::Warning)]), 1);
    }

    #[test]
    fn test_calculate_exit_code_error_takes_precedence() {
        let reports = [report(Status::Warning), report(Status::Error)];
        assert_eq!(calculate_exit_code(&reports), 2);
    }

    #[test]
    fn test_effective_engine_precedence() {
        let config = Config {
            engine: Some(Engine::Postgres),
            ..Default::default()
        };
        assert_eq!(effective_engine(Some(EngineArg::Mysql), &config), Engine::MySql);
        assert_eq!(effective_engine(None, &config), Engine::Postgres);
        assert_eq!(effective_engine(None, &Config::default()), Engine::MySql);
    }

    #[test]
    fn test_single_rule_keeps_configured_payload() {
        let registry = Registry::builtin().unwrap();
        let config = Config {
            rules: vec![
                RuleConfig::new(RuleType::NamingTable, RuleLevel::Warning)
                    .with_payload(serde_json::json!({ "maxLength": 8 })),
            ],
            ..Default::default()
        };
        let rules = effective_rules(
            Some(RuleType::NamingTable),
            Some(RuleLevel::Error),
            Engine::MySql,
            &config,
            &registry
        );
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].level, RuleLevel::Error);
        assert!(rules[0].payload.is_some());
    }

    #[test]
    fn test_read_sql_input_missing_file() {
        assert!(read_sql_input("/nonexistent/input.sql").is_err());
    }
}
