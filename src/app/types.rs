//! Application types for CLI commands.
//!
//! This module defines the parameters each subcommand receives from the CLI
//! and the output it hands back to the entry point.

use crate::{
    advisor::{RuleLevel, RuleType},
    cli::{EngineArg, Format}
};

/// Parameters for the check command.
///
/// # Example
///
/// ```
/// use sql_review::{
///     app::CheckParams,
///     cli::{EngineArg, Format}
/// };
///
/// let params = CheckParams {
///     input_path:    "migration.sql".to_string(),
///     engine:        Some(EngineArg::Mysql),
///     rule:          None,
///     level:         None,
///     output_format: Format::Text,
///     no_color:      false
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CheckParams {
    /// Path to SQL file or "-" for stdin input.
    pub input_path:    String,
    /// Engine override; falls back to the configured engine.
    pub engine:        Option<EngineArg>,
    /// Run only this rule instead of the configured set.
    pub rule:          Option<RuleType>,
    /// Level for `rule`; defaults to the rule's default level.
    pub level:         Option<RuleLevel>,
    pub output_format: Format,
    pub no_color:      bool
}

/// Parameters for the resources command.
#[derive(Debug, Clone)]
pub struct ResourcesParams {
    pub input_path:    String,
    pub engine:        Option<EngineArg>,
    /// Database for unqualified names; falls back to configuration.
    pub database:      Option<String>,
    pub output_format: Format,
    pub no_color:      bool
}

/// Parameters for the validate command.
#[derive(Debug, Clone)]
pub struct ValidateParams {
    pub input_path:    String,
    pub engine:        Option<EngineArg>,
    pub output_format: Format,
    pub no_color:      bool
}

/// Rendered result of a command.
///
/// # Fields
///
/// * `exit_code` - Process exit code (0=clean, 1=warnings, 2=errors or
///   rejected)
/// * `output` - Formatted text for stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub output:    String
}
