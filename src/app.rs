//! Application logic for the SQL Review CLI.
//!
//! This module contains the command runners separated from the main entry
//! point to enable testing. Each runner reads its input, calls into the
//! review engine, and returns rendered output with an exit code.

mod convert;
mod helpers;
mod types;

pub use convert::{convert_engine, convert_format};
pub use helpers::{
    calculate_exit_code, create_output_options, effective_database, effective_engine,
    effective_rules, read_sql_input
};
use tracing::info;
pub use types::{CheckParams, CommandOutput, ResourcesParams, ValidateParams};

use crate::{
    advisor::Registry,
    cli::EngineArg,
    config::Config,
    error::AppResult,
    output::{
        OutputOptions, RuleEntry, Verdict, format_reports, format_resources, format_rules,
        format_verdict
    },
    parser::parse,
    resource::resources_from_trees,
    validate::validate_read_only
};

/// Exit code of a rejected validation
pub const EXIT_REJECTED: i32 = 2;

/// Review SQL text against the configured or selected rules.
///
/// # Errors
///
/// Returns an error when the input cannot be read or parsed, or a rule is
/// not supported for the engine.
pub fn run_check(
    registry: &Registry,
    config: &Config,
    params: CheckParams
) -> AppResult<CommandOutput> {
    let sql = read_sql_input(&params.input_path)?;
    let engine = effective_engine(params.engine, config);
    let rules = effective_rules(params.rule, params.level, engine, config, registry);
    let statements = parse(engine, &sql)?;
    let reports = registry.review(engine, &statements, &rules)?;
    info!(
        engine = %engine,
        statements = statements.len(),
        rules = reports.len(),
        "check finished"
    );
    let opts = create_output_options(params.output_format, params.no_color);
    Ok(CommandOutput {
        exit_code: calculate_exit_code(&reports),
        output:    format_reports(&reports, &opts)
    })
}

/// List the tables referenced by SQL text.
pub fn run_resources(config: &Config, params: ResourcesParams) -> AppResult<CommandOutput> {
    let sql = read_sql_input(&params.input_path)?;
    let engine = effective_engine(params.engine, config);
    let database = effective_database(params.database, config);
    let statements = parse(engine, &sql)?;
    let resources = resources_from_trees(&database, &statements);
    let opts = create_output_options(params.output_format, params.no_color);
    Ok(CommandOutput {
        exit_code: 0,
        output:    format_resources(&resources, &opts)
    })
}

/// Check that SQL text is read-only.
///
/// A rejection is a verdict, not an error: it is rendered and mapped to
/// [`EXIT_REJECTED`].
pub fn run_validate(config: &Config, params: ValidateParams) -> AppResult<CommandOutput> {
    let sql = read_sql_input(&params.input_path)?;
    let engine = effective_engine(params.engine, config);
    let statements = parse(engine, &sql)?;
    let result = validate_read_only(&statements);
    let verdict = Verdict::from_result(statements.len(), &result);
    let opts = create_output_options(params.output_format, params.no_color);
    Ok(CommandOutput {
        exit_code: if verdict.accepted { 0 } else { EXIT_REJECTED },
        output:    format_verdict(&verdict, &opts)
    })
}

/// List registered rules, optionally for one engine.
pub fn run_rules(
    registry: &Registry,
    engine: Option<EngineArg>,
    opts: &OutputOptions
) -> CommandOutput {
    let engine = engine.map(convert_engine);
    let entries: Vec<RuleEntry> = registry
        .entries()
        .filter(|(e, _)| engine.is_none_or(|wanted| wanted == *e))
        .map(|(engine, rule)| RuleEntry {
            engine,
            rule,
            default_level: rule.default_level().to_string()
        })
        .collect();
    CommandOutput {
        exit_code: 0,
        output:    format_rules(&entries, opts)
    }
}
