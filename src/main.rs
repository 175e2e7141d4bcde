//! # SQL Review
//!
//! Review SQL changes against configurable rules before they reach a
//! database.
//!
//! `sql-review` parses MySQL or PostgreSQL text, runs review advisors over
//! every statement, lists the tables the text touches, and checks whether
//! it is safe to run read-only.
//!
//! # Quick Start
//!
//! ```bash
//! # Review a migration with the configured rules
//! sql-review check migration.sql --engine mysql
//!
//! # Run a single rule as an error
//! sql-review check migration.sql --rule statement.where.require --level error
//!
//! # List referenced tables as JSON
//! sql-review -f json resources query.sql --database app
//!
//! # Gate a console query
//! echo "SELECT * FROM users" | sql-review validate -
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`SQL_REVIEW_ENGINE`, `SQL_REVIEW_DATABASE`)
//! 3. `.sql-review.toml` in current directory
//! 4. `~/.config/sql-review/config.toml`
//!
//! # Rules
//!
//! | Type | Engines | Code |
//! |------|---------|------|
//! | `statement.insert.must-specify-column` | mysql, postgres | 1107 |
//! | `statement.where.require` | mysql, postgres | 202 |
//! | `statement.select.no-select-all` | mysql, postgres | 203 |
//! | `statement.where.no-leading-wildcard-like` | mysql, postgres | 204 |
//! | `statement.disallow-commit` | mysql | 206 |
//! | `table.require-pk` | mysql, postgres | 601 |
//! | `naming.table` | mysql, postgres | 301 |
//!
//! # Exit Codes
//!
//! - `0` - Success, no findings or statements accepted
//! - `1` - Warnings found
//! - `2` - Errors found, or validation rejected the input
//! - `3` - The command failed (unreadable input, syntax error, bad config)

mod advisor;
mod app;
mod ast;
mod cli;
mod config;
mod error;
mod output;
mod parser;
mod resource;
mod validate;

use std::process;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::{
    advisor::Registry,
    app::{
        CheckParams, ResourcesParams, ValidateParams, create_output_options, run_check,
        run_resources, run_rules, run_validate
    },
    cli::{Cli, Commands},
    config::Config,
    error::AppResult
};

/// Exit code for failures that produced no review result
const EXIT_FAILURE: i32 = 3;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

/// `RUST_LOG` wins when set; otherwise `-v` picks debug over warn.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> AppResult<i32> {
    let registry = Registry::builtin()?;
    let config = Config::load_from(cli.config.as_deref())?;

    let output = match cli.command {
        Commands::Check {
            input,
            engine,
            rule,
            level
        } => run_check(&registry, &config, CheckParams {
            input_path: input.display().to_string(),
            engine,
            rule,
            level,
            output_format: cli.output_format,
            no_color: cli.no_color
        })?,
        Commands::Resources {
            input,
            engine,
            database
        } => run_resources(&config, ResourcesParams {
            input_path: input.display().to_string(),
            engine,
            database,
            output_format: cli.output_format,
            no_color: cli.no_color
        })?,
        Commands::Validate {
            input,
            engine
        } => run_validate(&config, ValidateParams {
            input_path: input.display().to_string(),
            engine,
            output_format: cli.output_format,
            no_color: cli.no_color
        })?,
        Commands::Rules {
            engine
        } => {
            let opts = create_output_options(cli.output_format, cli.no_color);
            run_rules(&registry, engine, &opts)
        }
    };

    print!("{}", output.output);
    Ok(output.exit_code)
}
