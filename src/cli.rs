use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::advisor::{RuleLevel, RuleType};

/// SQL Review - Check SQL changes against review rules
#[derive(Parser, Debug)]
#[command(name = "sql-review")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text", global = true)]
    pub output_format: Format,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file, replacing the default lookup
    #[arg(long, global = true, env = "SQL_REVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review SQL statements against the configured rules
    Check {
        /// Path to SQL file (use - for stdin)
        input: PathBuf,

        /// Database engine
        #[arg(short, long, value_enum)]
        engine: Option<EngineArg>,

        /// Run only this rule
        #[arg(short, long, value_parser = parse_rule_type)]
        rule: Option<RuleType>,

        /// Level of the rule given with --rule
        #[arg(short, long, requires = "rule", value_parser = parse_rule_level)]
        level: Option<RuleLevel>
    },

    /// List the tables referenced by SQL statements
    Resources {
        /// Path to SQL file (use - for stdin)
        input: PathBuf,

        /// Database engine
        #[arg(short, long, value_enum)]
        engine: Option<EngineArg>,

        /// Database for unqualified table names
        #[arg(short, long)]
        database: Option<String>
    },

    /// Check that SQL statements are read-only
    Validate {
        /// Path to SQL file (use - for stdin)
        input: PathBuf,

        /// Database engine
        #[arg(short, long, value_enum)]
        engine: Option<EngineArg>
    },

    /// List the registered rules
    Rules {
        /// Only rules of this engine
        #[arg(short, long, value_enum)]
        engine: Option<EngineArg>
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    #[value(alias = "mariadb")]
    Mysql,
    #[value(alias = "postgresql", alias = "pg")]
    Postgres
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}

fn parse_rule_type(s: &str) -> Result<RuleType, String> {
    s.parse()
}

fn parse_rule_level(s: &str) -> Result<RuleLevel, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_rule() {
        let cli = Cli::parse_from([
            "sql-review",
            "check",
            "q.sql",
            "--engine",
            "pg",
            "--rule",
            "statement.where.require",
            "--level",
            "error",
            "-f",
            "json"
        ]);
        assert_eq!(cli.output_format, Format::Json);
        match cli.command {
            Commands::Check {
                engine,
                rule,
                level,
                ..
            } => {
                assert_eq!(engine, Some(EngineArg::Postgres));
                assert_eq!(rule, Some(RuleType::StatementRequireWhere));
                assert_eq!(level, Some(RuleLevel::Error));
            }
            other => panic!("unexpected command: {:?}", other)
        }
    }

    #[test]
    fn test_level_requires_rule() {
        assert!(Cli::try_parse_from(["sql-review", "check", "q.sql", "--level", "error"]).is_err());
    }
}
