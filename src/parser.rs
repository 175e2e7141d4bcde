//! Dialect parsing boundary.
//!
//! Raw SQL text is split into statements with the engine's tokenizer (see
//! [`split_statements`]), each statement is parsed by the engine's
//! `sqlparser` dialect, and the result is lowered into a [`StatementTree`].
//! Line and column numbers everywhere refer to the original input.
//!
//! # Example
//!
//! ```
//! use sql_review::parser::{Engine, parse};
//!
//! let sql = "SELECT * FROM t1 WHERE c1 = 1;\nSELECT * FROM t2;";
//! let trees = parse(Engine::MySql, sql).unwrap();
//!
//! assert_eq!(trees.len(), 2);
//! assert_eq!(trees[1].text(), "SELECT * FROM t2;");
//! assert_eq!(trees[1].first_line(), 2);
//! ```

mod lower;
mod source;
mod split;

use std::{
    fmt,
    ops::Range,
    str::FromStr,
    sync::LazyLock
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlparser::{
    dialect::{Dialect, MySqlDialect, PostgreSqlDialect},
    parser::{Parser, ParserError}
};
pub use split::{RawStatement, split_statements};
use tracing::debug;

use crate::{ast::SyntaxNode, error::ReviewError};

/// Target database engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::MySql, Engine::Postgres];

    /// Convert to sqlparser dialect for parsing
    pub fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::MySql => Box::new(MySqlDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {})
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres"
        }
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(format!(
                "Unknown engine: '{}'. Supported engines: mysql, postgres.",
                s
            ))
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed statement of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTree {
    engine:     Engine,
    root:       SyntaxNode,
    text:       String,
    range:      Range<usize>,
    first_line: usize,
    last_line:  usize
}

impl StatementTree {
    fn new(engine: Engine, root: SyntaxNode, raw: &RawStatement) -> Self {
        Self {
            engine,
            root,
            text: raw.text.clone(),
            range: raw.range.clone(),
            first_line: raw.first_line,
            last_line: raw.last_line
        }
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Normalized statement text, exactly as it appears in the input.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte range of [`text`](Self::text) within the input.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn first_line(&self) -> usize {
        self.first_line
    }

    pub fn last_line(&self) -> usize {
        self.last_line
    }
}

/// Parse SQL text into ordered statement trees.
///
/// # Errors
///
/// Returns [`ReviewError::Syntax`] with the position of the first token the
/// grammar rejects. A routine definition with a `BEGIN ... END` body that the
/// grammar rejects is kept as an opaque `CreateRoutine` statement instead.
pub fn parse(engine: Engine, sql: &str) -> Result<Vec<StatementTree>, ReviewError> {
    let source = source::Source::new(sql);
    let raws = split::split_source(engine, &source)?;
    let dialect = engine.dialect();
    let mut trees = Vec::with_capacity(raws.len());
    let lowering = lower::Lowering::new(&source);
    for raw in &raws {
        let statements = match Parser::parse_sql(dialect.as_ref(), &raw.padded()) {
            Ok(statements) => statements,
            Err(e) if raw.compound => {
                debug!(
                    engine = %engine,
                    line = raw.first_line,
                    error = %e,
                    "routine body kept unparsed"
                );
                trees.push(StatementTree::new(engine, lowering.routine(raw), raw));
                continue;
            }
            Err(e) => return Err(parser_error(engine, &e, raw))
        };
        match statements.as_slice() {
            [statement] => trees.push(StatementTree::new(
                engine,
                lowering.statement(statement, raw),
                raw
            )),
            [] => {}
            more => {
                return Err(ReviewError::internal(format!(
                    "statement at line {} was split into {} statements by the parser",
                    raw.first_line,
                    more.len()
                )));
            }
        }
    }
    debug!(engine = %engine, statements = trees.len(), "parsed sql");
    Ok(trees)
}

static POSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*at Line: (\d+), Column:? (\d+)\s*$").expect("position pattern is valid")
});

fn parser_error(engine: Engine, err: &ParserError, raw: &RawStatement) -> ReviewError {
    let message = match err {
        ParserError::TokenizerError(m) | ParserError::ParserError(m) => m.clone(),
        other => other.to_string()
    };
    syntax_error(engine, &message, (raw.first_line, raw.column))
}

/// Build a syntax error, lifting the position sqlparser appends to messages.
pub(crate) fn syntax_error(engine: Engine, message: &str, fallback: (usize, usize)) -> ReviewError {
    let (message, line, column) = match POSITION.captures(message) {
        Some(caps) => {
            let stripped = message[..caps.get(0).map_or(message.len(), |m| m.start())].to_string();
            let line = caps[1].parse().unwrap_or(fallback.0);
            let column = caps[2].parse().unwrap_or(fallback.1);
            (stripped, line, column)
        }
        None => (message.to_string(), fallback.0, fallback.1)
    };
    ReviewError::Syntax {
        engine,
        line,
        column,
        message
    }
}
