//! SQL review advisors.
//!
//! An [`Advisor`] checks the statements of one input against one configured
//! rule and reports [`Advice`]. Advisors are registered per
//! `(engine, rule type)` in a [`Registry`], which is built once at startup by
//! [`Registry::builtin`] and shared read-only afterwards.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ Statements │────▶│   Registry   │────▶│ RuleReports │
//! └────────────┘     └──────────────┘     └─────────────┘
//!                           │
//!                    ┌──────┴──────┐
//!                    │  Advisors   │
//!                    │ (parallel)  │
//!                    └─────────────┘
//! ```
//!
//! Most advisors are a [`Checker`] walked over every statement by
//! [`walk_statements`], which hands each checker a fresh [`Scope`] and
//! collects what it found.
//!
//! # Example
//!
//! ```
//! use sql_review::{
//!     advisor::{Code, Context, Registry, RuleConfig, RuleLevel, RuleType, Status},
//!     parser::{Engine, parse}
//! };
//!
//! let registry = Registry::builtin().unwrap();
//! let statements = parse(Engine::Postgres, "INSERT INTO t VALUES (1);").unwrap();
//! let rule = RuleConfig::new(RuleType::StatementInsertMustSpecifyColumn, RuleLevel::Error);
//! let advice = registry
//!     .check(&Context::new(Engine::Postgres, &statements, &rule))
//!     .unwrap();
//!
//! assert_eq!(advice.len(), 1);
//! assert_eq!(advice[0].status, Status::Error);
//! assert_eq!(advice[0].code, Code::InsertNotSpecifyColumn);
//! ```

mod naming;
mod registry;
mod statement;
mod table;
mod types;

pub use naming::NamingTableFormat;
pub use registry::{Registry, RegistryBuilder};
pub use statement::{
    DisallowCommit, InsertMustSpecifyColumn, NoLeadingWildcardLike, NoSelectAll, WhereRequire
};
pub use table::RequirePrimaryKey;
pub use types::{Advice, Code, RuleConfig, RuleLevel, RuleReport, RuleType, Status};

use crate::{
    ast::{Visitor, walk},
    error::ReviewError,
    parser::{Engine, StatementTree}
};

/// Inputs of one advisor invocation.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub engine:     Engine,
    pub statements: &'a [StatementTree],
    pub rule:       &'a RuleConfig
}

impl<'a> Context<'a> {
    pub fn new(engine: Engine, statements: &'a [StatementTree], rule: &'a RuleConfig) -> Self {
        Self {
            engine,
            statements,
            rule
        }
    }
}

/// Stateless check of one rule.
///
/// Advisors must be `Send + Sync`: one registry instance serves every
/// concurrent review.
pub trait Advisor: Send + Sync {
    /// Return the findings for `ctx`, empty when there are none.
    ///
    /// The success sentinel is added by [`Registry::check`], not here.
    fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError>;
}

/// What a checker knows about the statement it walks.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Rule type name, used as advice title
    pub title:     &'static str,
    /// Status of every finding, derived from the rule level
    pub status:    Status,
    pub statement: &'a StatementTree
}

impl Scope<'_> {
    /// Build a finding, keeping `line` inside the statement.
    pub fn advice(&self, code: Code, content: String, line: usize) -> Advice {
        Advice {
            status: self.status,
            code,
            title: self.title.to_string(),
            content,
            line: line.clamp(self.statement.first_line(), self.statement.last_line())
        }
    }
}

/// Per-statement traversal that accumulates advice.
pub trait Checker: Visitor {
    fn into_advice(self) -> Vec<Advice>;
}

/// Walk every statement of `ctx` with a checker made by `make`.
///
/// # Errors
///
/// Returns [`ReviewError::Internal`] when a statement was parsed for another
/// engine or the rule is disabled.
pub fn walk_statements<'a, C, F>(ctx: &Context<'a>, make: F) -> Result<Vec<Advice>, ReviewError>
where
    C: Checker,
    F: Fn(Scope<'a>) -> C
{
    let Some(status) = ctx.rule.level.status() else {
        return Err(ReviewError::internal(format!(
            "rule \"{}\" is disabled and must not run",
            ctx.rule.rule_type
        )));
    };
    let mut advice = Vec::new();
    for statement in ctx.statements {
        if statement.engine() != ctx.engine {
            return Err(ReviewError::internal(format!(
                "statement at line {} was parsed for {} but checked for {}",
                statement.first_line(),
                statement.engine(),
                ctx.engine
            )));
        }
        let mut checker = make(Scope {
            title: ctx.rule.rule_type.as_str(),
            status,
            statement
        });
        walk(&mut checker, statement.root());
        advice.extend(checker.into_advice());
    }
    Ok(advice)
}
