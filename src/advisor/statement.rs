use super::{Advice, Advisor, Checker, Code, Context, Scope, walk_statements};
use crate::{
    ast::{NodeKind, StatementKind, SyntaxNode, Visitor, Walk},
    error::ReviewError
};

/// INSERT must name its target columns
///
/// Positional inserts silently break when columns are added or reordered.
pub struct InsertMustSpecifyColumn;

impl Advisor for InsertMustSpecifyColumn {
    fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError> {
        walk_statements(ctx, |scope| InsertColumnChecker {
            scope,
            advice: Vec::new()
        })
    }
}

struct InsertColumnChecker<'a> {
    scope:  Scope<'a>,
    advice: Vec<Advice>
}

impl Visitor for InsertColumnChecker<'_> {
    fn visit(&mut self, node: &SyntaxNode) -> Walk {
        if let NodeKind::Insert {
            columns, ..
        } = node.kind()
            && columns.is_empty()
        {
            let statement = self.scope.statement;
            self.advice.push(self.scope.advice(
                Code::InsertNotSpecifyColumn,
                format!(
                    "The INSERT statement must specify columns but \"{}\" does not",
                    statement.text()
                ),
                statement.last_line()
            ));
        }
        Walk::Descend
    }
}

impl Checker for InsertColumnChecker<'_> {
    fn into_advice(self) -> Vec<Advice> {
        self.advice
    }
}

/// UPDATE and DELETE must have a WHERE clause
pub struct WhereRequire;

impl Advisor for WhereRequire {
    fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError> {
        walk_statements(ctx, |scope| WhereChecker {
            scope,
            advice: Vec::new()
        })
    }
}

struct WhereChecker<'a> {
    scope:  Scope<'a>,
    advice: Vec<Advice>
}

impl Visitor for WhereChecker<'_> {
    fn visit(&mut self, node: &SyntaxNode) -> Walk {
        let unfiltered = matches!(
            node.kind(),
            NodeKind::Update {
                filtered: false
            } | NodeKind::Delete {
                filtered: false
            }
        );
        if unfiltered {
            self.advice.push(self.scope.advice(
                Code::StatementNoWhere,
                format!("\"{}\" requires WHERE clause", self.scope.statement.text()),
                node.line()
            ));
        }
        Walk::Descend
    }
}

impl Checker for WhereChecker<'_> {
    fn into_advice(self) -> Vec<Advice> {
        self.advice
    }
}

/// Select blocks must not use `*`
pub struct NoSelectAll;

impl Advisor for NoSelectAll {
    fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError> {
        walk_statements(ctx, |scope| SelectAllChecker {
            scope,
            advice: Vec::new()
        })
    }
}

struct SelectAllChecker<'a> {
    scope:  Scope<'a>,
    advice: Vec<Advice>
}

impl Visitor for SelectAllChecker<'_> {
    fn visit(&mut self, node: &SyntaxNode) -> Walk {
        if let NodeKind::Select {
            wildcard: true, ..
        } = node.kind()
        {
            self.advice.push(self.scope.advice(
                Code::StatementSelectAll,
                format!("\"{}\" uses SELECT all", self.scope.statement.text()),
                node.line()
            ));
        }
        Walk::Descend
    }
}

impl Checker for SelectAllChecker<'_> {
    fn into_advice(self) -> Vec<Advice> {
        self.advice
    }
}

/// LIKE patterns must not start with `%`
///
/// A leading wildcard defeats index range scans. Reported once per statement.
pub struct NoLeadingWildcardLike;

impl Advisor for NoLeadingWildcardLike {
    fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError> {
        walk_statements(ctx, |scope| LeadingWildcardChecker {
            scope,
            found: None
        })
    }
}

struct LeadingWildcardChecker<'a> {
    scope: Scope<'a>,
    found: Option<usize>
}

impl Visitor for LeadingWildcardChecker<'_> {
    fn visit(&mut self, node: &SyntaxNode) -> Walk {
        if self.found.is_some() {
            return Walk::Skip;
        }
        if let NodeKind::Like {
            pattern: Some(pattern)
        } = node.kind()
            && pattern.starts_with('%')
        {
            self.found = Some(node.line());
        }
        Walk::Descend
    }
}

impl Checker for LeadingWildcardChecker<'_> {
    fn into_advice(self) -> Vec<Advice> {
        match self.found {
            Some(line) => vec![self.scope.advice(
                Code::StatementLeadingWildcardLike,
                format!(
                    "\"{}\" uses leading wildcard LIKE",
                    self.scope.statement.text()
                ),
                line
            )],
            None => Vec::new()
        }
    }
}

/// COMMIT is not allowed in a reviewed change
///
/// The change runner owns transaction boundaries.
pub struct DisallowCommit;

impl Advisor for DisallowCommit {
    fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError> {
        walk_statements(ctx, |scope| CommitChecker {
            scope,
            advice: Vec::new()
        })
    }
}

struct CommitChecker<'a> {
    scope:  Scope<'a>,
    advice: Vec<Advice>
}

impl Visitor for CommitChecker<'_> {
    fn visit(&mut self, node: &SyntaxNode) -> Walk {
        if node.kind().statement_kind() == Some(StatementKind::Commit) {
            self.advice.push(self.scope.advice(
                Code::StatementDisallowCommit,
                format!(
                    "Commit is not allowed, related statement: \"{}\"",
                    self.scope.statement.text()
                ),
                node.line()
            ));
        }
        Walk::Skip
    }
}

impl Checker for CommitChecker<'_> {
    fn into_advice(self) -> Vec<Advice> {
        self.advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        advisor::{RuleConfig, RuleLevel, RuleType, Status},
        parser::{Engine, parse}
    };

    fn run(advisor: &dyn Advisor, engine: Engine, rule: RuleType, sql: &str) -> Vec<Advice> {
        let statements = parse(engine, sql).unwrap();
        let config = RuleConfig::new(rule, RuleLevel::Warning);
        advisor
            .check(&Context::new(engine, &statements, &config))
            .unwrap()
    }

    #[test]
    fn test_insert_with_columns_is_clean() {
        let advice = run(
            &InsertMustSpecifyColumn,
            Engine::MySql,
            RuleType::StatementInsertMustSpecifyColumn,
            "INSERT INTO t (a, b) VALUES (1, 2);"
        );
        assert!(advice.is_empty());
    }

    #[test]
    fn test_insert_select_without_columns() {
        let advice = run(
            &InsertMustSpecifyColumn,
            Engine::Postgres,
            RuleType::StatementInsertMustSpecifyColumn,
            "INSERT INTO t\nSELECT * FROM s;"
        );
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].line, 2);
        assert_eq!(advice[0].status, Status::Warning);
    }

    #[test]
    fn test_where_required_for_update_and_delete() {
        let advice = run(
            &WhereRequire,
            Engine::MySql,
            RuleType::StatementRequireWhere,
            "UPDATE t SET a = 1;\nDELETE FROM t WHERE id = 1;\nDELETE FROM t;"
        );
        assert_eq!(advice.len(), 2);
        assert_eq!(advice[0].line, 1);
        assert_eq!(advice[1].line, 3);
        assert_eq!(advice[1].content, "\"DELETE FROM t;\" requires WHERE clause");
    }

    #[test]
    fn test_select_all_in_subquery() {
        let advice = run(
            &NoSelectAll,
            Engine::Postgres,
            RuleType::StatementNoSelectAll,
            "SELECT a FROM (SELECT * FROM t) AS s;"
        );
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].code, Code::StatementSelectAll);
    }

    #[test]
    fn test_leading_wildcard_reported_once_per_statement() {
        let advice = run(
            &NoLeadingWildcardLike,
            Engine::MySql,
            RuleType::StatementNoLeadingWildcardLike,
            "SELECT a FROM t WHERE a LIKE '%x' OR b LIKE '%y';\nSELECT a FROM t WHERE a LIKE 'x%';"
        );
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].line, 1);
    }

    #[test]
    fn test_commit_is_reported() {
        let advice = run(
            &DisallowCommit,
            Engine::MySql,
            RuleType::StatementDisallowCommit,
            "INSERT INTO t (a) VALUES (1);\nCOMMIT;"
        );
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].line, 2);
        assert_eq!(advice[0].code, Code::StatementDisallowCommit);
    }
}
