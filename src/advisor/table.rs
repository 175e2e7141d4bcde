use super::{Advice, Advisor, Checker, Code, Context, Scope, walk_statements};
use crate::{
    ast::{NodeKind, SyntaxNode, Visitor, Walk},
    error::ReviewError
};

/// CREATE TABLE must declare a primary key
///
/// Tables created from a query (`CREATE TABLE ... AS SELECT`) are exempt
/// because their shape comes from the query.
pub struct RequirePrimaryKey;

impl Advisor for RequirePrimaryKey {
    fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError> {
        walk_statements(ctx, |scope| PrimaryKeyChecker {
            scope,
            advice: Vec::new()
        })
    }
}

struct PrimaryKeyChecker<'a> {
    scope:  Scope<'a>,
    advice: Vec<Advice>
}

impl Visitor for PrimaryKeyChecker<'_> {
    fn visit(&mut self, node: &SyntaxNode) -> Walk {
        if let NodeKind::CreateTable {
            table,
            primary_key: false,
            from_query: false
        } = node.kind()
        {
            self.advice.push(self.scope.advice(
                Code::TableNoPk,
                format!(
                    "Table \"{}\" requires PRIMARY KEY, related statement: \"{}\"",
                    table.table(),
                    self.scope.statement.text()
                ),
                node.line()
            ));
        }
        Walk::Skip
    }
}

impl Checker for PrimaryKeyChecker<'_> {
    fn into_advice(self) -> Vec<Advice> {
        self.advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        advisor::{RuleConfig, RuleLevel, RuleType},
        parser::{Engine, parse}
    };

    fn run(engine: Engine, sql: &str) -> Vec<Advice> {
        let statements = parse(engine, sql).unwrap();
        let config = RuleConfig::new(RuleType::TableRequirePk, RuleLevel::Error);
        RequirePrimaryKey
            .check(&Context::new(engine, &statements, &config))
            .unwrap()
    }

    #[test]
    fn test_column_and_table_level_keys_pass() {
        assert!(run(Engine::MySql, "CREATE TABLE t (id INT PRIMARY KEY, a INT);").is_empty());
        assert!(
            run(
                Engine::Postgres,
                "CREATE TABLE t (id INT, a INT, PRIMARY KEY (id));"
            )
            .is_empty()
        );
    }

    #[test]
    fn test_missing_key_is_reported() {
        let advice = run(Engine::Postgres, "CREATE TABLE t (a INT);");
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].code, Code::TableNoPk);
        assert_eq!(
            advice[0].content,
            "Table \"t\" requires PRIMARY KEY, related statement: \"CREATE TABLE t (a INT);\""
        );
    }

    #[test]
    fn test_create_table_as_select_is_exempt() {
        assert!(run(Engine::MySql, "CREATE TABLE t2 AS SELECT a FROM t1;").is_empty());
    }
}
