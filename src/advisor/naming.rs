use regex::Regex;
use serde::Deserialize;

use super::{Advice, Advisor, Checker, Code, Context, Scope, walk_statements};
use crate::{
    ast::{NodeKind, SyntaxNode, Visitor, Walk},
    error::ReviewError
};

const DEFAULT_FORMAT: &str = "^[a-z]+(_[a-z]+)*$";
const DEFAULT_MAX_LENGTH: usize = 64;

/// Options of the table naming rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct NamingPayload {
    format:     String,
    max_length: usize
}

impl Default for NamingPayload {
    fn default() -> Self {
        Self {
            format:     DEFAULT_FORMAT.to_string(),
            max_length: DEFAULT_MAX_LENGTH
        }
    }
}

/// New table names must match a pattern and a length limit
///
/// Payload: `{ "format": "<regex>", "maxLength": <n> }`. A zero `maxLength`
/// disables the length check.
pub struct NamingTableFormat;

impl Advisor for NamingTableFormat {
    fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError> {
        let payload: NamingPayload = ctx.rule.payload_as()?;
        let format = Regex::new(&payload.format).map_err(|e| ReviewError::InvalidPayload {
            rule:    ctx.rule.rule_type,
            message: e.to_string()
        })?;
        walk_statements(ctx, |scope| NamingChecker {
            scope,
            format: &format,
            pattern: &payload.format,
            max_length: payload.max_length,
            advice: Vec::new()
        })
    }
}

struct NamingChecker<'a, 'p> {
    scope:      Scope<'a>,
    format:     &'p Regex,
    pattern:    &'p str,
    max_length: usize,
    advice:     Vec<Advice>
}

impl Visitor for NamingChecker<'_, '_> {
    fn visit(&mut self, node: &SyntaxNode) -> Walk {
        let NodeKind::CreateTable {
            table, ..
        } = node.kind()
        else {
            return Walk::Skip;
        };
        let name = table.table();
        if !self.format.is_match(name) {
            self.advice.push(self.scope.advice(
                Code::NamingTableConventionMismatch,
                format!(
                    "\"{}\" mismatches table naming convention, naming format should be \"{}\"",
                    name, self.pattern
                ),
                node.line()
            ));
        }
        if self.max_length > 0 && name.chars().count() > self.max_length {
            self.advice.push(self.scope.advice(
                Code::NamingTableConventionMismatch,
                format!(
                    "\"{}\" mismatches table naming convention, its length should be within {} characters",
                    name, self.max_length
                ),
                node.line()
            ));
        }
        Walk::Skip
    }
}

impl Checker for NamingChecker<'_, '_> {
    fn into_advice(self) -> Vec<Advice> {
        self.advice
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        advisor::{RuleConfig, RuleLevel, RuleType},
        parser::{Engine, parse}
    };

    fn run(sql: &str, payload: Option<serde_json::Value>) -> Result<Vec<Advice>, ReviewError> {
        let statements = parse(Engine::MySql, sql).unwrap();
        let mut config = RuleConfig::new(RuleType::NamingTable, RuleLevel::Warning);
        config.payload = payload;
        NamingTableFormat.check(&Context::new(Engine::MySql, &statements, &config))
    }

    #[test]
    fn test_default_format_accepts_snake_case() {
        assert!(run("CREATE TABLE order_item (id INT PRIMARY KEY);", None).unwrap().is_empty());
    }

    #[test]
    fn test_format_mismatch() {
        let advice = run("CREATE TABLE OrderItem (id INT);", None).unwrap();
        assert_eq!(advice.len(), 1);
        assert_eq!(
            advice[0].content,
            "\"OrderItem\" mismatches table naming convention, naming format should be \"^[a-z]+(_[a-z]+)*$\""
        );
    }

    #[test]
    fn test_length_limit_from_payload() {
        let advice = run(
            "CREATE TABLE abcdef (id INT);",
            Some(json!({ "format": "^[a-z]+$", "maxLength": 4 }))
        )
        .unwrap();
        assert_eq!(advice.len(), 1);
        assert!(advice[0].content.contains("within 4 characters"));
    }

    #[test]
    fn test_invalid_regex_is_payload_error() {
        let err = run("CREATE TABLE t (id INT);", Some(json!({ "format": "(" }))).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidPayload { .. }));
    }
}
