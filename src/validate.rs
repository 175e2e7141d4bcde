//! Read-only statement validation.
//!
//! Used before running user SQL against a replica or a query console: only
//! statements that cannot change data or session state pass.

use tracing::debug;

use crate::{
    ast::{NodeKind, StatementKind, SyntaxNode, Walk, walk},
    error::ReviewError,
    parser::StatementTree
};

/// Accept `trees` only if every statement is read-only.
///
/// Allowed are SELECT (with set operations and WITH), SHOW, DESCRIBE, and
/// EXPLAIN of an allowed statement. SELECT ... INTO and data-modifying
/// statements nested in a query are rejected.
///
/// # Example
///
/// ```
/// use sql_review::{
///     parser::{Engine, parse},
///     validate::validate_read_only
/// };
///
/// let ok = parse(Engine::MySql, "SELECT * FROM t1; EXPLAIN SELECT * FROM t2;").unwrap();
/// assert!(validate_read_only(&ok).is_ok());
///
/// let bad = parse(Engine::MySql, "SELECT 1;\nUPDATE t1 SET c1 = 1;").unwrap();
/// assert!(validate_read_only(&bad).is_err());
/// ```
///
/// # Errors
///
/// Returns [`ReviewError::Disallowed`] for the first offending statement.
pub fn validate_read_only(trees: &[StatementTree]) -> Result<(), ReviewError> {
    for tree in trees {
        if let Some(kind) = disallowed(tree.root()) {
            debug!(kind = %kind, line = tree.first_line(), "statement rejected");
            return Err(ReviewError::Disallowed {
                kind,
                line: tree.first_line()
            });
        }
    }
    Ok(())
}

/// Kind of the first construct that makes `root` unsafe to run read-only.
fn disallowed(root: &SyntaxNode) -> Option<StatementKind> {
    match root.kind().statement_kind() {
        Some(StatementKind::Explain) => root.children().iter().find_map(disallowed),
        Some(kind) if kind.is_read_only() => nested_write(root),
        Some(kind) => Some(kind),
        None => Some(StatementKind::Other)
    }
}

fn nested_write(root: &SyntaxNode) -> Option<StatementKind> {
    let mut found = None;
    for child in root.children() {
        walk(
            &mut |node: &SyntaxNode| {
                if found.is_some() {
                    return Walk::Skip;
                }
                match node.kind() {
                    NodeKind::Select {
                        into: true, ..
                    } => found = Some(StatementKind::Select),
                    kind => {
                        found = kind.statement_kind().filter(|k| !k.is_read_only());
                    }
                }
                Walk::Descend
            },
            child
        );
    }
    found
}
