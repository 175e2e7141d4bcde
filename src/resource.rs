//! Schema resources referenced by SQL text.
//!
//! Every table a statement reads or writes is resolved to a
//! [`SchemaResource`]: the owning database, the PostgreSQL schema if one was
//! written, and the table. Common table expressions and aliases are local
//! bindings and never resources.

use std::fmt;

use compact_str::CompactString;
use indexmap::IndexSet;
use serde::Serialize;

use crate::{
    ast::{NodeKind, SyntaxNode, TableName, Walk, walk},
    error::ReviewError,
    parser::{Engine, StatementTree, parse}
};

/// A table in a database, optionally in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SchemaResource {
    pub database: CompactString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema:   Option<CompactString>,
    pub table:    CompactString
}

impl SchemaResource {
    pub fn new(database: impl Into<CompactString>, table: impl Into<CompactString>) -> Self {
        Self {
            database: database.into(),
            schema:   None,
            table:    table.into()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<CompactString>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    fn resolve(engine: Engine, default_database: &str, name: &TableName) -> Self {
        let table = name.table();
        match (engine, name.qualifiers()) {
            (_, []) => Self::new(default_database, table),
            (Engine::MySql, [.., database]) => Self::new(database.clone(), table),
            (Engine::Postgres, [schema]) => Self::new(default_database, table).with_schema(schema.clone()),
            (Engine::Postgres, [.., database, schema]) => {
                Self::new(database.clone(), table).with_schema(schema.clone())
            }
        }
    }
}

impl fmt::Display for SchemaResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.database.is_empty() {
            write!(f, "{}.", self.database)?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        f.write_str(&self.table)
    }
}

/// Parse `sql` and list the tables it references.
///
/// # Example
///
/// ```
/// use sql_review::{
///     parser::Engine,
///     resource::{SchemaResource, extract_resources}
/// };
///
/// let resources = extract_resources(
///     Engine::MySql,
///     "db",
///     "SELECT * FROM db1.t1 JOIN db2.t2 ON t1.c1 = t2.c1"
/// )
/// .unwrap();
///
/// assert_eq!(resources, [
///     SchemaResource::new("db1", "t1"),
///     SchemaResource::new("db2", "t2")
/// ]);
/// ```
///
/// # Errors
///
/// Fails only when `sql` does not parse.
pub fn extract_resources(
    engine: Engine,
    default_database: &str,
    sql: &str
) -> Result<Vec<SchemaResource>, ReviewError> {
    let trees = parse(engine, sql)?;
    Ok(resources_from_trees(default_database, &trees))
}

/// Tables referenced by already parsed statements, deduplicated in
/// first-occurrence order.
pub fn resources_from_trees(default_database: &str, trees: &[StatementTree]) -> Vec<SchemaResource> {
    let mut resources = IndexSet::new();
    for tree in trees {
        let engine = tree.engine();
        walk(
            &mut |node: &SyntaxNode| {
                if let NodeKind::Table(table) = node.kind() {
                    resources.insert(SchemaResource::resolve(
                        engine,
                        default_database,
                        &table.name
                    ));
                }
                Walk::Descend
            },
            tree.root()
        );
    }
    resources.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_schema_qualification() {
        let name = TableName::new(["public", "t1"]);
        assert_eq!(
            SchemaResource::resolve(Engine::Postgres, "app", &name),
            SchemaResource::new("app", "t1").with_schema("public")
        );

        let name = TableName::new(["db", "public", "t1"]);
        assert_eq!(
            SchemaResource::resolve(Engine::Postgres, "app", &name),
            SchemaResource::new("db", "t1").with_schema("public")
        );
    }

    #[test]
    fn test_mysql_database_qualification() {
        let name = TableName::new(["db1", "t1"]);
        assert_eq!(
            SchemaResource::resolve(Engine::MySql, "db", &name),
            SchemaResource::new("db1", "t1")
        );
        assert_eq!(
            SchemaResource::resolve(Engine::MySql, "db", &TableName::new(["t1"])),
            SchemaResource::new("db", "t1")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(SchemaResource::new("db", "t").to_string(), "db.t");
        assert_eq!(
            SchemaResource::new("db", "t").with_schema("s").to_string(),
            "db.s.t"
        );
        assert_eq!(SchemaResource::new("", "t").to_string(), "t");
    }
}
