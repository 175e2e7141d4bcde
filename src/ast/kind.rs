use std::fmt;

use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;

/// Classification of a statement root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    Select,
    Insert,
    Replace,
    Update,
    Delete,
    Merge,
    CreateTable,
    CreateIndex,
    CreateView,
    CreateDatabase,
    CreateRoutine,
    AlterTable,
    Drop,
    Truncate,
    Rename,
    Explain,
    Describe,
    Show,
    Set,
    Use,
    Begin,
    Commit,
    Rollback,
    Call,
    Grant,
    Revoke,
    Other
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Replace => "REPLACE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::CreateTable => "CREATE TABLE",
            Self::CreateIndex => "CREATE INDEX",
            Self::CreateView => "CREATE VIEW",
            Self::CreateDatabase => "CREATE DATABASE",
            Self::CreateRoutine => "CREATE ROUTINE",
            Self::AlterTable => "ALTER TABLE",
            Self::Drop => "DROP",
            Self::Truncate => "TRUNCATE",
            Self::Rename => "RENAME",
            Self::Explain => "EXPLAIN",
            Self::Describe => "DESCRIBE",
            Self::Show => "SHOW",
            Self::Set => "SET",
            Self::Use => "USE",
            Self::Begin => "BEGIN",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Call => "CALL",
            Self::Grant => "GRANT",
            Self::Revoke => "REVOKE",
            Self::Other => "OTHER"
        }
    }

    /// Statements that only read data and never change state.
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::Select | Self::Show | Self::Describe)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Possibly qualified object name, unquoted, outermost qualifier first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    parts: SmallVec<[CompactString; 3]>
}

impl TableName {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect()
        }
    }

    /// Unqualified object name.
    pub fn table(&self) -> &str {
        self.parts.last().map(CompactString::as_str).unwrap_or_default()
    }

    /// Qualifiers before the object name, outermost first.
    pub fn qualifiers(&self) -> &[CompactString] {
        match self.parts.len() {
            0 => &[],
            n => &self.parts[..n - 1]
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.parts.len() > 1
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// Table reference as written in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name:  TableName,
    /// Local binding only; never part of the table's identity
    pub alias: Option<CompactString>
}

/// Closed set of node kinds produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Statement root without structural payload
    Statement(StatementKind),
    /// INSERT or REPLACE root
    Insert {
        table:   TableName,
        columns: Vec<CompactString>,
        replace: bool
    },
    /// UPDATE root
    Update { filtered: bool },
    /// DELETE root
    Delete { filtered: bool },
    /// CREATE TABLE root
    CreateTable {
        table:       TableName,
        primary_key: bool,
        from_query:  bool
    },
    /// Query expression, top-level or nested
    Query,
    /// One SELECT block of a query
    Select {
        wildcard: bool,
        filtered: bool,
        into:     bool
    },
    /// Joined operand together with its constraint
    Join,
    /// Reference to a stored table or view
    Table(TableRef),
    /// Reference to a common table expression in scope
    CteRef(CompactString),
    /// Query in expression or derived-table position
    Subquery,
    /// LIKE / ILIKE predicate
    Like { pattern: Option<CompactString> }
}

impl NodeKind {
    /// Kind of statement this node roots, if it is a statement node.
    pub fn statement_kind(&self) -> Option<StatementKind> {
        match self {
            Self::Statement(kind) => Some(*kind),
            Self::Insert {
                replace, ..
            } => Some(if *replace {
                StatementKind::Replace
            } else {
                StatementKind::Insert
            }),
            Self::Update {
                ..
            } => Some(StatementKind::Update),
            Self::Delete {
                ..
            } => Some(StatementKind::Delete),
            Self::CreateTable {
                ..
            } => Some(StatementKind::CreateTable),
            _ => None
        }
    }
}
