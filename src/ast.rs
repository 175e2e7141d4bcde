//! Dialect-agnostic syntax tree.
//!
//! The parser lowers every `sqlparser` statement into a [`SyntaxNode`] tree
//! that keeps only what the advisors, the resource extractor and the
//! validator need: a closed set of node kinds, children in source order, and
//! line/column/text provenance. Trees are immutable once built and are
//! consumed through the visitor contract in [`walk`].
//!
//! # Example
//!
//! ```
//! use sql_review::{
//!     ast::{NodeKind, Walk, walk},
//!     parser::{Engine, parse}
//! };
//!
//! let trees = parse(Engine::MySql, "SELECT * FROM t1 JOIN t2 ON t1.a = t2.a;").unwrap();
//! let mut tables = Vec::new();
//! walk(&mut |node: &sql_review::ast::SyntaxNode| {
//!     if let NodeKind::Table(table) = node.kind() {
//!         tables.push(table.name.table().to_string());
//!     }
//!     Walk::Descend
//! }, trees[0].root());
//!
//! assert_eq!(tables, ["t1", "t2"]);
//! ```

mod kind;
mod walk;

pub use kind::{NodeKind, StatementKind, TableName, TableRef};
pub use walk::{Visitor, Walk, walk};

/// One lowered construct of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind:     NodeKind,
    line:     usize,
    column:   usize,
    text:     String,
    children: Vec<SyntaxNode>
}

impl SyntaxNode {
    pub(crate) fn new(kind: NodeKind, line: usize, column: usize, text: String) -> Self {
        Self {
            kind,
            line,
            column,
            text,
            children: Vec::new()
        }
    }

    pub(crate) fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// 1-based line where the construct starts in the original input.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column where the construct starts in the original input.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Source text of the construct.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }
}
