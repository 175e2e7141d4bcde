//! Lowering of `sqlparser` statements into [`SyntaxNode`] trees.
//!
//! Query structure (WITH, set operations, SELECT, FROM and joins) is lowered
//! by explicit descent so that CTE scoping and join nesting are exact. Every
//! other clause is handed to [`Collector`], a `sqlparser` visitor that picks
//! up the outermost table references, subqueries and LIKE predicates it
//! finds. Children always appear in source order.

use std::{fmt, ops::ControlFlow};

use compact_str::CompactString;
use sqlparser::{
    ast::{
        self as sql, ColumnDef, ColumnOption, Expr, ObjectName, ObjectNamePart, SelectItem, SetExpr,
        Spanned, Statement, TableConstraint, TableFactor, TableObject, TableWithJoins, Value, Visit,
        Visitor
    },
    tokenizer::Span
};

use super::{source::Source, split::RawStatement};
use crate::ast::{NodeKind, StatementKind, SyntaxNode, TableName, TableRef};

/// Fallback position for nodes whose span sqlparser does not track.
#[derive(Debug, Clone, Copy)]
struct At {
    line:   usize,
    column: usize
}

pub(super) struct Lowering<'s, 'a> {
    source: &'s Source<'a>
}

impl<'s, 'a> Lowering<'s, 'a> {
    pub(super) fn new(source: &'s Source<'a>) -> Self {
        Self {
            source
        }
    }

    /// Lower a top-level statement parsed from `raw`.
    pub(super) fn statement(&self, stmt: &Statement, raw: &RawStatement) -> SyntaxNode {
        let at = At {
            line:   raw.first_line,
            column: raw.column
        };
        let (kind, children) = self.statement_parts(stmt, at);
        SyntaxNode::new(kind, raw.first_line, raw.column, raw.text.clone()).with_children(children)
    }

    /// Opaque root for a routine definition whose body the grammar rejects.
    pub(super) fn routine(&self, raw: &RawStatement) -> SyntaxNode {
        SyntaxNode::new(
            NodeKind::Statement(StatementKind::CreateRoutine),
            raw.first_line,
            raw.column,
            raw.text.clone()
        )
    }

    /// Lower a statement nested in another one, such as EXPLAIN targets.
    fn nested_statement(&self, stmt: &Statement, at: At) -> SyntaxNode {
        let at = self.position(stmt.span(), at);
        let (kind, children) = self.statement_parts(stmt, at);
        SyntaxNode::new(kind, at.line, at.column, self.text(stmt.span(), stmt)).with_children(children)
    }

    fn statement_parts(&self, stmt: &Statement, at: At) -> (NodeKind, Vec<SyntaxNode>) {
        match stmt {
            Statement::Query(query) => (
                NodeKind::Statement(StatementKind::Select),
                vec![self.query(query, &[], at)]
            ),
            Statement::Insert(insert) => {
                let table = match &insert.table {
                    TableObject::TableName(name) => table_name(name),
                    other => TableName::new([other.to_string()])
                };
                let mut children = vec![self.table_ref(table.clone(), at)];
                if let Some(source) = &insert.source {
                    children.push(self.query(source, &[], at));
                }
                // MySQL `INSERT ... SET col = value` names its columns too
                let columns = if insert.columns.is_empty() {
                    insert
                        .assignments
                        .iter()
                        .map(|a| CompactString::from(a.target.to_string()))
                        .collect()
                } else {
                    insert
                        .columns
                        .iter()
                        .map(|c| CompactString::from(c.to_string()))
                        .collect()
                };
                let kind = NodeKind::Insert {
                    table,
                    columns,
                    replace: insert.replace_into
                };
                (kind, children)
            }
            Statement::Update(update) => (
                NodeKind::Update {
                    filtered: update.selection.is_some()
                },
                self.collect(stmt, &[], at)
            ),
            Statement::Delete(delete) => (
                NodeKind::Delete {
                    filtered: delete.selection.is_some()
                },
                self.collect(stmt, &[], at)
            ),
            Statement::CreateTable(create) => {
                let table = table_name(&create.name);
                let mut children = vec![self.table_ref(table.clone(), at)];
                if let Some(query) = &create.query {
                    children.push(self.query(query, &[], at));
                }
                let primary_key = create.columns.iter().any(declares_primary_key)
                    || create
                        .constraints
                        .iter()
                        .any(|c| matches!(c, TableConstraint::PrimaryKey(_)));
                let kind = NodeKind::CreateTable {
                    table,
                    primary_key,
                    from_query: create.query.is_some()
                };
                (kind, children)
            }
            Statement::Explain {
                statement, ..
            } => (
                NodeKind::Statement(StatementKind::Explain),
                vec![self.nested_statement(statement, at)]
            ),
            other => (NodeKind::Statement(classify(other)), self.collect(other, &[], at))
        }
    }

    fn query(&self, query: &sql::Query, outer: &[CompactString], at: At) -> SyntaxNode {
        let at = self.position(query.span(), at);
        let mut scope = outer.to_vec();
        let mut children = Vec::new();
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                let name = CompactString::from(cte.alias.name.value.as_str());
                if with.recursive {
                    scope.push(name.clone());
                }
                children.push(self.query(&cte.query, &scope, at));
                if !with.recursive {
                    scope.push(name);
                }
            }
        }
        self.set_expr(&query.body, &scope, at, &mut children);
        children.extend(self.collect(&query.order_by, &scope, at));
        children.extend(self.collect(&query.limit_clause, &scope, at));
        self.node(NodeKind::Query, query.span(), query, at, children)
    }

    fn set_expr(&self, body: &SetExpr, scope: &[CompactString], at: At, out: &mut Vec<SyntaxNode>) {
        match body {
            SetExpr::Select(select) => out.push(self.select(select, scope, at)),
            SetExpr::Query(query) => out.push(self.query(query, scope, at)),
            SetExpr::SetOperation {
                left,
                right,
                ..
            } => {
                self.set_expr(left, scope, at, out);
                self.set_expr(right, scope, at, out);
            }
            SetExpr::Insert(stmt) | SetExpr::Update(stmt) | SetExpr::Delete(stmt) => {
                out.push(self.nested_statement(stmt, at));
            }
            other => out.extend(self.collect(other, scope, at))
        }
    }

    fn select(&self, select: &sql::Select, scope: &[CompactString], at: At) -> SyntaxNode {
        let at = self.position(select.span(), at);
        let mut children = self.collect(&select.projection, scope, at);
        for from in &select.from {
            self.table_with_joins(from, scope, at, &mut children);
        }
        children.extend(self.collect(&select.selection, scope, at));
        children.extend(self.collect(&select.group_by, scope, at));
        children.extend(self.collect(&select.having, scope, at));
        let kind = NodeKind::Select {
            wildcard: select.projection.iter().any(|item| {
                matches!(
                    item,
                    SelectItem::Wildcard(..) | SelectItem::QualifiedWildcard(..)
                )
            }),
            filtered: select.selection.is_some(),
            into:     select.into.is_some()
        };
        self.node(kind, select.span(), select, at, children)
    }

    fn table_with_joins(
        &self,
        twj: &TableWithJoins,
        scope: &[CompactString],
        at: At,
        out: &mut Vec<SyntaxNode>
    ) {
        out.extend(self.table_factor(&twj.relation, scope, at));
        for join in &twj.joins {
            let mut children = self.table_factor(&join.relation, scope, at);
            children.extend(self.collect(&join.join_operator, scope, at));
            out.push(self.node(NodeKind::Join, join.relation.span(), join, at, children));
        }
    }

    fn table_factor(&self, factor: &TableFactor, scope: &[CompactString], at: At) -> Vec<SyntaxNode> {
        match factor {
            TableFactor::Table {
                args: Some(args), ..
            } => self.collect(args, scope, at),
            TableFactor::Table {
                name,
                alias,
                ..
            } => {
                let alias = alias
                    .as_ref()
                    .map(|a| CompactString::from(a.name.value.as_str()));
                vec![self.relation(name, alias, scope, at)]
            }
            TableFactor::Derived {
                subquery, ..
            } => vec![self.subquery(subquery, scope, at)],
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => {
                let mut out = Vec::new();
                self.table_with_joins(table_with_joins, scope, at, &mut out);
                out
            }
            other => self.collect(other, scope, at)
        }
    }

    fn subquery(&self, query: &sql::Query, scope: &[CompactString], at: At) -> SyntaxNode {
        let inner = self.query(query, scope, at);
        SyntaxNode::new(
            NodeKind::Subquery,
            inner.line(),
            inner.column(),
            inner.text().to_string()
        )
        .with_children(vec![inner])
    }

    fn relation(
        &self,
        name: &ObjectName,
        alias: Option<CompactString>,
        scope: &[CompactString],
        at: At
    ) -> SyntaxNode {
        let at = self.position(name.span(), at);
        let table = table_name(name);
        let text = self.text(name.span(), name);
        if !table.is_qualified()
            && scope
                .iter()
                .any(|cte| cte.eq_ignore_ascii_case(table.table()))
        {
            let cte = CompactString::from(table.table());
            return SyntaxNode::new(NodeKind::CteRef(cte), at.line, at.column, text);
        }
        SyntaxNode::new(
            NodeKind::Table(TableRef {
                name: table,
                alias
            }),
            at.line,
            at.column,
            text
        )
    }

    /// Target table of a DML or DDL root.
    fn table_ref(&self, name: TableName, at: At) -> SyntaxNode {
        let text = name.to_string();
        SyntaxNode::new(
            NodeKind::Table(TableRef {
                name,
                alias: None
            }),
            at.line,
            at.column,
            text
        )
    }

    fn like(&self, expr: &Expr, pattern: &Expr, at: At) -> SyntaxNode {
        let at = self.position(expr.span(), at);
        let pattern = match pattern {
            Expr::Value(v) => match &v.value {
                Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => {
                    Some(CompactString::from(s.as_str()))
                }
                _ => None
            },
            _ => None
        };
        SyntaxNode::new(
            NodeKind::Like {
                pattern
            },
            at.line,
            at.column,
            self.text(expr.span(), expr)
        )
    }

    /// Outermost tables, subqueries and LIKE predicates under `node`.
    fn collect<T: Visit>(&self, node: &T, scope: &[CompactString], at: At) -> Vec<SyntaxNode> {
        let mut collector = Collector {
            lowering: self,
            scope,
            at,
            depth: 0,
            function: false,
            nodes: Vec::new()
        };
        let _ = node.visit(&mut collector);
        collector.nodes
    }

    fn node(
        &self,
        kind: NodeKind,
        span: Span,
        display: &dyn fmt::Display,
        at: At,
        children: Vec<SyntaxNode>
    ) -> SyntaxNode {
        let at = self.position(span, at);
        SyntaxNode::new(kind, at.line, at.column, self.text(span, display)).with_children(children)
    }

    fn position(&self, span: Span, fallback: At) -> At {
        if span.start.line == 0 {
            return fallback;
        }
        At {
            line:   usize::try_from(span.start.line).unwrap_or(fallback.line),
            column: usize::try_from(span.start.column).unwrap_or(fallback.column)
        }
    }

    fn text(&self, span: Span, display: &dyn fmt::Display) -> String {
        match self.source.slice(span) {
            Some(text) => text.to_string(),
            None => display.to_string()
        }
    }
}

/// Picks up constructs sqlparser's visitor reaches that explicit descent
/// does not model, stopping at the first query boundary.
struct Collector<'l, 's, 'a, 'c> {
    lowering: &'l Lowering<'s, 'a>,
    scope:    &'c [CompactString],
    at:       At,
    depth:    usize,
    /// Next relation names a table-valued function
    function: bool,
    nodes:    Vec<SyntaxNode>
}

impl Visitor for Collector<'_, '_, '_, '_> {
    type Break = ();

    fn pre_visit_query(&mut self, query: &sql::Query) -> ControlFlow<Self::Break> {
        if self.depth == 0 {
            let node = self.lowering.subquery(query, self.scope, self.at);
            self.nodes.push(node);
        }
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &sql::Query) -> ControlFlow<Self::Break> {
        self.depth = self.depth.saturating_sub(1);
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<Self::Break> {
        self.function = matches!(
            factor,
            TableFactor::Table {
                args: Some(_), ..
            }
        );
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        if std::mem::take(&mut self.function) {
            return ControlFlow::Continue(());
        }
        if self.depth == 0 {
            let node = self.lowering.relation(relation, None, self.scope, self.at);
            self.nodes.push(node);
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if self.depth == 0
            && let Expr::Like {
                pattern, ..
            }
            | Expr::ILike {
                pattern, ..
            } = expr
        {
            let node = self.lowering.like(expr, pattern, self.at);
            self.nodes.push(node);
        }
        ControlFlow::Continue(())
    }
}

/// Unquoted name parts, outermost qualifier first.
pub(super) fn table_name(name: &ObjectName) -> TableName {
    TableName::new(name.0.iter().map(|part| match part {
        ObjectNamePart::Identifier(ident) => CompactString::from(ident.value.as_str()),
        other => CompactString::from(other.to_string())
    }))
}

fn declares_primary_key(column: &ColumnDef) -> bool {
    column
        .options
        .iter()
        .any(|o| matches!(o.option, ColumnOption::PrimaryKey(_)))
}

/// Statement kind for roots without structural payload.
fn classify(stmt: &Statement) -> StatementKind {
    match stmt {
        Statement::Query(_) => StatementKind::Select,
        Statement::Insert(insert) if insert.replace_into => StatementKind::Replace,
        Statement::Insert(_) => StatementKind::Insert,
        Statement::Update {
            ..
        } => StatementKind::Update,
        Statement::Delete(_) => StatementKind::Delete,
        Statement::Merge {
            ..
        } => StatementKind::Merge,
        Statement::CreateTable(_) => StatementKind::CreateTable,
        Statement::CreateIndex(_) => StatementKind::CreateIndex,
        Statement::CreateView {
            ..
        } => StatementKind::CreateView,
        Statement::CreateDatabase {
            ..
        }
        | Statement::CreateSchema {
            ..
        } => StatementKind::CreateDatabase,
        Statement::CreateFunction {
            ..
        }
        | Statement::CreateProcedure {
            ..
        }
        | Statement::CreateTrigger {
            ..
        } => StatementKind::CreateRoutine,
        Statement::AlterTable {
            ..
        }
        | Statement::AlterIndex {
            ..
        } => StatementKind::AlterTable,
        Statement::Drop {
            ..
        }
        | Statement::DropFunction {
            ..
        }
        | Statement::DropProcedure {
            ..
        }
        | Statement::DropTrigger {
            ..
        } => StatementKind::Drop,
        Statement::Truncate {
            ..
        } => StatementKind::Truncate,
        Statement::RenameTable {
            ..
        } => StatementKind::Rename,
        Statement::Explain {
            ..
        } => StatementKind::Explain,
        Statement::ExplainTable {
            ..
        } => StatementKind::Describe,
        Statement::ShowTables {
            ..
        }
        | Statement::ShowColumns {
            ..
        }
        | Statement::ShowVariables {
            ..
        }
        | Statement::ShowCreate {
            ..
        }
        | Statement::ShowDatabases {
            ..
        }
        | Statement::ShowSchemas {
            ..
        }
        | Statement::ShowViews {
            ..
        }
        | Statement::ShowFunctions {
            ..
        }
        | Statement::ShowVariable {
            ..
        }
        | Statement::ShowStatus {
            ..
        }
        | Statement::ShowCollation {
            ..
        }
        | Statement::ShowCharset(_)
        | Statement::ShowObjects(_) => StatementKind::Show,
        Statement::Set {
            ..
        } => StatementKind::Set,
        Statement::Use {
            ..
        } => StatementKind::Use,
        Statement::StartTransaction {
            ..
        } => StatementKind::Begin,
        Statement::Commit {
            ..
        } => StatementKind::Commit,
        Statement::Rollback {
            ..
        } => StatementKind::Rollback,
        Statement::Call {
            ..
        } => StatementKind::Call,
        Statement::Grant {
            ..
        } => StatementKind::Grant,
        Statement::Revoke {
            ..
        } => StatementKind::Revoke,
        _ => StatementKind::Other
    }
}
