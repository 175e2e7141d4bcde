use super::SyntaxNode;

/// What the traversal does after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Visit the node's children with the same visitor
    Descend,
    /// Do not visit the node's children
    Skip
}

/// Per-node callback of a pre-order traversal.
///
/// Implementors own whatever they accumulate; the tree is never mutated.
/// Any `FnMut(&SyntaxNode) -> Walk` closure is a visitor.
pub trait Visitor {
    fn visit(&mut self, node: &SyntaxNode) -> Walk;
}

impl<F> Visitor for F
where
    F: FnMut(&SyntaxNode) -> Walk
{
    fn visit(&mut self, node: &SyntaxNode) -> Walk {
        self(node)
    }
}

/// Walk `node` and its descendants in pre-order.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, node: &SyntaxNode) {
    if visitor.visit(node) == Walk::Skip {
        return;
    }
    for child in node.children() {
        walk(visitor, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, StatementKind};

    fn node(kind: NodeKind, children: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::new(kind, 1, 1, String::new()).with_children(children)
    }

    fn sample() -> SyntaxNode {
        node(
            NodeKind::Statement(StatementKind::Select),
            vec![
                node(NodeKind::Query, vec![node(NodeKind::Subquery, vec![node(
                    NodeKind::Query,
                    vec![]
                )])]),
                node(NodeKind::Join, vec![]),
            ]
        )
    }

    #[test]
    fn test_walk_is_pre_order() {
        let mut seen = Vec::new();
        walk(
            &mut |n: &SyntaxNode| {
                seen.push(format!("{:?}", n.kind()));
                Walk::Descend
            },
            &sample()
        );
        assert_eq!(seen, [
            "Statement(Select)",
            "Query",
            "Subquery",
            "Query",
            "Join"
        ]);
    }

    #[test]
    fn test_skip_prunes_children_only() {
        let mut seen = 0;
        walk(
            &mut |n: &SyntaxNode| {
                seen += 1;
                if matches!(n.kind(), NodeKind::Subquery) {
                    Walk::Skip
                } else {
                    Walk::Descend
                }
            },
            &sample()
        );
        assert_eq!(seen, 4);
    }
}
