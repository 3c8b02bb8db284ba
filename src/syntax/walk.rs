//! Depth-first CST traversal.

use super::SyntaxNode;

/// Enter/exit callbacks for a depth-first walk. Both default to no-ops so
/// visitors only implement the sides they care about.
pub trait Visitor {
    fn enter_node(&mut self, _node: &SyntaxNode) {}
    fn exit_node(&mut self, _node: &SyntaxNode) {}
}

/// Walk the tree depth-first, calling `enter_node` before a node's children
/// and `exit_node` after them. Fully synchronous; per-file analysis is a
/// single uninterrupted walk.
pub fn walk<V: Visitor>(visitor: &mut V, node: &SyntaxNode) {
    visitor.enter_node(node);
    for child in node.children() {
        walk(visitor, child);
    }
    visitor.exit_node(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{GrammarRule, Token};

    struct Recorder {
        events: Vec<(bool, GrammarRule)>,
    }

    impl Visitor for Recorder {
        fn enter_node(&mut self, node: &SyntaxNode) {
            self.events.push((true, node.rule()));
        }
        fn exit_node(&mut self, node: &SyntaxNode) {
            self.events.push((false, node.rule()));
        }
    }

    #[test]
    fn walk_is_depth_first_and_symmetric() {
        let leaf = SyntaxNode::leaf(GrammarRule::Identifier, Token::new("x", 1, 0));
        let tree = SyntaxNode::new(
            GrammarRule::CompilationUnit,
            vec![SyntaxNode::new(GrammarRule::ClassDeclaration, vec![leaf])],
        );

        let mut recorder = Recorder { events: Vec::new() };
        walk(&mut recorder, &tree);

        assert_eq!(
            recorder.events,
            vec![
                (true, GrammarRule::CompilationUnit),
                (true, GrammarRule::ClassDeclaration),
                (true, GrammarRule::Identifier),
                (false, GrammarRule::Identifier),
                (false, GrammarRule::ClassDeclaration),
                (false, GrammarRule::CompilationUnit),
            ]
        );
    }
}
