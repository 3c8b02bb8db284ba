//! Declaration-boundary tracking during a tree walk.
//!
//! The gatherer and the checker both walk the CST depth-first and need to
//! know which type/method declaration they are currently inside. The tracker
//! is a plain stack machine: `check_enter_scope` before visiting a node's
//! children, `check_exit_scope` after. A node that is not a declaration
//! boundary simply returns `None` — that is the normal case, not an error.

use smol_str::SmolStr;

use crate::base::Bounds;
use crate::syntax::{GrammarRule, SyntaxNode};

/// What kind of declaration opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Class,
    Interface,
    Enum,
    Record,
    AnnotationType,
    Method,
    GenericMethod,
    InterfaceMethod,
    GenericInterfaceMethod,
    Constructor,
    GenericConstructor,
}

impl ScopeKind {
    /// Class-like scopes declare a type.
    pub fn is_class_kind(self) -> bool {
        matches!(
            self,
            ScopeKind::Class
                | ScopeKind::Interface
                | ScopeKind::Enum
                | ScopeKind::Record
                | ScopeKind::AnnotationType
        )
    }

    /// Method-like scopes declare a callable member.
    pub fn is_method_kind(self) -> bool {
        !self.is_class_kind()
    }

    fn from_rule(rule: GrammarRule) -> Option<ScopeKind> {
        match rule {
            GrammarRule::ClassDeclaration => Some(ScopeKind::Class),
            GrammarRule::InterfaceDeclaration => Some(ScopeKind::Interface),
            GrammarRule::EnumDeclaration => Some(ScopeKind::Enum),
            GrammarRule::RecordDeclaration => Some(ScopeKind::Record),
            GrammarRule::AnnotationTypeDeclaration => Some(ScopeKind::AnnotationType),
            GrammarRule::MethodDeclaration => Some(ScopeKind::Method),
            GrammarRule::GenericMethodDeclaration => Some(ScopeKind::GenericMethod),
            GrammarRule::InterfaceMethodDeclaration => Some(ScopeKind::InterfaceMethod),
            GrammarRule::GenericInterfaceMethodDeclaration => {
                Some(ScopeKind::GenericInterfaceMethod)
            }
            GrammarRule::ConstructorDeclaration => Some(ScopeKind::Constructor),
            GrammarRule::GenericConstructorDeclaration => Some(ScopeKind::GenericConstructor),
            _ => None,
        }
    }
}

/// A named declaration scope. The bounds are those of the declaration's
/// identifier, which is where definitions get recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: SmolStr,
    pub bounds: Bounds,
}

/// Stack machine recognizing declaration boundaries.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    stack: Vec<Scope>,
    // A generic wrapper opens the scope for the plain declaration it wraps;
    // the inner declaration itself must not open a second one.
    suppress_next_plain: bool,
    suppressed: Vec<Bounds>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// If `node` opens a scope, push and return it.
    pub fn check_enter_scope(&mut self, node: &SyntaxNode) -> Option<&Scope> {
        let kind = ScopeKind::from_rule(node.rule())?;

        if is_plain_callable(node.rule()) && self.suppress_next_plain {
            self.suppress_next_plain = false;
            self.suppressed.push(node.bounds());
            return None;
        }

        if is_generic_wrapper(node.rule()) {
            self.suppress_next_plain = true;
        }

        let (name, bounds) = match node.identifier() {
            Some(ident) => (ident.text(), ident.bounds()),
            None => (SmolStr::new_static("<anonymous>"), node.bounds()),
        };

        self.stack.push(Scope { kind, name, bounds });
        self.stack.last()
    }

    /// If `node` opened a scope on the way in, pop and return it.
    pub fn check_exit_scope(&mut self, node: &SyntaxNode) -> Option<Scope> {
        ScopeKind::from_rule(node.rule())?;

        if self.suppressed.last() == Some(&node.bounds()) {
            self.suppressed.pop();
            return None;
        }

        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Scope> {
        self.stack.last()
    }

    /// The scope `offset` levels above the top (`top_minus(0)` is the top).
    pub fn top_minus(&self, offset: usize) -> Option<&Scope> {
        let len = self.stack.len();
        if offset >= len {
            return None;
        }
        self.stack.get(len - 1 - offset)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.stack
    }

    /// Dotted path of the current scope stack, for diagnostics.
    pub fn current_scope_name(&self) -> String {
        self.stack
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn is_generic_wrapper(rule: GrammarRule) -> bool {
    matches!(
        rule,
        GrammarRule::GenericMethodDeclaration
            | GrammarRule::GenericInterfaceMethodDeclaration
            | GrammarRule::GenericConstructorDeclaration
    )
}

fn is_plain_callable(rule: GrammarRule) -> bool {
    matches!(
        rule,
        GrammarRule::MethodDeclaration
            | GrammarRule::InterfaceMethodDeclaration
            | GrammarRule::ConstructorDeclaration
    )
}
