//! Position-annotated CST nodes and tokens.

use smol_str::SmolStr;

use crate::base::{Bounds, FileLocation};

/// Grammar-rule identity of a CST node. Closed set: the analyzer only
/// inspects the rules below, anything else the parser produces is walked
/// through as [`GrammarRule::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarRule {
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    QualifiedName,

    ClassDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    RecordDeclaration,
    AnnotationTypeDeclaration,

    ClassBody,
    ClassBodyDeclaration,
    Modifier,

    ExtendsClause,
    ImplementsClause,
    TypeList,
    TypeType,
    TypeTypeOrVoid,

    MethodDeclaration,
    GenericMethodDeclaration,
    InterfaceMethodDeclaration,
    GenericInterfaceMethodDeclaration,
    ConstructorDeclaration,
    GenericConstructorDeclaration,

    FormalParameters,
    FormalParameterList,
    FormalParameter,
    LastFormalParameter,
    ReceiverParameter,
    Ellipsis,

    MethodBody,
    Block,
    BlockStatement,
    Statement,

    FieldDeclaration,
    LocalVariableDeclaration,
    TypedVariableDeclaration,
    UntypedVariableDeclaration,
    VariableDeclarators,
    VariableDeclarator,
    VariableDeclaratorId,

    Expression,
    Primary,
    Operator,

    Literal,
    IntegerLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
    BoolLiteral,
    NullLiteral,
    TextBlock,

    Identifier,
    Other,
}

/// A token as reported by the external lexer: 1-based line, 0-based column,
/// and the literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub line: u32,
    pub column: u32,
    pub text: SmolStr,
}

impl Token {
    pub fn new(text: impl Into<SmolStr>, line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            text: text.into(),
        }
    }

    pub fn location(&self) -> FileLocation {
        FileLocation::new(self.line, self.column)
    }

    /// Location just past the last character of the token.
    pub fn end_location(&self) -> FileLocation {
        FileLocation::new(self.line, self.column + self.text.len() as u32)
    }
}

/// A node in the concrete syntax tree.
///
/// Nodes own their children; the start/stop tokens delimit the whole
/// construct. Leaf nodes (identifiers, literals, operators) carry their text
/// in the start token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    rule: GrammarRule,
    start: Token,
    stop: Token,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// A leaf node: one token, no children.
    pub fn leaf(rule: GrammarRule, token: Token) -> Self {
        Self {
            rule,
            start: token.clone(),
            stop: token,
            children: Vec::new(),
        }
    }

    /// An interior node spanning its children. The child list must be
    /// non-empty; start/stop tokens are taken from the first and last child.
    pub fn new(rule: GrammarRule, children: Vec<SyntaxNode>) -> Self {
        debug_assert!(!children.is_empty(), "interior node needs children");
        let start = children.first().map(|c| c.start.clone()).unwrap_or(Token {
            line: 1,
            column: 0,
            text: SmolStr::default(),
        });
        let stop = children.last().map(|c| c.stop.clone()).unwrap_or_else(|| start.clone());
        Self {
            rule,
            start,
            stop,
            children,
        }
    }

    /// An interior node with explicit start/stop tokens, for constructs whose
    /// keywords or punctuation extend past the first/last child.
    pub fn with_tokens(
        rule: GrammarRule,
        start: Token,
        stop: Token,
        children: Vec<SyntaxNode>,
    ) -> Self {
        Self {
            rule,
            start,
            stop,
            children,
        }
    }

    pub fn rule(&self) -> GrammarRule {
        self.rule
    }

    pub fn start(&self) -> &Token {
        &self.start
    }

    pub fn stop(&self) -> &Token {
        &self.stop
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    /// Bounds of the construct, from the first character of the start token
    /// to just past the last character of the stop token.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.start.location(), self.stop.end_location())
    }

    /// Literal text of the node: the token text for leaves, the
    /// concatenation of child texts otherwise.
    pub fn text(&self) -> SmolStr {
        if self.children.is_empty() {
            self.start.text.clone()
        } else {
            let mut out = String::new();
            for child in &self.children {
                out.push_str(child.text().as_str());
            }
            SmolStr::from(out)
        }
    }

    /// First direct child with the given rule.
    pub fn child(&self, rule: GrammarRule) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.rule == rule)
    }

    /// All direct children with the given rule.
    pub fn children_of(&self, rule: GrammarRule) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.rule == rule)
    }

    pub fn has_child(&self, rule: GrammarRule) -> bool {
        self.child(rule).is_some()
    }

    /// All descendants with the given rule, in source order. Used for
    /// clauses whose shape varies (e.g. `extends` carrying either one type
    /// or a type list).
    pub fn descendants_of(&self, rule: GrammarRule) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        self.collect_descendants(rule, &mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, rule: GrammarRule, out: &mut Vec<&'a SyntaxNode>) {
        for child in &self.children {
            if child.rule == rule {
                out.push(child);
            } else {
                child.collect_descendants(rule, out);
            }
        }
    }

    /// The declaration's identifier. Generic method/constructor wrappers
    /// delegate to the wrapped plain declaration.
    pub fn identifier(&self) -> Option<&SyntaxNode> {
        if let Some(ident) = self.child(GrammarRule::Identifier) {
            return Some(ident);
        }
        self.inner_declaration().and_then(|decl| decl.identifier())
    }

    /// The plain declaration wrapped by a generic method/constructor
    /// declaration, if this node is such a wrapper.
    pub fn inner_declaration(&self) -> Option<&SyntaxNode> {
        match self.rule {
            GrammarRule::GenericMethodDeclaration
            | GrammarRule::GenericInterfaceMethodDeclaration => self
                .child(GrammarRule::MethodDeclaration)
                .or_else(|| self.child(GrammarRule::InterfaceMethodDeclaration)),
            GrammarRule::GenericConstructorDeclaration => {
                self.child(GrammarRule::ConstructorDeclaration)
            }
            _ => None,
        }
    }

    /// Formal parameter list, looking through generic wrappers.
    pub fn formal_parameters(&self) -> Option<&SyntaxNode> {
        if let Some(params) = self.child(GrammarRule::FormalParameters) {
            return Some(params);
        }
        self.inner_declaration()
            .and_then(|decl| decl.formal_parameters())
    }

    /// Declared return type (`TypeTypeOrVoid`), looking through generic
    /// wrappers.
    pub fn return_type(&self) -> Option<&SyntaxNode> {
        if let Some(ty) = self.child(GrammarRule::TypeTypeOrVoid) {
            return Some(ty);
        }
        self.inner_declaration().and_then(|decl| decl.return_type())
    }

    /// The binary operator token of an expression node, if any.
    pub fn binary_operator(&self) -> Option<&Token> {
        if self.rule != GrammarRule::Expression {
            return None;
        }
        self.child(GrammarRule::Operator).map(|op| op.start())
    }

    /// Whether this node carries the given modifier keyword (`static`,
    /// `final`, ...) as a direct `Modifier` child.
    pub fn has_modifier(&self, keyword: &str) -> bool {
        self.children_of(GrammarRule::Modifier)
            .any(|m| m.text() == keyword)
    }
}

/// A syntax error reported by the external parser. Carried through to
/// diagnostics untouched; the core never produces these itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub location: FileLocation,
    pub token: SmolStr,
    pub message: String,
}

impl SyntaxError {
    /// Bounds covering the offending token.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.location,
            FileLocation::new(
                self.location.line,
                self.location.column + self.token.len() as u32,
            ),
        )
    }
}
