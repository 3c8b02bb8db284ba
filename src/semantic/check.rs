//! Expression type checking.
//!
//! The checker walks the CST once, after both gathering passes. It keeps a
//! stack of typed sub-expressions: literals and identifiers push their type,
//! a binary operator pops its two operands, checks them against the
//! operator's category, and pushes the result type. Declarations drain the
//! stack and demand that every initializer coerces to the declared type.
//!
//! Alongside checking, the walk builds the lexical scope tree used by
//! position queries and records local definitions and identifier usages in
//! the file's lookup table.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{Bounds, CodeLocation, FileLocation};
use crate::semantic::defs_usages::DefinitionsUsagesLookup;
use crate::semantic::scope_tracker::{ScopeKind, ScopeTracker};
use crate::semantic::symbols::{JavaLocal, SymbolId, TypeKind};
use crate::semantic::types::TypeStore;
use crate::syntax::{GrammarRule, SyntaxNode, Visitor, walk};

/// A single checking diagnostic: what went wrong and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub bounds: Bounds,
    pub message: String,
}

/// Everything one checking run produces for a file.
#[derive(Debug)]
pub struct TypeCheckResult {
    pub errors: Vec<TypeError>,
    pub lookup: DefinitionsUsagesLookup,
    pub scopes: ScopeTree,
}

/// Check one file. `lookup` is the table from the gathering passes; the
/// checker adds local definitions and identifier usages to it and hands it
/// back in the result.
pub fn check_types(
    file_uri: &str,
    file_version: i32,
    root: &SyntaxNode,
    store: &mut TypeStore,
    lookup: DefinitionsUsagesLookup,
) -> TypeCheckResult {
    let mut checker = TypeChecker::new(file_uri, file_version, store, lookup);
    walk(&mut checker, root);

    debug!(
        file = file_uri,
        errors = checker.errors.len(),
        "type checking finished"
    );

    TypeCheckResult {
        errors: checker.errors,
        lookup: checker.lookup,
        scopes: checker.scopes,
    }
}

// ----------------------------------------------------------------------
// Lexical scope tree
// ----------------------------------------------------------------------

/// One node of the scope tree: the locals visible at this level and the
/// source range the scope covers. Parent/child links are indices into the
/// owning [`ScopeTree`].
#[derive(Debug)]
pub struct TypeCheckingScope {
    pub locals: FxHashMap<SmolStr, SymbolId>,
    pub bounds: Bounds,
    /// The declaration that opened this scope (type or method symbol).
    /// `None` only for the root.
    pub symbol: Option<SymbolId>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Arena of [`TypeCheckingScope`]s. Index 0 is the root, whose bounds cover
/// the whole file.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<TypeCheckingScope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![TypeCheckingScope {
                locals: FxHashMap::default(),
                bounds: Bounds::whole_file(),
                symbol: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub const ROOT: usize = 0;

    pub fn scope(&self, index: usize) -> &TypeCheckingScope {
        &self.scopes[index]
    }

    fn scope_mut(&mut self, index: usize) -> &mut TypeCheckingScope {
        &mut self.scopes[index]
    }

    fn push_child(&mut self, parent: usize, bounds: Bounds, symbol: Option<SymbolId>) -> usize {
        let index = self.scopes.len();
        self.scopes.push(TypeCheckingScope {
            locals: FxHashMap::default(),
            bounds,
            symbol,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.scopes[parent].children.push(index);
        index
    }

    /// The narrowest scope containing the given position. Recurses into the
    /// first matching child; falls back to the current scope when no child
    /// matches.
    pub fn scope_for(&self, location: FileLocation) -> usize {
        self.scope_for_from(Self::ROOT, location)
    }

    fn scope_for_from(&self, index: usize, location: FileLocation) -> usize {
        for &child in &self.scopes[index].children {
            if self.scopes[child].bounds.contains(location) {
                return self.scope_for_from(child, location);
            }
        }
        index
    }

    /// Resolve a name against a scope and its ancestors, innermost first.
    pub fn lookup_local(&self, mut index: usize, name: &str) -> Option<SymbolId> {
        loop {
            if let Some(&id) = self.scopes[index].locals.get(name) {
                return Some(id);
            }
            index = self.scopes[index].parent?;
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------
// Operator categories
// ----------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpCategory {
    Arithmetic,
    Bitshift,
    Bitwise,
    Comparison,
    Equality,
    Boolean,
    Unknown,
}

impl OpCategory {
    fn classify(op: &str) -> OpCategory {
        const ARITHMETIC: [&str; 10] = ["+", "-", "*", "/", "%", "+=", "-=", "*=", "/=", "%="];
        const BITSHIFT: [&str; 6] = [">>", ">>>", "<<", ">>=", ">>>=", "<<="];
        const COMPARISON: [&str; 4] = ["<", ">", "<=", ">="];
        const BITWISE: [&str; 6] = ["&", "|", "^", "&=", "|=", "^="];
        const EQUALITY: [&str; 2] = ["==", "!="];
        const BOOLEAN: [&str; 4] = ["&&", "||", "&&=", "||="];

        if ARITHMETIC.contains(&op) {
            OpCategory::Arithmetic
        } else if BITSHIFT.contains(&op) {
            OpCategory::Bitshift
        } else if COMPARISON.contains(&op) {
            OpCategory::Comparison
        } else if BITWISE.contains(&op) {
            OpCategory::Bitwise
        } else if EQUALITY.contains(&op) {
            OpCategory::Equality
        } else if BOOLEAN.contains(&op) {
            OpCategory::Boolean
        } else {
            OpCategory::Unknown
        }
    }

    fn name(self) -> &'static str {
        match self {
            OpCategory::Arithmetic => "arithmetic",
            OpCategory::Bitshift => "bitshift",
            OpCategory::Bitwise => "bitwise",
            OpCategory::Comparison => "comparison",
            OpCategory::Equality => "equality",
            OpCategory::Boolean => "boolean",
            OpCategory::Unknown => "unknown",
        }
    }

    /// Comparison and equality operators contain `=` but never assign.
    fn never_assignment(self) -> bool {
        matches!(self, OpCategory::Comparison | OpCategory::Equality)
    }
}

const NUMERIC_TYPES: [&str; 7] = ["byte", "char", "short", "int", "long", "float", "double"];
const INTEGRAL_TYPES: [&str; 5] = ["byte", "char", "short", "int", "long"];

// Widening order for arithmetic results. char sits between short and int:
// adding a char to a short promotes to the char.
const INTEGRAL_TYPE_WIDTHS: [&str; 5] = ["byte", "short", "char", "int", "long"];

// ----------------------------------------------------------------------
// The checker
// ----------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct TypedExpression {
    bounds: Bounds,
    ty: SymbolId,
}

struct TypeChecker<'a> {
    tracker: ScopeTracker,
    store: &'a mut TypeStore,
    lookup: DefinitionsUsagesLookup,
    errors: Vec<TypeError>,
    scopes: ScopeTree,
    current_scope: usize,
    expression_stack: Vec<TypedExpression>,
    file_uri: &'a str,
    file_version: i32,
}

impl<'a> TypeChecker<'a> {
    fn new(
        file_uri: &'a str,
        file_version: i32,
        store: &'a mut TypeStore,
        lookup: DefinitionsUsagesLookup,
    ) -> Self {
        Self {
            tracker: ScopeTracker::new(),
            store,
            lookup,
            errors: Vec::new(),
            scopes: ScopeTree::new(),
            current_scope: ScopeTree::ROOT,
            expression_stack: Vec::new(),
            file_uri,
            file_version,
        }
    }

    fn add_error(&mut self, bounds: Bounds, message: String) {
        self.errors.push(TypeError { bounds, message });
    }

    fn code_location(&self, bounds: Bounds) -> CodeLocation {
        CodeLocation::new(self.file_uri, self.file_version, bounds)
    }

    fn push_expr(&mut self, ty: SymbolId, bounds: Bounds) {
        self.expression_stack.push(TypedExpression { bounds, ty });
    }

    fn push_expr_named(&mut self, type_name: &str, bounds: Bounds) {
        let ty = self.store.lookup_or_create_type(type_name);
        self.push_expr(ty, bounds);
    }

    /// The type declared by the innermost class-like scope.
    fn enclosing_type(&mut self) -> Option<SymbolId> {
        let name = self
            .tracker
            .scopes()
            .iter()
            .rev()
            .find(|s| s.kind.is_class_kind())
            .map(|s| s.name.clone())?;
        Some(self.store.lookup_or_create_type(&name))
    }

    /// The method or constructor symbol the current scope belongs to, if the
    /// walk is inside one.
    fn enclosing_callable(&self) -> Option<SymbolId> {
        let mut index = self.current_scope;
        loop {
            let scope = self.scopes.scope(index);
            if let Some(id) = scope.symbol {
                match self.store.symbol(id).kind() {
                    crate::semantic::symbols::SymbolKind::Method
                    | crate::semantic::symbols::SymbolKind::Constructor => return Some(id),
                    _ => return None,
                }
            }
            index = scope.parent?;
        }
    }

    // ------------------------------------------------------------------
    // Scope handling
    // ------------------------------------------------------------------

    fn open_scope(&mut self, kind: ScopeKind, name: &SmolStr, node: &SyntaxNode) {
        let bounds = node.bounds();
        let symbol = self.symbol_for_scope(kind, name);
        let index = self.scopes.push_child(self.current_scope, bounds, symbol);
        self.current_scope = index;

        // Method parameters become locals of the method scope.
        if kind.is_method_kind()
            && let Some(callable) = symbol
        {
            self.bind_params(callable, bounds);
        }
    }

    fn symbol_for_scope(&mut self, kind: ScopeKind, name: &SmolStr) -> Option<SymbolId> {
        if kind.is_class_kind() {
            return Some(self.store.lookup_or_create_type(name));
        }

        let enclosing = self.enclosing_type()?;
        match kind {
            ScopeKind::Constructor | ScopeKind::GenericConstructor => {
                // Constructors are anonymous; match on the definition site,
                // which the gatherer and the tracker both take from the
                // declaration identifier.
                let scope_bounds = self.tracker.top()?.bounds;
                let ctors = self.store.symbol(enclosing).as_type()?.constructors.clone();
                ctors.into_iter().find(|&id| {
                    self.store
                        .symbol(id)
                        .definition()
                        .is_some_and(|def| def.bounds == scope_bounds)
                })
            }
            _ => self.store.lookup_method(enclosing, name),
        }
    }

    fn bind_params(&mut self, callable: SymbolId, decl_bounds: Bounds) {
        let params = match self.store.symbol(callable) {
            crate::semantic::symbols::Symbol::Method(m) => m.params.clone(),
            crate::semantic::symbols::Symbol::Constructor(c) => c.params.clone(),
            _ => return,
        };

        for param in params {
            let local = JavaLocal {
                name: param.name.clone(),
                ty: param.ty,
                owner: callable,
                definition: self.code_location(decl_bounds),
                usages: Vec::new(),
            };
            let id = self.store.alloc(crate::semantic::symbols::Symbol::Local(local));
            self.scopes
                .scope_mut(self.current_scope)
                .locals
                .insert(param.name, id);
        }
    }

    fn close_scope(&mut self) {
        if let Some(parent) = self.scopes.scope(self.current_scope).parent {
            self.current_scope = parent;
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// `int x = expr, y = expr;` as a field or a typed local declaration.
    fn handle_typed_declaration(&mut self, node: &SyntaxNode, is_local: bool) {
        let Some(tt) = node.child(GrammarRule::TypeType) else {
            return;
        };
        let declared = self.store.lookup_or_create_type(&tt.text());

        if let Some(declarators) = node.child(GrammarRule::VariableDeclarators) {
            let scope_type = if is_local { "method" } else { "class" };
            let idents: Vec<SyntaxNode> = declarators
                .children_of(GrammarRule::VariableDeclarator)
                .filter_map(|d| {
                    d.child(GrammarRule::VariableDeclaratorId)
                        .and_then(|id| id.child(GrammarRule::Identifier))
                        .cloned()
                })
                .collect();
            for ident in idents {
                self.check_and_add_variable(&ident.text(), declared, ident.bounds(), scope_type);
            }
        }

        // Every initializer value left on the stack must fit the declared
        // type. Draining is safe: the stack is cleared per statement anyway.
        while let Some(expr) = self.expression_stack.pop() {
            if !self.store.coerces_to(expr.ty, declared) {
                self.add_error(
                    expr.bounds,
                    format!(
                        "Type mismatch: cannot convert from {} to {}",
                        self.store.type_name(expr.ty),
                        self.store.type_name(declared)
                    ),
                );
            }
        }
    }

    /// `var x = expr;` takes its type from the initializer.
    fn handle_untyped_declaration(&mut self, node: &SyntaxNode) {
        let ty = match self.expression_stack.pop() {
            Some(expr) => expr.ty,
            None => self.store.lookup_or_create_type("Object"),
        };

        if let Some(ident) = node.child(GrammarRule::Identifier) {
            self.check_and_add_variable(&ident.text(), ty, ident.bounds(), "method");
        }
    }

    fn check_and_add_variable(
        &mut self,
        name: &str,
        ty: SymbolId,
        bounds: Bounds,
        scope_type: &str,
    ) {
        if self
            .scopes
            .scope(self.current_scope)
            .locals
            .contains_key(name)
        {
            let scope_name = self
                .tracker
                .top()
                .map(|s| s.name.clone())
                .unwrap_or_default();
            self.add_error(
                bounds,
                format!("Variable {name} is already defined in {scope_type} {scope_name}"),
            );
        }

        // Only method bodies hold locals; a field lives on its type instead.
        let Some(callable) = self.enclosing_callable() else {
            return;
        };

        let local = JavaLocal {
            name: SmolStr::from(name),
            ty,
            owner: callable,
            definition: self.code_location(bounds),
            usages: Vec::new(),
        };
        let id = self.store.alloc(crate::semantic::symbols::Symbol::Local(local));
        self.scopes
            .scope_mut(self.current_scope)
            .locals
            .insert(SmolStr::from(name), id);
        self.lookup.add_definition(bounds, id);
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn handle_primary(&mut self, node: &SyntaxNode) {
        let inner = node.child(GrammarRule::Literal).unwrap_or(node);

        for child in inner.children() {
            let bounds = child.bounds();
            match child.rule() {
                GrammarRule::IntegerLiteral => {
                    let name = if child.text().ends_with(['l', 'L']) {
                        "long"
                    } else {
                        "int"
                    };
                    self.push_expr_named(name, bounds);
                    return;
                }
                GrammarRule::FloatLiteral => {
                    let name = if child.text().ends_with(['f', 'F']) {
                        "float"
                    } else {
                        "double"
                    };
                    self.push_expr_named(name, bounds);
                    return;
                }
                GrammarRule::CharLiteral => {
                    self.push_expr_named("char", bounds);
                    return;
                }
                GrammarRule::StringLiteral | GrammarRule::TextBlock => {
                    self.push_expr_named("String", bounds);
                    return;
                }
                GrammarRule::BoolLiteral => {
                    self.push_expr_named("boolean", bounds);
                    return;
                }
                GrammarRule::NullLiteral => {
                    // null fits any reference type; Object is the closest
                    // the model has to a bottom type.
                    self.push_expr_named("Object", bounds);
                    return;
                }
                GrammarRule::Identifier => {
                    self.handle_identifier(child);
                    return;
                }
                _ => {}
            }
        }
    }

    fn handle_identifier(&mut self, node: &SyntaxNode) {
        let name = node.text();
        let bounds = node.bounds();

        if let Some(local) = self.scopes.lookup_local(self.current_scope, &name) {
            let ty = self
                .store
                .symbol(local)
                .value_type()
                .unwrap_or_else(|| self.store.lookup_or_create_type("Object"));
            self.record_usage(local, bounds);
            self.push_expr(ty, bounds);
            return;
        }

        if let Some(enclosing) = self.enclosing_type()
            && let Some(field) = self.store.lookup_field(enclosing, &name)
        {
            let ty = self
                .store
                .symbol(field)
                .value_type()
                .unwrap_or_else(|| self.store.lookup_or_create_type("Object"));
            self.record_usage(field, bounds);
            self.push_expr(ty, bounds);
            return;
        }

        self.add_error(bounds, format!("Unknown identifier: {name}"));

        // The surrounding expression still needs an operand to work with.
        self.push_expr_named("Object", bounds);
    }

    fn record_usage(&mut self, symbol: SymbolId, bounds: Bounds) {
        let location = self.code_location(bounds);
        self.store.add_usage(symbol, location);
        self.lookup.add_usage(bounds, symbol);
    }

    fn handle_binary_expression(&mut self, op: &str, expr_bounds: Bounds) {
        let right = self.expression_stack.pop();
        let left = self.expression_stack.pop();

        let (Some(left), Some(right)) = (left, right) else {
            let side = if right.is_none() { "right" } else { "left" };
            self.add_error(
                expr_bounds,
                format!("Internal error: missing {side} operand of {op}"),
            );
            self.push_expr_named("Object", expr_bounds);
            return;
        };

        let category = OpCategory::classify(op);

        let result = if !category.never_assignment() && op.contains('=') {
            // Assignment evaluates to the assigned-to side.
            left.ty
        } else {
            self.bop_return_type(left, right, category)
        };

        self.push_expr(result, expr_bounds);
    }

    fn bop_return_type(
        &mut self,
        left: TypedExpression,
        right: TypedExpression,
        category: OpCategory,
    ) -> SymbolId {
        // String concatenation: `+` with a String on either side accepts any
        // other operand and yields String.
        if category == OpCategory::Arithmetic {
            if self.store.type_name(left.ty) == "String" {
                return left.ty;
            }
            if self.store.type_name(right.ty) == "String" {
                return right.ty;
            }
        }

        // An invalid operand reports one error and yields the other side, so
        // checking continues up the expression.
        if !self.operand_is_valid(right.ty, category) {
            self.invalid_operand_error(right, category);
            return left.ty;
        }
        if !self.operand_is_valid(left.ty, category) {
            self.invalid_operand_error(left, category);
            return right.ty;
        }

        match category {
            OpCategory::Arithmetic | OpCategory::Bitshift | OpCategory::Bitwise => {
                self.arithmetic_result(left.ty, right.ty)
            }
            _ => self.store.lookup_or_create_type("boolean"),
        }
    }

    fn invalid_operand_error(&mut self, expr: TypedExpression, category: OpCategory) {
        self.add_error(
            expr.bounds,
            format!(
                "Cannot use {} operator on {}",
                category.name(),
                self.store.type_name(expr.ty)
            ),
        );
    }

    fn operand_is_valid(&self, ty: SymbolId, category: OpCategory) -> bool {
        let is_primitive = self.store.type_kind(ty) == Some(TypeKind::Primitive);
        let name = self.store.type_name(ty);

        match category {
            OpCategory::Arithmetic | OpCategory::Comparison => {
                is_primitive && NUMERIC_TYPES.contains(&name)
            }
            OpCategory::Bitshift | OpCategory::Bitwise => {
                is_primitive && INTEGRAL_TYPES.contains(&name)
            }
            OpCategory::Boolean => is_primitive && name == "boolean",
            OpCategory::Equality | OpCategory::Unknown => true,
        }
    }

    /// Result of `+`-family operators on numerics: floating point wins,
    /// then the wider integral operand.
    fn arithmetic_result(&mut self, left: SymbolId, right: SymbolId) -> SymbolId {
        for name in ["double", "float"] {
            if self.store.type_name(left) == name {
                return left;
            }
            if self.store.type_name(right) == name {
                return right;
            }
        }

        let width = |id: SymbolId| {
            INTEGRAL_TYPE_WIDTHS
                .iter()
                .position(|&n| n == self.store.type_name(id))
                .map_or(-1, |i| i as i32)
        };
        if width(left) > width(right) { left } else { right }
    }
}

impl Visitor for TypeChecker<'_> {
    fn enter_node(&mut self, node: &SyntaxNode) {
        if let Some(scope) = self.tracker.check_enter_scope(node) {
            let (kind, name) = (scope.kind, scope.name.clone());
            self.open_scope(kind, &name, node);
        }
    }

    fn exit_node(&mut self, node: &SyntaxNode) {
        if self.tracker.check_exit_scope(node).is_some() {
            self.close_scope();
            return;
        }

        match node.rule() {
            GrammarRule::Statement | GrammarRule::BlockStatement => {
                self.expression_stack.clear();
            }
            GrammarRule::FieldDeclaration => {
                self.handle_typed_declaration(node, false);
            }
            GrammarRule::LocalVariableDeclaration => {
                if let Some(typed) = node.child(GrammarRule::TypedVariableDeclaration) {
                    let typed = typed.clone();
                    self.handle_typed_declaration(&typed, true);
                } else if let Some(untyped) = node.child(GrammarRule::UntypedVariableDeclaration) {
                    let untyped = untyped.clone();
                    self.handle_untyped_declaration(&untyped);
                }
            }
            GrammarRule::Primary => {
                self.handle_primary(node);
            }
            GrammarRule::Expression => {
                if let Some(op) = node.binary_operator() {
                    let op = op.text.clone();
                    self.handle_binary_expression(&op, node.bounds());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::gather::gather_types;
    use crate::syntax::Token;
    use rstest::rstest;

    const URI: &str = "file:///Test.java";

    fn ident(text: &str, line: u32, col: u32) -> SyntaxNode {
        SyntaxNode::leaf(GrammarRule::Identifier, Token::new(text, line, col))
    }

    fn primary_literal(rule: GrammarRule, text: &str, line: u32, col: u32) -> SyntaxNode {
        SyntaxNode::new(
            GrammarRule::Primary,
            vec![SyntaxNode::new(
                GrammarRule::Literal,
                vec![SyntaxNode::leaf(rule, Token::new(text, line, col))],
            )],
        )
    }

    fn primary_ident(text: &str, line: u32, col: u32) -> SyntaxNode {
        SyntaxNode::new(GrammarRule::Primary, vec![ident(text, line, col)])
    }

    fn binary(left: SyntaxNode, op: &str, op_line: u32, op_col: u32, right: SyntaxNode) -> SyntaxNode {
        SyntaxNode::new(
            GrammarRule::Expression,
            vec![
                left,
                SyntaxNode::leaf(GrammarRule::Operator, Token::new(op, op_line, op_col)),
                right,
            ],
        )
    }

    fn typed_local(ty: &str, ty_line: u32, ty_col: u32, name: &str, init: SyntaxNode) -> SyntaxNode {
        let name_col = ty_col + ty.len() as u32 + 1;
        SyntaxNode::new(
            GrammarRule::BlockStatement,
            vec![SyntaxNode::new(
                GrammarRule::LocalVariableDeclaration,
                vec![SyntaxNode::new(
                    GrammarRule::TypedVariableDeclaration,
                    vec![
                        SyntaxNode::leaf(GrammarRule::TypeType, Token::new(ty, ty_line, ty_col)),
                        SyntaxNode::new(
                            GrammarRule::VariableDeclarators,
                            vec![SyntaxNode::new(
                                GrammarRule::VariableDeclarator,
                                vec![
                                    SyntaxNode::new(
                                        GrammarRule::VariableDeclaratorId,
                                        vec![ident(name, ty_line, name_col)],
                                    ),
                                    init,
                                ],
                            )],
                        ),
                    ],
                )],
            )],
        )
    }

    /// class Main { void run() { <statements> } }
    fn class_with_method_body(statements: Vec<SyntaxNode>) -> SyntaxNode {
        let body = SyntaxNode::with_tokens(
            GrammarRule::Block,
            Token::new("{", 2, 15),
            Token::new("}", 90, 0),
            statements,
        );
        let method = SyntaxNode::new(
            GrammarRule::MethodDeclaration,
            vec![
                SyntaxNode::leaf(GrammarRule::TypeTypeOrVoid, Token::new("void", 2, 4)),
                ident("run", 2, 9),
                SyntaxNode::with_tokens(
                    GrammarRule::FormalParameters,
                    Token::new("(", 2, 12),
                    Token::new(")", 2, 13),
                    vec![],
                ),
                SyntaxNode::new(GrammarRule::MethodBody, vec![body]),
            ],
        );
        SyntaxNode::with_tokens(
            GrammarRule::CompilationUnit,
            Token::new("public", 1, 0),
            Token::new("}", 91, 0),
            vec![SyntaxNode::new(
                GrammarRule::ClassDeclaration,
                vec![
                    ident("Main", 1, 13),
                    SyntaxNode::new(GrammarRule::ClassBody, vec![SyntaxNode::new(
                        GrammarRule::ClassBodyDeclaration,
                        vec![method],
                    )]),
                ],
            )],
        )
    }

    fn run_check(tree: &SyntaxNode) -> (TypeStore, TypeCheckResult) {
        let mut store = TypeStore::with_primitives();
        let lookup = gather_types(URI, 1, tree, &mut store);
        let result = check_types(URI, 1, tree, &mut store, lookup);
        (store, result)
    }

    #[test]
    fn clean_declaration_produces_no_errors() {
        let tree = class_with_method_body(vec![typed_local(
            "int",
            3,
            8,
            "x",
            primary_literal(GrammarRule::IntegerLiteral, "42", 3, 16),
        )]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors, vec![]);
    }

    #[test]
    fn string_initializer_does_not_fit_int() {
        let tree = class_with_method_body(vec![typed_local(
            "int",
            3,
            8,
            "x",
            primary_literal(GrammarRule::StringLiteral, "\"hi\"", 3, 16),
        )]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "Type mismatch: cannot convert from String to int"
        );
        // The error points at the initializer, not the declaration.
        assert_eq!(result.errors[0].bounds, Bounds::from_coords(3, 16, 3, 20));
    }

    #[rstest]
    #[case("9", "10", "int", true)]
    #[case("9", "10L", "long", true)]
    #[case("9L", "10", "long", true)]
    #[case("1", "2.0", "double", true)]
    #[case("1", "2.5f", "float", true)]
    #[case("1.0f", "2.0", "double", true)]
    fn arithmetic_widens_to_the_larger_operand(
        #[case] left: &str,
        #[case] right: &str,
        #[case] declared: &str,
        #[case] fits: bool,
    ) {
        let lit = |text: &str, col: u32| {
            let rule = if text.contains('.') {
                GrammarRule::FloatLiteral
            } else {
                GrammarRule::IntegerLiteral
            };
            primary_literal(rule, text, 3, col)
        };
        let expr = binary(lit(left, 18), "+", 3, 21, lit(right, 23));
        let tree = class_with_method_body(vec![typed_local(declared, 3, 8, "x", expr)]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors.is_empty(), fits, "{left} + {right} as {declared}");
    }

    #[test]
    fn string_concatenation_result_is_string() {
        let expr = binary(
            primary_literal(GrammarRule::StringLiteral, "\"n = \"", 3, 19),
            "+",
            3,
            26,
            primary_literal(GrammarRule::IntegerLiteral, "3", 3, 28),
        );
        let tree = class_with_method_body(vec![typed_local("String", 3, 8, "s", expr)]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors, vec![]);
    }

    #[test]
    fn comparison_yields_boolean() {
        let expr = binary(
            primary_literal(GrammarRule::IntegerLiteral, "1", 3, 20),
            "<",
            3,
            22,
            primary_literal(GrammarRule::IntegerLiteral, "2", 3, 24),
        );
        let tree = class_with_method_body(vec![typed_local("boolean", 3, 8, "b", expr)]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors, vec![]);

        let expr = binary(
            primary_literal(GrammarRule::IntegerLiteral, "1", 3, 16),
            "<",
            3,
            18,
            primary_literal(GrammarRule::IntegerLiteral, "2", 3, 20),
        );
        let tree = class_with_method_body(vec![typed_local("int", 3, 8, "x", expr)]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "Type mismatch: cannot convert from boolean to int"
        );
    }

    #[test]
    fn boolean_operator_rejects_numeric_operand() {
        let expr = binary(
            primary_literal(GrammarRule::BoolLiteral, "true", 3, 20),
            "&&",
            3,
            25,
            primary_literal(GrammarRule::IntegerLiteral, "3", 3, 28),
        );
        let tree = class_with_method_body(vec![typed_local("boolean", 3, 8, "b", expr)]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Cannot use boolean operator on int");
    }

    #[test]
    fn bitshift_rejects_floating_point() {
        let expr = binary(
            primary_literal(GrammarRule::IntegerLiteral, "8", 3, 16),
            ">>",
            3,
            18,
            primary_literal(GrammarRule::FloatLiteral, "2.0", 3, 21),
        );
        let tree = class_with_method_body(vec![typed_local("int", 3, 8, "x", expr)]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "Cannot use bitshift operator on double"
        );
    }

    #[test]
    fn redefining_a_local_reports_one_error() {
        let tree = class_with_method_body(vec![
            typed_local(
                "int",
                3,
                8,
                "x",
                primary_literal(GrammarRule::IntegerLiteral, "1", 3, 16),
            ),
            typed_local(
                "int",
                4,
                8,
                "x",
                primary_literal(GrammarRule::IntegerLiteral, "2", 4, 16),
            ),
        ]);
        let (_, result) = run_check(&tree);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "Variable x is already defined in method run"
        );
    }

    #[test]
    fn unknown_identifier_reports_and_recovers_as_object() {
        let expr = binary(
            primary_ident("mystery", 3, 19),
            "+",
            3,
            27,
            primary_literal(GrammarRule::StringLiteral, "\"!\"", 3, 29),
        );
        let tree = class_with_method_body(vec![typed_local("String", 3, 8, "s", expr)]);
        let (_, result) = run_check(&tree);
        // Only the unknown-identifier error: the concatenation still types
        // as String because the missing operand was assumed to be Object.
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Unknown identifier: mystery");
    }

    #[test]
    fn local_is_visible_to_later_statements_and_usage_is_recorded() {
        let decl = typed_local(
            "int",
            3,
            8,
            "a",
            primary_literal(GrammarRule::IntegerLiteral, "1", 3, 16),
        );
        let use_stmt = typed_local("long", 4, 8, "c", primary_ident("a", 4, 17));
        let tree = class_with_method_body(vec![decl, use_stmt]);
        let (store, result) = run_check(&tree);
        assert_eq!(result.errors, vec![]);

        // The definition site and the usage site both resolve to the local.
        let def = result.lookup.lookup(FileLocation::new(3, 12)).unwrap();
        let at_use = result.lookup.lookup(FileLocation::new(4, 17)).unwrap();
        assert_eq!(def, at_use);
        assert_eq!(store.symbol(def).usages().len(), 1);
        assert_eq!(store.symbol(def).usages()[0].bounds, Bounds::from_coords(4, 17, 4, 18));
    }

    #[test]
    fn field_reference_resolves_through_enclosing_class() {
        // class Main { static int count; void run() { int x = count; } }
        let field = SyntaxNode::new(
            GrammarRule::ClassBodyDeclaration,
            vec![
                SyntaxNode::leaf(GrammarRule::Modifier, Token::new("static", 2, 4)),
                SyntaxNode::new(
                    GrammarRule::FieldDeclaration,
                    vec![
                        SyntaxNode::leaf(GrammarRule::TypeType, Token::new("int", 2, 11)),
                        SyntaxNode::new(
                            GrammarRule::VariableDeclarators,
                            vec![SyntaxNode::new(
                                GrammarRule::VariableDeclarator,
                                vec![SyntaxNode::new(
                                    GrammarRule::VariableDeclaratorId,
                                    vec![ident("count", 2, 15)],
                                )],
                            )],
                        ),
                    ],
                ),
            ],
        );
        let stmt = typed_local("int", 4, 8, "x", primary_ident("count", 4, 16));
        let method = SyntaxNode::new(
            GrammarRule::MethodDeclaration,
            vec![
                SyntaxNode::leaf(GrammarRule::TypeTypeOrVoid, Token::new("void", 3, 4)),
                ident("run", 3, 9),
                SyntaxNode::with_tokens(
                    GrammarRule::FormalParameters,
                    Token::new("(", 3, 12),
                    Token::new(")", 3, 13),
                    vec![],
                ),
                SyntaxNode::new(
                    GrammarRule::MethodBody,
                    vec![SyntaxNode::with_tokens(
                        GrammarRule::Block,
                        Token::new("{", 3, 15),
                        Token::new("}", 5, 4),
                        vec![stmt],
                    )],
                ),
            ],
        );
        let tree = SyntaxNode::new(
            GrammarRule::CompilationUnit,
            vec![SyntaxNode::new(
                GrammarRule::ClassDeclaration,
                vec![
                    ident("Main", 1, 13),
                    SyntaxNode::new(
                        GrammarRule::ClassBody,
                        vec![field, SyntaxNode::new(GrammarRule::ClassBodyDeclaration, vec![method])],
                    ),
                ],
            )],
        );

        let (store, result) = run_check(&tree);
        assert_eq!(result.errors, vec![]);

        let at_use = result.lookup.lookup(FileLocation::new(4, 18)).unwrap();
        assert!(store.symbol(at_use).as_field().is_some());
        assert_eq!(store.symbol(at_use).usages().len(), 1);
    }

    #[test]
    fn scope_tree_narrows_to_method_scope() {
        let tree = class_with_method_body(vec![typed_local(
            "int",
            3,
            8,
            "x",
            primary_literal(GrammarRule::IntegerLiteral, "1", 3, 16),
        )]);
        let (store, result) = run_check(&tree);

        let index = result.scopes.scope_for(FileLocation::new(3, 10));
        let scope = result.scopes.scope(index);
        let symbol = scope.symbol.expect("method scope has a symbol");
        assert!(store.symbol(symbol).as_method().is_some());
        assert!(scope.locals.contains_key("x"));

        // Outside any declaration the root scope answers.
        assert_eq!(
            result.scopes.scope_for(FileLocation::new(95, 0)),
            ScopeTree::ROOT
        );
    }
}
