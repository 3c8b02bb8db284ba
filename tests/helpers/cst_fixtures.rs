//! Builders for hand-made CST fixtures with explicit source positions.
//!
//! Analysis never sees raw text, only position-annotated nodes, so tests
//! construct the trees an external Java parser would produce. Positions are
//! passed explicitly; keeping them consistent inside one fixture matters for
//! the position-query tests.

use javamini::syntax::{GrammarRule, SyntaxNode, Token};

pub fn ident(text: &str, line: u32, col: u32) -> SyntaxNode {
    SyntaxNode::leaf(GrammarRule::Identifier, Token::new(text, line, col))
}

pub fn type_ref(text: &str, line: u32, col: u32) -> SyntaxNode {
    SyntaxNode::leaf(GrammarRule::TypeType, Token::new(text, line, col))
}

fn literal(rule: GrammarRule, text: &str, line: u32, col: u32) -> SyntaxNode {
    SyntaxNode::new(
        GrammarRule::Primary,
        vec![SyntaxNode::new(
            GrammarRule::Literal,
            vec![SyntaxNode::leaf(rule, Token::new(text, line, col))],
        )],
    )
}

pub fn int_lit(text: &str, line: u32, col: u32) -> SyntaxNode {
    literal(GrammarRule::IntegerLiteral, text, line, col)
}

pub fn float_lit(text: &str, line: u32, col: u32) -> SyntaxNode {
    literal(GrammarRule::FloatLiteral, text, line, col)
}

pub fn string_lit(text: &str, line: u32, col: u32) -> SyntaxNode {
    literal(GrammarRule::StringLiteral, text, line, col)
}

pub fn bool_lit(text: &str, line: u32, col: u32) -> SyntaxNode {
    literal(GrammarRule::BoolLiteral, text, line, col)
}

pub fn null_lit(line: u32, col: u32) -> SyntaxNode {
    literal(GrammarRule::NullLiteral, "null", line, col)
}

/// An identifier used as an expression operand.
pub fn name_expr(text: &str, line: u32, col: u32) -> SyntaxNode {
    SyntaxNode::new(GrammarRule::Primary, vec![ident(text, line, col)])
}

/// `left <op> right` as an expression node.
pub fn binary(left: SyntaxNode, op: &str, line: u32, col: u32, right: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        GrammarRule::Expression,
        vec![
            left,
            SyntaxNode::leaf(GrammarRule::Operator, Token::new(op, line, col)),
            right,
        ],
    )
}

/// `<ty> <name> = <init>;` as a block statement. The variable name starts
/// one column past the type name.
pub fn local_decl(ty: &str, line: u32, col: u32, name: &str, init: SyntaxNode) -> SyntaxNode {
    let name_col = col + ty.len() as u32 + 1;
    SyntaxNode::new(
        GrammarRule::BlockStatement,
        vec![SyntaxNode::new(
            GrammarRule::LocalVariableDeclaration,
            vec![SyntaxNode::new(
                GrammarRule::TypedVariableDeclaration,
                vec![
                    type_ref(ty, line, col),
                    SyntaxNode::new(
                        GrammarRule::VariableDeclarators,
                        vec![SyntaxNode::new(
                            GrammarRule::VariableDeclarator,
                            vec![
                                SyntaxNode::new(
                                    GrammarRule::VariableDeclaratorId,
                                    vec![ident(name, line, name_col)],
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

/// `var <name> = <init>;` as a block statement.
pub fn var_decl(line: u32, col: u32, name: &str, init: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        GrammarRule::BlockStatement,
        vec![SyntaxNode::new(
            GrammarRule::LocalVariableDeclaration,
            vec![SyntaxNode::new(
                GrammarRule::UntypedVariableDeclaration,
                vec![ident(name, line, col + 4), init],
            )],
        )],
    )
}

/// A field declaration wrapped in its class-body declaration, with optional
/// modifier keywords.
pub fn field(modifiers: &[&str], ty: &str, line: u32, col: u32, name: &str) -> SyntaxNode {
    let mut children: Vec<SyntaxNode> = Vec::new();
    let mut cursor = col;
    for keyword in modifiers {
        children.push(SyntaxNode::leaf(
            GrammarRule::Modifier,
            Token::new(*keyword, line, cursor),
        ));
        cursor += keyword.len() as u32 + 1;
    }

    let name_col = cursor + ty.len() as u32 + 1;
    children.push(SyntaxNode::new(
        GrammarRule::FieldDeclaration,
        vec![
            type_ref(ty, line, cursor),
            SyntaxNode::new(
                GrammarRule::VariableDeclarators,
                vec![SyntaxNode::new(
                    GrammarRule::VariableDeclarator,
                    vec![SyntaxNode::new(
                        GrammarRule::VariableDeclaratorId,
                        vec![ident(name, line, name_col)],
                    )],
                )],
            ),
        ],
    ));

    SyntaxNode::new(GrammarRule::ClassBodyDeclaration, children)
}

/// A `(type, name)` formal parameter.
pub fn param(ty: &str, name: &str, line: u32, col: u32) -> SyntaxNode {
    let name_col = col + ty.len() as u32 + 1;
    SyntaxNode::new(
        GrammarRule::FormalParameter,
        vec![
            type_ref(ty, line, col),
            SyntaxNode::new(
                GrammarRule::VariableDeclaratorId,
                vec![ident(name, line, name_col)],
            ),
        ],
    )
}

/// `<ret> <name>(<params>) { <statements> }` wrapped in a class-body
/// declaration. `body_end_line` closes the block so later statements stay
/// inside the method scope for position queries.
pub fn method(
    ret: &str,
    name: &str,
    line: u32,
    params: Vec<SyntaxNode>,
    statements: Vec<SyntaxNode>,
    body_end_line: u32,
) -> SyntaxNode {
    let name_col = 4 + ret.len() as u32 + 1;
    let open_col = name_col + name.len() as u32;

    let mut formals_children = Vec::new();
    if !params.is_empty() {
        formals_children.push(SyntaxNode::new(GrammarRule::FormalParameterList, params));
    }
    let formals = SyntaxNode::with_tokens(
        GrammarRule::FormalParameters,
        Token::new("(", line, open_col),
        Token::new(")", line, open_col + 1),
        formals_children,
    );

    let block = SyntaxNode::with_tokens(
        GrammarRule::Block,
        Token::new("{", line, open_col + 3),
        Token::new("}", body_end_line, 4),
        statements,
    );

    SyntaxNode::new(
        GrammarRule::ClassBodyDeclaration,
        vec![SyntaxNode::new(
            GrammarRule::MethodDeclaration,
            vec![
                SyntaxNode::leaf(GrammarRule::TypeTypeOrVoid, Token::new(ret, line, 4)),
                ident(name, line, name_col),
                formals,
                SyntaxNode::new(GrammarRule::MethodBody, vec![block]),
            ],
        )],
    )
}

/// `public class <name> ... { <members> }` with optional supertype clauses.
pub fn class(
    name: &str,
    line: u32,
    extends: Option<SyntaxNode>,
    implements: Option<SyntaxNode>,
    members: Vec<SyntaxNode>,
    end_line: u32,
) -> SyntaxNode {
    let mut children = vec![ident(name, line, 13)];
    if let Some(clause) = extends {
        children.push(clause);
    }
    if let Some(clause) = implements {
        children.push(clause);
    }
    children.push(SyntaxNode::with_tokens(
        GrammarRule::ClassBody,
        Token::new("{", line, 13 + name.len() as u32 + 1),
        Token::new("}", end_line, 0),
        members,
    ));
    SyntaxNode::new(GrammarRule::ClassDeclaration, children)
}

pub fn extends_clause(ty: &str, line: u32, col: u32) -> SyntaxNode {
    SyntaxNode::new(GrammarRule::ExtendsClause, vec![type_ref(ty, line, col)])
}

pub fn implements_clause(types: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::new(
        GrammarRule::ImplementsClause,
        vec![SyntaxNode::new(GrammarRule::TypeList, types)],
    )
}

pub fn compilation_unit(declarations: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::new(GrammarRule::CompilationUnit, declarations)
}

pub fn package_decl(name: &str, line: u32) -> SyntaxNode {
    SyntaxNode::new(
        GrammarRule::PackageDeclaration,
        vec![SyntaxNode::leaf(
            GrammarRule::QualifiedName,
            Token::new(name, line, 8),
        )],
    )
}
