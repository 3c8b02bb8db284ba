//! Type gathering: the two declaration passes that run before checking.
//!
//! Pass one registers every type declared in the file by bare name, so that
//! pass two (and pass two of every *other* file in a workspace scan) can
//! resolve references to it. Pass two fills in supertypes, fields, methods,
//! and constructors, resolving member type names through the shared store.
//!
//! Both passes are plain CST walks driven by [`ScopeTracker`]; neither pass
//! descends into method bodies in any meaningful way, that is the checker's
//! job.

use smol_str::SmolStr;
use tracing::trace;

use crate::base::{Bounds, CodeLocation};
use crate::semantic::defs_usages::DefinitionsUsagesLookup;
use crate::semantic::scope_tracker::{Scope, ScopeKind, ScopeTracker};
use crate::semantic::symbols::{
    JavaConstructor, JavaField, JavaMethod, JavaType, Parameter, SymbolId, TypeKind, Visibility,
};
use crate::semantic::types::TypeStore;
use crate::syntax::{GrammarRule, SyntaxNode, Visitor, walk};

/// Run both gathering passes over one file and return its lookup table.
///
/// Workspace scans call the individual passes instead, with a barrier
/// between them so every file's pass one lands before any file's pass two.
pub fn gather_types(
    file_uri: &str,
    file_version: i32,
    root: &SyntaxNode,
    store: &mut TypeStore,
) -> DefinitionsUsagesLookup {
    let mut lookup = DefinitionsUsagesLookup::new();
    gather_types_first_pass(file_uri, file_version, root, store, &mut lookup);
    gather_types_second_pass(file_uri, file_version, root, store, &mut lookup);
    lookup
}

/// Pass one: declare every type in the file by name.
pub fn gather_types_first_pass(
    file_uri: &str,
    file_version: i32,
    root: &SyntaxNode,
    store: &mut TypeStore,
    lookup: &mut DefinitionsUsagesLookup,
) {
    let mut gatherer = TypeGatherer::new(file_uri, file_version, store, lookup, Pass::First);
    walk(&mut gatherer, root);
}

/// Pass two: resolve supertypes and declare members.
pub fn gather_types_second_pass(
    file_uri: &str,
    file_version: i32,
    root: &SyntaxNode,
    store: &mut TypeStore,
    lookup: &mut DefinitionsUsagesLookup,
) {
    let mut gatherer = TypeGatherer::new(file_uri, file_version, store, lookup, Pass::Second);
    walk(&mut gatherer, root);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    First,
    Second,
}

struct TypeGatherer<'a> {
    scopes: ScopeTracker,
    store: &'a mut TypeStore,
    lookup: &'a mut DefinitionsUsagesLookup,
    file_uri: &'a str,
    file_version: i32,
    package: SmolStr,
    pass: Pass,
    member_is_static: bool,
    member_is_final: bool,
}

impl<'a> TypeGatherer<'a> {
    fn new(
        file_uri: &'a str,
        file_version: i32,
        store: &'a mut TypeStore,
        lookup: &'a mut DefinitionsUsagesLookup,
        pass: Pass,
    ) -> Self {
        Self {
            scopes: ScopeTracker::new(),
            store,
            lookup,
            file_uri,
            file_version,
            package: SmolStr::default(),
            pass,
            member_is_static: false,
            member_is_final: false,
        }
    }

    fn code_location(&self, bounds: Bounds) -> CodeLocation {
        CodeLocation::new(self.file_uri, self.file_version, bounds)
    }

    fn enter_scope_first_pass(&mut self, scope: &Scope) {
        let kind = match scope.kind {
            ScopeKind::Class => TypeKind::Class,
            ScopeKind::Interface => TypeKind::Interface,
            ScopeKind::Enum => TypeKind::Enum,
            ScopeKind::Record => TypeKind::Record,
            ScopeKind::AnnotationType => TypeKind::Annotation,
            _ => return,
        };

        trace!(name = %scope.name, ?kind, "declaring type");
        let location = self.code_location(scope.bounds);
        let ty = JavaType::new(
            scope.name.clone(),
            self.package.clone(),
            Visibility::Public,
            kind,
            Some(location),
        );
        let id = self.store.declare_user_type(ty);
        self.lookup.add_definition(scope.bounds, id);
    }

    fn enter_scope_second_pass(&mut self, scope: &Scope, node: &SyntaxNode) {
        match scope.kind {
            ScopeKind::Class | ScopeKind::Interface => self.resolve_supertypes(scope, node),
            ScopeKind::Constructor | ScopeKind::GenericConstructor => {
                self.declare_constructor(node)
            }
            ScopeKind::Method
            | ScopeKind::GenericMethod
            | ScopeKind::InterfaceMethod
            | ScopeKind::GenericInterfaceMethod => self.declare_method(scope, node),
            _ => {}
        }
    }

    /// Fill in `extends`/`implements` on a type declared in pass one.
    fn resolve_supertypes(&mut self, scope: &Scope, node: &SyntaxNode) {
        let extends = self.clause_types(node, GrammarRule::ExtendsClause);
        let implements = self.clause_types(node, GrammarRule::ImplementsClause);

        let Some(type_id) = self.store.get_type(&scope.name) else {
            return;
        };
        if let Some(ty) = self.store.symbol_mut(type_id).as_type_mut() {
            ty.extends = extends;
            ty.implements = implements;
        }
    }

    /// Resolve every type named in an extends/implements clause. Handles
    /// both the single-type form and a type list.
    fn clause_types(&mut self, node: &SyntaxNode, clause: GrammarRule) -> Vec<SymbolId> {
        let Some(clause_node) = node.child(clause) else {
            return Vec::new();
        };
        clause_node
            .descendants_of(GrammarRule::TypeType)
            .iter()
            .map(|tt| self.store.lookup_or_create_type(&tt.text()))
            .collect()
    }

    /// The type declared by the scope directly enclosing the current one.
    fn enclosing_type(&self) -> Option<SymbolId> {
        let enclosing = self.scopes.top_minus(1)?;
        self.store.get_type(&enclosing.name)
    }

    fn declare_method(&mut self, scope: &Scope, node: &SyntaxNode) {
        let Some(owner) = self.enclosing_type() else {
            return;
        };

        let return_type = node
            .return_type()
            .map(|tt| tt.text())
            .filter(|text| text != "void")
            .map(|text| self.store.lookup_or_create_type(&text));

        let definition = self.code_location(scope.bounds);
        let method = JavaMethod {
            name: scope.name.clone(),
            owner,
            return_type,
            params: self.gather_params(node),
            visibility: Visibility::Default,
            is_static: self.member_is_static,
            definition: Some(definition),
            usages: Vec::new(),
        };

        let id = self.store.attach_method(owner, method);
        self.lookup.add_definition(scope.bounds, id);
    }

    fn declare_constructor(&mut self, node: &SyntaxNode) {
        let Some(owner) = self.enclosing_type() else {
            return;
        };
        let Some(ident) = node.identifier() else {
            return;
        };

        let bounds = ident.bounds();
        let definition = self.code_location(bounds);
        let ctor = JavaConstructor {
            owner,
            params: self.gather_params(node),
            visibility: Visibility::Default,
            definition: Some(definition),
            usages: Vec::new(),
        };

        let id = self.store.attach_constructor(owner, ctor);
        self.lookup.add_definition(bounds, id);
    }

    fn gather_params(&mut self, node: &SyntaxNode) -> Vec<Parameter> {
        let mut params = Vec::new();
        let Some(formals) = node.formal_parameters() else {
            return params;
        };

        // `void frob(Receiver this, ...)` binds an explicit receiver.
        if let Some(receiver) = formals.child(GrammarRule::ReceiverParameter)
            && let Some(tt) = receiver.child(GrammarRule::TypeType)
        {
            params.push(Parameter {
                name: SmolStr::new_static("this"),
                ty: self.store.lookup_or_create_type(&tt.text()),
                is_varargs: false,
            });
        }

        let Some(list) = formals.child(GrammarRule::FormalParameterList) else {
            return params;
        };

        for param in list.children_of(GrammarRule::FormalParameter) {
            if let Some(p) = self.plain_param(param, false) {
                params.push(p);
            }
        }
        if let Some(last) = list.child(GrammarRule::LastFormalParameter) {
            let varargs = last.has_child(GrammarRule::Ellipsis);
            if let Some(p) = self.plain_param(last, varargs) {
                params.push(p);
            }
        }

        params
    }

    fn plain_param(&mut self, param: &SyntaxNode, is_varargs: bool) -> Option<Parameter> {
        let name = param.child(GrammarRule::VariableDeclaratorId)?.text();
        let ty_name = param.child(GrammarRule::TypeType)?.text();
        Some(Parameter {
            name,
            ty: self.store.lookup_or_create_type(&ty_name),
            is_varargs,
        })
    }

    fn declare_fields(&mut self, node: &SyntaxNode) {
        let Some(scope) = self.scopes.top() else {
            return;
        };
        let Some(owner) = self.store.get_type(&scope.name) else {
            return;
        };

        let Some(tt) = node.child(GrammarRule::TypeType) else {
            return;
        };
        let field_type = self.store.lookup_or_create_type(&tt.text());

        let Some(declarators) = node.child(GrammarRule::VariableDeclarators) else {
            return;
        };

        for declarator in declarators.children_of(GrammarRule::VariableDeclarator) {
            let ident = declarator
                .child(GrammarRule::VariableDeclaratorId)
                .and_then(|id| id.child(GrammarRule::Identifier));
            let Some(ident) = ident else {
                continue;
            };

            let bounds = ident.bounds();
            let field = JavaField {
                name: ident.text(),
                ty: field_type,
                owner,
                visibility: Visibility::Default,
                is_static: self.member_is_static,
                is_final: self.member_is_final,
                definition: Some(self.code_location(bounds)),
                usages: Vec::new(),
            };

            let id = self.store.attach_field(owner, field);
            self.lookup.add_definition(bounds, id);
        }
    }
}

impl Visitor for TypeGatherer<'_> {
    fn enter_node(&mut self, node: &SyntaxNode) {
        if let Some(scope) = self.scopes.check_enter_scope(node) {
            let scope = scope.clone();
            match self.pass {
                Pass::First => self.enter_scope_first_pass(&scope),
                Pass::Second => self.enter_scope_second_pass(&scope, node),
            }
            return;
        }

        match node.rule() {
            GrammarRule::PackageDeclaration => {
                if let Some(name) = node.child(GrammarRule::QualifiedName) {
                    self.package = name.text();
                }
            }
            GrammarRule::ClassBodyDeclaration => {
                // Member modifiers sit on the body declaration wrapper.
                if node.has_modifier("static") {
                    self.member_is_static = true;
                }
                if node.has_modifier("final") {
                    self.member_is_final = true;
                }
            }
            GrammarRule::FieldDeclaration if self.pass == Pass::Second => {
                self.declare_fields(node);
            }
            _ => {}
        }
    }

    fn exit_node(&mut self, node: &SyntaxNode) {
        if self.scopes.check_exit_scope(node).is_some() {
            return;
        }

        if node.rule() == GrammarRule::ClassBodyDeclaration {
            if node.has_modifier("static") {
                self.member_is_static = false;
            }
            if node.has_modifier("final") {
                self.member_is_final = false;
            }
        }
    }
}
