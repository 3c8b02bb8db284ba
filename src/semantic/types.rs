//! The type store: arena storage for all symbols plus the builtin and
//! user type tables, inheritance traversal, and Java's cast-free coercion
//! rules.
//!
//! Builtin symbols are created once per load and never mutated afterwards,
//! with one exception: unresolvable type names are auto-vivified into the
//! builtin table as minimal placeholder classes so analysis stays total.
//! User types are re-declared fresh on every gathering run of their file.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

use crate::base::CodeLocation;
use crate::semantic::symbols::{
    JavaConstructor, JavaField, JavaMethod, JavaType, Symbol, SymbolId, TypeKind, Visibility,
};

/// The eight primitive types, injected before any JSON builtins are loaded.
pub const PRIMITIVE_TYPES: [&str; 8] = [
    "byte", "short", "int", "long", "float", "double", "boolean", "char",
];

/// Which other primitive/boxed type names each primitive can coerce to.
const PRIMITIVE_COERCIONS: [(&str, &[&str]); 8] = [
    ("byte", &["Byte", "short", "int", "long", "float", "double"]),
    ("short", &["Short", "int", "long", "float", "double"]),
    ("int", &["Integer", "long", "float", "double"]),
    ("long", &["Long", "float", "double"]),
    ("float", &["Float", "double"]),
    ("double", &["Double"]),
    ("char", &["Character", "int", "long", "float", "double"]),
    ("boolean", &["Boolean"]),
];

/// Boxed wrapper classes and the primitive each unboxes to.
const BOXED_PRIMITIVES: [(&str, &str); 8] = [
    ("Byte", "byte"),
    ("Short", "short"),
    ("Integer", "int"),
    ("Long", "long"),
    ("Float", "float"),
    ("Double", "double"),
    ("Character", "char"),
    ("Boolean", "boolean"),
];

/// Arena of symbols plus the name tables for type lookup.
#[derive(Debug, Default)]
pub struct TypeStore {
    arena: Vec<Symbol>,
    /// Builtin types by simple name. Placeholders for unknown names land
    /// here too.
    builtins: FxHashMap<SmolStr, SymbolId>,
    /// User-declared types by simple name, in declaration order.
    user_types: IndexMap<SmolStr, SymbolId>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the primitive types already injected.
    pub fn with_primitives() -> Self {
        let mut store = Self::new();
        store.add_primitive_types();
        store
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.arena.len());
        self.arena.push(symbol);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id.index()]
    }

    pub fn add_usage(&mut self, id: SymbolId, location: CodeLocation) {
        self.symbol_mut(id).add_usage(location);
    }

    // ------------------------------------------------------------------
    // Type tables
    // ------------------------------------------------------------------

    pub fn add_primitive_types(&mut self) {
        for name in PRIMITIVE_TYPES {
            let id = self.alloc(Symbol::Type(JavaType::primitive(name)));
            self.builtins.insert(SmolStr::new_static(name), id);
        }
    }

    pub fn declare_builtin(&mut self, ty: JavaType) -> SymbolId {
        let name = ty.name.clone();
        let id = self.alloc(Symbol::Type(ty));
        self.builtins.insert(name, id);
        id
    }

    /// Declare a user type, replacing any previous declaration of the same
    /// simple name (re-gathering a file supersedes the prior run).
    pub fn declare_user_type(&mut self, ty: JavaType) -> SymbolId {
        let name = ty.name.clone();
        let id = self.alloc(Symbol::Type(ty));
        self.user_types.insert(name, id);
        id
    }

    /// Look up a type by simple name: user types shadow builtins.
    pub fn get_type(&self, name: &str) -> Option<SymbolId> {
        self.user_types
            .get(name)
            .or_else(|| self.builtins.get(name))
            .copied()
    }

    /// Look up a type, creating a minimal placeholder class when the name is
    /// unknown. Unresolvable names never fail gathering or checking.
    pub fn lookup_or_create_type(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.get_type(name) {
            return id;
        }

        debug!(type_name = name, "creating placeholder for unknown type");
        let ty = JavaType::new(name, "", Visibility::Public, TypeKind::Class, None);
        self.declare_builtin(ty)
    }

    /// User type names in declaration order.
    pub fn user_type_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.user_types.keys()
    }

    pub fn user_type_count(&self) -> usize {
        self.user_types.len()
    }

    pub fn builtin_count(&self) -> usize {
        self.builtins.len()
    }

    /// Drop all user declarations. Recovery path after an aborted workspace
    /// scan; the next scan re-gathers from scratch.
    pub fn reset_user_types(&mut self) {
        self.user_types.clear();
    }

    // ------------------------------------------------------------------
    // Member attachment (gathering + builtin install)
    // ------------------------------------------------------------------

    pub fn attach_field(&mut self, owner: SymbolId, field: JavaField) -> SymbolId {
        let id = self.alloc(Symbol::Field(field));
        if let Some(ty) = self.symbol_mut(owner).as_type_mut() {
            ty.fields.push(id);
        }
        id
    }

    pub fn attach_method(&mut self, owner: SymbolId, method: JavaMethod) -> SymbolId {
        let id = self.alloc(Symbol::Method(method));
        if let Some(ty) = self.symbol_mut(owner).as_type_mut() {
            ty.methods.push(id);
        }
        id
    }

    pub fn attach_constructor(&mut self, owner: SymbolId, ctor: JavaConstructor) -> SymbolId {
        let id = self.alloc(Symbol::Constructor(ctor));
        if let Some(ty) = self.symbol_mut(owner).as_type_mut() {
            ty.constructors.push(id);
        }
        id
    }

    // ------------------------------------------------------------------
    // Inheritance-aware lookup
    // ------------------------------------------------------------------

    /// Find a field by name on the type or, failing that, on its supertypes
    /// in declaration order. First match wins.
    pub fn lookup_field(&self, type_id: SymbolId, name: &str) -> Option<SymbolId> {
        let ty = self.symbol(type_id).as_type()?;

        for &field_id in &ty.fields {
            if self.symbol(field_id).as_field().is_some_and(|f| f.name == name) {
                return Some(field_id);
            }
        }

        for &super_id in &ty.extends {
            if let Some(found) = self.lookup_field(super_id, name) {
                return Some(found);
            }
        }

        None
    }

    /// Find a method by name, recursing into supertypes like
    /// [`TypeStore::lookup_field`]. Overloads are not distinguished.
    pub fn lookup_method(&self, type_id: SymbolId, name: &str) -> Option<SymbolId> {
        let ty = self.symbol(type_id).as_type()?;

        for &method_id in &ty.methods {
            if self
                .symbol(method_id)
                .as_method()
                .is_some_and(|m| m.name == name)
            {
                return Some(method_id);
            }
        }

        for &super_id in &ty.extends {
            if let Some(found) = self.lookup_method(super_id, name) {
                return Some(found);
            }
        }

        None
    }

    /// Find any member (field first, then method) by name, recursing into
    /// supertypes. First match wins; no ambiguity detection across multiple
    /// interface parents.
    pub fn lookup_member(&self, type_id: SymbolId, name: &str) -> Option<SymbolId> {
        let ty = self.symbol(type_id).as_type()?;

        for &field_id in &ty.fields {
            if self.symbol(field_id).as_field().is_some_and(|f| f.name == name) {
                return Some(field_id);
            }
        }

        for &method_id in &ty.methods {
            if self
                .symbol(method_id)
                .as_method()
                .is_some_and(|m| m.name == name)
            {
                return Some(method_id);
            }
        }

        for &super_id in &ty.extends {
            if let Some(found) = self.lookup_member(super_id, name) {
                return Some(found);
            }
        }

        None
    }

    /// Transitive closure of supertypes in pre-order: each immediate
    /// supertype followed by its own superclasses.
    pub fn all_superclasses(&self, type_id: SymbolId) -> Vec<SymbolId> {
        let mut supers = Vec::new();
        let mut seen = FxHashSet::default();
        self.collect_superclasses(type_id, &mut supers, &mut seen);
        supers
    }

    fn collect_superclasses(
        &self,
        type_id: SymbolId,
        supers: &mut Vec<SymbolId>,
        seen: &mut FxHashSet<SymbolId>,
    ) {
        let Some(ty) = self.symbol(type_id).as_type() else {
            return;
        };

        for &super_id in &ty.extends {
            // Malformed inheritance cycles must not hang the traversal
            if !seen.insert(super_id) {
                continue;
            }
            supers.push(super_id);
            self.collect_superclasses(super_id, supers, seen);
        }
    }

    // ------------------------------------------------------------------
    // Coercion
    // ------------------------------------------------------------------

    /// Whether `from` converts to `to` without a cast: identity, anything to
    /// `Object`, primitive widening/boxing, unboxing of wrapper classes, or
    /// reference upcast to a transitive supertype.
    pub fn coerces_to(&self, from: SymbolId, to: SymbolId) -> bool {
        if from == to {
            return true;
        }

        let (Some(from_ty), Some(to_ty)) =
            (self.symbol(from).as_type(), self.symbol(to).as_type())
        else {
            return false;
        };

        if to_ty.name == "Object" {
            return true;
        }

        if from_ty.kind == TypeKind::Primitive {
            return PRIMITIVE_COERCIONS
                .iter()
                .find(|(name, _)| *name == from_ty.name)
                .is_some_and(|(_, targets)| targets.contains(&to_ty.name.as_str()));
        }

        if from_ty.kind == TypeKind::Class && to_ty.kind == TypeKind::Primitive {
            let unboxes = BOXED_PRIMITIVES
                .iter()
                .find(|(boxed, _)| *boxed == from_ty.name)
                .is_some_and(|(_, primitive)| *primitive == to_ty.name);
            if unboxes {
                return true;
            }
        }

        self.all_superclasses(from).contains(&to)
    }

    // ------------------------------------------------------------------
    // Names and display
    // ------------------------------------------------------------------

    /// Simple name of a type symbol.
    pub fn type_name(&self, id: SymbolId) -> &str {
        self.symbol(id)
            .as_type()
            .map(|t| t.name.as_str())
            .unwrap_or("<not a type>")
    }

    pub fn type_kind(&self, id: SymbolId) -> Option<TypeKind> {
        self.symbol(id).as_type().map(|t| t.kind)
    }

    /// Package the symbol belongs to, following back-references for members.
    pub fn package_name(&self, id: SymbolId) -> SmolStr {
        match self.symbol(id) {
            Symbol::Type(t) => t.package.clone(),
            Symbol::Field(f) => self.package_name(f.owner),
            Symbol::Method(m) => self.package_name(m.owner),
            Symbol::Constructor(c) => self.package_name(c.owner),
            Symbol::Local(l) => self.package_name(l.owner),
        }
    }

    /// Short name; constructors borrow their owner's name.
    pub fn short_name(&self, id: SymbolId) -> SmolStr {
        match self.symbol(id) {
            Symbol::Constructor(c) => SmolStr::from(self.type_name(c.owner)),
            other => other.name().cloned().unwrap_or_default(),
        }
    }

    /// Fully-qualified name, however much of
    /// `{package}.{class}.{member}({args})` applies.
    pub fn full_name(&self, id: SymbolId) -> String {
        match self.symbol(id) {
            Symbol::Type(t) => {
                if t.package.is_empty() {
                    t.name.to_string()
                } else {
                    format!("{}.{}", t.package, t.name)
                }
            }
            Symbol::Field(f) => format!("{}.{}", self.full_name(f.owner), f.name),
            Symbol::Method(m) => {
                let ret = m
                    .return_type
                    .map(|t| self.type_name(t).to_string())
                    .unwrap_or_else(|| "void".to_string());
                format!(
                    "{} {}.{}({})",
                    ret,
                    self.full_name(m.owner),
                    m.name,
                    self.param_list(&m.params)
                )
            }
            Symbol::Constructor(c) => {
                format!(
                    "{}.{}({})",
                    self.full_name(c.owner),
                    self.type_name(c.owner),
                    self.param_list(&c.params)
                )
            }
            Symbol::Local(l) => {
                format!(
                    "{} {} (local variable in {})",
                    self.type_name(l.ty),
                    l.name,
                    self.full_name(l.owner)
                )
            }
        }
    }

    /// One-line human-readable description, used for hover.
    pub fn describe(&self, id: SymbolId) -> String {
        match self.symbol(id) {
            Symbol::Type(t) => format!("{} {} {}", t.visibility, t.kind.as_str(), t.name),
            Symbol::Field(f) => format!(
                "{} {}{}{} {}",
                f.visibility,
                static_str(f.is_static),
                final_str(f.is_final),
                self.type_name(f.ty),
                f.name
            ),
            Symbol::Method(m) => {
                let ret = m
                    .return_type
                    .map(|t| self.type_name(t).to_string())
                    .unwrap_or_else(|| "void".to_string());
                format!(
                    "{} {}{} {}({})",
                    m.visibility,
                    static_str(m.is_static),
                    ret,
                    m.name,
                    self.param_list(&m.params)
                )
            }
            Symbol::Constructor(c) => format!(
                "{} {}({})",
                c.visibility,
                self.type_name(c.owner),
                self.param_list(&c.params)
            ),
            Symbol::Local(l) => format!("{} {}", self.type_name(l.ty), l.name),
        }
    }

    fn param_list(&self, params: &[crate::semantic::symbols::Parameter]) -> String {
        params
            .iter()
            .map(|p| {
                if p.is_varargs {
                    format!("{}... {}", self.type_name(p.ty), p.name)
                } else {
                    format!("{} {}", self.type_name(p.ty), p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn static_str(is_static: bool) -> &'static str {
    if is_static { "static " } else { "" }
}

fn final_str(is_final: bool) -> &'static str {
    if is_final { "final " } else { "" }
}
