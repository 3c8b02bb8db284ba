//! The symbol model: types, members, parameters, and locals.
//!
//! Symbols live in an arena owned by [`crate::semantic::TypeStore`] and
//! reference each other by [`SymbolId`]. Ownership runs one way (a type owns
//! its fields/methods/constructors via id lists); back-references
//! (field → owning type, local → owning method) and supertype links are plain
//! ids with no ownership implication, which is what lets the graph be cyclic.

use std::fmt;

use smol_str::SmolStr;

use crate::base::CodeLocation;

/// Unique identifier for a symbol in the arena.
/// Uses u32 for compact storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Discriminant of a [`Symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Type,
    Field,
    Method,
    Constructor,
    Local,
}

/// Java member visibility. `Default` is package visibility (no keyword).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Default,
    Private,
    Public,
    Protected,
    Local,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Default => "<package-private>",
            Visibility::Private => "private",
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Local => "<local>",
        };
        f.write_str(s)
    }
}

/// What sort of type a [`JavaType`] declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Primitive => "primitive",
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "annotation",
        }
    }
}

/// A declared type: class, interface, enum, record, annotation, or primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaType {
    pub name: SmolStr,
    pub package: SmolStr,
    pub module: SmolStr,
    pub kind: TypeKind,
    /// Supertypes. More than one element only for interfaces extending
    /// several interfaces; classes have at most one.
    pub extends: Vec<SymbolId>,
    pub implements: Vec<SymbolId>,
    pub constructors: Vec<SymbolId>,
    pub fields: Vec<SymbolId>,
    pub methods: Vec<SymbolId>,
    pub visibility: Visibility,
    /// Where the type is declared. `None` for builtin/library types.
    pub definition: Option<CodeLocation>,
    pub usages: Vec<CodeLocation>,
}

impl JavaType {
    pub fn new(
        name: impl Into<SmolStr>,
        package: impl Into<SmolStr>,
        visibility: Visibility,
        kind: TypeKind,
        definition: Option<CodeLocation>,
    ) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            module: SmolStr::default(),
            kind,
            extends: Vec::new(),
            implements: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            visibility,
            definition,
            usages: Vec::new(),
        }
    }

    pub fn primitive(name: impl Into<SmolStr>) -> Self {
        Self::new(name, "", Visibility::Public, TypeKind::Primitive, None)
    }
}

/// A field on a type. `owner` is a non-owning back-reference.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaField {
    pub name: SmolStr,
    pub ty: SymbolId,
    pub owner: SymbolId,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub definition: Option<CodeLocation>,
    pub usages: Vec<CodeLocation>,
}

/// A method on a type. `return_type` of `None` means void.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaMethod {
    pub name: SmolStr,
    pub owner: SymbolId,
    pub return_type: Option<SymbolId>,
    pub params: Vec<Parameter>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub definition: Option<CodeLocation>,
    pub usages: Vec<CodeLocation>,
}

/// A constructor. Named after its owning type, so it carries no name itself.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaConstructor {
    pub owner: SymbolId,
    pub params: Vec<Parameter>,
    pub visibility: Visibility,
    pub definition: Option<CodeLocation>,
    pub usages: Vec<CodeLocation>,
}

/// A formal parameter. Plain value: parameters have no identity of their own
/// and no usage tracking (they become locals inside the method body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: SmolStr,
    pub ty: SymbolId,
    pub is_varargs: bool,
}

/// A local variable inside a method or constructor body.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaLocal {
    pub name: SmolStr,
    pub ty: SymbolId,
    /// The enclosing method/constructor symbol.
    pub owner: SymbolId,
    pub definition: CodeLocation,
    pub usages: Vec<CodeLocation>,
}

/// A named, typed entity in the model. Closed set; consumers match on the
/// variant instead of going through dynamic dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Type(JavaType),
    Field(JavaField),
    Method(JavaMethod),
    Constructor(JavaConstructor),
    Local(JavaLocal),
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Type(_) => SymbolKind::Type,
            Symbol::Field(_) => SymbolKind::Field,
            Symbol::Method(_) => SymbolKind::Method,
            Symbol::Constructor(_) => SymbolKind::Constructor,
            Symbol::Local(_) => SymbolKind::Local,
        }
    }

    /// Short name of the symbol. Constructors report their owner's name via
    /// [`crate::semantic::TypeStore::short_name`]; here they have none.
    pub fn name(&self) -> Option<&SmolStr> {
        match self {
            Symbol::Type(t) => Some(&t.name),
            Symbol::Field(f) => Some(&f.name),
            Symbol::Method(m) => Some(&m.name),
            Symbol::Constructor(_) => None,
            Symbol::Local(l) => Some(&l.name),
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Symbol::Type(t) => t.visibility,
            Symbol::Field(f) => f.visibility,
            Symbol::Method(m) => m.visibility,
            Symbol::Constructor(c) => c.visibility,
            Symbol::Local(_) => Visibility::Local,
        }
    }

    /// Where the symbol is defined. `None` for builtin/library symbols.
    pub fn definition(&self) -> Option<&CodeLocation> {
        match self {
            Symbol::Type(t) => t.definition.as_ref(),
            Symbol::Field(f) => f.definition.as_ref(),
            Symbol::Method(m) => m.definition.as_ref(),
            Symbol::Constructor(c) => c.definition.as_ref(),
            Symbol::Local(l) => Some(&l.definition),
        }
    }

    pub fn usages(&self) -> &[CodeLocation] {
        match self {
            Symbol::Type(t) => &t.usages,
            Symbol::Field(f) => &f.usages,
            Symbol::Method(m) => &m.usages,
            Symbol::Constructor(c) => &c.usages,
            Symbol::Local(l) => &l.usages,
        }
    }

    pub fn add_usage(&mut self, location: CodeLocation) {
        let usages = match self {
            Symbol::Type(t) => &mut t.usages,
            Symbol::Field(f) => &mut f.usages,
            Symbol::Method(m) => &mut m.usages,
            Symbol::Constructor(c) => &mut c.usages,
            Symbol::Local(l) => &mut l.usages,
        };
        usages.push(location);
    }

    /// The type a reference to this symbol evaluates to: the declared type
    /// for fields and locals, the return type for methods.
    pub fn value_type(&self) -> Option<SymbolId> {
        match self {
            Symbol::Field(f) => Some(f.ty),
            Symbol::Local(l) => Some(l.ty),
            Symbol::Method(m) => m.return_type,
            Symbol::Type(_) | Symbol::Constructor(_) => None,
        }
    }

    pub fn as_type(&self) -> Option<&JavaType> {
        match self {
            Symbol::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_type_mut(&mut self) -> Option<&mut JavaType> {
        match self {
            Symbol::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&JavaField> {
        match self {
            Symbol::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&JavaMethod> {
        match self {
            Symbol::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&JavaConstructor> {
        match self {
            Symbol::Constructor(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_local(&self) -> Option<&JavaLocal> {
        match self {
            Symbol::Local(l) => Some(l),
            _ => None,
        }
    }
}
