//! Standard-library type definitions.
//!
//! The definitions live in a JSON document produced offline from the Java
//! API docs: a flat list of types, each with its package, supertypes, and
//! members. Decoding is memoized per path behind a read/write lock so that
//! concurrent analysis hosts share one decoded copy and the file is read
//! from disk at most once.
//!
//! Installation into a [`TypeStore`] is phased like gathering is: declare
//! every type first, then fill in supertypes and members, so definitions may
//! reference each other in any order. Names that never appear in the
//! document (the docs parser is not exhaustive) are auto-vivified as
//! placeholder classes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{info, warn};

use crate::semantic::symbols::{
    JavaConstructor, JavaField, JavaMethod, JavaType, Parameter, TypeKind, Visibility,
};
use crate::semantic::types::TypeStore;

#[derive(Debug, Error)]
pub enum BuiltinsError {
    #[error("failed to read builtin type definitions: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode builtin type definitions: {0}")]
    Json(#[from] serde_json::Error),
}

/// One type as described by the definitions document.
#[derive(Debug, Clone, Deserialize)]
pub struct BuiltinTypeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(rename = "type", default)]
    pub field_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(rename = "type", default)]
    pub return_type: String,
    #[serde(default)]
    pub args: Vec<ArgDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstructorDef {
    #[serde(default)]
    pub args: Vec<ArgDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArgDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub arg_type: String,
}

static DECODED_CACHE: RwLock<Option<FxHashMap<PathBuf, Arc<Vec<BuiltinTypeDef>>>>> =
    RwLock::new(None);

/// Decode the definitions document at `path`, reading the file at most once
/// per process.
pub fn load_builtin_defs(path: &Path) -> Result<Arc<Vec<BuiltinTypeDef>>, BuiltinsError> {
    if let Some(cache) = DECODED_CACHE.read().as_ref()
        && let Some(defs) = cache.get(path)
    {
        return Ok(Arc::clone(defs));
    }

    let mut cache = DECODED_CACHE.write();
    let cache = cache.get_or_insert_with(FxHashMap::default);
    // Re-check under the write lock: another thread may have just loaded it.
    if let Some(defs) = cache.get(path) {
        return Ok(Arc::clone(defs));
    }

    let bytes = std::fs::read(path)?;
    let defs: Vec<BuiltinTypeDef> = serde_json::from_slice(&bytes)?;
    let defs = Arc::new(defs);
    cache.insert(path.to_path_buf(), Arc::clone(&defs));
    Ok(defs)
}

/// Load the definitions at `path` and install them into `store`. Returns
/// the number of builtin types in the store afterwards.
pub fn load_and_install_builtins(
    path: &Path,
    store: &mut TypeStore,
) -> Result<usize, BuiltinsError> {
    let started = Instant::now();
    let defs = load_builtin_defs(path)?;
    install_builtins(store, &defs);
    info!(
        types = store.builtin_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded standard library types"
    );
    Ok(store.builtin_count())
}

/// Install decoded definitions into `store`. Primitives are injected first,
/// independent of the document's contents.
pub fn install_builtins(store: &mut TypeStore, defs: &[BuiltinTypeDef]) {
    if store.get_type("int").is_none() {
        store.add_primitive_types();
    }

    // Phase 1: declare every type bare, so later phases can resolve
    // forward references.
    for def in defs {
        let mut ty = JavaType::new(
            def.name.as_str(),
            def.package.as_str(),
            Visibility::Public,
            type_kind(&def.kind),
            None,
        );
        ty.module = SmolStr::from(def.module.as_str());
        store.declare_builtin(ty);
    }

    // Phase 2: supertypes.
    for def in defs {
        let extends: Vec<_> = def
            .extends
            .iter()
            .map(|name| store.lookup_or_create_type(name))
            .collect();
        let implements: Vec<_> = def
            .implements
            .iter()
            .map(|name| store.lookup_or_create_type(name))
            .collect();

        let Some(id) = store.get_type(&def.name) else {
            continue;
        };
        if let Some(ty) = store.symbol_mut(id).as_type_mut() {
            ty.extends = extends;
            ty.implements = implements;
        }
    }

    // Phase 3: members.
    for def in defs {
        let Some(owner) = store.get_type(&def.name) else {
            continue;
        };

        for ctor in &def.constructors {
            let params = args_to_params(store, &ctor.args);
            store.attach_constructor(
                owner,
                JavaConstructor {
                    owner,
                    params,
                    visibility: Visibility::Public,
                    definition: None,
                    usages: Vec::new(),
                },
            );
        }

        for field in &def.fields {
            let ty = store.lookup_or_create_type(&field.field_type);
            store.attach_field(
                owner,
                JavaField {
                    name: SmolStr::from(field.name.as_str()),
                    ty,
                    owner,
                    visibility: Visibility::Public,
                    is_static: field.modifiers.iter().any(|m| m == "static"),
                    is_final: field.modifiers.iter().any(|m| m == "final"),
                    definition: None,
                    usages: Vec::new(),
                },
            );
        }

        for method in &def.methods {
            let return_type = if method.return_type.is_empty() || method.return_type == "void" {
                None
            } else {
                Some(store.lookup_or_create_type(&method.return_type))
            };
            let params = args_to_params(store, &method.args);
            store.attach_method(
                owner,
                JavaMethod {
                    name: SmolStr::from(method.name.as_str()),
                    owner,
                    return_type,
                    params,
                    visibility: Visibility::Public,
                    is_static: method.modifiers.iter().any(|m| m == "static"),
                    definition: None,
                    usages: Vec::new(),
                },
            );
        }
    }
}

fn args_to_params(store: &mut TypeStore, args: &[ArgDef]) -> Vec<Parameter> {
    args.iter()
        .map(|arg| Parameter {
            name: SmolStr::from(arg.name.as_str()),
            ty: store.lookup_or_create_type(&arg.arg_type),
            is_varargs: false,
        })
        .collect()
}

fn type_kind(kind: &str) -> TypeKind {
    match kind {
        "class" => TypeKind::Class,
        "interface" => TypeKind::Interface,
        "enum" => TypeKind::Enum,
        "annotation" => TypeKind::Annotation,
        "record" => TypeKind::Record,
        other => {
            warn!(kind = other, "unknown builtin type kind, assuming class");
            TypeKind::Class
        }
    }
}
