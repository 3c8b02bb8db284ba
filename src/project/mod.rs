//! Project-level resources: the standard-library type definitions and their
//! installation into a [`crate::semantic::TypeStore`].

pub mod builtins;

pub use builtins::{
    BuiltinTypeDef, BuiltinsError, install_builtins, load_and_install_builtins, load_builtin_defs,
};
