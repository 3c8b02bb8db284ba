//! Semantic analysis: the symbol model and the passes that build and check it.
//!
//! Per file the pipeline is strictly sequential:
//!
//! ```text
//! gather pass 1 (bare type declarations)
//!   → gather pass 2 (supertypes, members, parameters)
//!     → check (scopes, identifier resolution, expression types)
//! ```
//!
//! Pass 2 and checking may resolve names declared later in the same file or
//! in sibling files, which is why the passes are exposed individually for
//! workspace scans (see [`crate::ide`] for the cross-file barriers).

pub mod check;
pub mod defs_usages;
pub mod gather;
pub mod scope_tracker;
pub mod symbols;
pub mod types;

pub use check::{ScopeTree, TypeCheckResult, TypeCheckingScope, TypeError, check_types};
pub use defs_usages::DefinitionsUsagesLookup;
pub use gather::{gather_types, gather_types_first_pass, gather_types_second_pass};
pub use scope_tracker::{Scope, ScopeKind, ScopeTracker};
pub use symbols::{Symbol, SymbolId, SymbolKind, TypeKind, Visibility};
pub use types::TypeStore;
