//! The [`AnalysisHost`]: one shared type store, per-file analysis results,
//! and the position-based queries an editor asks.
//!
//! Single-file checking is strictly sequential (gather pass 1, pass 2,
//! check). A workspace scan runs the same three phases across all files with
//! a global barrier between phases: every file finishes pass 1 before any
//! file starts pass 2, because pass 2 and checking resolve names declared in
//! sibling files. Within a phase, files are independent rayon tasks
//! serialized on the store lock only for their own walk.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{info, warn};

use crate::base::{CodeLocation, DisplayPosition, DisplayRange, FileLocation};
use crate::semantic::check::{ScopeTree, TypeError, check_types};
use crate::semantic::defs_usages::DefinitionsUsagesLookup;
use crate::semantic::gather::{gather_types, gather_types_first_pass, gather_types_second_pass};
use crate::semantic::symbols::SymbolId;
use crate::semantic::types::TypeStore;
use crate::syntax::{SyntaxError, SyntaxNode};

/// Upper bound on a whole-workspace rescan.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan hit its deadline. Remaining files were skipped and the
    /// user-type table was reset, so a later rescan starts clean.
    #[error("workspace scan timed out after {0:?}")]
    Timeout(Duration),
}

/// Diagnostic severity at the display boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A renderable diagnostic with a 0-based display range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: DisplayRange,
    pub severity: Severity,
    pub source: &'static str,
    pub message: String,
}

const DIAGNOSTIC_SOURCE: &str = "javamini";

impl Diagnostic {
    fn from_type_error(error: &TypeError) -> Self {
        Self {
            range: error.bounds.to_display_range(),
            severity: Severity::Error,
            source: DIAGNOSTIC_SOURCE,
            message: error.message.clone(),
        }
    }

    fn from_syntax_error(error: &SyntaxError) -> Self {
        Self {
            range: error.bounds().to_display_range(),
            severity: Severity::Error,
            source: DIAGNOSTIC_SOURCE,
            message: error.message.clone(),
        }
    }
}

/// A parsed file handed to the host by the frontend, which owns parsing.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub uri: SmolStr,
    pub version: i32,
    pub root: SyntaxNode,
    pub syntax_errors: Vec<SyntaxError>,
}

/// Everything the host retains about one analyzed file.
#[derive(Debug)]
pub struct FileAnalysis {
    pub version: i32,
    pub syntax_errors: Vec<SyntaxError>,
    pub type_errors: Vec<TypeError>,
    pub lookup: DefinitionsUsagesLookup,
    pub scopes: ScopeTree,
}

/// Shared analysis state: the type store and per-file results.
#[derive(Debug)]
pub struct AnalysisHost {
    store: Mutex<TypeStore>,
    files: Mutex<FxHashMap<SmolStr, FileAnalysis>>,
}

impl AnalysisHost {
    /// A host with only the primitive types installed. Callers wanting the
    /// standard library run
    /// [`crate::project::load_and_install_builtins`] against
    /// [`AnalysisHost::from_store`] first.
    pub fn new() -> Self {
        Self {
            store: Mutex::new(TypeStore::with_primitives()),
            files: Mutex::new(FxHashMap::default()),
        }
    }

    /// A host over a pre-populated store (typically with builtins loaded).
    pub fn from_store(store: TypeStore) -> Self {
        Self {
            store: Mutex::new(store),
            files: Mutex::new(FxHashMap::default()),
        }
    }

    /// Run the full pipeline on one file, replacing any previous analysis of
    /// the same URI, and return its diagnostics.
    pub fn check_file(&self, file: ParsedFile) -> Vec<Diagnostic> {
        let result = {
            let mut store = self.store.lock();
            let lookup = gather_types(&file.uri, file.version, &file.root, &mut store);
            check_types(&file.uri, file.version, &file.root, &mut store, lookup)
        };

        let analysis = FileAnalysis {
            version: file.version,
            syntax_errors: file.syntax_errors,
            type_errors: result.errors,
            lookup: result.lookup,
            scopes: result.scopes,
        };

        let diagnostics = render_diagnostics(&analysis);
        self.files.lock().insert(file.uri, analysis);
        diagnostics
    }

    /// Analyze a set of files with global phase barriers. With a deadline,
    /// files whose turn comes after it are skipped; a timeout resets the
    /// user-type table so the next scan starts from a clean slate.
    pub fn scan_workspace(
        &self,
        files: Vec<ParsedFile>,
        timeout: Option<Duration>,
    ) -> Result<(), ScanError> {
        let timeout = timeout.unwrap_or(DEFAULT_SCAN_TIMEOUT);
        let deadline = Instant::now() + timeout;
        let timed_out = AtomicBool::new(false);

        // Duplicate URIs collapse to their last entry, like rechecking a
        // file replaces its previous analysis. The per-file state below is
        // keyed by URI, so each URI must run each phase exactly once.
        let files = dedup_by_uri(files);

        let lookups: Mutex<FxHashMap<SmolStr, DefinitionsUsagesLookup>> = Mutex::new(
            files
                .iter()
                .map(|f| (f.uri.clone(), DefinitionsUsagesLookup::new()))
                .collect(),
        );

        let run_phase = |phase: &(dyn Fn(&ParsedFile) + Sync)| {
            files.par_iter().for_each(|file| {
                if Instant::now() >= deadline {
                    timed_out.store(true, Ordering::Relaxed);
                    return;
                }
                phase(file);
            });
            if timed_out.load(Ordering::Relaxed) {
                self.store.lock().reset_user_types();
                warn!(?timeout, "workspace scan timed out");
                return Err(ScanError::Timeout(timeout));
            }
            Ok(())
        };

        run_phase(&|file| {
            let mut store = self.store.lock();
            let mut lookups = lookups.lock();
            let lookup = lookups.get_mut(&file.uri).expect("lookup preallocated");
            gather_types_first_pass(&file.uri, file.version, &file.root, &mut store, lookup);
        })?;

        run_phase(&|file| {
            let mut store = self.store.lock();
            let mut lookups = lookups.lock();
            let lookup = lookups.get_mut(&file.uri).expect("lookup preallocated");
            gather_types_second_pass(&file.uri, file.version, &file.root, &mut store, lookup);
        })?;

        run_phase(&|file| {
            let lookup = lookups
                .lock()
                .remove(&file.uri)
                .expect("lookup preallocated");
            let result = {
                let mut store = self.store.lock();
                check_types(&file.uri, file.version, &file.root, &mut store, lookup)
            };
            self.files.lock().insert(
                file.uri.clone(),
                FileAnalysis {
                    version: file.version,
                    syntax_errors: file.syntax_errors.clone(),
                    type_errors: result.errors,
                    lookup: result.lookup,
                    scopes: result.scopes,
                },
            );
        })?;

        info!(files = files.len(), "workspace scan finished");
        Ok(())
    }

    /// Run a closure against one file's analysis, if the file is known.
    pub fn with_file<R>(&self, uri: &str, f: impl FnOnce(&FileAnalysis) -> R) -> Option<R> {
        self.files.lock().get(uri).map(|analysis| f(analysis))
    }

    /// Run a closure against the shared type store.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut TypeStore) -> R) -> R {
        f(&mut self.store.lock())
    }

    /// Syntax and type diagnostics for a file, display-ready.
    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        self.with_file(uri, render_diagnostics).unwrap_or_default()
    }

    /// The symbol under the cursor, if any.
    pub fn symbol_at(&self, uri: &str, position: DisplayPosition) -> Option<SymbolId> {
        let location = to_internal(position);
        self.with_file(uri, |analysis| analysis.lookup.lookup(location))?
    }

    /// Where the symbol under the cursor is defined. `None` for builtins,
    /// which have no source location.
    pub fn definition_at(&self, uri: &str, position: DisplayPosition) -> Option<CodeLocation> {
        let symbol = self.symbol_at(uri, position)?;
        self.store.lock().symbol(symbol).definition().cloned()
    }

    /// All recorded usages of the symbol under the cursor.
    pub fn usages_at(&self, uri: &str, position: DisplayPosition) -> Vec<CodeLocation> {
        let Some(symbol) = self.symbol_at(uri, position) else {
            return Vec::new();
        };
        self.store.lock().symbol(symbol).usages().to_vec()
    }

    /// One-line description of the symbol under the cursor, for hover.
    pub fn hover(&self, uri: &str, position: DisplayPosition) -> Option<String> {
        let symbol = self.symbol_at(uri, position)?;
        Some(self.store.lock().describe(symbol))
    }
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

fn dedup_by_uri(files: Vec<ParsedFile>) -> Vec<ParsedFile> {
    let mut by_uri: IndexMap<SmolStr, ParsedFile> = IndexMap::with_capacity(files.len());
    for file in files {
        by_uri.insert(file.uri.clone(), file);
    }
    by_uri.into_values().collect()
}

fn render_diagnostics(analysis: &FileAnalysis) -> Vec<Diagnostic> {
    analysis
        .syntax_errors
        .iter()
        .map(Diagnostic::from_syntax_error)
        .chain(analysis.type_errors.iter().map(Diagnostic::from_type_error))
        .collect()
}

fn to_internal(position: DisplayPosition) -> FileLocation {
    // Display lines are 0-based, internal lines 1-based.
    FileLocation::new(position.line + 1, position.character)
}
