//! Position-indexed lookup from a cursor location to the symbol it points at.
//!
//! One lookup table per file. Entries are bucketed by starting line so a
//! query only scans the identifiers on that line; when several entries
//! contain the queried position (a member access inside a wider expression,
//! say), the narrowest bounds win.

use rustc_hash::FxHashMap;

use crate::base::{Bounds, FileLocation};
use crate::semantic::symbols::SymbolId;

/// A single definition or usage site. Bounds rather than a full
/// [`crate::base::CodeLocation`] because the table is per-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefUsageEntry {
    pub bounds: Bounds,
    pub symbol: SymbolId,
    /// `false` for the definition site itself.
    pub is_usage: bool,
}

/// Per-file table mapping source positions to symbols.
#[derive(Debug, Clone, Default)]
pub struct DefinitionsUsagesLookup {
    by_line: FxHashMap<u32, Vec<DefUsageEntry>>,
}

impl DefinitionsUsagesLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition or usage site. Inserting the same symbol at the
    /// same bounds twice is a no-op, so re-walking a subtree cannot
    /// duplicate entries.
    pub fn add(&mut self, bounds: Bounds, symbol: SymbolId, is_usage: bool) {
        let line = self.by_line.entry(bounds.start.line).or_default();

        if line
            .iter()
            .any(|entry| entry.symbol == symbol && entry.bounds == bounds)
        {
            return;
        }

        line.push(DefUsageEntry {
            bounds,
            symbol,
            is_usage,
        });
    }

    pub fn add_definition(&mut self, bounds: Bounds, symbol: SymbolId) {
        self.add(bounds, symbol, false);
    }

    pub fn add_usage(&mut self, bounds: Bounds, symbol: SymbolId) {
        self.add(bounds, symbol, true);
    }

    /// All entries starting on the given line, in insertion order.
    pub fn entries_on_line(&self, line: u32) -> &[DefUsageEntry] {
        self.by_line.get(&line).map_or(&[], Vec::as_slice)
    }

    /// The most specific entry containing the given position, if any.
    pub fn lookup_entry(&self, location: FileLocation) -> Option<&DefUsageEntry> {
        let line = self.by_line.get(&location.line)?;

        let mut found: Option<&DefUsageEntry> = None;
        for entry in line {
            let matches = location.line == entry.bounds.start.line
                && location.column >= entry.bounds.start.column
                && location.column <= entry.bounds.end.column;
            let narrower = found.is_none_or(|f| entry.bounds.size() < f.bounds.size());

            if matches && narrower {
                found = Some(entry);
            }
        }

        found
    }

    /// The symbol under the given position, if any.
    pub fn lookup(&self, location: FileLocation) -> Option<SymbolId> {
        self.lookup_entry(location).map(|entry| entry.symbol)
    }

    pub fn len(&self) -> usize {
        self.by_line.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.values().all(Vec::is_empty)
    }
}
