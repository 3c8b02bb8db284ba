//! Source positions for CST nodes and symbols.
//!
//! The external parser reports 1-based lines and 0-based columns; everything
//! in this crate keeps that convention and only converts at the display
//! boundary (see [`DisplayRange`], which is fully 0-based).

use std::fmt;

use smol_str::SmolStr;

/// A position in a source file. Lines are 1-based, columns 0-based,
/// matching the token positions the external parser produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileLocation {
    pub line: u32,
    pub column: u32,
}

impl FileLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A start/end location pair delimiting a syntactic construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bounds {
    pub start: FileLocation,
    pub end: FileLocation,
}

impl Bounds {
    pub fn new(start: FileLocation, end: FileLocation) -> Self {
        Self { start, end }
    }

    /// Create bounds from line/column coordinates.
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: FileLocation::new(start_line, start_col),
            end: FileLocation::new(end_line, end_col),
        }
    }

    /// Bounds spanning an entire file, used for the root checking scope.
    pub fn whole_file() -> Self {
        Self {
            start: FileLocation::new(0, 0),
            end: FileLocation::new(u32::MAX, u32::MAX),
        }
    }

    /// Check if a location falls within these bounds.
    pub fn contains(&self, location: FileLocation) -> bool {
        if location.line < self.start.line || location.line > self.end.line {
            return false;
        }
        if location.line == self.start.line && location.column < self.start.column {
            return false;
        }
        if location.line == self.end.line && location.column > self.end.column {
            return false;
        }
        true
    }

    /// A size measure used for narrowest-match tie-breaking: line span
    /// dominates, column span only matters for single-line bounds.
    pub fn size(&self) -> u64 {
        let line_size = u64::from(self.end.line.saturating_sub(self.start.line));

        let column_size = if line_size == 0 {
            u64::from(self.end.column.saturating_sub(self.start.column))
        } else {
            0
        };

        line_size * 10_000 + column_size
    }

    /// Convert to the 0-based range convention editors expect.
    pub fn to_display_range(&self) -> DisplayRange {
        DisplayRange {
            start: DisplayPosition {
                // Internal lines are 1-based, display lines 0-based
                line: self.start.line.saturating_sub(1),
                character: self.start.column,
            },
            end: DisplayPosition {
                line: self.end.line.saturating_sub(1),
                character: self.end.column,
            },
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line != self.end.line {
            write!(
                f,
                "{}:{}-{}:{}",
                self.start.line, self.start.column, self.end.line, self.end.column
            )
        } else {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        }
    }
}

/// Bounds plus the file they belong to and the document version they were
/// computed against. The version detects results that are out of date with
/// respect to the editor buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CodeLocation {
    pub file_uri: SmolStr,
    pub version: i32,
    pub bounds: Bounds,
}

impl CodeLocation {
    pub fn new(file_uri: impl Into<SmolStr>, version: i32, bounds: Bounds) -> Self {
        Self {
            file_uri: file_uri.into(),
            version,
            bounds,
        }
    }

    /// Equality that ignores the document version.
    pub fn same_place(&self, other: &CodeLocation) -> bool {
        self.file_uri == other.file_uri && self.bounds == other.bounds
    }
}

impl fmt::Display for CodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.file_uri, self.version, self.bounds)
    }
}

/// A 0-based position for editor-facing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayPosition {
    pub line: u32,
    pub character: u32,
}

/// A 0-based range for editor-facing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayRange {
    pub start: DisplayPosition,
    pub end: DisplayPosition,
}
