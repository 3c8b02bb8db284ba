//! The analysis host and the query surface exposed to an editor frontend.
//!
//! Everything position-based at this boundary uses the 0-based display
//! convention; internally lines are 1-based (see [`crate::base`]).

mod analysis;

pub use analysis::{
    AnalysisHost, DEFAULT_SCAN_TIMEOUT, Diagnostic, FileAnalysis, ParsedFile, ScanError, Severity,
};
