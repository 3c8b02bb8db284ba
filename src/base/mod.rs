//! Foundation types for javamini.
//!
//! This module provides the position primitives used throughout the analyzer:
//! - [`FileLocation`] - a line/column pair (1-based line, 0-based column)
//! - [`Bounds`] - a start/end location pair delimiting a syntactic construct
//! - [`CodeLocation`] - bounds plus the file URI and document version
//! - [`DisplayRange`] - the 0-based range convention used by editors
//!
//! This module has NO dependencies on other javamini modules.

mod location;

pub use location::{Bounds, CodeLocation, DisplayPosition, DisplayRange, FileLocation};
