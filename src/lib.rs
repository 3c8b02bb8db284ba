//! # javamini-base
//!
//! Core library for lightweight Java source analysis: symbol model,
//! expression type checking, and definition/usage lookup.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost, workspace scans, hover/goto/references queries
//!   ↓
//! project   → builtin (standard library) type loading from JSON
//!   ↓
//! semantic  → scope tracking, symbol arena, two-pass gathering, type checker
//!   ↓
//! syntax    → the external parser's CST contract: nodes, tokens, tree walks
//!   ↓
//! base      → primitives (FileLocation, Bounds, CodeLocation)
//! ```
//!
//! The concrete parser for the Java grammar is *not* part of this crate.
//! Anything that can produce a [`syntax::SyntaxNode`] tree (position-annotated
//! nodes tagged with a [`syntax::GrammarRule`]) can drive the analysis.

/// Foundation types: source positions, bounds, code locations
pub mod base;

/// Syntax: the CST node/token contract and depth-first tree walking
pub mod syntax;

/// Semantic analysis: scopes, symbols, type gathering and checking
pub mod semantic;

/// Project management: builtin type table loading
pub mod project;

/// IDE features: analysis host, workspace scans, position queries
pub mod ide;

// Re-export foundation types
pub use base::{Bounds, CodeLocation, DisplayPosition, DisplayRange, FileLocation};
