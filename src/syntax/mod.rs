//! The concrete-syntax-tree contract between the external Java parser and
//! the analysis core.
//!
//! The parser itself lives outside this crate; it hands over a tree of
//! [`SyntaxNode`]s, each tagged with a [`GrammarRule`] and delimited by a
//! start/stop [`Token`] pair. The core never looks at raw source text, only
//! at this tree. [`walk`] drives a synchronous depth-first traversal with
//! enter/exit callbacks, which is all the gatherer and checker need.

mod node;
mod walk;

pub use node::{GrammarRule, SyntaxError, SyntaxNode, Token};
pub use walk::{Visitor, walk};
