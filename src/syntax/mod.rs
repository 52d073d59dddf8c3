//! Syntax layer: the tree the semantic model reads.
//!
//! The semantic layer only needs a child list per node, a kind tag per node
//! and the heading text of each section. [`SyntaxTree`] provides exactly
//! that, plus stable ids and in-place edit primitives so that an editor can
//! report "this subtree changed" without a re-parse.
//!
//! [`parse`] is a shallow line reader for the plain-text format, used to
//! load documents from disk and to build test fixtures.

mod kind;
mod lexer;
mod reader;
mod tree;

pub use kind::{ImportType, NodeKind, SectionKind};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use reader::parse;
pub use tree::{NodeId, NodeRef, SyntaxTree};
