//! Semantic model: sections, their cached queries and reference resolution.
//!
//! This module provides:
//! - [`Document`] - a syntax tree with one [`Section`] per heading
//! - [`SectionRef`] - the six memoized section queries
//! - [`ReferenceResolver`], [`HostLanguageBridge`] - the seams to the
//!   outside world
//!
//! ## Invalidation
//!
//! Nothing recomputes on its own. An edit reports the changed node to
//! [`Document::subtree_changed`], which clears the owning section. Changes
//! to a Settings section clear the whole document.

mod bridge;
mod cache;
mod definitions;
mod document;
mod imports;
mod invocations;
mod names;
mod resolver;
mod section;

pub use bridge::{HostLanguageBridge, HostSymbol, HostSymbolKind, NoHost};
pub use cache::{CacheStats, Epoch, Query};
pub use definitions::{DefinedKeyword, DefinedVariable, TestCaseDefinition};
pub use document::Document;
pub use imports::ImportedFile;
pub use invocations::KeywordInvocation;
pub use names::{find_variable, normalize_name, split_qualified, variable_base_name};
pub use resolver::{Analysis, ReferenceResolver, Resolved, Unresolved};
pub use section::{Section, SectionRef};
