//! Workspace management: open documents, file ids and cross-file resolution.
//!
//! [`Project`] owns the documents and implements the
//! [`ReferenceResolver`](crate::hir::ReferenceResolver) every section query
//! runs with. [`HostIndex`] is an in-memory host-language bridge.

mod error;
mod host_index;
mod resolver;
mod source;
mod workspace;

pub use error::{Error, Result};
pub use host_index::HostIndex;
pub use source::FileSet;
pub use workspace::Project;
