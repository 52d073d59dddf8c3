//! # robot-sections
//!
//! Section-level semantic model for keyword-driven test documents.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project → Open documents, file ids, cross-file resolution
//!   ↓
//! hir     → Sections with memoized queries and explicit invalidation
//!   ↓
//! syntax  → Node tree, lexer and line reader
//!   ↓
//! base    → Primitives (FileId, TextRange)
//! ```
//!
//! ## Usage
//!
//! ```
//! use robot_sections::Project;
//!
//! let project = Project::new();
//! let suite = project.open_document(
//!     "suite.robot",
//!     "*** Test Cases ***\nLogin\n    Open Session\n",
//! );
//! let analysis = project.analysis();
//! for section in suite.sections() {
//!     let _ = section.test_cases();
//!     let _ = section.files_from_invoked_keywords(&analysis);
//! }
//! ```

/// Foundation types: FileId, TextRange
pub mod base;

/// Analysis options
pub mod config;

/// Semantic model: sections, caches, resolution seams
pub mod hir;

/// Workspace: documents, loading, the default resolver
pub mod project;

/// Node tree and plain-text reader
pub mod syntax;

pub use base::{FileId, TextRange, TextSize};
pub use config::AnalysisConfig;
pub use hir::{Analysis, Document, SectionRef};
pub use project::{HostIndex, Project};
pub use syntax::{NodeId, NodeKind, SectionKind, SyntaxTree};
