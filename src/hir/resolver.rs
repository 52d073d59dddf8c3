//! Reference resolution seam.
//!
//! A [`ReferenceResolver`] answers "what does this node point to" for
//! keyword names, import arguments and variable arguments. It does no
//! caching of its own; anything it needs from other sections goes through
//! their cached queries.

use std::sync::{Arc, Weak};

use super::bridge::{HostLanguageBridge, HostSymbol};
use super::document::Document;
use crate::base::FileId;
use crate::config::AnalysisConfig;
use crate::syntax::NodeId;

/// The target of a resolved reference.
#[derive(Clone, Debug)]
pub enum Resolved {
    /// Another document of the same language.
    ///
    /// Held weakly: resolving an import must not keep the target alive
    /// after the project drops it.
    Document {
        file: FileId,
        document: Weak<Document>,
    },
    /// A symbol of the embedded host language.
    Host(HostSymbol),
    /// A node inside a document: a user keyword or a variable definition.
    Element { file: FileId, node: NodeId },
}

impl Resolved {
    /// Wrap a live document.
    pub fn document(document: &Arc<Document>) -> Self {
        Resolved::Document {
            file: document.file(),
            document: Arc::downgrade(document),
        }
    }

    /// The file the target lives in.
    pub fn containing_file(&self) -> FileId {
        match self {
            Resolved::Document { file, .. } => *file,
            Resolved::Host(symbol) => symbol.file,
            Resolved::Element { file, .. } => *file,
        }
    }
}

/// Resolves reference nodes to their targets.
pub trait ReferenceResolver: Send + Sync {
    /// Resolve `node` of `document`, or return `None`.
    fn resolve(&self, document: &Document, node: NodeId, analysis: &Analysis<'_>) -> Option<Resolved>;
}

/// Everything a query needs besides the section itself.
#[derive(Clone, Copy)]
pub struct Analysis<'a> {
    pub resolver: &'a dyn ReferenceResolver,
    pub bridge: &'a dyn HostLanguageBridge,
    pub config: &'a AnalysisConfig,
}

impl<'a> Analysis<'a> {
    pub fn new(
        resolver: &'a dyn ReferenceResolver,
        bridge: &'a dyn HostLanguageBridge,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            resolver,
            bridge,
            config,
        }
    }

    /// Resolve a node through the configured resolver.
    pub fn resolve(&self, document: &Document, node: NodeId) -> Option<Resolved> {
        self.resolver.resolve(document, node, self)
    }
}

impl std::fmt::Debug for Analysis<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analysis")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// A resolver that never resolves anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unresolved;

impl ReferenceResolver for Unresolved {
    fn resolve(&self, _document: &Document, _node: NodeId, _analysis: &Analysis<'_>) -> Option<Resolved> {
        None
    }
}
