//! Sections and their cached queries.
//!
//! A [`Section`] is created when the tree assigns a heading a kind, and
//! lives until that heading node is destroyed or its text reclassifies it.
//! [`SectionRef`] pairs a section with its document and exposes the six
//! memoized queries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use super::cache::{
    CacheStats, Epoch, Query, SectionCache, declared_variables_slot, defined_keywords_slot,
    imported_files_slot, invoked_keywords_slot, referenced_files_slot, test_cases_slot,
};
use super::definitions::{
    DefinedKeyword, DefinedVariable, TestCaseDefinition, collect_defined_keywords,
    collect_imported_variables, collect_section_variables, collect_test_cases,
};
use super::document::Document;
use super::imports::{ImportedFile, collect_imports};
use super::invocations::{KeywordInvocation, collect_invoked_keywords, collect_referenced_files};
use super::resolver::Analysis;
use crate::base::FileId;
use crate::syntax::{NodeId, NodeKind, NodeRef, SectionKind, SyntaxTree};

/// A heading-delimited region of a document.
pub struct Section {
    heading: NodeId,
    kind: SectionKind,
    cache: Mutex<SectionCache>,
    /// Set once the document stops tracking this section.
    detached: AtomicBool,
}

impl Section {
    pub(crate) fn new(heading: NodeId, kind: SectionKind) -> Self {
        Self {
            heading,
            kind,
            cache: Mutex::new(SectionCache::default()),
            detached: AtomicBool::new(false),
        }
    }

    /// The heading node that owns this section.
    pub fn heading(&self) -> NodeId {
        self.heading
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn is_settings(&self) -> bool {
        self.kind == SectionKind::Settings
    }

    /// Current invalidation epoch.
    pub fn epoch(&self) -> Epoch {
        self.cache.lock().epoch()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Whether `query` has a memoized value right now.
    pub fn is_cached(&self, query: Query) -> bool {
        self.cache.lock().is_cached(query)
    }

    /// Whether the heading was removed, reclassified or reparsed away.
    ///
    /// A detached section answers every query with an empty result.
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Stop answering from the document's tree, and drop the cache.
    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::Release);
        self.invalidate();
    }

    /// Drop all six memoized collections.
    pub(crate) fn invalidate(&self) {
        self.cache.lock().invalidate();
        tracing::trace!(heading = ?self.heading, kind = ?self.kind, "section cache invalidated");
    }

    /// Compute-if-absent, memoize, return.
    ///
    /// The cache lock is not held while `compute` runs, so a query may call
    /// other queries of the same section.
    fn memoize<T: Clone>(
        &self,
        query: Query,
        slot: fn(&mut SectionCache) -> &mut Option<T>,
        compute: impl FnOnce() -> T,
    ) -> T {
        let epoch = {
            let mut cache = self.cache.lock();
            if let Some(value) = slot(&mut cache) {
                return value.clone();
            }
            cache.epoch()
        };

        let start = Instant::now();
        let value = compute();
        tracing::debug!(
            heading = ?self.heading,
            query = query.name(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "computed section query"
        );

        let mut cache = self.cache.lock();
        cache.record_computation(query);
        if cache.epoch() == epoch {
            *slot(&mut cache) = Some(value.clone());
        }
        value
    }
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("heading", &self.heading)
            .field("kind", &self.kind)
            .field("epoch", &self.epoch())
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// A section of a specific document.
#[derive(Clone)]
pub struct SectionRef<'d> {
    document: &'d Document,
    section: Arc<Section>,
}

impl<'d> SectionRef<'d> {
    pub(crate) fn new(document: &'d Document, section: Arc<Section>) -> Self {
        Self { document, section }
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    pub fn section(&self) -> &Arc<Section> {
        &self.section
    }

    pub fn kind(&self) -> SectionKind {
        self.section.kind
    }

    pub fn heading(&self) -> NodeId {
        self.section.heading
    }

    fn file(&self) -> FileId {
        self.document.file()
    }

    /// The heading line, as currently in the tree.
    pub fn heading_text(&self) -> Option<String> {
        let tree = self.document.tree();
        tree.node(self.heading()).map(|node| node.text().to_string())
    }

    pub fn is_settings_section(&self) -> bool {
        self.kind() == SectionKind::Settings
    }

    pub fn contains_variables_section(&self) -> bool {
        self.kind() == SectionKind::Variables
    }

    pub fn contains_test_cases_section(&self) -> bool {
        self.kind() == SectionKind::TestCases
    }

    pub fn contains_keyword_definitions_section(&self) -> bool {
        self.kind() == SectionKind::Keywords
    }

    pub fn stats(&self) -> CacheStats {
        self.section.stats()
    }

    /// Run `f` over the heading node of the current tree snapshot.
    ///
    /// A detached section sees nothing, and neither does one whose heading
    /// id now names a different node.
    fn with_heading<R: Default>(&self, f: impl FnOnce(NodeRef<'_>, &SyntaxTree) -> R) -> R {
        if self.section.is_detached() {
            return R::default();
        }
        let tree = self.document.tree();
        match tree.node(self.heading()) {
            Some(heading)
                if heading.kind() == NodeKind::Heading
                    && SectionKind::from_heading(heading.text()) == self.kind() =>
            {
                f(heading, &tree)
            }
            _ => R::default(),
        }
    }

    // ========================================================================
    // CACHED QUERIES
    // ========================================================================

    /// Variables this section declares.
    ///
    /// A Variables section declares its direct variable rows. A Settings
    /// section sources variables from its `Variables` imports. Every other
    /// kind declares nothing.
    pub fn declared_variables(&self, analysis: &Analysis<'_>) -> Arc<Vec<DefinedVariable>> {
        self.section
            .memoize(Query::DeclaredVariables, declared_variables_slot, || {
                let variables = match self.kind() {
                    SectionKind::Variables => self
                        .with_heading(|heading, _| collect_section_variables(heading, self.file())),
                    SectionKind::Settings => {
                        let imported = self.imported_files(analysis);
                        collect_imported_variables(&imported, analysis)
                    }
                    _ => Vec::new(),
                };
                Arc::new(variables)
            })
    }

    /// User keywords defined directly in this section.
    pub fn defined_keywords(&self) -> Arc<Vec<DefinedKeyword>> {
        self.section
            .memoize(Query::DefinedKeywords, defined_keywords_slot, || {
                Arc::new(self.with_heading(|heading, _| {
                    collect_defined_keywords(self.kind(), heading, self.file())
                }))
            })
    }

    /// Test cases defined directly in this section.
    pub fn test_cases(&self) -> Arc<Vec<TestCaseDefinition>> {
        self.section.memoize(Query::TestCases, test_cases_slot, || {
            Arc::new(
                self.with_heading(|heading, _| collect_test_cases(self.kind(), heading, self.file())),
            )
        })
    }

    /// Files this section imports, built-in library last.
    pub fn imported_files(&self, analysis: &Analysis<'_>) -> Arc<Vec<ImportedFile>> {
        self.section
            .memoize(Query::ImportedFiles, imported_files_slot, || {
                Arc::new(self.with_heading(|heading, _| {
                    collect_imports(self.kind(), heading, self.document, analysis)
                }))
            })
    }

    /// Keyword invocations visible from this section.
    pub fn invoked_keywords(&self) -> Arc<Vec<KeywordInvocation>> {
        self.section
            .memoize(Query::InvokedKeywords, invoked_keywords_slot, || {
                let test_cases = self.test_cases();
                let defined_keywords = self.defined_keywords();
                Arc::new(self.with_heading(|heading, tree| {
                    collect_invoked_keywords(
                        self.kind(),
                        heading,
                        tree,
                        self.file(),
                        &test_cases,
                        &defined_keywords,
                    )
                }))
            })
    }

    /// Distinct files containing the targets of invoked keywords and their
    /// arguments.
    pub fn files_from_invoked_keywords(&self, analysis: &Analysis<'_>) -> Arc<FxHashSet<FileId>> {
        self.section
            .memoize(Query::ReferencedFiles, referenced_files_slot, || {
                let invoked = self.invoked_keywords();
                Arc::new(collect_referenced_files(&invoked, self.document, analysis))
            })
    }
}

impl std::fmt::Debug for SectionRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionRef")
            .field("file", &self.document.file())
            .field("section", &self.section)
            .finish()
    }
}
