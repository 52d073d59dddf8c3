//! Documents: a syntax tree plus the sections assigned to its headings.
//!
//! The tree is held as an immutable snapshot behind a lock. An edit clones
//! the snapshot if a reader still holds it, mutates the copy and swaps it
//! in. Callers report what they touched through [`Document::subtree_changed`].

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use super::bridge::HostSymbol;
use super::definitions::{DefinedKeyword, DefinedVariable, TestCaseDefinition};
use super::imports::ImportedFile;
use super::resolver::Analysis;
use super::section::{Section, SectionRef};
use crate::base::FileId;
use crate::syntax::{ImportType, NodeId, NodeKind, SectionKind, SyntaxTree, parse};

/// One parsed document of the language.
pub struct Document {
    file: FileId,
    path: Arc<str>,
    tree: RwLock<Arc<SyntaxTree>>,
    sections: RwLock<IndexMap<NodeId, Arc<Section>>>,
    import_epoch: AtomicU64,
}

impl Document {
    pub fn new(file: FileId, path: impl Into<Arc<str>>, tree: SyntaxTree) -> Self {
        let sections = build_sections(&tree);
        Self {
            file,
            path: path.into(),
            tree: RwLock::new(Arc::new(tree)),
            sections: RwLock::new(sections),
            import_epoch: AtomicU64::new(0),
        }
    }

    /// Parse `text` into a new document.
    pub fn parse(file: FileId, path: impl Into<Arc<str>>, text: &str) -> Self {
        Self::new(file, path, parse(text))
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name without directory and extension, as used in qualified
    /// keyword names (`common.Login`).
    pub fn name(&self) -> &str {
        Path::new(self.path())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(self.path())
    }

    /// The current tree snapshot.
    pub fn tree(&self) -> Arc<SyntaxTree> {
        self.tree.read().clone()
    }

    /// Bumped whenever a Settings section of this document changes.
    pub fn import_epoch(&self) -> u64 {
        self.import_epoch.load(Ordering::Acquire)
    }

    // ========================================================================
    // SECTIONS
    // ========================================================================

    /// Sections in heading order.
    pub fn sections(&self) -> Vec<SectionRef<'_>> {
        self.sections
            .read()
            .values()
            .map(|section| SectionRef::new(self, section.clone()))
            .collect()
    }

    /// The section owned by `heading`.
    pub fn section(&self, heading: NodeId) -> Option<SectionRef<'_>> {
        let section = self.sections.read().get(&heading).cloned()?;
        Some(SectionRef::new(self, section))
    }

    /// The section whose heading is `node` or an ancestor of `node`.
    pub fn section_containing(&self, node: NodeId) -> Option<SectionRef<'_>> {
        let heading = self.owning_heading(&self.tree(), node)?;
        self.section(heading)
    }

    fn owning_heading(&self, tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
        let node = tree.node(node)?;
        if node.kind() == NodeKind::Heading {
            return Some(node.id());
        }
        node.ancestors()
            .find(|ancestor| ancestor.kind() == NodeKind::Heading)
            .map(|heading| heading.id())
    }

    // ========================================================================
    // EDITING
    // ========================================================================

    /// Mutate the tree in place.
    ///
    /// Readers holding the previous snapshot keep it. Follow up with
    /// [`subtree_changed`](Self::subtree_changed) for the touched node.
    pub fn edit<R>(&self, f: impl FnOnce(&mut SyntaxTree) -> R) -> R {
        let mut tree = self.tree.write();
        f(Arc::make_mut(&mut tree))
    }

    /// React to a change at or below `node`.
    ///
    /// Drops the owning section's cache. A change to the root or to a
    /// heading re-syncs the section list first. Touching a Settings section
    /// invalidates every section of the document.
    pub fn subtree_changed(&self, node: NodeId) {
        let tree = self.tree();
        let Some(changed) = tree.node(node) else {
            tracing::trace!(file = %self.file, node = ?node, "change reported for a dead node");
            return;
        };

        let mut imports_affected = false;
        if matches!(changed.kind(), NodeKind::File | NodeKind::Heading) {
            imports_affected |= self.sync_sections(&tree);
        }

        let owner = self
            .owning_heading(&tree, node)
            .and_then(|heading| self.sections.read().get(&heading).cloned());
        if let Some(section) = owner {
            section.invalidate();
            imports_affected |= section.is_settings();
        }

        if imports_affected {
            self.imports_changed();
        }
    }

    /// Invalidate every section after an import change.
    pub fn imports_changed(&self) {
        self.import_epoch.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(file = %self.file, "imports changed, invalidating all sections");
        self.invalidate_all();
    }

    /// Replace the whole tree. Every heading is new, so every section is.
    pub fn reparse(&self, text: &str) {
        let tree = parse(text);
        let sections = build_sections(&tree);
        *self.tree.write() = Arc::new(tree);
        let previous = std::mem::replace(&mut *self.sections.write(), sections);
        // Node ids restart with the new tree.
        for section in previous.values() {
            section.detach();
        }
        self.import_epoch.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(file = %self.file, sections = self.sections.read().len(), "document reparsed");
    }

    /// Drop every section's cache.
    pub fn invalidate_all(&self) {
        let sections: Vec<_> = self.sections.read().values().cloned().collect();
        for section in sections {
            section.invalidate();
        }
    }

    /// Reconcile the section list with the tree's headings.
    ///
    /// A heading keeps its section while its kind is unchanged. Returns
    /// whether a Settings section appeared, disappeared or was replaced.
    fn sync_sections(&self, tree: &SyntaxTree) -> bool {
        let mut sections = self.sections.write();
        let mut next = IndexMap::with_capacity(sections.len());
        let mut imports_affected = false;

        for heading in tree.root_node().children_of_kind(NodeKind::Heading) {
            let kind = SectionKind::from_heading(heading.text());
            let section = match sections.swap_remove(&heading.id()) {
                Some(existing) if existing.kind() == kind => existing,
                replaced => {
                    if let Some(old) = replaced {
                        tracing::trace!(heading = ?heading.id(), from = ?old.kind(), to = ?kind, "section reclassified");
                        old.detach();
                        imports_affected |= old.is_settings();
                    }
                    imports_affected |= kind == SectionKind::Settings;
                    Arc::new(Section::new(heading.id(), kind))
                }
            };
            next.insert(heading.id(), section);
        }

        for removed in sections.values() {
            removed.detach();
            imports_affected |= removed.is_settings();
        }
        *sections = next;
        imports_affected
    }

    // ========================================================================
    // DOCUMENT-WIDE VIEWS
    // ========================================================================

    /// User keywords defined anywhere in the document.
    pub fn defined_keywords(&self) -> Vec<DefinedKeyword> {
        self.sections()
            .iter()
            .filter(|section| section.contains_keyword_definitions_section())
            .flat_map(|section| section.defined_keywords().iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    pub fn test_cases(&self) -> Vec<TestCaseDefinition> {
        self.sections()
            .iter()
            .filter(|section| section.contains_test_cases_section())
            .flat_map(|section| section.test_cases().iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Variables declared by the document's Variables and Settings sections.
    pub fn declared_variables(&self, analysis: &Analysis<'_>) -> Vec<DefinedVariable> {
        self.sections()
            .iter()
            .flat_map(|section| section.declared_variables(analysis).iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Imports of the document's Settings sections.
    ///
    /// With `transitive`, resource documents are followed breadth-first.
    /// Each document is entered once, and host imports are reported once
    /// per symbol and import type.
    pub fn imported_files(&self, analysis: &Analysis<'_>, transitive: bool) -> Vec<ImportedFile> {
        let direct: Vec<ImportedFile> = self
            .sections()
            .iter()
            .filter(|section| section.is_settings_section())
            .flat_map(|section| section.imported_files(analysis).iter().cloned().collect::<Vec<_>>())
            .collect();
        if !transitive {
            return direct;
        }

        let mut visited = FxHashSet::default();
        visited.insert(self.file);
        let mut seen_hosts: FxHashSet<(HostSymbol, ImportType)> = FxHashSet::default();
        let mut queue: VecDeque<ImportedFile> = direct.into();
        let mut result = Vec::new();

        while let Some(import) = queue.pop_front() {
            match &import {
                ImportedFile::Document { file, .. } => {
                    if !visited.insert(*file) {
                        tracing::trace!(file = %file, "resource already visited");
                        continue;
                    }
                    if let Some(document) = import.document() {
                        queue.extend(document.imported_files(analysis, false));
                    }
                }
                ImportedFile::HostClass { symbol, import_type, .. }
                | ImportedFile::HostModule { symbol, import_type, .. } => {
                    if !seen_hosts.insert((symbol.clone(), *import_type)) {
                        continue;
                    }
                }
            }
            result.push(import);
        }
        result
    }

    /// Union of the referenced files of every section.
    pub fn files_from_invoked_keywords(&self, analysis: &Analysis<'_>) -> FxHashSet<FileId> {
        let mut files = FxHashSet::default();
        for section in self.sections() {
            files.extend(section.files_from_invoked_keywords(analysis).iter().copied());
        }
        files
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("file", &self.file)
            .field("path", &self.path)
            .field("sections", &self.sections.read().len())
            .finish()
    }
}

fn build_sections(tree: &SyntaxTree) -> IndexMap<NodeId, Arc<Section>> {
    tree.root_node()
        .children_of_kind(NodeKind::Heading)
        .map(|heading| {
            let kind = SectionKind::from_heading(heading.text());
            (heading.id(), Arc::new(Section::new(heading.id(), kind)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::hir::bridge::NoHost;
    use crate::hir::cache::Query;
    use crate::hir::resolver::Unresolved;

    const TEXT: &str = "\
*** Settings ***
Library    Collections

*** Test Cases ***
Login Works
    Open Session

*** Keywords ***
Open Session
    Log    hi
";

    fn heading_of(document: &Document, kind: SectionKind) -> NodeId {
        document
            .sections()
            .into_iter()
            .find(|section| section.kind() == kind)
            .unwrap()
            .heading()
    }

    #[test]
    fn test_sections_follow_heading_order() {
        let document = Document::parse(FileId::new(0), "suite.robot", TEXT);
        let kinds: Vec<_> = document.sections().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::Settings, SectionKind::TestCases, SectionKind::Keywords]
        );
        assert_eq!(document.name(), "suite");
    }

    #[test]
    fn test_body_change_invalidates_only_owner() {
        let document = Document::parse(FileId::new(0), "suite.robot", TEXT);
        let tests = heading_of(&document, SectionKind::TestCases);
        let keywords = heading_of(&document, SectionKind::Keywords);

        document.section(tests).unwrap().test_cases();
        document.section(keywords).unwrap().defined_keywords();

        let definition = document
            .tree()
            .node(keywords)
            .unwrap()
            .first_child_of_kind(NodeKind::Definition)
            .unwrap()
            .id();
        document.edit(|tree| tree.set_text(definition, "Open Connection"));
        document.subtree_changed(definition);

        assert!(document.section(tests).unwrap().section().is_cached(Query::TestCases));
        let keywords = document.section(keywords).unwrap();
        assert!(!keywords.section().is_cached(Query::DefinedKeywords));
        assert_eq!(keywords.defined_keywords()[0].name, "Open Connection");
    }

    #[test]
    fn test_settings_change_invalidates_everything() {
        let document = Document::parse(FileId::new(0), "suite.robot", TEXT);
        let settings = heading_of(&document, SectionKind::Settings);
        let tests = heading_of(&document, SectionKind::TestCases);
        document.section(tests).unwrap().test_cases();

        let epoch = document.import_epoch();
        let import = document
            .tree()
            .node(settings)
            .unwrap()
            .children()
            .next()
            .unwrap()
            .id();
        document.subtree_changed(import);

        assert_eq!(document.import_epoch(), epoch + 1);
        assert!(!document.section(tests).unwrap().section().is_cached(Query::TestCases));
    }

    #[test]
    fn test_heading_rename_replaces_section() {
        let document = Document::parse(FileId::new(0), "suite.robot", TEXT);
        let heading = heading_of(&document, SectionKind::Keywords);
        let before = document.section(heading).unwrap().section().clone();

        document.edit(|tree| tree.set_text(heading, "*** Test Cases ***"));
        document.subtree_changed(heading);

        let after = document.section(heading).unwrap();
        assert_eq!(after.kind(), SectionKind::TestCases);
        assert!(!Arc::ptr_eq(&before, after.section()));
        assert_eq!(after.test_cases()[0].name, "Open Session");
    }

    #[test]
    fn test_removed_heading_drops_section() {
        let document = Document::parse(FileId::new(0), "suite.robot", TEXT);
        let heading = heading_of(&document, SectionKind::Keywords);

        let parent = document.edit(|tree| tree.remove_subtree(heading)).unwrap();
        document.subtree_changed(parent);

        assert_eq!(document.sections().len(), 2);
        assert!(document.section(heading).is_none());
        assert!(document.tree().removed_len() > 0);

        document.reparse(TEXT);
        assert_eq!(document.tree().removed_len(), 0);
    }

    #[test]
    fn test_reparse_rebuilds_sections() {
        let document = Document::parse(FileId::new(0), "suite.robot", TEXT);
        document.reparse("*** Variables ***\n${X}    1\n");

        let config = AnalysisConfig::default();
        let analysis = Analysis::new(&Unresolved, &NoHost, &config);
        let variables = document.declared_variables(&analysis);
        assert_eq!(document.sections().len(), 1);
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].name, "${X}");
    }
}
