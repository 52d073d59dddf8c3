//! The project: every open document plus the context to analyze them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use walkdir::WalkDir;

use super::error::{Error, Result};
use super::source::{FileSet, normalize_path};
use crate::base::FileId;
use crate::config::AnalysisConfig;
use crate::hir::{Analysis, Document, HostLanguageBridge, NoHost};

/// Owns the documents of one workspace.
///
/// Documents are shared as `Arc<Document>`; imports between them are held
/// weakly, so removing a document here really releases it.
pub struct Project {
    files: FileSet,
    documents: RwLock<IndexMap<FileId, Arc<Document>>>,
    bridge: Arc<dyn HostLanguageBridge>,
    config: AnalysisConfig,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// An empty project without host-language support.
    pub fn new() -> Self {
        Self::with_bridge(NoHost)
    }

    pub fn with_bridge(bridge: impl HostLanguageBridge + 'static) -> Self {
        Self {
            files: FileSet::new(),
            documents: RwLock::new(IndexMap::new()),
            bridge: Arc::new(bridge),
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap the host bridge. Every cached query may depend on it.
    pub fn set_bridge(&mut self, bridge: impl HostLanguageBridge + 'static) {
        self.bridge = Arc::new(bridge);
        self.invalidate_all();
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn bridge(&self) -> &dyn HostLanguageBridge {
        &*self.bridge
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// The id for `path`, assigned on first use.
    pub fn file_id(&self, path: impl AsRef<Path>) -> FileId {
        self.files.file_id(path.as_ref())
    }

    /// The context every section query runs in.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis::new(self, &*self.bridge, &self.config)
    }

    // ========================================================================
    // DOCUMENTS
    // ========================================================================

    /// Open `path` with `text`, or reparse it if already open.
    ///
    /// A reparse keeps the same `Arc<Document>`, so imports held by other
    /// documents stay valid.
    pub fn open_document(&self, path: impl AsRef<Path>, text: &str) -> Arc<Document> {
        let path = normalize_path(path.as_ref());
        let file = self.files.file_id(&path);

        if let Some(existing) = self.document(file) {
            existing.reparse(text);
            self.invalidate_others(file);
            return existing;
        }

        let document = Arc::new(Document::parse(file, path.to_string_lossy().as_ref(), text));
        self.insert(document.clone());
        document
    }

    fn insert(&self, document: Arc<Document>) {
        let file = document.file();
        tracing::debug!(file = %file, path = document.path(), "document opened");
        self.documents.write().insert(file, document);
        self.invalidate_others(file);
    }

    pub fn document(&self, file: FileId) -> Option<Arc<Document>> {
        self.documents.read().get(&file).cloned()
    }

    pub fn document_by_path(&self, path: impl AsRef<Path>) -> Option<Arc<Document>> {
        let file = self.files.lookup(path.as_ref())?;
        self.document(file)
    }

    /// Like [`document`](Self::document), for callers that need an error.
    pub fn require_document(&self, file: FileId) -> Result<Arc<Document>> {
        self.document(file).ok_or(Error::UnknownFile(file))
    }

    /// Every open document, in the order they were opened.
    pub fn documents(&self) -> Vec<Arc<Document>> {
        self.documents.read().values().cloned().collect()
    }

    /// Close a document. Its id stays reserved for its path.
    pub fn remove_document(&self, file: FileId) -> Result<()> {
        let removed = self.documents.write().shift_remove(&file);
        if removed.is_none() {
            return Err(Error::UnknownFile(file));
        }
        tracing::debug!(file = %file, "document removed");
        self.invalidate_others(file);
        Ok(())
    }

    pub fn remove_document_by_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = self
            .files
            .lookup(path)
            .ok_or_else(|| Error::UnknownPath(path.to_path_buf()))?;
        self.remove_document(file)
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Read and open one document from disk.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Arc<Document>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Ok(self.open_document(path, &text))
    }

    /// Open every document under `dir`, recursively.
    ///
    /// Files are read and parsed in parallel. A file that cannot be read
    /// fails the whole load; nothing is opened in that case.
    pub fn load_directory(&self, dir: impl AsRef<Path>) -> Result<Vec<FileId>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir) {
            let entry = entry?;
            if entry.file_type().is_file() && self.config.is_document_path(entry.path()) {
                paths.push(normalize_path(entry.path()));
            }
        }
        paths.sort();

        // Already open documents are reparsed in place to keep their `Arc`.
        let read: Vec<(FileId, String, Option<Document>)> = paths
            .par_iter()
            .map(|path| {
                let text = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
                let file = self.files.file_id(path);
                let fresh = self
                    .document(file)
                    .is_none()
                    .then(|| Document::parse(file, path.to_string_lossy().as_ref(), &text));
                Ok((file, text, fresh))
            })
            .collect::<Result<_>>()?;

        let mut loaded = Vec::with_capacity(read.len());
        for (file, text, fresh) in read {
            match fresh {
                Some(document) => {
                    self.documents.write().insert(file, Arc::new(document));
                }
                None => {
                    if let Some(existing) = self.document(file) {
                        existing.reparse(&text);
                    }
                }
            }
            loaded.push(file);
        }
        tracing::debug!(dir = %dir.display(), count = loaded.len(), "directory loaded");
        self.invalidate_all();
        Ok(loaded)
    }

    // ========================================================================
    // INVALIDATION
    // ========================================================================

    /// Drop every cached query of every document.
    pub fn invalidate_all(&self) {
        for document in self.documents() {
            document.invalidate_all();
        }
    }

    /// Opening, reparsing or removing one document can change what the
    /// others resolve to.
    fn invalidate_others(&self, changed: FileId) {
        for document in self.documents() {
            if document.file() != changed {
                document.invalidate_all();
            }
        }
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("files", &self.files.len())
            .field("documents", &self.documents.read().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_assigns_stable_ids() {
        let project = Project::new();
        let first = project.open_document("/suite/a.robot", "*** Test Cases ***\n");
        let again = project.open_document("/suite/./a.robot", "*** Keywords ***\n");

        assert_eq!(first.file(), again.file());
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(project.documents().len(), 1);
        assert_eq!(
            project.document_by_path("/suite/a.robot").unwrap().sections()[0].kind(),
            crate::syntax::SectionKind::Keywords
        );
    }

    #[test]
    fn test_remove_unknown_document_errors() {
        let project = Project::new();
        let err = project.remove_document(FileId::new(42)).unwrap_err();
        assert!(matches!(err, Error::UnknownFile(id) if id == FileId::new(42)));
        assert!(project.remove_document_by_path("/nowhere.robot").is_err());
    }

    #[test]
    fn test_load_missing_directory() {
        let project = Project::new();
        let err = project.load_directory("/definitely/not/here").unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(_)));
    }
}
