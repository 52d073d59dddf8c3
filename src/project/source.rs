//! File set management for tracking document paths.

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::FileId;

/// Manages the mapping between file paths and FileIds.
///
/// Ids are assigned once per path and never reused, so a document that is
/// removed and opened again gets its old id back.
#[derive(Debug, Default)]
pub struct FileSet {
    inner: RwLock<FileSetInner>,
}

#[derive(Debug, Default)]
struct FileSetInner {
    /// Path → FileId mapping
    path_to_id: IndexMap<PathBuf, FileId>,
    /// FileId → Path mapping (reverse lookup)
    id_to_path: IndexMap<FileId, PathBuf>,
    /// Next FileId to assign
    next_id: u32,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a FileId for a path.
    ///
    /// Paths are compared after lexical normalization, so `a/./b/../c.robot`
    /// and `a/c.robot` share an id.
    pub fn file_id(&self, path: &Path) -> FileId {
        let path = normalize_path(path);
        // Fast path: read lock
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.path_to_id.get(&path) {
                return id;
            }
        }

        let mut inner = self.inner.write();

        // Double-check
        if let Some(&id) = inner.path_to_id.get(&path) {
            return id;
        }

        let id = FileId::new(inner.next_id);
        inner.next_id += 1;
        inner.id_to_path.insert(id, path.clone());
        inner.path_to_id.insert(path, id);
        id
    }

    /// Look up an id without assigning one.
    pub fn lookup(&self, path: &Path) -> Option<FileId> {
        self.inner.read().path_to_id.get(&normalize_path(path)).copied()
    }

    /// Get the path for a FileId.
    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.inner.read().id_to_path.get(&file).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().path_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All known ids, in assignment order.
    pub fn files(&self) -> Vec<FileId> {
        self.inner.read().id_to_path.keys().copied().collect()
    }
}

/// Resolve `.` and `..` components without touching the file system.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    normalized.components().next_back(),
                    None | Some(Component::ParentDir)
                );
                if at_root {
                    normalized.push("..");
                } else {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
