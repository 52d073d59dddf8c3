//! File identifiers for tracking documents and host-language sources.

use std::fmt;

/// An interned identifier for a file.
///
/// `FileId` is a lightweight handle (just a u32) that uniquely identifies
/// a file within a project: a test document, a resource document, or a
/// host-language source backing a library. The path lives in the project's
/// `FileSet`.
///
/// Collections of referenced files are sets of `FileId`, so identity is a
/// plain integer comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new FileId from a raw index.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

impl From<u32> for FileId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}
