//! Per-section memoization.
//!
//! Every section carries six optional slots. A slot is `None` until its
//! query first runs, and all six are cleared together whenever the section
//! is invalidated. Clearing bumps the section's epoch; a value computed
//! against an older epoch is handed back to its caller but never stored.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::definitions::{DefinedKeyword, DefinedVariable, TestCaseDefinition};
use super::imports::ImportedFile;
use super::invocations::KeywordInvocation;
use crate::base::FileId;

/// The six cached section queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Query {
    DeclaredVariables,
    DefinedKeywords,
    TestCases,
    ImportedFiles,
    InvokedKeywords,
    ReferencedFiles,
}

impl Query {
    pub const ALL: [Query; 6] = [
        Query::DeclaredVariables,
        Query::DefinedKeywords,
        Query::TestCases,
        Query::ImportedFiles,
        Query::InvokedKeywords,
        Query::ReferencedFiles,
    ];

    /// Human readable name, used in log events.
    pub fn name(self) -> &'static str {
        match self {
            Query::DeclaredVariables => "declared variables",
            Query::DefinedKeywords => "defined keywords",
            Query::TestCases => "test cases",
            Query::ImportedFiles => "imported files",
            Query::InvokedKeywords => "invoked keywords",
            Query::ReferencedFiles => "files from invoked keywords",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical version of a section's cache. Bumped on every invalidation.
pub type Epoch = u64;

/// How often each query's collector actually ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    computed: [u64; 6],
    invalidations: u64,
}

impl CacheStats {
    /// Number of times `query` was recomputed.
    pub fn computations(&self, query: Query) -> u64 {
        self.computed[query.index()]
    }

    /// Total recomputations across all queries.
    pub fn total_computations(&self) -> u64 {
        self.computed.iter().sum()
    }

    /// Number of invalidations seen.
    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }
}

/// The six memoized collections of one section.
#[derive(Default)]
pub(crate) struct SectionCache {
    epoch: Epoch,
    pub(crate) declared_variables: Option<Arc<Vec<DefinedVariable>>>,
    pub(crate) defined_keywords: Option<Arc<Vec<DefinedKeyword>>>,
    pub(crate) test_cases: Option<Arc<Vec<TestCaseDefinition>>>,
    pub(crate) imported_files: Option<Arc<Vec<ImportedFile>>>,
    pub(crate) invoked_keywords: Option<Arc<Vec<KeywordInvocation>>>,
    pub(crate) referenced_files: Option<Arc<FxHashSet<FileId>>>,
    stats: CacheStats,
}

impl SectionCache {
    pub(crate) fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Clear all six slots at once.
    pub(crate) fn invalidate(&mut self) {
        self.epoch += 1;
        self.stats.invalidations += 1;
        self.declared_variables = None;
        self.defined_keywords = None;
        self.test_cases = None;
        self.imported_files = None;
        self.invoked_keywords = None;
        self.referenced_files = None;
    }

    pub(crate) fn record_computation(&mut self, query: Query) {
        self.stats.computed[query.index()] += 1;
    }

    /// Whether a query currently has a memoized value.
    pub(crate) fn is_cached(&self, query: Query) -> bool {
        match query {
            Query::DeclaredVariables => self.declared_variables.is_some(),
            Query::DefinedKeywords => self.defined_keywords.is_some(),
            Query::TestCases => self.test_cases.is_some(),
            Query::ImportedFiles => self.imported_files.is_some(),
            Query::InvokedKeywords => self.invoked_keywords.is_some(),
            Query::ReferencedFiles => self.referenced_files.is_some(),
        }
    }
}

// Slot accessors handed to `Section::memoize`.

pub(crate) fn declared_variables_slot(
    cache: &mut SectionCache,
) -> &mut Option<Arc<Vec<DefinedVariable>>> {
    &mut cache.declared_variables
}

pub(crate) fn defined_keywords_slot(
    cache: &mut SectionCache,
) -> &mut Option<Arc<Vec<DefinedKeyword>>> {
    &mut cache.defined_keywords
}

pub(crate) fn test_cases_slot(cache: &mut SectionCache) -> &mut Option<Arc<Vec<TestCaseDefinition>>> {
    &mut cache.test_cases
}

pub(crate) fn imported_files_slot(cache: &mut SectionCache) -> &mut Option<Arc<Vec<ImportedFile>>> {
    &mut cache.imported_files
}

pub(crate) fn invoked_keywords_slot(
    cache: &mut SectionCache,
) -> &mut Option<Arc<Vec<KeywordInvocation>>> {
    &mut cache.invoked_keywords
}

pub(crate) fn referenced_files_slot(
    cache: &mut SectionCache,
) -> &mut Option<Arc<FxHashSet<FileId>>> {
    &mut cache.referenced_files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_clears_every_slot() {
        let mut cache = SectionCache::default();
        cache.defined_keywords = Some(Arc::new(Vec::new()));
        cache.referenced_files = Some(Arc::new(FxHashSet::default()));
        assert!(cache.is_cached(Query::DefinedKeywords));

        cache.invalidate();

        assert_eq!(cache.epoch(), 1);
        for query in Query::ALL {
            assert!(!cache.is_cached(query), "{query} survived invalidation");
        }
        assert_eq!(cache.stats().invalidations(), 1);
    }

    #[test]
    fn test_stats_count_per_query() {
        let mut cache = SectionCache::default();
        cache.record_computation(Query::TestCases);
        cache.record_computation(Query::TestCases);
        cache.record_computation(Query::ImportedFiles);

        let stats = cache.stats();
        assert_eq!(stats.computations(Query::TestCases), 2);
        assert_eq!(stats.computations(Query::ImportedFiles), 1);
        assert_eq!(stats.computations(Query::DefinedKeywords), 0);
        assert_eq!(stats.total_computations(), 3);
    }
}
