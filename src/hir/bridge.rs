//! Host-language bridge.
//!
//! `Library` and `Variables` imports name symbols of an embedded host
//! language (a class or a module). The semantic layer never looks inside
//! that language; it asks a [`HostLanguageBridge`] to find and classify
//! symbols and to list what they contribute.

use smol_str::SmolStr;

use crate::base::FileId;

/// An opaque symbol of the host language.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostSymbol {
    /// Presentable name (`Collections`, `vars`, `Log`).
    pub name: SmolStr,
    /// The host source file that defines the symbol.
    pub file: FileId,
}

impl HostSymbol {
    pub fn new(name: impl Into<SmolStr>, file: FileId) -> Self {
        Self {
            name: name.into(),
            file,
        }
    }
}

/// How a host symbol can back an import.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostSymbolKind {
    /// A class: keyword library whose methods are keywords.
    ClassLike,
    /// A module: top-level functions are keywords, globals are variables.
    ModuleLike,
    /// Anything else (a function, a constant); cannot be imported.
    Neither,
}

/// Symbol provider for the embedded host language.
///
/// Every method fails by returning nothing; callers treat that as "this
/// import contributes no entry".
pub trait HostLanguageBridge: Send + Sync {
    /// Resolve a library or variables-file name as written in an import,
    /// relative to the importing document.
    fn resolve_symbol_by_name(&self, name: &str, scope: FileId) -> Option<HostSymbol>;

    /// Classify a previously resolved symbol.
    fn classify(&self, symbol: &HostSymbol) -> HostSymbolKind;

    /// Find a well-known library by name in the current project.
    ///
    /// Only class-like symbols qualify.
    fn find_well_known_library(&self, name: &str) -> Option<HostSymbol>;

    /// Keywords provided by a library symbol.
    fn keywords(&self, _library: &HostSymbol) -> Vec<HostSymbol> {
        Vec::new()
    }

    /// Variables provided by a variables-file symbol.
    fn variables(&self, _source: &HostSymbol) -> Vec<HostSymbol> {
        Vec::new()
    }
}

/// A bridge that knows no host symbols at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHost;

impl HostLanguageBridge for NoHost {
    fn resolve_symbol_by_name(&self, _name: &str, _scope: FileId) -> Option<HostSymbol> {
        None
    }

    fn classify(&self, _symbol: &HostSymbol) -> HostSymbolKind {
        HostSymbolKind::Neither
    }

    fn find_well_known_library(&self, _name: &str) -> Option<HostSymbol> {
        None
    }
}
