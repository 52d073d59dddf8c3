//! An in-memory host-language bridge.
//!
//! Embedders without a real host language, and tests, register classes,
//! modules and the keywords and variables they provide.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::FileId;
use crate::hir::{HostLanguageBridge, HostSymbol, HostSymbolKind, normalize_name};

#[derive(Clone, Debug)]
struct HostEntry {
    symbol: HostSymbol,
    kind: HostSymbolKind,
    keywords: Vec<HostSymbol>,
    variables: Vec<HostSymbol>,
}

/// Host symbols registered by name.
#[derive(Clone, Debug, Default)]
pub struct HostIndex {
    entries: Vec<HostEntry>,
    by_name: FxHashMap<SmolStr, usize>,
}

impl HostIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class-like symbol (a keyword library).
    pub fn add_class(&mut self, name: &str, file: FileId) -> HostSymbol {
        self.add(name, file, HostSymbolKind::ClassLike)
    }

    /// Register a module-like symbol (a library or variables module).
    pub fn add_module(&mut self, name: &str, file: FileId) -> HostSymbol {
        self.add(name, file, HostSymbolKind::ModuleLike)
    }

    /// Register a symbol that resolves but cannot be imported.
    pub fn add_opaque(&mut self, name: &str, file: FileId) -> HostSymbol {
        self.add(name, file, HostSymbolKind::Neither)
    }

    fn add(&mut self, name: &str, file: FileId, kind: HostSymbolKind) -> HostSymbol {
        let symbol = HostSymbol::new(name, file);
        let key = lookup_key(name);
        let entry = HostEntry {
            symbol: symbol.clone(),
            kind,
            keywords: Vec::new(),
            variables: Vec::new(),
        };
        match self.by_name.get(&key) {
            Some(&index) => self.entries[index] = entry,
            None => {
                self.by_name.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
        symbol
    }

    /// Add a keyword to a registered library. Unknown owners are ignored.
    pub fn add_keyword(&mut self, owner: &HostSymbol, name: &str) -> Option<HostSymbol> {
        let entry = self.entry_mut(owner)?;
        let keyword = HostSymbol::new(name, owner.file);
        entry.keywords.push(keyword.clone());
        Some(keyword)
    }

    /// Add a variable to a registered variables source.
    pub fn add_variable(&mut self, owner: &HostSymbol, name: &str) -> Option<HostSymbol> {
        let entry = self.entry_mut(owner)?;
        let variable = HostSymbol::new(name, owner.file);
        entry.variables.push(variable.clone());
        Some(variable)
    }

    fn entry(&self, symbol: &HostSymbol) -> Option<&HostEntry> {
        let index = *self.by_name.get(&lookup_key(&symbol.name))?;
        self.entries.get(index).filter(|entry| entry.symbol == *symbol)
    }

    fn entry_mut(&mut self, symbol: &HostSymbol) -> Option<&mut HostEntry> {
        let index = *self.by_name.get(&lookup_key(&symbol.name))?;
        self.entries.get_mut(index).filter(|entry| entry.symbol == *symbol)
    }
}

impl HostLanguageBridge for HostIndex {
    fn resolve_symbol_by_name(&self, name: &str, _scope: FileId) -> Option<HostSymbol> {
        let index = *self.by_name.get(&lookup_key(name))?;
        self.entries.get(index).map(|entry| entry.symbol.clone())
    }

    fn classify(&self, symbol: &HostSymbol) -> HostSymbolKind {
        self.entry(symbol)
            .map(|entry| entry.kind)
            .unwrap_or(HostSymbolKind::Neither)
    }

    fn find_well_known_library(&self, name: &str) -> Option<HostSymbol> {
        let index = *self.by_name.get(&lookup_key(name))?;
        let entry = self.entries.get(index)?;
        (entry.kind == HostSymbolKind::ClassLike).then(|| entry.symbol.clone())
    }

    fn keywords(&self, library: &HostSymbol) -> Vec<HostSymbol> {
        self.entry(library)
            .map(|entry| entry.keywords.clone())
            .unwrap_or_default()
    }

    fn variables(&self, source: &HostSymbol) -> Vec<HostSymbol> {
        self.entry(source)
            .map(|entry| entry.variables.clone())
            .unwrap_or_default()
    }
}

/// `libs/My_Lib.py`, `MyLib.py` and `my lib` all look up `mylib`.
fn lookup_key(name: &str) -> SmolStr {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let name = name.strip_suffix(".py").unwrap_or(name);
    normalize_name(name)
}
