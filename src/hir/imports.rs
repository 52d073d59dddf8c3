//! Import collection for Settings sections.

use std::sync::{Arc, Weak};

use smol_str::SmolStr;

use super::bridge::{HostSymbol, HostSymbolKind};
use super::definitions::DefinedVariable;
use super::document::Document;
use super::resolver::{Analysis, Resolved};
use crate::base::FileId;
use crate::syntax::{ImportType, NodeKind, NodeRef, SectionKind};

/// The resolved target of an import declaration.
#[derive(Clone, Debug)]
pub enum ImportedFile {
    /// A resource document of the same language.
    Document {
        name: SmolStr,
        file: FileId,
        document: Weak<Document>,
    },
    /// A class-like host symbol.
    HostClass {
        name: SmolStr,
        symbol: HostSymbol,
        import_type: ImportType,
    },
    /// A module-like host symbol.
    HostModule {
        name: SmolStr,
        symbol: HostSymbol,
        import_type: ImportType,
    },
}

impl ImportedFile {
    /// The name as written in the import (or the built-in library name).
    pub fn name(&self) -> &str {
        match self {
            ImportedFile::Document { name, .. }
            | ImportedFile::HostClass { name, .. }
            | ImportedFile::HostModule { name, .. } => name,
        }
    }

    pub fn import_type(&self) -> ImportType {
        match self {
            ImportedFile::Document { .. } => ImportType::Resource,
            ImportedFile::HostClass { import_type, .. }
            | ImportedFile::HostModule { import_type, .. } => *import_type,
        }
    }

    /// The file backing this import.
    pub fn file(&self) -> FileId {
        match self {
            ImportedFile::Document { file, .. } => *file,
            ImportedFile::HostClass { symbol, .. } | ImportedFile::HostModule { symbol, .. } => {
                symbol.file
            }
        }
    }

    /// The imported document, if it is one and still alive.
    pub fn document(&self) -> Option<Arc<Document>> {
        match self {
            ImportedFile::Document { document, .. } => document.upgrade(),
            _ => None,
        }
    }

    pub fn host_symbol(&self) -> Option<&HostSymbol> {
        match self {
            ImportedFile::Document { .. } => None,
            ImportedFile::HostClass { symbol, .. } | ImportedFile::HostModule { symbol, .. } => {
                Some(symbol)
            }
        }
    }

    /// Variables this file declares.
    pub fn declared_variables(&self, analysis: &Analysis<'_>) -> Vec<DefinedVariable> {
        match self {
            ImportedFile::Document { document, .. } => document
                .upgrade()
                .map(|document| document.declared_variables(analysis))
                .unwrap_or_default(),
            ImportedFile::HostClass { symbol, .. } | ImportedFile::HostModule { symbol, .. } => {
                analysis
                    .bridge
                    .variables(symbol)
                    .into_iter()
                    .map(DefinedVariable::from_host)
                    .collect()
            }
        }
    }
}

impl PartialEq for ImportedFile {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ImportedFile::Document { name, file, .. },
                ImportedFile::Document {
                    name: other_name,
                    file: other_file,
                    ..
                },
            ) => name == other_name && file == other_file,
            (
                ImportedFile::HostClass {
                    name,
                    symbol,
                    import_type,
                },
                ImportedFile::HostClass {
                    name: other_name,
                    symbol: other_symbol,
                    import_type: other_type,
                },
            )
            | (
                ImportedFile::HostModule {
                    name,
                    symbol,
                    import_type,
                },
                ImportedFile::HostModule {
                    name: other_name,
                    symbol: other_symbol,
                    import_type: other_type,
                },
            ) => name == other_name && symbol == other_symbol && import_type == other_type,
            _ => false,
        }
    }
}

impl Eq for ImportedFile {}

/// Collect the imports declared by a section.
///
/// Non-Settings sections return immediately without scanning. Imports whose
/// argument is missing or does not resolve to something importable are
/// skipped. The configured built-in library is appended last, when the host
/// can find it.
pub(crate) fn collect_imports(
    kind: SectionKind,
    heading: NodeRef<'_>,
    document: &Document,
    analysis: &Analysis<'_>,
) -> Vec<ImportedFile> {
    if kind != SectionKind::Settings {
        return Vec::new();
    }

    let mut files = Vec::new();
    for child in heading.children() {
        let Some(import_type) = child.kind().import_type() else {
            continue;
        };
        let Some(argument) = child.first_child_of_kind(NodeKind::Argument) else {
            tracing::trace!(import = %import_type, "import without argument skipped");
            continue;
        };
        let name = SmolStr::new(argument.text());
        let resolved = analysis.resolve(document, argument.id());

        let imported = match (import_type, resolved) {
            (ImportType::Resource, Some(Resolved::Document { file, document })) => {
                Some(ImportedFile::Document {
                    name,
                    file,
                    document,
                })
            }
            (ImportType::Library | ImportType::Variables, Some(Resolved::Host(symbol))) => {
                match analysis.bridge.classify(&symbol) {
                    HostSymbolKind::ClassLike => Some(ImportedFile::HostClass {
                        name,
                        symbol,
                        import_type,
                    }),
                    HostSymbolKind::ModuleLike => Some(ImportedFile::HostModule {
                        name,
                        symbol,
                        import_type,
                    }),
                    HostSymbolKind::Neither => None,
                }
            }
            _ => None,
        };

        match imported {
            Some(imported) => files.push(imported),
            None => tracing::trace!(
                import = %import_type,
                name = argument.text(),
                "unresolved import skipped"
            ),
        }
    }

    if let Some(builtin) = builtin_library(analysis) {
        files.push(builtin);
    }
    files
}

/// The implicit library every Settings section imports.
fn builtin_library(analysis: &Analysis<'_>) -> Option<ImportedFile> {
    let name = analysis.config.builtin_library.as_ref()?;
    let symbol = analysis.bridge.find_well_known_library(name)?;
    Some(ImportedFile::HostClass {
        name: name.clone(),
        symbol,
        import_type: ImportType::Library,
    })
}
