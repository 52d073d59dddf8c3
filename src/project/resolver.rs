//! Reference resolution across the documents of a project.
//!
//! Resolution is read-only: it consults the cached queries of the
//! documents involved and never stores anything itself.

use std::path::{Path, PathBuf};

use super::source::normalize_path;
use super::workspace::Project;
use crate::hir::{
    Analysis, Document, HostSymbol, ImportedFile, ReferenceResolver, Resolved, find_variable,
    normalize_name, split_qualified, variable_base_name,
};
use crate::syntax::{ImportType, NodeId, NodeKind};

/// Placeholder for the directory of the importing document.
const CURDIR: &str = "${CURDIR}";

impl ReferenceResolver for Project {
    fn resolve(&self, document: &Document, node: NodeId, analysis: &Analysis<'_>) -> Option<Resolved> {
        let tree = document.tree();
        let target = tree.node(node)?;
        let text = target.text();

        match target.kind() {
            NodeKind::KeywordInvokable => self.resolve_keyword(document, text, analysis),
            NodeKind::Argument => {
                let parent = target.parent()?;
                let is_import_name = parent.kind().is_import()
                    && parent
                        .first_child_of_kind(NodeKind::Argument)
                        .is_some_and(|first| first.id() == node);
                match parent.kind().import_type() {
                    Some(ImportType::Resource) if is_import_name => self.resolve_resource(document, text),
                    Some(ImportType::Library | ImportType::Variables) if is_import_name => analysis
                        .bridge
                        .resolve_symbol_by_name(text, document.file())
                        .map(Resolved::Host),
                    _ => self.resolve_variable(document, text, analysis),
                }
            }
            _ => None,
        }
    }
}

impl Project {
    /// Find an open document for a resource import path.
    ///
    /// The path is taken relative to the importing document first. Failing
    /// that, any open document with the same file name matches.
    fn resolve_resource(&self, document: &Document, raw: &str) -> Option<Resolved> {
        let base = Path::new(document.path()).parent().unwrap_or(Path::new(""));
        let expanded = raw.replace(CURDIR, &base.to_string_lossy());
        let expanded = Path::new(&expanded);
        let candidate: PathBuf = if expanded.is_absolute() {
            normalize_path(expanded)
        } else {
            normalize_path(&base.join(expanded))
        };

        if let Some(target) = self.document_by_path(&candidate) {
            return Some(Resolved::document(&target));
        }

        let file_name = expanded.file_name()?;
        let target = self
            .documents()
            .into_iter()
            .find(|open| Path::new(open.path()).file_name() == Some(file_name));
        if target.is_none() {
            tracing::trace!(path = raw, "resource not found");
        }
        target.map(|target| Resolved::document(&target))
    }

    /// Find the definition a keyword name refers to.
    ///
    /// Search order: the document's own keywords, then imported resources
    /// (transitively) and libraries in import order. A qualified name such
    /// as `BuiltIn.Log` only looks inside the named owner; if no owner of
    /// that name exists, the whole text is tried as a plain keyword name.
    fn resolve_keyword(&self, document: &Document, name: &str, analysis: &Analysis<'_>) -> Option<Resolved> {
        if let Some((owner, keyword)) = split_qualified(name) {
            if let Some(found) = self.find_keyword(document, keyword, Some(owner), analysis) {
                return Some(found);
            }
        }
        self.find_keyword(document, name, None, analysis)
    }

    fn find_keyword(
        &self,
        document: &Document,
        keyword: &str,
        owner: Option<&str>,
        analysis: &Analysis<'_>,
    ) -> Option<Resolved> {
        let owner = owner.map(normalize_name);
        let owned_by = |name: &str| owner.as_ref().is_none_or(|owner| *owner == normalize_name(name));

        if owned_by(document.name()) {
            if let Some(found) = local_keyword(document, keyword) {
                return Some(found);
            }
        }

        let wanted = normalize_name(keyword);
        for import in document.imported_files(analysis, true) {
            match &import {
                ImportedFile::Document { .. } => {
                    let Some(target) = import.document() else {
                        continue;
                    };
                    if owned_by(target.name()) {
                        if let Some(found) = local_keyword(&target, keyword) {
                            return Some(found);
                        }
                    }
                }
                ImportedFile::HostClass { symbol, import_type, .. }
                | ImportedFile::HostModule { symbol, import_type, .. } => {
                    if *import_type != ImportType::Library || !owned_by(library_name(import.name())) {
                        continue;
                    }
                    let found = analysis
                        .bridge
                        .keywords(symbol)
                        .into_iter()
                        .find(|candidate: &HostSymbol| normalize_name(&candidate.name) == wanted);
                    if let Some(found) = found {
                        return Some(Resolved::Host(found));
                    }
                }
            }
        }
        None
    }

    /// Find the declaration of the first variable used in an argument.
    ///
    /// Looks at the document's own Variables sections and variables files,
    /// then at every transitively imported resource.
    fn resolve_variable(&self, document: &Document, text: &str, analysis: &Analysis<'_>) -> Option<Resolved> {
        let token = find_variable(text)?;
        variable_base_name(token)?;

        let found = document
            .declared_variables(analysis)
            .into_iter()
            .find(|variable| variable.matches_token(token));
        if let Some(variable) = found {
            return Some(declared(variable));
        }

        document
            .imported_files(analysis, true)
            .iter()
            .filter_map(ImportedFile::document)
            .find_map(|imported| {
                imported
                    .declared_variables(analysis)
                    .into_iter()
                    .find(|variable| variable.matches_token(token))
            })
            .map(declared)
    }
}

fn local_keyword(document: &Document, keyword: &str) -> Option<Resolved> {
    document
        .defined_keywords()
        .into_iter()
        .find(|defined| defined.matches_name(keyword))
        .map(|defined| Resolved::Element {
            file: defined.file,
            node: defined.node,
        })
}

fn declared(variable: crate::hir::DefinedVariable) -> Resolved {
    match variable.node {
        Some(node) => Resolved::Element {
            file: variable.file,
            node,
        },
        None => Resolved::Host(HostSymbol::new(variable.name, variable.file)),
    }
}

/// `libs/MyLib.py` and `MyLib` both name the library `MyLib`; a module
/// path such as `my.pkg.Lib` keeps its dots.
fn library_name(import_name: &str) -> &str {
    let name = import_name.rsplit(['/', '\\']).next().unwrap_or(import_name);
    name.strip_suffix(".py").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::project::HostIndex;
    use rstest::rstest;

    fn project() -> Project {
        let mut host = HostIndex::new();
        let builtin = host.add_class("BuiltIn", FileId::new(100));
        host.add_keyword(&builtin, "Log");
        Project::with_bridge(host)
    }

    fn invokable(document: &Document, name: &str) -> NodeId {
        document
            .tree()
            .root_node()
            .descendants()
            .find(|n| n.kind() == NodeKind::KeywordInvokable && n.text() == name)
            .unwrap()
            .id()
    }

    #[test]
    fn test_resource_path_relative_to_importer() {
        let project = project();
        let common = project.open_document("/ws/res/common.resource", "*** Keywords ***\nLogin\n");
        let suite = project.open_document(
            "/ws/suites/login.robot",
            "*** Settings ***\nResource    ../res/common.resource\n",
        );

        let imports = suite.imported_files(&project.analysis(), false);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].file(), common.file());
        assert_eq!(imports[1].name(), "BuiltIn");
    }

    #[test]
    fn test_resource_curdir_and_file_name_fallback() {
        let project = project();
        let common = project.open_document("/ws/common.resource", "");
        let suite = project.open_document(
            "/ws/a.robot",
            "*** Settings ***\nResource    ${CURDIR}/common.resource\nResource    elsewhere/common.resource\n",
        );

        let imports = suite.imported_files(&project.analysis(), false);
        assert_eq!(imports[0].file(), common.file());
        assert_eq!(imports[1].file(), common.file());
    }

    #[test]
    fn test_qualified_keyword_only_searches_owner() {
        let project = project();
        project.open_document("/ws/common.resource", "*** Keywords ***\nLog\n");
        let suite = project.open_document(
            "/ws/a.robot",
            "*** Settings ***\nResource    common.resource\n*** Test Cases ***\nT\n    BuiltIn.Log    hi\n    Log    hi\n",
        );
        let analysis = project.analysis();

        let qualified = analysis.resolve(&suite, invokable(&suite, "BuiltIn.Log")).unwrap();
        assert!(matches!(qualified, Resolved::Host(ref symbol) if symbol.name == "Log"));

        // Unqualified: the resource is imported before the implicit library.
        let plain = analysis.resolve(&suite, invokable(&suite, "Log")).unwrap();
        assert!(matches!(plain, Resolved::Element { .. }));
    }

    #[test]
    fn test_qualified_keyword_of_dotted_library() {
        let mut host = HostIndex::new();
        let lib = host.add_class("my.pkg.Lib", FileId::new(200));
        host.add_keyword(&lib, "Do It");
        let files = host.add_module("files", FileId::new(201));
        host.add_keyword(&files, "Touch");
        let project = Project::with_bridge(host);
        let suite = project.open_document(
            "/ws/a.robot",
            "*** Settings ***\nLibrary    my.pkg.Lib\nLibrary    libs/files.py\n*** Test Cases ***\nT\n    my.pkg.Lib.Do It\n    files.Touch\n    Lib.Do It\n",
        );
        let analysis = project.analysis();

        let dotted = analysis.resolve(&suite, invokable(&suite, "my.pkg.Lib.Do It")).unwrap();
        assert_eq!(dotted.containing_file(), FileId::new(200));
        let by_path = analysis.resolve(&suite, invokable(&suite, "files.Touch")).unwrap();
        assert_eq!(by_path.containing_file(), FileId::new(201));
        // The owner is the whole import name, not its last segment.
        assert!(analysis.resolve(&suite, invokable(&suite, "Lib.Do It")).is_none());
    }

    #[rstest]
    #[case("MyLib", "MyLib")]
    #[case("libs/MyLib.py", "MyLib")]
    #[case("my.pkg.Lib", "my.pkg.Lib")]
    #[case("C:\\libs\\Win.py", "Win")]
    fn test_library_name(#[case] import_name: &str, #[case] expected: &str) {
        assert_eq!(library_name(import_name), expected);
    }

    #[test]
    fn test_variable_argument_resolution() {
        let project = project();
        let suite = project.open_document(
            "/ws/a.robot",
            "*** Variables ***\n${HOST}    localhost\n*** Test Cases ***\nT\n    Log    url=http://${host}/\n",
        );
        let tree = suite.tree();
        let argument = tree
            .root_node()
            .descendants()
            .find(|n| n.kind() == NodeKind::Argument && n.text().contains("${host}"))
            .unwrap()
            .id();

        let resolved = project.analysis().resolve(&suite, argument).unwrap();
        assert_eq!(resolved.containing_file(), suite.file());
    }
}
