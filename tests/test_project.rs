//! Project-level behaviour: section lifecycle, cross-document imports and
//! loading documents from disk.

use std::fs;
use std::sync::Arc;

use robot_sections::hir::{ImportedFile, Query};
use robot_sections::project::Error;
use robot_sections::syntax::{NodeKind, SectionKind};
use robot_sections::{Document, Project};
use tempfile::TempDir;

fn kinds(document: &Document) -> Vec<SectionKind> {
    document.sections().iter().map(|s| s.kind()).collect()
}

#[test]
fn test_heading_rename_replaces_section() {
    let project = Project::new();
    let doc = project.open_document(
        "/ws/a.robot",
        "*** Keywords ***\nHelper\n    Log    hi\n",
    );
    let heading = doc.sections()[0].heading();
    let old = doc.sections()[0].section().clone();
    assert_eq!(doc.sections()[0].defined_keywords().len(), 1);

    doc.edit(|tree| tree.set_text(heading, "*** Test Cases ***"));
    doc.subtree_changed(heading);

    let section = doc.section(heading).unwrap();
    assert!(!Arc::ptr_eq(&old, section.section()), "kind change must create a new section");
    assert_eq!(section.kind(), SectionKind::TestCases);
    assert!(section.defined_keywords().is_empty());
    assert_eq!(section.test_cases()[0].name, "Helper");
}

#[test]
fn test_heading_edit_keeping_kind_keeps_section() {
    let project = Project::new();
    let doc = project.open_document("/ws/a.robot", "*** Keywords ***\nHelper\n");
    let heading = doc.sections()[0].heading();
    let old = doc.sections()[0].section().clone();

    doc.edit(|tree| tree.set_text(heading, "*** Keyword ***"));
    doc.subtree_changed(heading);

    assert!(Arc::ptr_eq(&old, doc.section(heading).unwrap().section()));
}

#[test]
fn test_inserted_heading_creates_section() {
    let project = Project::new();
    let doc = project.open_document("/ws/a.robot", "*** Test Cases ***\nT\n    Step\n");
    let root = doc.tree().root();

    let heading = doc
        .edit(|tree| {
            let range = tree.root_node().range();
            let heading = tree.push(root, NodeKind::Heading, "*** Keywords ***", range)?;
            let definition = tree.push(heading, NodeKind::Definition, "Step", range)?;
            tree.push(definition, NodeKind::KeywordStatement, "", range)?;
            Some(heading)
        })
        .unwrap();
    doc.subtree_changed(root);

    assert_eq!(kinds(&doc), vec![SectionKind::TestCases, SectionKind::Keywords]);
    assert_eq!(doc.section(heading).unwrap().defined_keywords()[0].name, "Step");
    assert_eq!(doc.defined_keywords().len(), 1);
}

#[test]
fn test_reparse_discards_sections() {
    let project = Project::new();
    let doc = project.open_document("/ws/a.robot", "*** Test Cases ***\nT\n    Step\n");
    let before = doc.sections()[0].section().clone();

    let same = project.open_document("/ws/a.robot", "*** Keywords ***\nStep\n");
    assert!(Arc::ptr_eq(&doc, &same), "reparse keeps the document");
    assert_eq!(kinds(&doc), vec![SectionKind::Keywords]);
    assert!(!Arc::ptr_eq(&before, doc.sections()[0].section()));
    assert!(doc.test_cases().is_empty());
}

#[test]
fn test_section_held_across_reparse_reports_nothing() {
    let project = Project::new();
    let doc = project.open_document("/ws/a.robot", "*** Keywords ***\nOld Keyword\n");
    let sections = doc.sections();
    let stale = &sections[0];

    project.open_document("/ws/a.robot", "*** Test Cases ***\nLogin Test\nLogout Test\n");

    assert!(stale.section().is_detached());
    assert_eq!(stale.kind(), SectionKind::Keywords);
    assert!(stale.defined_keywords().is_empty());
    assert!(stale.test_cases().is_empty());
    assert!(stale.invoked_keywords().is_empty());
    assert_eq!(doc.test_cases().len(), 2);
}

#[test]
fn test_reclassified_section_is_detached() {
    let project = Project::new();
    let doc = project.open_document("/ws/a.robot", "*** Keywords ***\nHelper\n");
    let sections = doc.sections();
    let old = &sections[0];
    let heading = old.heading();

    doc.edit(|tree| tree.set_text(heading, "*** Test Cases ***"));
    doc.subtree_changed(heading);

    assert!(old.section().is_detached());
    assert!(old.defined_keywords().is_empty());
    assert!(!doc.section(heading).unwrap().section().is_detached());
}

#[test]
fn test_cyclic_resource_imports_terminate() {
    let project = Project::new();
    let a = project.open_document(
        "/ws/a.resource",
        "*** Settings ***\nResource    b.resource\n*** Keywords ***\nFrom A\n    Missing Everywhere\n",
    );
    let b = project.open_document(
        "/ws/b.resource",
        "*** Settings ***\nResource    a.resource\n*** Keywords ***\nFrom B\n",
    );
    let analysis = project.analysis();

    let transitive: Vec<_> = a.imported_files(&analysis, true).iter().map(ImportedFile::file).collect();
    assert_eq!(transitive, vec![b.file()], "a itself is never re-entered");

    // Unresolvable names walk the whole cycle and still return.
    let files = a.files_from_invoked_keywords(&analysis);
    assert!(files.is_empty());
    assert!(b.declared_variables(&analysis).is_empty());
}

#[test]
fn test_imports_do_not_keep_removed_documents_alive() {
    let project = Project::new();
    let common = project.open_document("/ws/common.resource", "*** Keywords ***\nLogin\n");
    let suite = project.open_document("/ws/suite.robot", "*** Settings ***\nResource    common.resource\n");
    let imports = suite.imported_files(&project.analysis(), false);
    assert!(imports[0].document().is_some());

    let weak = Arc::downgrade(&common);
    project.remove_document(common.file()).unwrap();
    drop(common);

    assert!(weak.upgrade().is_none(), "project and imports released the document");
    assert!(imports[0].document().is_none());
    // The removal invalidated the importer, which now finds nothing.
    let sections = suite.sections();
    let settings = &sections[0];
    assert!(!settings.section().is_cached(Query::ImportedFiles));
    assert!(suite.imported_files(&project.analysis(), false).is_empty());
}

#[test]
fn test_opening_a_resource_later_resolves_it() {
    let project = Project::new();
    let suite = project.open_document(
        "/ws/suite.robot",
        "*** Settings ***\nResource    common.resource\n*** Test Cases ***\nT\n    Login\n",
    );
    let analysis = project.analysis();
    assert!(suite.files_from_invoked_keywords(&analysis).is_empty());

    let common = project.open_document("/ws/common.resource", "*** Keywords ***\nLogin\n");
    assert!(suite.files_from_invoked_keywords(&analysis).contains(&common.file()));
}

#[test]
fn test_load_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("resources")).unwrap();
    fs::write(
        dir.path().join("suite.robot"),
        "*** Settings ***\nResource    resources/common.resource\n\n*** Test Cases ***\nLogin Works\n    Login\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("resources").join("common.resource"),
        "*** Keywords ***\nLogin\n    No Operation\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a document").unwrap();

    let project = Project::new();
    let loaded = project.load_directory(dir.path()).unwrap();
    assert_eq!(loaded.len(), 2);

    let suite = project.document_by_path(dir.path().join("suite.robot")).unwrap();
    let common = project
        .document_by_path(dir.path().join("resources/common.resource"))
        .unwrap();
    let files = suite.files_from_invoked_keywords(&project.analysis());
    assert!(files.contains(&common.file()));

    // Loading again reparses in place.
    let reloaded = project.load_directory(dir.path()).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert!(Arc::ptr_eq(&suite, &project.document(suite.file()).unwrap()));
}

#[test]
fn test_load_errors() {
    let project = Project::new();
    let missing = std::env::temp_dir().join("robot-sections-missing-dir");
    assert!(matches!(project.load_directory(&missing), Err(Error::DirectoryNotFound(_))));

    let err = project.load_file(missing.join("a.robot")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("a.robot"));
}
