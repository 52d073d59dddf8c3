//! Locally defined symbols: user keywords, test cases and variables.
//!
//! Collection only looks at the direct children of a section and is gated
//! by the section kind, so a `Definition` node under a Test Cases heading
//! is a test case and the same node under a Keywords heading is a keyword.

use smol_str::SmolStr;

use super::bridge::HostSymbol;
use super::imports::ImportedFile;
use super::invocations::KeywordInvocation;
use super::names::{normalize_name, variable_base_name};
use super::resolver::Analysis;
use crate::base::FileId;
use crate::syntax::{ImportType, NodeId, NodeKind, NodeRef, SectionKind, SyntaxTree};

/// A user keyword defined in a Keywords section.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DefinedKeyword {
    pub name: SmolStr,
    pub file: FileId,
    pub node: NodeId,
}

impl DefinedKeyword {
    /// Whether `name` refers to this keyword under keyword-name matching.
    pub fn matches_name(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }

    /// Invocations made by this keyword's own body.
    pub fn invoked_keywords(&self, tree: &SyntaxTree) -> Vec<KeywordInvocation> {
        definition_invocations(tree, self.file, self.node)
    }
}

/// A test case defined in a Test Cases section.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestCaseDefinition {
    pub name: SmolStr,
    pub file: FileId,
    pub node: NodeId,
}

impl TestCaseDefinition {
    /// Invocations made by this test case's own body.
    pub fn invoked_keywords(&self, tree: &SyntaxTree) -> Vec<KeywordInvocation> {
        definition_invocations(tree, self.file, self.node)
    }
}

/// A declared variable, from a Variables section or a variables file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DefinedVariable {
    /// The name as written (`${HOST}`) or as the host reports it.
    pub name: SmolStr,
    pub file: FileId,
    /// The defining node, for variables declared in a document.
    pub node: Option<NodeId>,
}

impl DefinedVariable {
    pub(crate) fn from_host(symbol: HostSymbol) -> Self {
        Self {
            name: symbol.name,
            file: symbol.file,
            node: None,
        }
    }

    /// Whether a variable token (`${host}`, `@{HOST}[0]`) refers to this one.
    pub fn matches_token(&self, token: &str) -> bool {
        let Some(wanted) = variable_base_name(token) else {
            return false;
        };
        let own = variable_base_name(&self.name).unwrap_or_else(|| normalize_name(&self.name));
        own == wanted
    }
}

/// Invocations under the direct statement children of a definition.
///
/// Statements nested deeper than one level belong to whatever owns them;
/// this is the definition's own, pre-aggregated view.
pub(crate) fn definition_invocations(
    tree: &SyntaxTree,
    file: FileId,
    definition: NodeId,
) -> Vec<KeywordInvocation> {
    let Some(definition) = tree.node(definition) else {
        return Vec::new();
    };
    statement_invocations(definition, file)
}

/// Invocations under `parent`'s direct `KeywordStatement` children.
pub(crate) fn statement_invocations(parent: NodeRef<'_>, file: FileId) -> Vec<KeywordInvocation> {
    parent
        .children_of_kind(NodeKind::KeywordStatement)
        .flat_map(|statement| statement.children_of_kind(NodeKind::KeywordInvokable))
        .map(|invokable| KeywordInvocation::from_node(invokable, file))
        .collect()
}

pub(crate) fn collect_defined_keywords(
    kind: SectionKind,
    heading: NodeRef<'_>,
    file: FileId,
) -> Vec<DefinedKeyword> {
    if kind != SectionKind::Keywords {
        return Vec::new();
    }
    heading
        .children_of_kind(NodeKind::Definition)
        .map(|node| DefinedKeyword {
            name: node.text().into(),
            file,
            node: node.id(),
        })
        .collect()
}

pub(crate) fn collect_test_cases(
    kind: SectionKind,
    heading: NodeRef<'_>,
    file: FileId,
) -> Vec<TestCaseDefinition> {
    if kind != SectionKind::TestCases {
        return Vec::new();
    }
    heading
        .children_of_kind(NodeKind::Definition)
        .map(|node| TestCaseDefinition {
            name: node.text().into(),
            file,
            node: node.id(),
        })
        .collect()
}

/// Variables declared directly in a Variables section.
pub(crate) fn collect_section_variables(heading: NodeRef<'_>, file: FileId) -> Vec<DefinedVariable> {
    heading
        .children_of_kind(NodeKind::VariableDefinition)
        .map(|node| DefinedVariable {
            name: node.text().into(),
            file,
            node: Some(node.id()),
        })
        .collect()
}

/// Variables a Settings section sources from its `Variables` imports.
///
/// `Variables` imports only ever resolve to host symbols, so this never
/// re-enters a document.
pub(crate) fn collect_imported_variables(
    imported: &[ImportedFile],
    analysis: &Analysis<'_>,
) -> Vec<DefinedVariable> {
    imported
        .iter()
        .filter(|import| import.import_type() == ImportType::Variables)
        .flat_map(|import| import.declared_variables(analysis))
        .collect()
}
