//! Invoked keywords and the files they reference.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::definitions::{DefinedKeyword, TestCaseDefinition, statement_invocations};
use super::document::Document;
use super::resolver::Analysis;
use crate::base::FileId;
use crate::syntax::{NodeId, NodeKind, NodeRef, SectionKind, SyntaxTree};

/// One use of a keyword: its name node and its ordered argument nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeywordInvocation {
    /// The keyword name as written.
    pub name: SmolStr,
    pub file: FileId,
    /// The `KeywordInvokable` node.
    pub keyword: NodeId,
    /// `Argument` nodes, in order.
    pub arguments: Vec<NodeId>,
}

impl KeywordInvocation {
    pub(crate) fn from_node(invokable: NodeRef<'_>, file: FileId) -> Self {
        Self {
            name: invokable.text().into(),
            file,
            keyword: invokable.id(),
            arguments: invokable
                .children_of_kind(NodeKind::Argument)
                .map(|argument| argument.id())
                .collect(),
        }
    }
}

/// Invocations visible from a section.
///
/// Three sources, concatenated in order: the section's own statement
/// children, then each test case's own invocations, then each defined
/// keyword's own invocations. The recursion stops there: what a defined
/// keyword calls in turn is that keyword's business.
pub(crate) fn collect_invoked_keywords(
    kind: SectionKind,
    heading: NodeRef<'_>,
    tree: &SyntaxTree,
    file: FileId,
    test_cases: &[TestCaseDefinition],
    defined_keywords: &[DefinedKeyword],
) -> Vec<KeywordInvocation> {
    if kind == SectionKind::Unknown {
        return Vec::new();
    }
    let mut results = statement_invocations(heading, file);
    for test_case in test_cases {
        results.extend(test_case.invoked_keywords(tree));
    }
    for keyword in defined_keywords {
        results.extend(keyword.invoked_keywords(tree));
    }
    results
}

/// Distinct files containing whatever the invoked keyword names and their
/// arguments resolve to. Unresolved names contribute nothing.
pub(crate) fn collect_referenced_files(
    invocations: &[KeywordInvocation],
    document: &Document,
    analysis: &Analysis<'_>,
) -> FxHashSet<FileId> {
    let mut files = FxHashSet::default();
    for invocation in invocations {
        match analysis.resolve(document, invocation.keyword) {
            Some(resolved) => {
                files.insert(resolved.containing_file());
            }
            None => tracing::trace!(keyword = %invocation.name, "invoked keyword unresolved"),
        }
        for &argument in &invocation.arguments {
            if let Some(resolved) = analysis.resolve(document, argument) {
                files.insert(resolved.containing_file());
            }
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::definitions::{collect_defined_keywords, collect_test_cases};
    use crate::syntax::parse;

    #[test]
    fn test_invocation_arguments_in_order() {
        let tree = parse("*** Test Cases ***\nT\n    Should Be Equal    ${a}    ${b}\n");
        let invokable = tree
            .root_node()
            .descendants()
            .find(|n| n.kind() == NodeKind::KeywordInvokable)
            .unwrap();
        let invocation = KeywordInvocation::from_node(invokable, FileId::new(1));

        assert_eq!(invocation.name, "Should Be Equal");
        let args: Vec<_> = invocation
            .arguments
            .iter()
            .map(|&id| tree.node(id).unwrap().text())
            .collect();
        assert_eq!(args, vec!["${a}", "${b}"]);
    }

    #[test]
    fn test_collect_concatenates_three_sources() {
        let text = "\
*** Test Cases ***
    Orphan Call
First
    Step One
Second
    Step Two
";
        let tree = parse(text);
        let file = FileId::new(0);
        let heading = tree.root_node().children().next().unwrap();
        let tests = collect_test_cases(SectionKind::TestCases, heading, file);
        let keywords = collect_defined_keywords(SectionKind::TestCases, heading, file);

        let names: Vec<_> = collect_invoked_keywords(
            SectionKind::TestCases,
            heading,
            &tree,
            file,
            &tests,
            &keywords,
        )
        .into_iter()
        .map(|i| i.name)
        .collect();
        assert_eq!(names, vec!["Orphan Call", "Step One", "Step Two"]);
    }

    #[test]
    fn test_unknown_section_invokes_nothing() {
        let tree = parse("*** Comments ***\n    Log    hidden\n");
        let heading = tree.root_node().children().next().unwrap();
        let invoked =
            collect_invoked_keywords(SectionKind::Unknown, heading, &tree, FileId::new(0), &[], &[]);
        assert!(invoked.is_empty());
    }
}
