//! Structural kind tags for tree nodes.

use std::fmt;

/// How an import declaration brings its target into scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportType {
    /// `Resource  path/to/common.resource` - another DSL document.
    Resource,
    /// `Library  Collections` - a host-language class or module.
    Library,
    /// `Variables  vars.py` - a host-language source of variables.
    Variables,
}

impl ImportType {
    /// Classify the setting name that opens an import row.
    ///
    /// Matching is case-insensitive and tolerates a trailing colon
    /// (`Library:`), the way the plain-text format allows.
    pub fn from_setting_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_end_matches(':').trim();
        if name.eq_ignore_ascii_case("resource") {
            Some(ImportType::Resource)
        } else if name.eq_ignore_ascii_case("library") {
            Some(ImportType::Library)
        } else if name.eq_ignore_ascii_case("variables") {
            Some(ImportType::Variables)
        } else {
            None
        }
    }

    /// The canonical setting name.
    pub fn as_str(self) -> &'static str {
        match self {
            ImportType::Resource => "Resource",
            ImportType::Library => "Library",
            ImportType::Variables => "Variables",
        }
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structural kind of a tree node.
///
/// The reader assigns these; the semantic layer only ever dispatches on
/// them and never re-derives structure from text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document root.
    File,
    /// A section heading; its children are the section body.
    Heading,
    /// `Library` / `Resource` / `Variables` row. Children are arguments,
    /// the first one being the imported name or path.
    Import(ImportType),
    /// Any other setting row (`Documentation`, `[Tags]`, `Force Tags`, ...).
    Setting,
    /// `${NAME}  value` row of a Variables section.
    VariableDefinition,
    /// A test case or a user keyword, depending on the enclosing section.
    Definition,
    /// One executable row: optional assignments plus one invocation.
    KeywordStatement,
    /// `${result}=` target of a statement.
    Assignment,
    /// The keyword name being invoked. Children are its arguments.
    KeywordInvokable,
    /// A single argument cell.
    Argument,
    /// `# ...` comment.
    Comment,
}

impl NodeKind {
    /// Whether this node is an import declaration of any type.
    pub fn is_import(self) -> bool {
        matches!(self, NodeKind::Import(_))
    }

    /// The import type, for import declarations.
    pub fn import_type(self) -> Option<ImportType> {
        match self {
            NodeKind::Import(ty) => Some(ty),
            _ => None,
        }
    }
}

/// The kind of a section, derived from its heading text.
///
/// Classification is a total function over the heading: anything that is
/// not a recognized table title is `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Settings,
    Variables,
    TestCases,
    Keywords,
    Unknown,
}

impl SectionKind {
    /// Classify a heading line such as `*** Test Cases ***`.
    ///
    /// The heading must start with `*`; the title is matched by
    /// case-insensitive prefix so both singular and plural forms work.
    pub fn from_heading(text: &str) -> Self {
        let text = text.trim();
        if !text.starts_with('*') {
            return SectionKind::Unknown;
        }
        let title = text.trim_matches(|c: char| c == '*' || c.is_whitespace());
        let title = title.to_ascii_lowercase();

        if title.starts_with("setting") {
            SectionKind::Settings
        } else if title.starts_with("variable") {
            SectionKind::Variables
        } else if title.starts_with("test case") || title.starts_with("task") {
            SectionKind::TestCases
        } else if title.starts_with("keyword") || title.starts_with("user keyword") {
            SectionKind::Keywords
        } else {
            SectionKind::Unknown
        }
    }
}
