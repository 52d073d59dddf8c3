//! Line-oriented reader from plain text to a [`SyntaxTree`].
//!
//! This is deliberately shallow: it recognizes rows, cells, indentation,
//! `...` continuation rows and a handful of reserved setting names. It does
//! not validate anything; unrecognized rows still become nodes so the
//! semantic layer sees every child of a section.

use smol_str::SmolStr;

use super::kind::{ImportType, NodeKind, SectionKind};
use super::lexer::{Lexer, TokenKind};
use super::tree::{NodeId, SyntaxTree};
use crate::base::TextRange;

/// Section-level settings whose value is a keyword call.
const FIXTURE_SETTINGS: &[&str] = &[
    "suite setup",
    "suite teardown",
    "test setup",
    "test teardown",
    "task setup",
    "task teardown",
];

/// Definition-level settings whose value is a keyword call.
const FIXTURE_BRACKET_SETTINGS: &[&str] = &["[setup]", "[teardown]"];

/// Control-structure markers that never name a keyword.
const CONTROL_MARKERS: &[&str] = &[
    "FOR", "END", "IF", "ELSE", "ELSE IF", "WHILE", "TRY", "EXCEPT", "FINALLY", "BREAK",
    "CONTINUE", "RETURN",
];

#[derive(Debug, Clone, Copy)]
struct Cell<'a> {
    text: &'a str,
    range: TextRange,
}

#[derive(Debug, Default)]
struct Row<'a> {
    indented: bool,
    cells: Vec<Cell<'a>>,
    comment: Option<Cell<'a>>,
}

/// Split the token stream into rows.
fn rows(text: &str) -> Vec<Row<'_>> {
    let mut rows = Vec::new();
    let mut row = Row::default();
    let mut at_line_start = true;

    for token in Lexer::new(text) {
        match token.kind {
            TokenKind::Newline => {
                rows.push(std::mem::take(&mut row));
                at_line_start = true;
                continue;
            }
            TokenKind::Whitespace | TokenKind::Error => {
                if at_line_start {
                    row.indented = true;
                }
            }
            TokenKind::Comment => {
                row.comment = Some(Cell {
                    text: token.text,
                    range: token.range,
                });
            }
            TokenKind::Cell => {
                row.cells.push(Cell {
                    text: token.text,
                    range: token.range,
                });
            }
        }
        at_line_start = false;
    }
    if !row.cells.is_empty() || row.comment.is_some() {
        rows.push(row);
    }
    rows
}

fn span(cells: &[Cell<'_>]) -> TextRange {
    match (cells.first(), cells.last()) {
        (Some(first), Some(last)) => first.range.cover(last.range),
        _ => TextRange::default(),
    }
}

/// `${name}`, `@{name}` or `&{name}`, optionally followed by `=`.
fn is_assignment(cell: &str) -> bool {
    let cell = cell.trim_end_matches('=').trim_end();
    cell.len() >= 3
        && matches!(cell.as_bytes()[0], b'$' | b'@' | b'&')
        && cell.as_bytes()[1] == b'{'
        && cell.ends_with('}')
}

fn is_one_of(name: &str, names: &[&str]) -> bool {
    let name = name.trim_end_matches(':').trim();
    names.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
}

struct Reader {
    tree: SyntaxTree,
    section: Option<(NodeId, SectionKind)>,
    definition: Option<NodeId>,
    /// Where `...` continuation cells go.
    continuation: Option<NodeId>,
}

impl Reader {
    fn new() -> Self {
        Self {
            tree: SyntaxTree::new(),
            section: None,
            definition: None,
            continuation: None,
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind, cell: Cell<'_>) -> Option<NodeId> {
        self.tree.push(parent, kind, cell.text, cell.range)
    }

    fn push_arguments(&mut self, parent: NodeId, cells: &[Cell<'_>]) {
        for &cell in cells {
            self.push(parent, NodeKind::Argument, cell);
        }
    }

    fn read_row(&mut self, row: Row<'_>) {
        let Some(first) = row.cells.first().copied() else {
            if let Some(comment) = row.comment {
                let parent = self
                    .definition
                    .or(self.section.map(|(heading, _)| heading))
                    .unwrap_or_else(|| self.tree.root());
                self.push(parent, NodeKind::Comment, comment);
            }
            return;
        };

        if !row.indented && first.text.starts_with('*') {
            self.start_section(&row.cells);
            return;
        }

        let Some((heading, kind)) = self.section else {
            // Data before the first heading is ignored.
            return;
        };

        let cells = if row.indented {
            let skip = row.cells.iter().take_while(|c| c.text == "\\").count();
            &row.cells[skip..]
        } else {
            &row.cells[..]
        };
        let Some(&lead) = cells.first() else {
            return;
        };

        if lead.text == "..." {
            if let Some(target) = self.continuation {
                self.push_arguments(target, &cells[1..]);
            }
            return;
        }

        match kind {
            SectionKind::Settings => self.read_setting(heading, cells),
            SectionKind::Variables => {
                let Some(var) = self.push(heading, NodeKind::VariableDefinition, lead) else {
                    return;
                };
                self.push_arguments(var, &cells[1..]);
                self.continuation = Some(var);
            }
            SectionKind::TestCases | SectionKind::Keywords | SectionKind::Unknown => {
                if row.indented {
                    let parent = self.definition.unwrap_or(heading);
                    self.read_body_row(parent, cells);
                } else {
                    self.definition = self.push(heading, NodeKind::Definition, lead);
                    self.continuation = None;
                    if let Some(definition) = self.definition {
                        if cells.len() > 1 {
                            self.read_body_row(definition, &cells[1..]);
                        }
                    }
                }
            }
        }
    }

    fn start_section(&mut self, cells: &[Cell<'_>]) {
        let text: SmolStr = cells
            .iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("    ")
            .into();
        let kind = SectionKind::from_heading(&text);
        let root = self.tree.root();
        self.section = self
            .tree
            .push(root, NodeKind::Heading, text, span(cells))
            .map(|heading| (heading, kind));
        self.definition = None;
        self.continuation = None;
    }

    fn read_setting(&mut self, heading: NodeId, cells: &[Cell<'_>]) {
        let lead = cells[0];
        if let Some(import_type) = ImportType::from_setting_name(lead.text) {
            let import = self.push(heading, NodeKind::Import(import_type), lead);
            if let Some(import) = import {
                self.push_arguments(import, &cells[1..]);
            }
            self.continuation = import;
        } else if is_one_of(lead.text, FIXTURE_SETTINGS) {
            self.read_statement(heading, lead, &cells[1..]);
        } else {
            let setting = self.push(heading, NodeKind::Setting, lead);
            if let Some(setting) = setting {
                self.push_arguments(setting, &cells[1..]);
            }
            self.continuation = setting;
        }
    }

    /// An indented row inside a test case or keyword (or directly under a
    /// table heading when no definition has started yet).
    fn read_body_row(&mut self, parent: NodeId, cells: &[Cell<'_>]) {
        let lead = cells[0];
        if lead.text.starts_with('[') && lead.text.ends_with(']') {
            if is_one_of(lead.text, FIXTURE_BRACKET_SETTINGS) {
                self.read_statement(parent, lead, &cells[1..]);
            } else {
                let setting = self.push(parent, NodeKind::Setting, lead);
                if let Some(setting) = setting {
                    self.push_arguments(setting, &cells[1..]);
                }
                self.continuation = setting;
            }
        } else if CONTROL_MARKERS.iter().any(|marker| *marker == lead.text) {
            let marker = self.push(parent, NodeKind::Setting, lead);
            if let Some(marker) = marker {
                self.push_arguments(marker, &cells[1..]);
            }
            self.continuation = marker;
        } else {
            let range = span(cells);
            let Some(statement) =
                self.tree
                    .push(parent, NodeKind::KeywordStatement, SmolStr::default(), range)
            else {
                return;
            };
            self.read_call(statement, cells);
        }
    }

    /// A keyword call introduced by a label cell (`Suite Setup`, `[Setup]`).
    fn read_statement(&mut self, parent: NodeId, label: Cell<'_>, call: &[Cell<'_>]) {
        let Some(statement) = self.push(parent, NodeKind::KeywordStatement, label) else {
            return;
        };
        self.read_call(statement, call);
    }

    /// `[assignments...] keyword [arguments...]`.
    fn read_call(&mut self, statement: NodeId, cells: &[Cell<'_>]) {
        let assignments = cells
            .iter()
            .take_while(|c| is_assignment(c.text))
            .count()
            .min(cells.len().saturating_sub(1));
        for &cell in &cells[..assignments] {
            self.push(statement, NodeKind::Assignment, cell);
        }
        let rest = &cells[assignments..];
        let Some(&keyword) = rest.first() else {
            self.continuation = None;
            return;
        };
        let invokable = self.push(statement, NodeKind::KeywordInvokable, keyword);
        if let Some(invokable) = invokable {
            self.push_arguments(invokable, &rest[1..]);
        }
        self.continuation = invokable;
    }
}

/// Read a whole document.
pub fn parse(text: &str) -> SyntaxTree {
    let mut reader = Reader::new();
    for row in rows(text) {
        reader.read_row(row);
    }
    reader.tree
}
