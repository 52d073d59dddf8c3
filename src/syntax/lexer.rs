//! Logos-based lexer for the plain-text table format.
//!
//! The format is line oriented: a row is a sequence of cells separated by
//! two or more spaces or a tab. A single space is part of a cell
//! (`Log Many` is one cell). A `#` at the start of a cell begins a comment
//! that runs to the end of the line.

use logos::Logos;

use crate::base::{TextRange, TextSize};

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of spaces or tabs.
    Whitespace,
    Newline,
    Comment,
    Cell,
    /// Anything the lexer could not classify (a stray `\r`).
    Error,
}

/// Logos token enum - maps to [`TokenKind`].
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    // A cell never ends in a space, so any run between cells is a separator.
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"#[^\r\n]*")]
    Comment,

    #[regex(r"[^ \t\r\n#][^ \t\r\n]*( [^ \t\r\n]+)*")]
    Cell,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => TokenKind::Whitespace,
            LogosToken::Newline => TokenKind::Newline,
            LogosToken::Comment => TokenKind::Comment,
            LogosToken::Cell => TokenKind::Cell,
        }
    }
}

/// A token with its kind, text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

impl Token<'_> {
    /// Whether this whitespace run actually separates cells.
    pub fn is_separator(&self) -> bool {
        self.kind == TokenKind::Whitespace && (self.text.len() >= 2 || self.text.contains('\t'))
    }
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = match self.inner.next()? {
            Ok(token) => token.into(),
            Err(()) => TokenKind::Error,
        };
        let span = self.inner.span();
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );
        Some(Token {
            kind,
            text: self.inner.slice(),
            range,
        })
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}
