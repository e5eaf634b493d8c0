//! Lexical colouring for JSON-looking bodies.
//!
//! This is a line-at-a-time heuristic, not a parser: invalid JSON still
//! tokenizes, and a quoted string counts as a key purely because a `:`
//! follows it on the same line.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `{ } [ ]`
    Delimiter,
    /// Quoted string followed by `:`.
    Key,
    StringValue,
    /// `true`, `false`, `null`
    Literal,
    Number,
    /// Whitespace, `,`, `:` and anything the scanner did not recognise.
    Plain,
}

/// A slice of the source line with its colour class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
}

fn scanner() -> &'static Regex {
    static SCANNER: OnceLock<Regex> = OnceLock::new();
    SCANNER.get_or_init(|| {
        Regex::new(
            r#""(?:\\.|[^"\\])*"|(?:-|\b)[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?\b|\btrue\b|\bfalse\b|\bnull\b|[{}\[\],:]"#,
        )
        .expect("json scanner pattern is valid")
    })
}

/// Split `line` into tokens that cover it exactly, in order.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for m in scanner().find_iter(line) {
        if m.start() > cursor {
            tokens.push(Token {
                text: &line[cursor..m.start()],
                kind: TokenKind::Plain,
            });
        }
        tokens.push(Token {
            text: m.as_str(),
            kind: classify(m.as_str(), &line[m.end()..]),
        });
        cursor = m.end();
    }

    if cursor < line.len() {
        tokens.push(Token {
            text: &line[cursor..],
            kind: TokenKind::Plain,
        });
    }
    if tokens.is_empty() {
        tokens.push(Token {
            text: line,
            kind: TokenKind::Plain,
        });
    }
    tokens
}

fn classify(text: &str, rest: &str) -> TokenKind {
    match text {
        "{" | "}" | "[" | "]" => TokenKind::Delimiter,
        "," | ":" => TokenKind::Plain,
        "true" | "false" | "null" => TokenKind::Literal,
        t if t.starts_with('"') => {
            if rest.trim_start().starts_with(':') {
                TokenKind::Key
            } else {
                TokenKind::StringValue
            }
        }
        _ => TokenKind::Number,
    }
}

/// Bodies whose first non-blank character opens an object or array.
pub fn is_likely_json(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}
