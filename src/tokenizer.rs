//! Splits diff line text into identifier-shaped tokens.
//!
//! A candidate is a maximal run of non-delimiter characters. Delimiters are
//! whitespace, ASCII digits and common source punctuation (including `_`, so
//! `snake_case` yields `snake` and `case`). A candidate survives only if it
//! looks like an identifier: `^[_a-zA-Z][_a-zA-Z0-9]*$`.

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").unwrap());

/// Punctuation treated as a token boundary
const PUNCTUATION_DELIMITERS: &[char] = &[
    '!', '"', '#', '$', '%', '&', '\'', '(', ')', '[', ']', '{', '}', '-', '=', '^', '~', '\\', '|', '@', '`', ';',
    '+', ':', '*', ',', '.', '<', '>', '/', '_', '?',
];

/// Whether `c` separates candidate tokens
pub fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_digit() || PUNCTUATION_DELIMITERS.contains(&c)
}

/// Whether `candidate` has the shape of a source identifier
pub fn is_identifier(candidate: &str) -> bool {
    IDENTIFIER_REGEX.is_match(candidate)
}

/// An identifier-shaped token borrowed from a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Byte offset of the token within the line
    pub offset: usize,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Lazy iterator over the tokens of one line. Cloning restarts from the
/// clone point.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];

            // Skip delimiters
            let skip = rest.find(|c: char| !is_delimiter(c)).unwrap_or(rest.len());
            self.pos += skip;
            if self.pos >= self.text.len() {
                break;
            }

            let rest = &self.text[self.pos..];
            let len = rest.find(is_delimiter).unwrap_or(rest.len());
            let start = self.pos;
            self.pos += len;

            let candidate = &self.text[start..start + len];
            if is_identifier(candidate) {
                return Some(Token {
                    text: candidate,
                    offset: start,
                });
            }
        }
        None
    }
}

/// Tokenize a line of diff text
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { text, pos: 0 }
}
