//! Reviewable sections and their diff lines.
//!
//! A [`Section`] is one reviewable unit of a diff page, usually one file. Its
//! identity is a [`SectionId`] handed out by the host page; the core never
//! derives identity from content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based index of a line within its section
pub type LineIndex = usize;

/// Stable handle for a section, issued by the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(pub u64);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

/// How a diff line relates to the change under review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Deleted,
    Unchanged,
}

/// One displayed line of diff text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub kind: ChangeKind,
    /// Line number in the old file, when the host knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_number: Option<usize>,
    /// Line number in the new file, when the host knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_number: Option<usize>,
}

impl Line {
    pub fn new(text: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            text: text.into(),
            kind,
            old_number: None,
            new_number: None,
        }
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(text, ChangeKind::Added)
    }

    pub fn deleted(text: impl Into<String>) -> Self {
        Self::new(text, ChangeKind::Deleted)
    }

    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(text, ChangeKind::Unchanged)
    }

    /// Attach old/new file line numbers
    pub fn with_numbers(mut self, old_number: Option<usize>, new_number: Option<usize>) -> Self {
        self.old_number = old_number;
        self.new_number = new_number;
        self
    }

    /// The line number most useful to a reviewer: new side, falling back to old side
    pub fn display_number(&self) -> Option<usize> {
        self.new_number.or(self.old_number)
    }
}

/// A reviewable unit of content, e.g. one file's diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    /// Human-readable label, typically the file path
    pub title: String,
    pub lines: Vec<Line>,
}

impl Section {
    pub fn new(id: SectionId, title: impl Into<String>, lines: Vec<Line>) -> Self {
        Self {
            id,
            title: title.into(),
            lines,
        }
    }

    pub fn line(&self, index: LineIndex) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_number_prefers_new_side() {
        let line = Line::unchanged("x").with_numbers(Some(3), Some(5));
        assert_eq!(line.display_number(), Some(5));

        let deleted = Line::deleted("x").with_numbers(Some(7), None);
        assert_eq!(deleted.display_number(), Some(7));

        assert_eq!(Line::added("x").display_number(), None);
    }

    #[test]
    fn test_change_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ChangeKind::Unchanged).unwrap();
        assert_eq!(json, "\"unchanged\"");
        let kind: ChangeKind = serde_json::from_str("\"added\"").unwrap();
        assert_eq!(kind, ChangeKind::Added);
    }
}
