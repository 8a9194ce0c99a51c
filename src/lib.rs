pub mod annotation;
pub mod config;
pub mod diff_parser;
pub mod dictionary;
pub mod engine;
pub mod exceptions;
pub mod exit_codes;
pub mod report;
pub mod scan_cache;
pub mod section;
pub mod tokenizer;
pub mod words;

pub use crate::annotation::{AnnotationController, Button, HighlightChange, Panel, Style};
pub use crate::config::{ConfigError, ScanOptions, Settings, SettingsSnapshot};
pub use crate::dictionary::{AcceptAll, Classifier, Dictionary, DictionaryError, WordListDictionary};
pub use crate::engine::{BadgeSink, HostError, HostPage, PassReport, SpellContext, Trigger};
pub use crate::report::BadgeMessage;
pub use crate::scan_cache::{FlaggedIdentifier, ScanCache, ScanResult};
pub use crate::section::{ChangeKind, Line, LineIndex, Section, SectionId};

use serde::Serialize;

/// Flagged identifier with reviewer-facing line numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub identifier: String,
    /// Display line numbers (new side, or old side for deleted lines)
    pub lines: Vec<usize>,
}

/// Flagged identifiers of one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionFindings {
    pub section: SectionId,
    pub title: String,
    pub findings: Vec<Finding>,
}

/// Check a set of sections in one pass without any panel rendering.
///
/// Convenience entry point for batch use; interactive hosts drive a
/// [`SpellContext`] directly.
pub fn check_sections(sections: &[Section], settings: &Settings, dictionary: &dyn Dictionary) -> Vec<SectionFindings> {
    let snapshot = SettingsSnapshot::new(settings);
    let mut cache = ScanCache::new();

    sections
        .iter()
        .map(|section| {
            let result = cache.scan(section, &snapshot, dictionary);
            SectionFindings {
                section: section.id,
                title: section.title.clone(),
                findings: findings_for(section, &result),
            }
        })
        .collect()
}

/// Map a scan result's line indices to display line numbers
pub fn findings_for(section: &Section, result: &ScanResult) -> Vec<Finding> {
    result
        .identifiers()
        .iter()
        .map(|flagged| Finding {
            identifier: flagged.text.clone(),
            lines: flagged
                .lines
                .iter()
                .map(|&index| {
                    section
                        .line(index)
                        .and_then(Line::display_number)
                        .unwrap_or(index + 1)
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_check_sections_reports_display_numbers() {
        let section = Section::new(
            SectionId(1),
            "src/user.rs",
            vec![
                Line::unchanged("fn main() {").with_numbers(Some(10), Some(12)),
                Line::added("let userNmae = 1;").with_numbers(None, Some(13)),
            ],
        );
        let dictionary = WordListDictionary::from_words(["main", "user"]);
        let findings = check_sections(&[section], &Settings::default(), &dictionary);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "src/user.rs");
        assert_eq!(
            findings[0].findings,
            vec![Finding {
                identifier: "userNmae".to_string(),
                lines: vec![13],
            }]
        );
    }

    #[test]
    fn test_findings_fall_back_to_index() {
        let section = Section::new(SectionId(1), "f", vec![Line::added("valeu")]);
        let dictionary = WordListDictionary::new();
        let findings = check_sections(&[section], &Settings::default(), &dictionary);
        assert_eq!(findings[0].findings[0].lines, vec![1]);
    }
}
