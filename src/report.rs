//! Page-wide flagged identifier counts and the badge payload.

use crate::scan_cache::ScanCache;
use crate::section::SectionId;
use serde::{Deserialize, Serialize};

/// Message for the external badge indicator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BadgeMessage {
    /// Count as decimal text, or empty to clear the badge
    pub badge: String,
}

impl BadgeMessage {
    /// Badge showing `count`; zero clears it
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            Self::cleared()
        } else {
            Self {
                badge: count.to_string(),
            }
        }
    }

    pub fn cleared() -> Self {
        Self { badge: String::new() }
    }

    pub fn is_cleared(&self) -> bool {
        self.badge.is_empty()
    }
}

/// Per-section breakdown of the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCount {
    pub section: SectionId,
    pub flagged: usize,
}

/// Total flagged identifiers over every committed section result.
///
/// Identifiers are unique within a section but the same text flagged in two
/// sections counts twice.
pub fn count(cache: &ScanCache) -> usize {
    cache.results().map(|(_, result)| result.len()).sum()
}

/// Per-section counts, sorted by section id
pub fn breakdown(cache: &ScanCache) -> Vec<SectionCount> {
    let mut counts: Vec<SectionCount> = cache
        .results()
        .map(|(section, result)| SectionCount {
            section,
            flagged: result.len(),
        })
        .collect();
    counts.sort_by_key(|c| c.section);
    counts
}

/// Console summary line for diagnostics
pub fn summary(cache: &ScanCache) -> String {
    let total = count(cache);
    let sections = cache.results().filter(|(_, result)| !result.is_empty()).count();
    match total {
        0 => "No suspected typos".to_string(),
        1 => "1 suspected typo in 1 section".to_string(),
        _ => format!(
            "{total} suspected typos in {sections} section{}",
            if sections == 1 { "" } else { "s" }
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, SettingsSnapshot};
    use crate::dictionary::WordListDictionary;
    use crate::section::{Line, Section};

    #[test]
    fn test_badge_message() {
        assert_eq!(BadgeMessage::from_count(3).badge, "3");
        assert!(BadgeMessage::from_count(0).is_cleared());
        let json = serde_json::to_string(&BadgeMessage::from_count(12)).unwrap();
        assert_eq!(json, r#"{"badge":"12"}"#);
    }

    #[test]
    fn test_counts_sum_per_section() {
        let dictionary = WordListDictionary::from_words(["hello", "thing"]);
        let settings = SettingsSnapshot::new(&Settings::default());
        let mut cache = ScanCache::new();

        let first = Section::new(SectionId(1), "a", vec![Line::added("helloWrold helloWrold")]);
        let second = Section::new(SectionId(2), "b", vec![Line::added("helloWrold"), Line::added("quuxThing")]);
        cache.scan(&first, &settings, &dictionary);
        cache.scan(&second, &settings, &dictionary);

        assert_eq!(count(&cache), 3);
        assert_eq!(
            breakdown(&cache),
            vec![
                SectionCount {
                    section: SectionId(1),
                    flagged: 1
                },
                SectionCount {
                    section: SectionId(2),
                    flagged: 2
                },
            ]
        );
        assert_eq!(summary(&cache), "3 suspected typos in 2 sections");
    }

    #[test]
    fn test_empty_summary() {
        let cache = ScanCache::new();
        assert_eq!(count(&cache), 0);
        assert_eq!(summary(&cache), "No suspected typos");
    }
}
