//! Per-section scan results and the cache that memoizes them.
//!
//! A cached result is reused as long as the number of candidate lines in the
//! section is unchanged. This is a cheap heuristic: an edit that keeps the line
//! count the same is not noticed until something else invalidates the entry
//! (a settings change, or the section being rebuilt by the host).

use crate::config::SettingsSnapshot;
use crate::dictionary::{Classifier, Dictionary};
use crate::section::{LineIndex, Section, SectionId};
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// An identifier containing at least one misspelled word
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedIdentifier {
    /// The literal token text
    pub text: String,
    /// Lines the identifier occurs in, in order of first occurrence
    pub lines: Vec<LineIndex>,
}

/// Result of scanning one section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Unique flagged identifiers in order of first occurrence
    identifiers: Vec<FlaggedIdentifier>,
    /// Number of candidate lines the result was computed from
    fingerprint: usize,
}

impl ScanResult {
    /// An empty result for `fingerprint` candidate lines
    pub fn empty(fingerprint: usize) -> Self {
        Self {
            identifiers: Vec::new(),
            fingerprint,
        }
    }

    pub fn identifiers(&self) -> &[FlaggedIdentifier] {
        &self.identifiers
    }

    /// Identifier texts in result order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(|i| i.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn fingerprint(&self) -> usize {
        self.fingerprint
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.iter().any(|i| i.text == identifier)
    }

    /// Lines associated with `identifier`
    pub fn lines_for(&self, identifier: &str) -> Option<&[LineIndex]> {
        self.identifiers
            .iter()
            .find(|i| i.text == identifier)
            .map(|i| i.lines.as_slice())
    }
}

/// Accumulates flagged identifiers in first-occurrence order
#[derive(Debug, Default)]
struct ScanResultBuilder {
    identifiers: Vec<FlaggedIdentifier>,
    positions: HashMap<String, usize>,
}

impl ScanResultBuilder {
    fn record(&mut self, identifier: &str, line: LineIndex) {
        match self.positions.get(identifier) {
            Some(&pos) => {
                let lines = &mut self.identifiers[pos].lines;
                if !lines.contains(&line) {
                    lines.push(line);
                }
            }
            None => {
                self.positions.insert(identifier.to_string(), self.identifiers.len());
                self.identifiers.push(FlaggedIdentifier {
                    text: identifier.to_string(),
                    lines: vec![line],
                });
            }
        }
    }

    fn finish(self, fingerprint: usize) -> ScanResult {
        ScanResult {
            identifiers: self.identifiers,
            fingerprint,
        }
    }
}

/// Scan `section` from scratch, without consulting any cache.
///
/// Lines are visited in document order; only lines whose change kind is
/// enabled in `settings` are tokenized.
pub fn compute_scan(section: &Section, settings: &SettingsSnapshot, dictionary: &dyn Dictionary) -> ScanResult {
    if settings.options().is_empty() {
        return ScanResult::empty(0);
    }
    let candidates: Vec<LineIndex> = candidate_lines(section, settings).collect();

    let classifier = Classifier::new(dictionary, settings);
    let mut verdicts: HashMap<&str, bool> = HashMap::new();
    let mut builder = ScanResultBuilder::default();

    for &index in &candidates {
        let line = &section.lines[index];
        for token in tokenize(&line.text) {
            let flagged = *verdicts
                .entry(token.text)
                .or_insert_with(|| classifier.is_flagged(token.text));
            if flagged {
                builder.record(token.text, index);
            }
        }
    }

    builder.finish(candidates.len())
}

/// Indices of the lines `settings` selects for scanning
pub fn candidate_lines<'a>(
    section: &'a Section,
    settings: &'a SettingsSnapshot,
) -> impl Iterator<Item = LineIndex> + 'a {
    section
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| settings.is_kind_enabled(line.kind))
        .map(|(index, _)| index)
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoized scan results keyed by section
#[derive(Debug, Default)]
pub struct ScanCache {
    results: HashMap<SectionId, Arc<ScanResult>>,
    stats: CacheStats,
    /// Incremented whenever a committed result changes
    version: u64,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a section, reusing the cached result when the candidate line
    /// count is unchanged. The new result replaces the old one only once it
    /// is complete.
    pub fn scan(
        &mut self,
        section: &Section,
        settings: &SettingsSnapshot,
        dictionary: &dyn Dictionary,
    ) -> Arc<ScanResult> {
        let fingerprint = candidate_lines(section, settings).count();

        if let Some(cached) = self.results.get(&section.id)
            && cached.fingerprint() == fingerprint
        {
            self.stats.hits += 1;
            return Arc::clone(cached);
        }

        self.stats.misses += 1;
        let result = Arc::new(compute_scan(section, settings, dictionary));
        log::debug!(
            "Scanned {} ({}): {} candidate lines, {} flagged identifiers",
            section.id,
            section.title,
            fingerprint,
            result.len()
        );
        self.commit(section.id, Arc::clone(&result));
        result
    }

    fn commit(&mut self, id: SectionId, result: Arc<ScanResult>) {
        self.results.insert(id, result);
        self.version = self.version.wrapping_add(1);
    }

    /// Last committed result for a section
    pub fn get(&self, id: SectionId) -> Option<&Arc<ScanResult>> {
        self.results.get(&id)
    }

    pub fn contains(&self, id: SectionId) -> bool {
        self.results.contains_key(&id)
    }

    /// Drop one section's result
    pub fn remove(&mut self, id: SectionId) -> Option<Arc<ScanResult>> {
        let removed = self.results.remove(&id);
        if removed.is_some() {
            self.version = self.version.wrapping_add(1);
        }
        removed
    }

    /// Keep only the sections in `live`; returns the ids that were dropped
    pub fn retain(&mut self, live: &HashSet<SectionId>) -> Vec<SectionId> {
        let stale: Vec<SectionId> = self.results.keys().filter(|id| !live.contains(id)).copied().collect();
        for id in &stale {
            self.remove(*id);
        }
        stale
    }

    /// Drop every cached result
    pub fn invalidate_all(&mut self) {
        if !self.results.is_empty() {
            self.results.clear();
            self.version = self.version.wrapping_add(1);
        }
    }

    /// Committed results, in no particular order
    pub fn results(&self) -> impl Iterator<Item = (SectionId, &Arc<ScanResult>)> {
        self.results.iter().map(|(id, result)| (*id, result))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
