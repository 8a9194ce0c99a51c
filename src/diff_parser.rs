//! Unified diff parsing and an in-memory host page built from it.
//!
//! Each file in the diff becomes one [`Section`]. Hunk line counts decide
//! whether a line starting with `---`/`+++` is a file header or content.

use crate::annotation::{HighlightChange, Panel};
use crate::engine::{HostError, HostPage};
use crate::section::{ChangeKind, Line, Section, SectionId};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static HUNK_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap());

const DEV_NULL: &str = "/dev/null";

/// Title used for hunks that appear before any file header
const UNNAMED_SECTION: &str = "<diff>";

#[derive(Debug, Default)]
struct FileBuilder {
    old_path: Option<String>,
    new_path: Option<String>,
    lines: Vec<Line>,
}

impl FileBuilder {
    fn title(&self) -> String {
        match (self.new_path.as_deref(), self.old_path.as_deref()) {
            (Some(new), _) if new != DEV_NULL => new.to_string(),
            (_, Some(old)) if old != DEV_NULL => old.to_string(),
            _ => UNNAMED_SECTION.to_string(),
        }
    }

    fn has_content(&self) -> bool {
        self.old_path.is_some() || self.new_path.is_some() || !self.lines.is_empty()
    }
}

#[derive(Debug, Default)]
struct Hunk {
    old_line: usize,
    new_line: usize,
    old_remaining: usize,
    new_remaining: usize,
}

impl Hunk {
    fn parse(header: &str) -> Option<Self> {
        let caps = HUNK_HEADER_REGEX.captures(header)?;
        let number = |i: usize, default: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .unwrap_or(default)
        };
        Some(Self {
            old_line: number(1, 0),
            old_remaining: number(2, 1),
            new_line: number(3, 0),
            new_remaining: number(4, 1),
        })
    }

    fn is_open(&self) -> bool {
        self.old_remaining > 0 || self.new_remaining > 0
    }
}

/// Strip the `a/` or `b/` prefix git puts on paths, and any trailing tab metadata
fn clean_path(raw: &str) -> String {
    let path = raw.split('\t').next().unwrap_or(raw).trim();
    if path == DEV_NULL {
        return path.to_string();
    }
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
        .to_string()
}

/// Parse a unified diff into sections, numbered from 1 in file order
pub fn parse_unified_diff(diff: &str) -> Vec<Section> {
    let mut files: Vec<FileBuilder> = Vec::new();
    let mut current = FileBuilder::default();
    let mut hunk: Option<Hunk> = None;

    let mut finish = |file: &mut FileBuilder| {
        if file.has_content() {
            files.push(std::mem::take(file));
        }
    };

    for raw in diff.lines() {
        if raw.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        }

        if let Some(h) = hunk.as_mut().filter(|h| h.is_open()) {
            let content = match raw.chars().next() {
                Some('+') => Some((ChangeKind::Added, &raw[1..])),
                Some('-') => Some((ChangeKind::Deleted, &raw[1..])),
                Some(' ') => Some((ChangeKind::Unchanged, &raw[1..])),
                // Some tools drop the leading space of blank context lines
                None => Some((ChangeKind::Unchanged, "")),
                Some(_) => None,
            };

            if let Some((kind, text)) = content {
                let (old_number, new_number) = match kind {
                    ChangeKind::Added => {
                        h.new_remaining = h.new_remaining.saturating_sub(1);
                        h.new_line += 1;
                        (None, Some(h.new_line - 1))
                    }
                    ChangeKind::Deleted => {
                        h.old_remaining = h.old_remaining.saturating_sub(1);
                        h.old_line += 1;
                        (Some(h.old_line - 1), None)
                    }
                    ChangeKind::Unchanged => {
                        h.old_remaining = h.old_remaining.saturating_sub(1);
                        h.new_remaining = h.new_remaining.saturating_sub(1);
                        h.old_line += 1;
                        h.new_line += 1;
                        (Some(h.old_line - 1), Some(h.new_line - 1))
                    }
                };
                current
                    .lines
                    .push(Line::new(text, kind).with_numbers(old_number, new_number));
                continue;
            }

            log::warn!("Hunk ended before its declared length at {raw:?}");
            hunk = None;
        }

        if raw.starts_with("diff --git ") {
            finish(&mut current);
            hunk = None;
            // Fallback paths in case ---/+++ headers are absent (e.g. binary files)
            let mut parts = raw["diff --git ".len()..].split_whitespace();
            current.old_path = parts.next().map(clean_path);
            current.new_path = parts.next().map(clean_path);
        } else if let Some(path) = raw.strip_prefix("--- ") {
            // A second ---/+++ pair without a diff --git line starts a new file
            if !current.lines.is_empty() {
                finish(&mut current);
            }
            current.old_path = Some(clean_path(path));
        } else if let Some(path) = raw.strip_prefix("+++ ") {
            current.new_path = Some(clean_path(path));
        } else if raw.starts_with("@@") {
            match Hunk::parse(raw) {
                Some(h) => hunk = Some(h),
                None => log::warn!("Ignoring malformed hunk header: {raw:?}"),
            }
        }
    }
    finish(&mut current);

    files
        .into_iter()
        .enumerate()
        .map(|(i, file)| Section::new(SectionId(i as u64 + 1), file.title(), file.lines))
        .collect()
}

/// A host page holding parsed diff sections in memory
#[derive(Debug, Default)]
pub struct DiffPage {
    sections: BTreeMap<SectionId, Section>,
    order: Vec<SectionId>,
    highlighted: BTreeMap<SectionId, Vec<usize>>,
}

impl DiffPage {
    pub fn new(sections: Vec<Section>) -> Self {
        let order = sections.iter().map(|s| s.id).collect();
        let sections = sections.into_iter().map(|s| (s.id, s)).collect();
        Self {
            sections,
            order,
            highlighted: BTreeMap::new(),
        }
    }

    pub fn from_diff(diff: &str) -> Self {
        Self::new(parse_unified_diff(diff))
    }

    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    /// Sections in page order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.order.iter().filter_map(|id| self.sections.get(id))
    }

    /// Replace or add a section
    pub fn upsert(&mut self, section: Section) {
        if !self.sections.contains_key(&section.id) {
            self.order.push(section.id);
        }
        self.sections.insert(section.id, section);
    }

    /// Remove a section, leaving any handle to it stale
    pub fn remove(&mut self, id: SectionId) -> Option<Section> {
        self.order.retain(|other| *other != id);
        self.highlighted.remove(&id);
        self.sections.remove(&id)
    }

    /// Lines currently highlighted in a section
    pub fn highlighted(&self, id: SectionId) -> &[usize] {
        self.highlighted.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn apply(&mut self, id: SectionId, change: &HighlightChange) -> Result<(), HostError> {
        if !self.sections.contains_key(&id) {
            return Err(HostError::StaleSection(id));
        }
        let lines = self.highlighted.entry(id).or_default();
        lines.retain(|line| !change.cleared.contains(line));
        for line in &change.applied {
            if !lines.contains(line) {
                lines.push(*line);
            }
        }
        Ok(())
    }
}

impl HostPage for DiffPage {
    fn section_ids(&self) -> Vec<SectionId> {
        self.order.clone()
    }

    fn section(&self, id: SectionId) -> Option<Section> {
        self.sections.get(&id).cloned()
    }

    fn render_panel(&mut self, panel: &Panel, change: &HighlightChange) -> Result<(), HostError> {
        self.apply(panel.section, change)
    }

    fn apply_highlight(&mut self, section: SectionId, change: &HighlightChange) -> Result<(), HostError> {
        self.apply(section, change)
    }
}
