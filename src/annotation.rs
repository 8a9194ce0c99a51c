//! Annotation panels and the highlight toggle state machine.
//!
//! Each section gets at most one panel with one button per flagged
//! identifier. Clicking a button highlights every line the identifier occurs
//! in; at most one identifier per section is active at any time.

use crate::scan_cache::ScanResult;
use crate::section::{LineIndex, SectionId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Caption shown in front of the buttons
pub const PANEL_CAPTION: &str = "typo?";

/// Abstract styles the host maps to its own presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    /// Red wavy underline marking a suspected typo
    #[default]
    WavyUnderline,
}

/// One flagged-identifier button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    pub active: bool,
}

/// Lines whose highlight changed. The host removes the style from `cleared`
/// first, then applies it to `applied`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightChange {
    pub cleared: Vec<LineIndex>,
    pub applied: Vec<LineIndex>,
    pub style: Style,
}

impl HighlightChange {
    pub fn is_empty(&self) -> bool {
        self.cleared.is_empty() && self.applied.is_empty()
    }
}

/// The annotation panel of one section
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub section: SectionId,
    pub caption: &'static str,
    buttons: Vec<Button>,
    active: Option<String>,
    highlighted: Vec<LineIndex>,
    #[serde(skip)]
    result: Arc<ScanResult>,
    /// Number of times the buttons were rebuilt
    revision: u64,
}

impl Panel {
    fn new(section: SectionId) -> Self {
        Self {
            section,
            caption: PANEL_CAPTION,
            buttons: Vec::new(),
            active: None,
            highlighted: Vec::new(),
            result: Arc::new(ScanResult::default()),
            revision: 0,
        }
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Hidden when there is nothing to report
    pub fn is_visible(&self) -> bool {
        !self.buttons.is_empty()
    }

    /// The active identifier, if any
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Currently highlighted lines
    pub fn highlighted_lines(&self) -> &[LineIndex] {
        &self.highlighted
    }

    pub fn is_line_highlighted(&self, line: LineIndex) -> bool {
        self.highlighted.contains(&line)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The scan result the buttons were built from
    pub fn result(&self) -> &Arc<ScanResult> {
        &self.result
    }

    fn set_active(&mut self, identifier: Option<String>) {
        for button in &mut self.buttons {
            button.active = identifier.as_deref() == Some(button.label.as_str());
        }
        self.active = identifier;
    }

    /// Replace the highlight set, reporting what changed
    fn rehighlight(&mut self, lines: Vec<LineIndex>) -> HighlightChange {
        let cleared = std::mem::replace(&mut self.highlighted, lines);
        HighlightChange {
            cleared,
            applied: self.highlighted.clone(),
            style: Style::WavyUnderline,
        }
    }
}

/// Owns every section's panel and toggle state
#[derive(Debug, Default)]
pub struct AnnotationController {
    panels: HashMap<SectionId, Panel>,
}

impl AnnotationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build or rebuild the panel for a section.
    ///
    /// The active identifier survives a rebuild only if it is still flagged;
    /// its highlight then moves to its new line set. Otherwise the highlight
    /// is dropped.
    pub fn render(&mut self, section: SectionId, result: Arc<ScanResult>) -> (&Panel, HighlightChange) {
        let panel = self.panels.entry(section).or_insert_with(|| Panel::new(section));

        panel.buttons = result
            .labels()
            .map(|label| Button {
                label: label.to_string(),
                active: false,
            })
            .collect();
        panel.revision += 1;

        let still_active = panel.active.take().filter(|active| result.contains(active));
        let lines = still_active
            .as_deref()
            .and_then(|active| result.lines_for(active))
            .map(<[LineIndex]>::to_vec)
            .unwrap_or_default();

        if still_active.is_none() && !panel.highlighted.is_empty() {
            log::debug!("{section}: dropping highlight for identifier no longer flagged");
        }

        panel.result = result;
        panel.set_active(still_active);
        let change = panel.rehighlight(lines);
        (&*panel, change)
    }

    /// Toggle an identifier's highlight.
    ///
    /// Returns `None` when the section has no panel or the identifier is not
    /// one of its buttons.
    pub fn click(&mut self, section: SectionId, identifier: &str) -> Option<HighlightChange> {
        let panel = self.panels.get_mut(&section)?;
        let Some(lines) = panel.result.lines_for(identifier).map(<[LineIndex]>::to_vec) else {
            log::debug!("{section}: ignoring click on unknown identifier '{identifier}'");
            return None;
        };

        if panel.active() == Some(identifier) {
            panel.set_active(None);
            Some(panel.rehighlight(Vec::new()))
        } else {
            panel.set_active(Some(identifier.to_string()));
            Some(panel.rehighlight(lines))
        }
    }

    /// Clear any active highlight in a section
    pub fn deactivate(&mut self, section: SectionId) -> Option<HighlightChange> {
        let panel = self.panels.get_mut(&section)?;
        panel.set_active(None);
        Some(panel.rehighlight(Vec::new()))
    }

    pub fn panel(&self, section: SectionId) -> Option<&Panel> {
        self.panels.get(&section)
    }

    /// Discard the panel of a section that no longer exists
    pub fn remove(&mut self, section: SectionId) -> Option<Panel> {
        self.panels.remove(&section)
    }

    pub fn clear(&mut self) {
        self.panels.clear();
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
