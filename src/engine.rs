//! The process-wide spell checking context and scan pass driver.
//!
//! [`SpellContext`] owns everything that lives across passes: the settings
//! snapshot, the dictionary engine, per-section scan results and panels.
//! Hosts feed it [`Trigger`]s and it calls back into the [`HostPage`] and
//! [`BadgeSink`] collaborators.
//!
//! Passes never interleave. Triggers are queued and executed one at a time by
//! [`SpellContext::run_pending`]. Scanning is synchronous; the panel renders
//! a pass produces are delivered on the following [`SpellContext::tick`], so
//! the host page can settle its own layout first.

use crate::annotation::{AnnotationController, HighlightChange, Panel};
use crate::config::{Settings, SettingsSnapshot};
use crate::dictionary::Dictionary;
use crate::report::{self, BadgeMessage};
use crate::scan_cache::{CacheStats, ScanCache, ScanResult};
use crate::section::{Section, SectionId};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Errors a host page can report back
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The section handle no longer resolves on the page
    #[error("{0} is no longer on the page")]
    StaleSection(SectionId),

    /// Any other host-side failure
    #[error("Host page error: {0}")]
    Other(String),
}

/// The page hosting the diff
pub trait HostPage {
    /// Sections currently on the page, in page order
    fn section_ids(&self) -> Vec<SectionId>;

    /// Current content of a section, or `None` if the handle went stale
    fn section(&self, id: SectionId) -> Option<Section>;

    /// Show a rebuilt panel. `change` carries the line highlight updates
    /// caused by the rebuild.
    fn render_panel(&mut self, panel: &Panel, change: &HighlightChange) -> Result<(), HostError>;

    /// Apply a highlight toggle to a section's lines
    fn apply_highlight(&mut self, section: SectionId, change: &HighlightChange) -> Result<(), HostError>;
}

/// Receiver for badge updates
pub trait BadgeSink {
    fn send(&mut self, message: BadgeMessage);
}

impl BadgeSink for Vec<BadgeMessage> {
    fn send(&mut self, message: BadgeMessage) {
        self.push(message);
    }
}

/// Why a pass should run
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Initial page load: scan every section
    Load,
    /// The settings store changed: reload, invalidate and scan everything
    SettingsChanged(Settings),
    /// These sections were added or changed on the page
    SectionsChanged(Vec<SectionId>),
}

/// What one pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Sections scanned (cache hits included)
    pub scanned: usize,
    /// Sections that disappeared and were dropped
    pub dropped: Vec<SectionId>,
    /// Aggregate flagged count after the pass
    pub aggregate: usize,
}

/// Process-wide spell checking state
pub struct SpellContext<D: Dictionary = Box<dyn Dictionary>> {
    dictionary: D,
    settings: Arc<SettingsSnapshot>,
    cache: ScanCache,
    annotations: AnnotationController,
    pending: VecDeque<Trigger>,
    pending_renders: VecDeque<SectionId>,
}

impl<D: Dictionary> SpellContext<D> {
    pub fn new(dictionary: D, settings: &Settings) -> Self {
        Self {
            dictionary,
            settings: Arc::new(SettingsSnapshot::new(settings)),
            cache: ScanCache::new(),
            annotations: AnnotationController::new(),
            pending: VecDeque::new(),
            pending_renders: VecDeque::new(),
        }
    }

    /// Replace the settings snapshot and invalidate every cached result
    pub fn reload(&mut self, settings: &Settings) {
        self.settings = Arc::new(SettingsSnapshot::new(settings));
        self.cache.invalidate_all();
        log::debug!(
            "Settings reloaded: {:?}, {} user words",
            self.settings.options(),
            self.settings.user_dictionary_len()
        );
    }

    /// Forget every section, panel and queued work; settings are kept
    pub fn reset(&mut self) {
        self.cache.invalidate_all();
        self.annotations.clear();
        self.pending.clear();
        self.pending_renders.clear();
    }

    /// Queue a trigger.
    ///
    /// A settings change supersedes every settings change still queued and
    /// goes to the back, so the latest notification is the one left in force.
    /// Any other trigger identical to one already queued is dropped.
    pub fn enqueue(&mut self, trigger: Trigger) {
        if let Trigger::SettingsChanged(_) = trigger {
            let before = self.pending.len();
            self.pending.retain(|queued| !matches!(queued, Trigger::SettingsChanged(_)));
            if self.pending.len() < before {
                log::debug!("Superseding {} queued settings change(s)", before - self.pending.len());
            }
        } else if self.pending.contains(&trigger) {
            log::debug!("Coalescing duplicate trigger {trigger:?}");
            return;
        }
        self.pending.push_back(trigger);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Run queued passes in order until the queue is empty
    pub fn run_pending(&mut self, host: &mut dyn HostPage, badge: &mut dyn BadgeSink) -> Vec<PassReport> {
        let mut reports = Vec::new();
        while let Some(trigger) = self.pending.pop_front() {
            reports.push(self.run_pass(trigger, host, badge));
        }
        reports
    }

    /// Execute one pass
    pub fn run_pass(&mut self, trigger: Trigger, host: &mut dyn HostPage, badge: &mut dyn BadgeSink) -> PassReport {
        let (ids, full) = match trigger {
            Trigger::Load => (host.section_ids(), true),
            Trigger::SettingsChanged(settings) => {
                self.reload(&settings);
                (host.section_ids(), true)
            }
            Trigger::SectionsChanged(ids) => (ids, false),
        };

        // One snapshot for the whole pass
        let settings = Arc::clone(&self.settings);
        let mut outcome = PassReport::default();

        for id in &ids {
            let Some(section) = host.section(*id) else {
                log::debug!("{id} disappeared during the pass, dropping it");
                self.drop_section(*id);
                outcome.dropped.push(*id);
                continue;
            };
            self.cache.scan(&section, &settings, &self.dictionary);
            self.schedule_render(*id);
            outcome.scanned += 1;
        }

        if full {
            let live: HashSet<SectionId> = ids.iter().copied().collect();
            for id in self.cache.retain(&live) {
                self.annotations.remove(id);
                self.pending_renders.retain(|pending| *pending != id);
                outcome.dropped.push(id);
            }
        }

        outcome.aggregate = report::count(&self.cache);
        log::debug!(
            "Pass complete: {} scanned, {} dropped, {} flagged",
            outcome.scanned,
            outcome.dropped.len(),
            outcome.aggregate
        );
        if outcome.aggregate > 0 {
            badge.send(BadgeMessage::from_count(outcome.aggregate));
        }
        outcome
    }

    fn schedule_render(&mut self, id: SectionId) {
        if !self.pending_renders.contains(&id) {
            self.pending_renders.push_back(id);
        }
    }

    fn drop_section(&mut self, id: SectionId) {
        self.cache.remove(id);
        self.annotations.remove(id);
        self.pending_renders.retain(|pending| *pending != id);
    }

    /// Deliver deferred panel renders. Each render reads the section's latest
    /// committed result. Returns the number of panels rendered.
    pub fn tick(&mut self, host: &mut dyn HostPage) -> usize {
        let mut rendered = 0;
        while let Some(id) = self.pending_renders.pop_front() {
            let Some(result) = self.cache.get(id).map(Arc::clone) else {
                continue;
            };
            let (panel, change) = self.annotations.render(id, result);
            match host.render_panel(panel, &change) {
                Ok(()) => rendered += 1,
                Err(HostError::StaleSection(stale)) => {
                    log::debug!("{stale} went stale before its panel was rendered");
                    self.cache.remove(stale);
                    self.annotations.remove(stale);
                }
                Err(e) => log::warn!("Failed to render panel for {id}: {e}"),
            }
        }
        rendered
    }

    /// Toggle an identifier's highlight in response to a button click
    pub fn click(&mut self, host: &mut dyn HostPage, section: SectionId, identifier: &str) -> Option<HighlightChange> {
        let change = self.annotations.click(section, identifier)?;
        match host.apply_highlight(section, &change) {
            Ok(()) => {}
            Err(HostError::StaleSection(stale)) => {
                log::debug!("{stale} went stale, dropping it");
                self.drop_section(stale);
            }
            Err(e) => log::warn!("Failed to apply highlight in {section}: {e}"),
        }
        Some(change)
    }

    /// Page gained focus: show the current count
    pub fn on_focus(&self, badge: &mut dyn BadgeSink) {
        badge.send(BadgeMessage::from_count(self.count()));
    }

    /// Page lost focus: clear the badge
    pub fn on_blur(&self, badge: &mut dyn BadgeSink) {
        badge.send(BadgeMessage::cleared());
    }

    /// Flagged identifiers across all committed section results
    pub fn count(&self) -> usize {
        report::count(&self.cache)
    }

    pub fn summary(&self) -> String {
        report::summary(&self.cache)
    }

    pub fn result(&self, section: SectionId) -> Option<&Arc<ScanResult>> {
        self.cache.get(section)
    }

    pub fn panel(&self, section: SectionId) -> Option<&Panel> {
        self.annotations.panel(section)
    }

    pub fn settings(&self) -> &Arc<SettingsSnapshot> {
        &self.settings
    }

    pub fn dictionary(&self) -> &D {
        &self.dictionary
    }

    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Sections waiting for a deferred render
    pub fn pending_renders(&self) -> usize {
        self.pending_renders.len()
    }
}
