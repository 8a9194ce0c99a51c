/// End-to-end passes through SpellContext against an in-memory diff page
use diffspell_lib::annotation::PANEL_CAPTION;
use diffspell_lib::diff_parser::DiffPage;
use diffspell_lib::{
    BadgeMessage, Line, ScanOptions, Section, SectionId, Settings, SpellContext, Trigger, WordListDictionary,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn page(sections: Vec<Section>) -> DiffPage {
    DiffPage::new(sections)
}

fn load(ctx: &mut SpellContext<WordListDictionary>, page: &mut DiffPage) -> Vec<BadgeMessage> {
    let mut badge: Vec<BadgeMessage> = Vec::new();
    ctx.enqueue(Trigger::Load);
    ctx.run_pending(page, &mut badge);
    ctx.tick(page);
    badge
}

#[test]
fn test_single_typo_panel_and_toggle() {
    let mut page = page(vec![Section::new(
        SectionId(1),
        "src/user.js",
        vec![Line::added("const userNmae = 1")],
    )]);
    let mut ctx = SpellContext::new(WordListDictionary::from_words(["user"]), &Settings::default());

    let badge = load(&mut ctx, &mut page);
    assert_eq!(badge, vec![BadgeMessage::from_count(1)]);
    assert_eq!(ctx.count(), 1);

    let panel = ctx.panel(SectionId(1)).expect("panel rendered");
    assert_eq!(panel.caption, PANEL_CAPTION);
    assert_eq!(panel.buttons().len(), 1);
    assert_eq!(panel.buttons()[0].label, "userNmae");
    assert!(!panel.buttons()[0].active);

    let change = ctx.click(&mut page, SectionId(1), "userNmae").expect("known identifier");
    assert_eq!(change.applied, vec![0]);
    assert_eq!(page.highlighted(SectionId(1)), &[0]);
    assert_eq!(ctx.panel(SectionId(1)).and_then(|p| p.active()), Some("userNmae"));

    let change = ctx.click(&mut page, SectionId(1), "userNmae").expect("known identifier");
    assert_eq!(change.cleared, vec![0]);
    assert!(change.applied.is_empty());
    assert!(page.highlighted(SectionId(1)).is_empty());
    assert_eq!(ctx.panel(SectionId(1)).and_then(|p| p.active()), None);
}

#[test]
fn test_switching_between_identifiers() {
    let mut page = page(vec![Section::new(
        SectionId(1),
        "notes.txt",
        vec![Line::added("qwerty"), Line::unchanged("zxcvb")],
    )]);
    let mut ctx = SpellContext::new(WordListDictionary::new(), &Settings::default());
    load(&mut ctx, &mut page);

    ctx.click(&mut page, SectionId(1), "qwerty");
    assert_eq!(page.highlighted(SectionId(1)), &[0]);

    let change = ctx.click(&mut page, SectionId(1), "zxcvb").expect("known identifier");
    assert_eq!(change.cleared, vec![0]);
    assert_eq!(change.applied, vec![1]);
    assert_eq!(page.highlighted(SectionId(1)), &[1]);

    assert!(ctx.click(&mut page, SectionId(1), "unknown").is_none());
}

#[test]
fn test_aggregate_and_stale_sections() {
    let mut page = page(vec![
        Section::new(
            SectionId(1),
            "a.js",
            vec![Line::added("helloWrold()"), Line::added("let wrodl = hello")],
        ),
        Section::new(SectionId(2), "b.js", vec![Line::added("quux")]),
    ]);
    let mut ctx = SpellContext::new(WordListDictionary::from_words(["hello"]), &Settings::default());
    load(&mut ctx, &mut page);
    assert_eq!(ctx.count(), 3);
    assert_eq!(ctx.summary(), "3 suspected typos in 2 sections");

    page.remove(SectionId(2));
    let mut badge: Vec<BadgeMessage> = Vec::new();
    ctx.enqueue(Trigger::SectionsChanged(vec![SectionId(2)]));
    let reports = ctx.run_pending(&mut page, &mut badge);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].dropped, vec![SectionId(2)]);
    assert_eq!(reports[0].aggregate, 2);
    assert!(ctx.result(SectionId(2)).is_none());
    assert!(ctx.panel(SectionId(2)).is_none());
}

#[test]
fn test_unchanged_section_reuses_cached_result() {
    let mut page = page(vec![Section::new(SectionId(1), "a.js", vec![Line::added("wrodl")])]);
    let mut ctx = SpellContext::new(WordListDictionary::new(), &Settings::default());
    load(&mut ctx, &mut page);
    let first = Arc::clone(ctx.result(SectionId(1)).expect("scanned"));

    load(&mut ctx, &mut page);
    let second = ctx.result(SectionId(1)).expect("scanned");
    assert!(Arc::ptr_eq(&first, second));
    assert_eq!(ctx.cache_stats().hits, 1);

    page.upsert(Section::new(
        SectionId(1),
        "a.js",
        vec![Line::added("wrodl"), Line::added("zorp")],
    ));
    load(&mut ctx, &mut page);
    let third = ctx.result(SectionId(1)).expect("scanned");
    assert!(!Arc::ptr_eq(&first, third));
    assert_eq!(third.len(), 2);
}

#[test]
fn test_settings_change_rescans_everything() {
    let mut page = page(vec![Section::new(
        SectionId(1),
        "a.js",
        vec![Line::added("helloWrold"), Line::deleted("oldWrold")],
    )]);
    let mut ctx = SpellContext::new(WordListDictionary::from_words(["hello"]), &Settings::default());
    load(&mut ctx, &mut page);
    assert_eq!(ctx.count(), 1);

    let settings = Settings {
        user_dictionary: vec!["wrold".to_string()],
        options: ScanOptions {
            check_on_deleted_rows: true,
            ..Default::default()
        },
    };
    let mut badge: Vec<BadgeMessage> = Vec::new();
    ctx.enqueue(Trigger::SettingsChanged(settings));
    ctx.run_pending(&mut page, &mut badge);

    // "old" is too short and "wrold" is now accepted
    assert_eq!(ctx.count(), 0);
    assert!(badge.is_empty());
}

#[test]
fn test_no_row_kinds_enabled() {
    let mut page = page(vec![Section::new(SectionId(1), "a.js", vec![Line::added("wrodl")])]);
    let settings = Settings {
        options: ScanOptions {
            check_on_added_rows: false,
            check_on_deleted_rows: false,
            check_on_other_rows: false,
        },
        ..Default::default()
    };
    let mut ctx = SpellContext::new(WordListDictionary::new(), &settings);
    let badge = load(&mut ctx, &mut page);
    assert_eq!(ctx.count(), 0);
    assert!(badge.is_empty());
    assert!(!ctx.panel(SectionId(1)).is_some_and(|p| p.is_visible()));
}

#[test]
fn test_focus_and_blur_badge() {
    let mut page = page(vec![Section::new(SectionId(1), "a.js", vec![Line::added("wrodl")])]);
    let mut ctx = SpellContext::new(WordListDictionary::new(), &Settings::default());
    load(&mut ctx, &mut page);

    let mut badge: Vec<BadgeMessage> = Vec::new();
    ctx.on_blur(&mut badge);
    ctx.on_focus(&mut badge);
    assert_eq!(badge, vec![BadgeMessage::cleared(), BadgeMessage::from_count(1)]);
}

#[test]
fn test_duplicate_triggers_coalesce() {
    let mut page = page(vec![Section::new(SectionId(1), "a.js", vec![Line::added("wrodl")])]);
    let mut ctx = SpellContext::new(WordListDictionary::new(), &Settings::default());
    ctx.enqueue(Trigger::Load);
    ctx.enqueue(Trigger::Load);

    let mut badge: Vec<BadgeMessage> = Vec::new();
    let reports = ctx.run_pending(&mut page, &mut badge);
    assert_eq!(reports.len(), 1);
    assert!(!ctx.has_pending());
    assert_eq!(ctx.pending_renders(), 1);
    assert_eq!(ctx.tick(&mut page), 1);
    assert_eq!(ctx.pending_renders(), 0);
}

#[test]
fn test_most_recent_settings_notification_is_in_force() {
    let mut page = page(vec![Section::new(SectionId(1), "a.js", vec![Line::added("wrodl")])]);
    let mut ctx = SpellContext::new(WordListDictionary::new(), &Settings::default());
    let accepting = Settings {
        user_dictionary: vec!["wrodl".to_string()],
        ..Default::default()
    };

    ctx.enqueue(Trigger::SettingsChanged(Settings::default()));
    ctx.enqueue(Trigger::SettingsChanged(accepting.clone()));
    ctx.enqueue(Trigger::SettingsChanged(Settings::default()));
    let mut badge: Vec<BadgeMessage> = Vec::new();
    ctx.run_pending(&mut page, &mut badge);

    assert_eq!(ctx.settings().user_dictionary_len(), 0);
    assert_eq!(ctx.count(), 1);
    assert_eq!(badge, vec![BadgeMessage::from_count(1)]);

    // A notification followed by a load stays in force
    ctx.enqueue(Trigger::SettingsChanged(accepting));
    ctx.enqueue(Trigger::Load);
    let reports = ctx.run_pending(&mut page, &mut badge);
    assert_eq!(reports.len(), 2);
    assert_eq!(ctx.count(), 0);
}
