mod common;

use resume_pdf::blocks::{self, BlockKind, Element, generate_blocks};
use resume_pdf::content::{
    OutlineItem, SectionBody, contact_items, date_range, format_date, section_content, sections,
};
use resume_pdf::fonts::FontVariant;
use resume_pdf::pdf::text::plan_text;
use resume_pdf::style::{StyleSheet, resolve_style};
use resume_pdf::{ResumeRecord, SectionKey, TemplateId};

#[test]
fn dates_format_as_month_and_year() {
    assert_eq!(format_date("2023-06"), "Jun 2023");
    assert_eq!(format_date("1999-12"), "Dec 1999");
    assert_eq!(format_date(""), "Present");
    assert_eq!(format_date("   "), "Present");
    assert_eq!(format_date("Summer 2020"), "Summer 2020");
    assert_eq!(format_date("2023-13"), "2023-13");
}

#[test]
fn date_ranges_need_a_start() {
    assert_eq!(
        date_range("2020-01", "").as_deref(),
        Some("Jan 2020 - Present")
    );
    assert_eq!(
        date_range("2018-09", "2022-05").as_deref(),
        Some("Sep 2018 - May 2022")
    );
    assert_eq!(date_range("", "2021-01"), None);
}

#[test]
fn blank_bullets_are_dropped() {
    let mut record = ResumeRecord::default();
    record.experience = vec![common::experience("e1", "Engineer", &["", "Did X", "   "])];

    let section = section_content(&record, &SectionKey::Experience).expect("experience");
    let SectionBody::Entries(entries) = &section.body else {
        panic!("experience renders entries");
    };
    assert_eq!(entries[0].bullets, ["Did X"]);

    let blocks = generate_blocks(&record, &StyleSheet::default());
    let entry = blocks
        .iter()
        .find(|b| b.id == "experience:e1")
        .expect("entry block");
    let bullets: Vec<&Vec<String>> = entry
        .elements
        .iter()
        .filter_map(|e| match e {
            Element::Bullets { items, .. } => Some(items),
            _ => None,
        })
        .collect();
    assert_eq!(bullets, [&vec!["Did X".to_string()]]);
}

#[test]
fn entry_with_only_blank_bullets_has_no_bullet_list() {
    let mut record = ResumeRecord::default();
    record.experience = vec![common::experience("e1", "Engineer", &["", " "])];
    let blocks = generate_blocks(&record, &StyleSheet::default());
    let entry = blocks
        .iter()
        .find(|b| b.id == "experience:e1")
        .expect("entry block");
    assert!(
        !entry
            .elements
            .iter()
            .any(|e| matches!(e, Element::Bullets { .. }))
    );
}

#[test]
fn empty_sections_render_nothing() {
    let record = ResumeRecord::default();
    assert_eq!(sections(&record).count(), 0);

    let blocks = generate_blocks(&record, &StyleSheet::default());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, BlockKind::Header);
}

#[test]
fn sections_follow_section_order() {
    let mut record = common::fixture("full");
    record.section_order = vec![
        SectionKey::Skills,
        SectionKey::Custom("awards".into()),
        SectionKey::Experience,
    ];
    let headings: Vec<String> = sections(&record).map(|s| s.heading).collect();
    assert_eq!(headings, ["Skills", "Honours", "Experience"]);
}

#[test]
fn contacts_are_linked() {
    let record = common::fixture("full");
    let items = contact_items(&record.personal_info);
    let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "mailto:ada@example.com",
            "tel:+442079460018",
            "https://linkedin.com/in/ada",
            "https://github.com/ada",
        ]
    );
    assert_eq!(items[3].text, "github.com/ada");
}

#[test]
fn unknown_template_falls_back_to_default() {
    assert_eq!(resolve_style("retro"), StyleSheet::for_template(TemplateId::Harvard));
    assert_eq!(resolve_style(""), StyleSheet::default());
    assert_eq!(resolve_style("MODERN").template, TemplateId::Modern);
}

#[test]
fn styles_are_deterministic() {
    for template in TemplateId::ALL {
        assert_eq!(
            StyleSheet::for_template(template),
            resolve_style(template.name())
        );
    }
    assert_eq!(resolve_style("harvard").body_font, FontVariant::Serif);
    assert_eq!(resolve_style("minimal").body_font, FontVariant::Sans);
    assert!(resolve_style("modern").header_bar.is_some());
}

#[test]
fn both_exports_show_the_same_content() {
    for name in ["full", "legacy"] {
        let base = common::fixture(name);
        for template in TemplateId::ALL {
            let mut record = base.clone();
            record.template = template;
            let style = StyleSheet::for_template(template);

            let visual = blocks::outline(&generate_blocks(&record, &style));
            let text = plan_text(&record, &style).outline;
            assert_eq!(visual, text, "{name} / {}", template.name());
        }
    }
}

#[test]
fn outline_lists_headings_then_entries() {
    let record = common::fixture("full");
    let outline = plan_text(&record, &StyleSheet::default()).outline;
    assert_eq!(outline[0], OutlineItem::Heading("Summary".into()));
    assert_eq!(outline[1], OutlineItem::Heading("Education".into()));
    assert_eq!(outline[2], OutlineItem::Entry("University of London".into()));
    assert_eq!(
        outline.last(),
        Some(&OutlineItem::Entry("Countess of Lovelace".into()))
    );
}
