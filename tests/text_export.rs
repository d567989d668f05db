mod common;

use resume_pdf::pdf::text::{TextOp, plan_text};
use resume_pdf::style::StyleSheet;
use resume_pdf::{ResumeRecord, TemplateId, export_text, render_text_pdf};

const A4: (f32, f32) = (595.28, 841.89);
const MARGIN: f32 = 12.0 * 72.0 / 25.4;

#[test]
fn empty_record_is_one_page() {
    let bytes = render_text_pdf(&ResumeRecord::default());
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(common::pdf_page_count(&bytes), 1);
}

#[test]
fn pages_are_a4() {
    let bytes = render_text_pdf(&common::long_record(10, 4));
    for (w, h) in common::pdf_page_sizes(&bytes) {
        assert!((w - A4.0).abs() < 0.01 && (h - A4.1).abs() < 0.01, "{w}x{h}");
    }
}

#[test]
fn long_records_break_across_pages() {
    common::init_logging();
    let record = common::long_record(14, 5);
    let doc = plan_text(&record, &StyleSheet::default());
    assert!(doc.page_count() > 1);

    let bytes = render_text_pdf(&record);
    assert_eq!(common::pdf_page_count(&bytes), doc.page_count());

    for (i, page) in doc.pages.iter().enumerate() {
        assert!(!page.ops.is_empty(), "page {i} is empty");
        for op in &page.ops {
            if let TextOp::Text { baseline, text, .. } = op {
                assert!(
                    *baseline > MARGIN && *baseline <= A4.1 - MARGIN,
                    "page {i}: {text:?} at {baseline}"
                );
            }
        }
    }

    std::fs::write(common::output_dir("text_export").join("long.pdf"), &bytes).ok();
}

#[test]
fn every_bullet_is_drawn_once() {
    let record = common::long_record(3, 2);
    let text = plan_text(&record, &StyleSheet::default()).plain_text();
    let markers = text.lines().filter(|l| l.starts_with('\u{2022}')).count();
    assert_eq!(markers, 6);
}

#[test]
fn links_are_annotated() {
    let record = common::fixture("full");
    let doc = plan_text(&record, &StyleSheet::default());
    let urls: Vec<&str> = doc.links().into_iter().map(|(_, url)| url).collect();
    assert!(urls.contains(&"mailto:ada@example.com"));
    assert!(urls.contains(&"https://github.com/ada"));
    assert!(urls.contains(&"https://www.example.org/note-g"));

    let bytes = render_text_pdf(&record);
    assert!(common::contains_bytes(&bytes, "/Link"));
    assert!(common::contains_bytes(&bytes, "https://www.example.org/note-g"));
}

#[test]
fn project_titles_mark_links() {
    let record = common::fixture("full");
    let text = plan_text(&record, &StyleSheet::default()).plain_text();
    assert!(text.contains("Note G (Link)"), "{text}");
}

#[test]
fn sans_templates_use_helvetica() {
    let mut record = common::fixture("full");
    record.template = TemplateId::Minimal;
    let bytes = render_text_pdf(&record);
    assert!(common::contains_bytes(&bytes, "Helvetica"));

    let doc = plan_text(&record, &StyleSheet::for_template(record.template));
    let uses_times = doc.pages.iter().flat_map(|p| &p.ops).any(|op| {
        matches!(op, TextOp::Text { font, .. } if font.base_font().starts_with("Times"))
    });
    assert!(!uses_times);
}

#[test]
fn document_title_is_the_name() {
    let record = common::fixture("full");
    let doc = plan_text(&record, &StyleSheet::default());
    assert_eq!(doc.title.as_deref(), Some("Ada Lovelace"));
    assert_eq!(
        plan_text(&ResumeRecord::default(), &StyleSheet::default()).title,
        None
    );
}

#[test]
fn export_is_named_after_the_person() {
    let record = common::fixture("full");
    let export = export_text(&record);
    assert_eq!(export.filename, "Ada Lovelace_text.pdf");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = export.write_to(dir.path()).expect("write");
    assert_eq!(std::fs::read(&path).expect("read back"), export.bytes);
}
