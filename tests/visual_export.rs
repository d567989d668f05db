mod common;

use resume_pdf::blocks::LinkRegion;
use resume_pdf::measure::StandardMetrics;
use resume_pdf::pdf::visual::{Geometry, LinkTransform, compose_pages, render_visual};
use resume_pdf::raster::{self, raster_size};
use resume_pdf::style::StyleSheet;
use resume_pdf::{Error, RenderConfig, ResumeRecord, export_visual, render_visual_pdf};

const A4: (f32, f32) = (595.28, 841.89);

fn region(x: f32, y: f32, width: f32, height: f32) -> LinkRegion {
    LinkRegion {
        x,
        y,
        width,
        height,
        url: "https://example.com".to_string(),
    }
}

#[test]
fn raster_size_rounds_up() {
    assert_eq!(raster_size(A4.0, A4.1, 3.0), (1786, 2526));
    assert_eq!(raster_size(100.0, 50.0, 1.0), (100, 50));
}

#[test]
fn link_rects_flip_to_pdf_space() {
    let t = LinkTransform::new(A4.0, A4.1, 3.0);
    let rect = t.apply(&region(50.0, 50.0, 100.0, 10.0));
    assert!((rect.x1 - 50.0).abs() < 0.1, "{rect:?}");
    assert!((rect.x2 - 150.0).abs() < 0.1, "{rect:?}");
    assert!((rect.y2 - (A4.1 - 50.0)).abs() < 0.1, "{rect:?}");
    assert!((rect.y1 - (A4.1 - 60.0)).abs() < 0.1, "{rect:?}");
}

#[test]
fn letterboxed_images_centre_links() {
    // Image twice as wide as the page's aspect allows: height limits the
    // ratio and the image is centred horizontally.
    let t = LinkTransform::for_image(100.0, 100.0, 1.0, 200, 100);
    assert_eq!(t.ratio, 0.5);
    assert_eq!(t.x_offset, 0.0);

    let t = LinkTransform::for_image(100.0, 100.0, 1.0, 100, 200);
    assert_eq!(t.ratio, 0.5);
    assert_eq!(t.x_offset, 25.0);
    let rect = t.apply(&region(0.0, 0.0, 100.0, 100.0));
    assert_eq!((rect.x1, rect.x2), (25.0, 75.0));
    assert_eq!((rect.y1, rect.y2), (50.0, 100.0));
}

#[test]
fn composed_links_stay_inside_the_page() {
    let record = common::fixture("full");
    let pages = compose_pages(
        &record,
        &StyleSheet::default(),
        &StandardMetrics,
        &Geometry::a4(false),
    )
    .expect("compose");
    let urls: Vec<&str> = pages
        .iter()
        .flat_map(|p| p.links.iter().map(|l| l.url.as_str()))
        .collect();
    assert!(urls.contains(&"mailto:ada@example.com"));
    assert!(urls.contains(&"https://www.example.org/note-g"));

    for page in &pages {
        for link in &page.links {
            assert!(link.x >= 0.0 && link.x + link.width <= page.width + 0.01);
            assert!(link.y >= 0.0 && link.y + link.height <= page.height + 0.01);
        }
    }
}

#[test]
fn unusable_scales_fail_before_rendering() {
    let config = RenderConfig {
        scale: 100.0,
        font_dirs: vec!["/nonexistent".into()],
        ..RenderConfig::default()
    };
    let err = render_visual_pdf(&ResumeRecord::default(), &config).unwrap_err();
    assert!(matches!(err, Error::Measurement(ref m) if m.contains("100")), "{err:?}");

    let config = RenderConfig {
        scale: f32::NAN,
        ..RenderConfig::default()
    };
    assert!(matches!(
        export_visual(&ResumeRecord::default(), None, &config),
        Err(Error::Measurement(_))
    ));
}

#[test]
fn visual_export_has_one_image_per_page() {
    common::init_logging();
    let Some(faces) = common::faces_or_skip("visual_export_has_one_image_per_page") else {
        return;
    };
    let record = common::long_record(12, 5);
    let style = StyleSheet::for_template(record.template);
    let pages = compose_pages(&record, &style, &faces, &Geometry::a4(false)).expect("compose");
    assert!(pages.len() > 1);

    let config = RenderConfig {
        scale: 1.0,
        ..RenderConfig::default()
    };
    let bytes = render_visual(&pages, &faces, &config, Some("Peter Gibbons")).expect("render");
    assert_eq!(common::pdf_page_count(&bytes), pages.len());
    for (w, h) in common::pdf_page_sizes(&bytes) {
        assert!((w - A4.0).abs() < 0.01 && (h - A4.1).abs() < 0.01);
    }
    assert!(common::contains_bytes(&bytes, "mailto:peter@initech.example"));

    std::fs::write(common::output_dir("visual_export").join("long.pdf"), &bytes).ok();
}

#[test]
fn empty_record_still_renders_a_page() {
    let Some(faces) = common::faces_or_skip("empty_record_still_renders_a_page") else {
        return;
    };
    let record = ResumeRecord::default();
    let pages = compose_pages(
        &record,
        &StyleSheet::default(),
        &faces,
        &Geometry::a4(false),
    )
    .expect("compose");
    // Header block with the name placeholder.
    assert_eq!(pages.len(), 1);

    let img = raster::rasterize(&pages[0], &faces, 1.0).expect("rasterize");
    assert_eq!(img.dimensions(), raster_size(A4.0, A4.1, 1.0));
}

#[test]
fn exports_are_named_by_record_id() {
    let Some(_) = common::faces_or_skip("exports_are_named_by_record_id") else {
        return;
    };
    let record = common::fixture("full");
    let config = RenderConfig {
        scale: 1.0,
        ..RenderConfig::from_env()
    };
    let export = export_visual(&record, Some("abc123"), &config).expect("export");
    assert_eq!(export.filename, "resume_abc123.pdf");
    assert_eq!(common::pdf_page_count(&export.bytes), 1);

    let unnamed = export_visual(&ResumeRecord::default(), None, &config).expect("export");
    assert_eq!(unnamed.filename, "resume.pdf");
}

#[test]
fn page_dumps_are_written() {
    let Some(_) = common::faces_or_skip("page_dumps_are_written") else {
        return;
    };
    let dir = tempfile::tempdir().expect("tempdir");
    let config = RenderConfig {
        scale: 0.5,
        dump_pages: Some(dir.path().to_path_buf()),
        ..RenderConfig::from_env()
    };
    render_visual_pdf(&common::fixture("full"), &config).expect("render");
    assert!(dir.path().join("page-001.png").exists());
}
