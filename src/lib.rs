pub mod blocks;
pub mod collab;
pub mod config;
pub mod content;
mod error;
pub mod export;
pub mod fonts;
pub mod measure;
pub mod model;
pub mod normalize;
pub mod paginate;
pub mod pdf;
pub mod raster;
pub mod style;

pub use config::RenderConfig;
pub use error::{Error, Result};
pub use export::Export;
pub use model::{ResumeRecord, SectionKey, TemplateId};
pub use normalize::{normalize, normalize_str};

use std::time::Instant;

use collab::RecordStore;
use fonts::FaceSet;
use pdf::visual::{Geometry, compose_pages, render_visual};
use style::StyleSheet;

/// Fetches a user's record and merges it into the current schema. A user
/// with nothing stored gets the default record.
pub fn load_record<S: RecordStore + ?Sized>(store: &S, user_id: &str) -> Result<ResumeRecord> {
    match store
        .get_record(user_id)
        .map_err(collab::collaborator_error("get record"))?
    {
        Some(raw) => Ok(normalize(&raw)),
        None => {
            log::debug!("no stored record for {user_id}, using defaults");
            Ok(ResumeRecord::default())
        }
    }
}

/// Image-backed PDF: the record is laid out with system TrueType faces,
/// every page is rasterized, and links are re-attached over the images.
pub fn render_visual_pdf(record: &ResumeRecord, config: &RenderConfig) -> Result<Vec<u8>> {
    config.validate()?;
    let t0 = Instant::now();

    let faces = FaceSet::load(&config.font_dirs)?;
    let t_fonts = t0.elapsed();

    let style = StyleSheet::for_template(record.template);
    let pages = compose_pages(record, &style, &faces, &Geometry::a4(record.compact_mode))?;
    let t_layout = t0.elapsed();

    let title = content::collapse_whitespace(&record.personal_info.name);
    let title = (!title.is_empty()).then_some(title.as_str());
    let bytes = render_visual(&pages, &faces, config, title)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: fonts={:.1}ms, layout={:.1}ms, render={:.1}ms, total={:.1}ms (output {} bytes)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_layout - t_fonts).as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(bytes)
}

/// Selectable-text PDF drawn with the standard PDF fonts. Needs no system
/// fonts and cannot fail.
pub fn render_text_pdf(record: &ResumeRecord) -> Vec<u8> {
    let t0 = Instant::now();

    let style = StyleSheet::for_template(record.template);
    let doc = pdf::text::plan_text(record, &style);
    let t_plan = t0.elapsed();

    let bytes = pdf::text::render_text(&doc);
    let t_total = t0.elapsed();

    log::info!(
        "Timing: plan={:.1}ms, render={:.1}ms, total={:.1}ms ({} pages, {} bytes)",
        t_plan.as_secs_f64() * 1000.0,
        (t_total - t_plan).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        doc.page_count(),
        bytes.len(),
    );

    bytes
}

/// Visual export with its download name. `record_id` is the stored
/// record's id, when there is one.
pub fn export_visual(
    record: &ResumeRecord,
    record_id: Option<&str>,
    config: &RenderConfig,
) -> Result<Export> {
    let bytes = render_visual_pdf(record, config)?;
    Ok(Export {
        filename: export::visual_filename(record_id, &record.personal_info.name),
        bytes,
    })
}

pub fn export_text(record: &ResumeRecord) -> Export {
    Export {
        filename: export::text_filename(&record.personal_info.name),
        bytes: render_text_pdf(record),
    }
}
