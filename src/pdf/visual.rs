//! Bitmap export: every page is laid out from blocks, rasterized, and
//! embedded as one full-page image. Text is not selectable; hyperlinks are
//! re-attached as link annotations over the image.

use pdf_writer::{Content, Filter, Name, Rect};

use super::{A4_HEIGHT, A4_WIDTH, LinkAnnotation, PageResources, PdfBuilder};
use crate::blocks::{LaidOutBlock, LinkRegion, Primitive, generate_blocks, layout_block};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::fonts::FaceSet;
use crate::measure::TextMeasurer;
use crate::model::ResumeRecord;
use crate::paginate::{content_height, paginate};
use crate::raster::{self, raster_size};
use crate::style::StyleSheet;

const MARGIN: f32 = 50.0;
const COMPACT_MARGIN: f32 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
}

impl Geometry {
    pub fn a4(compact: bool) -> Geometry {
        Geometry {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin: if compact { COMPACT_MARGIN } else { MARGIN },
        }
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        content_height(self.page_height, self.margin)
    }
}

/// One page of positioned primitives in page coordinates (points, origin
/// top-left).
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedPage {
    pub width: f32,
    pub height: f32,
    pub block_ids: Vec<String>,
    pub primitives: Vec<Primitive>,
    pub links: Vec<LinkRegion>,
}

impl ComposedPage {
    fn blank(geometry: &Geometry) -> ComposedPage {
        ComposedPage {
            width: geometry.page_width,
            height: geometry.page_height,
            block_ids: Vec::new(),
            primitives: Vec::new(),
            links: Vec::new(),
        }
    }
}

/// Generates, lays out and paginates the record's blocks, then places each
/// page's blocks below the top margin.
pub fn compose_pages<M: TextMeasurer + ?Sized>(
    record: &ResumeRecord,
    style: &StyleSheet,
    measurer: &M,
    geometry: &Geometry,
) -> Result<Vec<ComposedPage>> {
    check_geometry(geometry)?;
    let blocks = generate_blocks(record, style);
    let width = geometry.content_width();
    let laid_out = blocks
        .iter()
        .map(|b| layout_block(b, measurer, width))
        .collect::<Result<Vec<LaidOutBlock>>>()?;
    let heights: Vec<f32> = laid_out.iter().map(|b| b.height).collect();

    let pages = paginate(&laid_out, &heights, geometry.content_height());
    log::debug!(
        "{} blocks on {} pages (content height {:.1}pt)",
        blocks.len(),
        pages.len(),
        geometry.content_height()
    );

    let composed = pages
        .iter()
        .map(|page| {
            let mut out = ComposedPage::blank(geometry);
            let mut y = geometry.margin;
            for (offset, block) in page.items.iter().enumerate() {
                out.block_ids.push(blocks[page.start + offset].id.clone());
                for primitive in &block.primitives {
                    let mut p = primitive.clone();
                    p.translate(geometry.margin, y);
                    out.primitives.push(p);
                }
                for link in &block.links {
                    out.links.push(LinkRegion {
                        x: link.x + geometry.margin,
                        y: link.y + y,
                        ..link.clone()
                    });
                }
                y += block.height;
            }
            out
        })
        .collect();
    Ok(composed)
}

/// Maps link regions from page points to PDF user space through the
/// raster: points → pixels (`scale`), pixels → embedded image points
/// (`ratio`, letterboxed and centred horizontally), then a y-flip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkTransform {
    pub scale: f32,
    pub ratio: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub page_height: f32,
}

impl LinkTransform {
    pub fn new(page_width: f32, page_height: f32, scale: f32) -> LinkTransform {
        let (w_px, h_px) = raster_size(page_width, page_height, scale);
        LinkTransform::for_image(page_width, page_height, scale, w_px, h_px)
    }

    pub fn for_image(
        page_width: f32,
        page_height: f32,
        scale: f32,
        w_px: u32,
        h_px: u32,
    ) -> LinkTransform {
        let ratio = (page_width / w_px as f32).min(page_height / h_px as f32);
        LinkTransform {
            scale,
            ratio,
            x_offset: (page_width - w_px as f32 * ratio) / 2.0,
            y_offset: 0.0,
            page_height,
        }
    }

    pub fn apply(&self, region: &LinkRegion) -> Rect {
        let k = self.scale * self.ratio;
        let x1 = self.x_offset + region.x * k;
        let x2 = x1 + region.width * k;
        let top = self.y_offset + region.y * k;
        let y2 = self.page_height - top;
        let y1 = self.page_height - (top + region.height * k);
        Rect::new(x1, y1, x2, y2)
    }

    /// `cm` operands that draw a `w_px` × `h_px` image at its letterboxed
    /// position.
    fn image_matrix(&self, w_px: u32, h_px: u32) -> [f32; 6] {
        let w = w_px as f32 * self.ratio;
        let h = h_px as f32 * self.ratio;
        let y = self.page_height - self.y_offset - h;
        [w, 0.0, 0.0, h, self.x_offset, y]
    }
}

/// Rasterizes `pages` and writes one image-backed PDF page per composed page.
/// An empty page list still produces a single blank page.
pub fn render_visual(
    pages: &[ComposedPage],
    faces: &FaceSet,
    config: &RenderConfig,
    title: Option<&str>,
) -> Result<Vec<u8>> {
    config.validate()?;
    let t0 = std::time::Instant::now();
    let mut builder = PdfBuilder::new();

    if let Some(dir) = &config.dump_pages {
        std::fs::create_dir_all(dir)?;
    }

    let mut raster_ms = 0.0;
    for (i, page) in pages.iter().enumerate() {
        let t_page = std::time::Instant::now();
        let img = raster::rasterize(page, faces, config.scale)?;
        raster_ms += t_page.elapsed().as_secs_f64() * 1000.0;

        if let Some(dir) = &config.dump_pages {
            let path = dir.join(format!("page-{:03}.png", i + 1));
            img.save(&path)?;
            log::debug!("wrote {}", path.display());
        }

        let (w_px, h_px) = img.dimensions();
        let rgb: Vec<u8> = img
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&rgb, 6);

        let xobj_ref = builder.alloc();
        {
            let mut xobj = builder.pdf.image_xobject(xobj_ref, &compressed);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w_px as i32);
            xobj.height(h_px as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }

        let transform = LinkTransform::for_image(page.width, page.height, config.scale, w_px, h_px);
        let mut content = Content::new();
        content.save_state();
        content.transform(transform.image_matrix(w_px, h_px));
        content.x_object(Name(b"Im1"));
        content.restore_state();

        let links: Vec<LinkAnnotation> = page
            .links
            .iter()
            .map(|link| LinkAnnotation {
                rect: transform.apply(link),
                url: link.url.clone(),
            })
            .collect();
        let resources = PageResources {
            fonts: Vec::new(),
            x_objects: vec![("Im1".to_string(), xobj_ref)],
        };
        builder.add_page(page.width, page.height, content, &links, &resources);
    }

    if builder.page_count() == 0 {
        builder.add_page(
            A4_WIDTH,
            A4_HEIGHT,
            Content::new(),
            &[],
            &PageResources::default(),
        );
    }

    let pages_written = builder.page_count();
    let bytes = builder.finish(title);
    log::info!(
        "Timing: raster={:.1}ms, total={:.1}ms ({} pages, {} bytes)",
        raster_ms,
        t0.elapsed().as_secs_f64() * 1000.0,
        pages_written,
        bytes.len(),
    );
    Ok(bytes)
}

/// Rejects geometry whose content area cannot hold anything.
fn check_geometry(geometry: &Geometry) -> Result<()> {
    if geometry.content_width() <= 0.0 || geometry.content_height() <= 0.0 {
        return Err(Error::Measurement(format!(
            "margins of {}pt leave no content area",
            geometry.margin
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_transform_is_nearly_identity() {
        let t = LinkTransform::new(A4_WIDTH, A4_HEIGHT, 3.0);
        let rect = t.apply(&LinkRegion {
            x: 50.0,
            y: 100.0,
            width: 80.0,
            height: 12.0,
            url: "https://example.com".into(),
        });
        assert!((rect.x1 - 50.0).abs() < 0.1);
        assert!((rect.y2 - (A4_HEIGHT - 100.0)).abs() < 0.1);
        assert!((rect.y2 - rect.y1 - 12.0).abs() < 0.1);
    }
}
