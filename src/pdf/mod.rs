//! PDF assembly shared by both export paths.

pub mod text;
pub mod visual;

use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

/// ISO A4 in points.
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

/// A URI link annotation in PDF user space (origin bottom-left).
#[derive(Clone, Debug, PartialEq)]
pub struct LinkAnnotation {
    pub rect: Rect,
    pub url: String,
}

/// Named resources referenced from a page's content stream.
#[derive(Default)]
pub(crate) struct PageResources {
    pub(crate) fonts: Vec<(String, Ref)>,
    pub(crate) x_objects: Vec<(String, Ref)>,
}

/// Incremental writer: allocate refs, write shared objects, then add pages
/// one at a time. The page tree is written by `finish`.
pub(crate) struct PdfBuilder {
    pub(crate) pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    page_ids: Vec<Ref>,
}

impl PdfBuilder {
    pub(crate) fn new() -> Self {
        let mut builder = PdfBuilder {
            pdf: Pdf::new(),
            next_id: 1,
            catalog_id: Ref::new(1),
            pages_id: Ref::new(1),
            page_ids: Vec::new(),
        };
        builder.catalog_id = builder.alloc();
        builder.pages_id = builder.alloc();
        builder
    }

    pub(crate) fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    pub(crate) fn add_page(
        &mut self,
        width: f32,
        height: f32,
        content: Content,
        links: &[LinkAnnotation],
        resources: &PageResources,
    ) {
        let page_id = self.alloc();
        let content_id = self.alloc();

        let annot_refs: Vec<Ref> = links
            .iter()
            .map(|link| {
                let annot_ref = self.alloc();
                let mut annot = self.pdf.annotation(annot_ref);
                annot
                    .subtype(AnnotationType::Link)
                    .rect(link.rect)
                    .border(0.0, 0.0, 0.0, None);
                annot
                    .action()
                    .action_type(ActionType::Uri)
                    .uri(Str(link.url.as_bytes()));
                annot_ref
            })
            .collect();

        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        self.pdf
            .stream(content_id, &compressed)
            .filter(Filter::FlateDecode);

        {
            let mut page = self.pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, width, height))
                .parent(self.pages_id)
                .contents(content_id);
            if !annot_refs.is_empty() {
                page.annotations(annot_refs.iter().copied());
            }
            let mut res = page.resources();
            if !resources.fonts.is_empty() {
                let mut fonts = res.fonts();
                for (name, font_ref) in &resources.fonts {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !resources.x_objects.is_empty() {
                let mut xobjects = res.x_objects();
                for (name, xobj_ref) in &resources.x_objects {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }
        self.page_ids.push(page_id);
    }

    pub(crate) fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Writes the page tree, catalog and document info. `title` is the
    /// person's name when one is known.
    pub(crate) fn finish(mut self, title: Option<&str>) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .kids(self.page_ids.iter().copied())
            .count(self.page_ids.len() as i32);

        let info_id = self.alloc();
        {
            let mut info = self.pdf.document_info(info_id);
            if let Some(title) = title {
                info.title(TextStr(title));
            }
            info.producer(TextStr(concat!(
                env!("CARGO_PKG_NAME"),
                " ",
                env!("CARGO_PKG_VERSION")
            )));
        }

        self.pdf.finish()
    }
}

/// Sets the non-stroking color from 8-bit RGB.
pub(crate) fn fill_rgb(content: &mut Content, color: [u8; 3]) {
    content.set_fill_rgb(
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    );
}

pub(crate) fn stroke_rgb(content: &mut Content, color: [u8; 3]) {
    content.set_stroke_rgb(
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    );
}
