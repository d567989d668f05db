//! Direct-draw export: vector text in the standard PDF fonts, laid out line
//! by line with its own page breaks. The output is selectable and parses
//! cleanly in applicant tracking systems.

use std::collections::BTreeSet;

use pdf_writer::{Content, Name, Rect, Str};

use super::{A4_HEIGHT, A4_WIDTH, LinkAnnotation, PageResources, PdfBuilder, fill_rgb, stroke_rgb};
use crate::content::{self, ContactItem, Entry, OutlineItem, SectionBody, SkillLine};
use crate::fonts::{FaceStyle, FontSpec, StandardFont, to_winansi_bytes, unencodable_chars};
use crate::measure::{StandardMetrics, TextMeasurer};
use crate::model::{ResumeRecord, SectionKey};
use crate::paginate::{PageFill, content_height};
use crate::style::{Align, BLACK, Color, HeadingRule, StyleSheet};

const MM: f32 = 72.0 / 25.4;
const MARGIN: f32 = 12.0 * MM;

const NAME_SIZE: f32 = 16.0;
const TITLE_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 11.0;
const ENTRY_TITLE_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;

const NAME_PITCH: f32 = 7.0 * MM;
const ENTRY_PITCH: f32 = 5.0 * MM;
const BODY_PITCH: f32 = 4.5 * MM;
const INDENT: f32 = 2.0 * MM;
/// Share of the content width available to an entry title; the rest holds the date.
const TITLE_COLUMN: f32 = 0.65;
/// Space a heading or an entry start needs before it is pushed to the next page.
const KEEP_HEIGHT: f32 = 15.0 * MM;
const CONTACT_SEPARATOR: &str = " \u{2022} ";

#[derive(Clone, Debug, PartialEq)]
pub enum TextOp {
    /// `baseline` is measured from the top of the page.
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font: StandardFont,
        size: f32,
        color: Color,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
        color: Color,
    },
    /// Clickable area, top-left origin.
    Link {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        url: String,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextPage {
    pub ops: Vec<TextOp>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<TextPage>,
    pub outline: Vec<OutlineItem>,
    pub title: Option<String>,
}

impl TextDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every drawn string, one per line, in drawing order.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for op in self.pages.iter().flat_map(|p| &p.ops) {
            if let TextOp::Text { text, .. } = op {
                out.push_str(text);
                out.push('\n');
            }
        }
        out
    }

    /// (page index, url) for every link.
    pub fn links(&self) -> Vec<(usize, &str)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(i, page)| {
                page.ops.iter().filter_map(move |op| match op {
                    TextOp::Link { url, .. } => Some((i, url.as_str())),
                    _ => None,
                })
            })
            .collect()
    }
}

struct Planner<'s> {
    style: &'s StyleSheet,
    metrics: StandardMetrics,
    width: f32,
    fill: PageFill,
    pages: Vec<TextPage>,
    outline: Vec<OutlineItem>,
}

impl<'s> Planner<'s> {
    fn new(style: &'s StyleSheet) -> Self {
        Planner {
            style,
            metrics: StandardMetrics,
            width: A4_WIDTH - 2.0 * MARGIN,
            fill: PageFill::new(content_height(A4_HEIGHT, MARGIN)),
            pages: vec![TextPage::default()],
            outline: Vec::new(),
        }
    }

    fn font(&self, style: FaceStyle, size: f32) -> FontSpec {
        FontSpec::new(self.style.body_font, style, size)
    }

    fn page(&mut self) -> &mut TextPage {
        // `pages` always holds the current page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(TextPage::default());
    }

    /// Claims a line of `pitch` and returns its top, breaking the page first
    /// when the line does not fit.
    fn line(&mut self, pitch: f32) -> f32 {
        if self.fill.admit(pitch) {
            self.new_page();
        }
        MARGIN + self.fill.used() - pitch
    }

    /// Vertical space that is dropped at a page break.
    fn gap(&mut self, h: f32) {
        if self.fill.remaining() >= h {
            self.fill.admit(h);
        } else {
            self.fill.break_page();
            self.new_page();
        }
    }

    /// Moves to a new page unless `h` still fits on this one.
    fn keep(&mut self, h: f32) {
        if !self.fill.is_empty() && self.fill.remaining() < h {
            self.fill.break_page();
            self.new_page();
        }
    }

    fn text(&mut self, x: f32, top: f32, pitch: f32, text: &str, font: FontSpec, color: Color) {
        let baseline = top + (pitch - font.size) / 2.0 + font.size * 0.8;
        self.page().ops.push(TextOp::Text {
            x,
            baseline,
            text: text.to_string(),
            font: StandardFont::for_spec(font.variant, font.style),
            size: font.size,
            color,
        });
    }

    fn link(&mut self, x: f32, top: f32, width: f32, pitch: f32, url: &str) {
        self.page().ops.push(TextOp::Link {
            x,
            y: top,
            width,
            height: pitch,
            url: url.to_string(),
        });
    }

    fn width_of(&self, text: &str, font: FontSpec) -> f32 {
        self.metrics.width(text, font)
    }

    fn wrap(&self, text: &str, font: FontSpec, width: f32) -> Vec<String> {
        // Standard metrics never fail to measure.
        self.metrics.wrap(text, font, width).unwrap_or_default()
    }

    fn x_for(&self, align: Align, w: f32) -> f32 {
        match align {
            Align::Left => MARGIN,
            Align::Center => MARGIN + ((self.width - w) / 2.0).max(0.0),
            Align::Right => MARGIN + (self.width - w).max(0.0),
        }
    }

    fn header(&mut self, record: &ResumeRecord) {
        let info = &record.personal_info;
        let align = self.style.header_align;

        let name = content::collapse_whitespace(&info.name);
        if !name.is_empty() {
            let font = self.font(FaceStyle::Bold, NAME_SIZE);
            for line in self.wrap(&self.style.name_case.apply(&name), font, self.width) {
                let top = self.line(NAME_PITCH);
                let x = self.x_for(align, self.width_of(&line, font));
                self.text(x, top, NAME_PITCH, &line, font, BLACK);
            }
        }

        let title = content::collapse_whitespace(&info.title);
        if !title.is_empty() {
            let font = self.font(FaceStyle::Regular, TITLE_SIZE);
            for line in self.wrap(&title, font, self.width) {
                let top = self.line(ENTRY_PITCH);
                let x = self.x_for(align, self.width_of(&line, font));
                self.text(x, top, ENTRY_PITCH, &line, font, BLACK);
            }
        }

        let contacts = content::contact_items(info);
        if !contacts.is_empty() {
            self.contact_lines(&contacts, align);
        }
        self.gap(5.0 * MM);
    }

    fn contact_lines(&mut self, items: &[ContactItem], align: Align) {
        let font = self.font(FaceStyle::Regular, BODY_SIZE);
        let sep_w = self.width_of(CONTACT_SEPARATOR, font);
        let widths: Vec<f32> = items.iter().map(|i| self.width_of(&i.text, font)).collect();

        let mut lines: Vec<(Vec<usize>, f32)> = Vec::new();
        for (i, &w) in widths.iter().enumerate() {
            match lines.last_mut() {
                Some((line, line_w)) if *line_w + sep_w + w <= self.width => {
                    line.push(i);
                    *line_w += sep_w + w;
                }
                _ => lines.push((vec![i], w)),
            }
        }

        for (line, line_w) in lines {
            let top = self.line(ENTRY_PITCH);
            let mut x = self.x_for(align, line_w);
            for (n, &i) in line.iter().enumerate() {
                if n > 0 {
                    self.text(x, top, ENTRY_PITCH, CONTACT_SEPARATOR, font, BLACK);
                    x += sep_w;
                }
                self.text(x, top, ENTRY_PITCH, &items[i].text, font, BLACK);
                self.link(x, top, widths[i], ENTRY_PITCH, &items[i].url);
                x += widths[i];
            }
        }
    }

    fn heading(&mut self, heading: &str) {
        self.outline.push(OutlineItem::Heading(heading.to_string()));
        self.keep(KEEP_HEIGHT);
        self.gap(2.0 * MM);

        let font = self.font(FaceStyle::Bold, HEADING_SIZE);
        let text = self.style.heading_case.apply(heading);
        for line in self.wrap(&text, font, self.width) {
            let top = self.line(ENTRY_PITCH);
            self.text(MARGIN, top, ENTRY_PITCH, &line, font, self.style.heading_color);
        }
        if let HeadingRule::Rule { color, thickness } = self.style.heading_rule {
            let top = self.line(2.0 * MM);
            let x2 = MARGIN + self.width;
            self.page().ops.push(TextOp::Rule {
                x1: MARGIN,
                x2,
                y: top + MM,
                thickness,
                color,
            });
        }
        self.gap(MM);
    }

    /// Wrapped lines at one pitch; returns the top of each line.
    fn lines(&mut self, lines: &[String], x: f32, pitch: f32, font: FontSpec) -> Vec<f32> {
        lines
            .iter()
            .map(|line| {
                let top = self.line(pitch);
                self.text(x, top, pitch, line, font, BLACK);
                top
            })
            .collect()
    }

    fn entry(&mut self, key: &SectionKey, entry: &Entry) {
        self.outline.push(OutlineItem::Entry(entry.title.clone()));
        self.keep(KEEP_HEIGHT);

        let mut row = entry.title.clone();
        if let Some(first) = entry.meta.first() {
            if row.is_empty() {
                row = first.clone();
            } else {
                row = format!("{row} \u{2013} {first}");
            }
        }
        if entry.link.is_some() {
            row.push_str(" (Link)");
        }

        let bold = self.font(FaceStyle::Bold, ENTRY_TITLE_SIZE);
        let date_font = self.font(FaceStyle::Regular, ENTRY_TITLE_SIZE);
        let title_lines = self.wrap(&row, bold, self.width * TITLE_COLUMN);
        let tops = self.lines(&title_lines, MARGIN, ENTRY_PITCH, bold);
        if let Some(link) = &entry.link {
            for (line, &top) in title_lines.iter().zip(&tops) {
                let w = self.width_of(line, bold);
                self.link(MARGIN, top, w, ENTRY_PITCH, &link.url);
            }
        }
        if let Some(date) = &entry.date {
            let top = match tops.first() {
                Some(&top) => top,
                None => self.line(ENTRY_PITCH),
            };
            let x = MARGIN + self.width - self.width_of(date, date_font);
            self.text(x, top, ENTRY_PITCH, date, date_font, BLACK);
        }

        let italic = self.font(FaceStyle::Italic, BODY_SIZE);
        let regular = self.font(FaceStyle::Regular, BODY_SIZE);
        if entry.meta.len() > 1 {
            let rest = entry.meta[1..].join(", ");
            let lines = self.wrap(&rest, italic, self.width);
            self.lines(&lines, MARGIN, BODY_PITCH, italic);
        }
        if let Some(detail) = &entry.detail {
            // Degrees read as a subtitle; descriptions as indented body text.
            if *key == SectionKey::Education {
                let lines = self.wrap(detail, italic, self.width);
                self.lines(&lines, MARGIN, BODY_PITCH, italic);
            } else {
                let lines = self.wrap(detail, regular, self.width - INDENT);
                self.lines(&lines, MARGIN + INDENT, BODY_PITCH, regular);
            }
        }

        for bullet in &entry.bullets {
            let lines = self.wrap(&format!("\u{2022} {bullet}"), regular, self.width - INDENT);
            self.lines(&lines, MARGIN + INDENT, BODY_PITCH, regular);
        }
        self.gap(2.0 * MM);
    }

    fn skill(&mut self, line: &SkillLine) {
        self.outline.push(OutlineItem::Entry(line.category.clone()));
        let bold = self.font(FaceStyle::Bold, BODY_SIZE);
        let regular = self.font(FaceStyle::Regular, BODY_SIZE);

        let prefix = if line.category.is_empty() {
            String::new()
        } else {
            format!("{}: ", line.category)
        };
        let prefix_w = self.width_of(&prefix, bold);
        let first_width = (self.width - prefix_w).max(self.width * 0.2);
        let mut lines = self.wrap(&line.items, regular, first_width);
        if lines.len() > 1 {
            let rest = lines[1..].join(" ");
            lines.truncate(1);
            lines.extend(self.wrap(&rest, regular, self.width));
        }

        let top = self.line(BODY_PITCH);
        if !prefix.is_empty() {
            self.text(MARGIN, top, BODY_PITCH, &prefix, bold, BLACK);
        }
        let mut lines = lines.into_iter();
        if let Some(first) = lines.next() {
            self.text(MARGIN + prefix_w, top, BODY_PITCH, &first, regular, BLACK);
        }
        let rest: Vec<String> = lines.collect();
        self.lines(&rest, MARGIN, BODY_PITCH, regular);
    }

    fn paragraph(&mut self, text: &str) {
        let font = self.font(FaceStyle::Regular, BODY_SIZE);
        let lines = self.wrap(text, font, self.width);
        self.lines(&lines, MARGIN, BODY_PITCH, font);
        self.gap(3.0 * MM);
    }
}

/// Lays out the record for the direct-draw export. Uses the same section
/// walk and field selection as the block path, with its own line wrapping
/// and page breaks.
pub fn plan_text(record: &ResumeRecord, style: &StyleSheet) -> TextDocument {
    let mut planner = Planner::new(style);
    planner.header(record);

    for section in content::sections(record) {
        planner.heading(&section.heading);
        match &section.body {
            SectionBody::Paragraph(text) => planner.paragraph(text),
            SectionBody::Skills(lines) => {
                for line in lines {
                    planner.skill(line);
                }
                planner.gap(3.0 * MM);
            }
            SectionBody::Entries(entries) => {
                for entry in entries {
                    planner.entry(&section.key, entry);
                }
            }
        }
    }

    // A trailing page can be left empty when the last gap crossed a break.
    if planner.pages.len() > 1 && planner.pages.last().is_some_and(|p| p.ops.is_empty()) {
        planner.pages.pop();
    }

    let name = content::collapse_whitespace(&record.personal_info.name);
    TextDocument {
        page_width: A4_WIDTH,
        page_height: A4_HEIGHT,
        pages: planner.pages,
        outline: planner.outline,
        title: (!name.is_empty()).then_some(name),
    }
}

/// Characters in `doc` the standard fonts cannot encode. They are drawn
/// as `?`.
pub fn unencodable(doc: &TextDocument) -> BTreeSet<char> {
    doc.pages
        .iter()
        .flat_map(|page| &page.ops)
        .filter_map(|op| match op {
            TextOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .flat_map(unencodable_chars)
        .collect()
}

/// Writes `doc` as a PDF with the six standard fonts it may reference.
pub fn render_text(doc: &TextDocument) -> Vec<u8> {
    let t0 = std::time::Instant::now();

    let missing = unencodable(doc);
    if !missing.is_empty() {
        let chars: String = missing.iter().collect();
        log::warn!(
            "{} character(s) have no WinAnsi encoding and are drawn as '?': {chars}",
            missing.len()
        );
    }
    let mut builder = PdfBuilder::new();

    let mut resources = PageResources::default();
    for font in StandardFont::ALL {
        let font_ref = builder.alloc();
        builder
            .pdf
            .type1_font(font_ref)
            .base_font(Name(font.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        resources
            .fonts
            .push((font.resource_name().to_string(), font_ref));
    }

    let h = doc.page_height;
    for page in &doc.pages {
        let mut content = Content::new();
        let mut links = Vec::new();
        for op in &page.ops {
            match op {
                TextOp::Text {
                    x,
                    baseline,
                    text,
                    font,
                    size,
                    color,
                } => {
                    fill_rgb(&mut content, *color);
                    content.begin_text();
                    content.set_font(Name(font.resource_name().as_bytes()), *size);
                    content.next_line(*x, h - baseline);
                    content.show(Str(&to_winansi_bytes(text)));
                    content.end_text();
                }
                TextOp::Rule {
                    x1,
                    x2,
                    y,
                    thickness,
                    color,
                } => {
                    stroke_rgb(&mut content, *color);
                    content.set_line_width(*thickness);
                    content.move_to(*x1, h - y);
                    content.line_to(*x2, h - y);
                    content.stroke();
                }
                TextOp::Link {
                    x,
                    y,
                    width,
                    height,
                    url,
                } => links.push(LinkAnnotation {
                    rect: Rect::new(*x, h - (y + height), x + width, h - y),
                    url: url.clone(),
                }),
            }
        }
        builder.add_page(doc.page_width, doc.page_height, content, &links, &resources);
    }
    if builder.page_count() == 0 {
        builder.add_page(doc.page_width, doc.page_height, Content::new(), &[], &resources);
    }

    let bytes = builder.finish(doc.title.as_deref());
    log::info!(
        "Timing: text_pdf={:.1}ms ({} pages, {} bytes)",
        t0.elapsed().as_secs_f64() * 1000.0,
        doc.pages.len().max(1),
        bytes.len(),
    );
    bytes
}
