//! Résumé record → ordered, styled blocks, and block → positioned primitives.
//!
//! A block is the unit of pagination: the header, one block per section
//! heading, and one per entry. Everything inside a block stays on one page.

use crate::content::{
    self, ContactItem, Entry, OutlineItem, SectionBody, SectionContent, SkillLine,
};
use crate::error::{Error, Result};
use crate::fonts::{FaceStyle, FontSpec};
use crate::measure::TextMeasurer;
use crate::model::{ResumeRecord, SectionKey};
use crate::style::{Align, Color, HeadingRule, StyleSheet};

pub const NAME_PLACEHOLDER: &str = "Your Name";

const ENTRY_TITLE_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const CONTACT_SIZE: f32 = 9.0;
const SECTION_GAP: f32 = 12.0;
const ITEM_GAP: f32 = 6.0;
const COMPACT_FACTOR: f32 = 0.5;

const BULLET_MARKER_INDENT: f32 = 12.0;
const BULLET_TEXT_INDENT: f32 = 25.0;
const DATE_GUTTER: f32 = 8.0;
const HEADER_BAR_WIDTH: f32 = 4.0;
const HEADER_BAR_INDENT: f32 = 15.0;
const CONTACT_SEPARATOR: &str = " \u{2022} ";

#[derive(Clone, Debug, PartialEq)]
pub enum BlockKind {
    Header,
    SectionHeading { key: SectionKey, title: String },
    Entry { key: SectionKey, title: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// Wrapped paragraph.
    Text {
        text: String,
        font: FontSpec,
        color: Color,
        align: Align,
    },
    /// Title left, date right-aligned on the title's first line.
    TitleDate {
        title: String,
        date: Option<String>,
        title_font: FontSpec,
        date_font: FontSpec,
        title_color: Color,
        date_color: Color,
    },
    Bullets {
        items: Vec<String>,
        font: FontSpec,
        marker_color: Color,
        color: Color,
    },
    /// Bold category followed by its items, continuation lines hanging.
    SkillRow {
        category: String,
        items: String,
        font: FontSpec,
        color: Color,
    },
    Contact {
        items: Vec<ContactItem>,
        font: FontSpec,
        color: Color,
        link_color: Color,
        align: Align,
    },
    Link {
        text: String,
        url: String,
        font: FontSpec,
        color: Color,
    },
    Rule {
        color: Color,
        thickness: f32,
    },
    Spacer(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Stable across renders of the same record.
    pub id: String,
    pub kind: BlockKind,
    pub elements: Vec<Element>,
    /// Gap above the block's content, counted in its height.
    pub space_before: f32,
    /// Vertical accent bar along the left edge of the block.
    pub accent_bar: Option<Color>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font: FontSpec,
        color: Color,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
}

impl Primitive {
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Primitive::Text { x, baseline, .. } => {
                *x += dx;
                *baseline += dy;
            }
            Primitive::Rect { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
        }
    }
}

/// Clickable area, in the same top-left-origin coordinates as primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaidOutBlock {
    pub height: f32,
    pub primitives: Vec<Primitive>,
    pub links: Vec<LinkRegion>,
}

struct Spacing {
    section: f32,
    item: f32,
    line: f32,
}

impl Spacing {
    fn new(style: &StyleSheet, compact: bool) -> Spacing {
        let factor = if compact { COMPACT_FACTOR } else { 1.0 };
        Spacing {
            section: SECTION_GAP * style.section_spacing * factor,
            item: ITEM_GAP * style.item_spacing * factor,
            line: if compact { 0.5 } else { 2.0 },
        }
    }
}

pub fn generate_blocks(record: &ResumeRecord, style: &StyleSheet) -> Vec<Block> {
    let spacing = Spacing::new(style, record.compact_mode);
    let mut blocks = vec![header_block(record, style, &spacing)];

    for section in content::sections(record) {
        blocks.push(heading_block(&section, style, &spacing));
        let key_name = section.key.to_string();
        match &section.body {
            SectionBody::Paragraph(text) => blocks.push(Block {
                id: format!("{key_name}:0"),
                kind: BlockKind::Entry {
                    key: section.key.clone(),
                    title: String::new(),
                },
                elements: vec![Element::Text {
                    text: text.clone(),
                    font: body_font(style, FaceStyle::Regular, BODY_SIZE),
                    color: style.text_color,
                    align: Align::Left,
                }],
                space_before: spacing.item * 0.5,
                accent_bar: None,
            }),
            SectionBody::Skills(lines) => {
                for (i, line) in lines.iter().enumerate() {
                    blocks.push(skill_block(&section.key, line, i == 0, style, &spacing));
                }
            }
            SectionBody::Entries(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    blocks.push(entry_block(&section.key, entry, i == 0, style, &spacing));
                }
            }
        }
    }
    blocks
}

fn body_font(style: &StyleSheet, face: FaceStyle, size: f32) -> FontSpec {
    FontSpec::new(style.body_font, face, size)
}

fn header_block(record: &ResumeRecord, style: &StyleSheet, spacing: &Spacing) -> Block {
    let info = &record.personal_info;
    let name = if info.name.trim().is_empty() {
        NAME_PLACEHOLDER.to_string()
    } else {
        content::collapse_whitespace(&info.name)
    };

    let mut elements = vec![Element::Text {
        text: style.name_case.apply(&name),
        font: body_font(style, FaceStyle::Bold, style.name_size),
        color: style.text_color,
        align: style.header_align,
    }];
    if !info.title.trim().is_empty() {
        elements.push(Element::Spacer(spacing.line));
        elements.push(Element::Text {
            text: style.title_case.apply(&content::collapse_whitespace(&info.title)),
            font: body_font(style, style.title_face, style.title_size),
            color: style.title_color,
            align: style.header_align,
        });
    }
    let contacts = content::contact_items(info);
    if !contacts.is_empty() {
        elements.push(Element::Spacer(spacing.line * 2.0));
        elements.push(Element::Contact {
            items: contacts,
            font: body_font(style, FaceStyle::Regular, CONTACT_SIZE),
            color: style.muted_color,
            link_color: style.link_color,
            align: style.header_align,
        });
    }

    Block {
        id: "header".to_string(),
        kind: BlockKind::Header,
        elements,
        space_before: 0.0,
        accent_bar: style.header_bar,
    }
}

fn heading_block(section: &SectionContent, style: &StyleSheet, spacing: &Spacing) -> Block {
    let mut elements = vec![Element::Text {
        text: style.heading_case.apply(&section.heading),
        font: body_font(style, FaceStyle::Bold, style.heading_size),
        color: style.heading_color,
        align: Align::Left,
    }];
    if let HeadingRule::Rule { color, thickness } = style.heading_rule {
        elements.push(Element::Spacer(2.0));
        elements.push(Element::Rule { color, thickness });
    }
    Block {
        id: format!("heading:{}", section.key),
        kind: BlockKind::SectionHeading {
            key: section.key.clone(),
            title: section.heading.clone(),
        },
        elements,
        space_before: spacing.section,
        accent_bar: None,
    }
}

fn entry_gap(first: bool, spacing: &Spacing) -> f32 {
    if first { spacing.item * 0.5 } else { spacing.item }
}

fn entry_block(
    key: &SectionKey,
    entry: &Entry,
    first: bool,
    style: &StyleSheet,
    spacing: &Spacing,
) -> Block {
    let mut elements = Vec::new();
    let push = |el: Element, elements: &mut Vec<Element>| {
        if !elements.is_empty() {
            elements.push(Element::Spacer(spacing.line));
        }
        elements.push(el);
    };

    if !entry.title.is_empty() || entry.date.is_some() {
        push(
            Element::TitleDate {
                title: entry.title.clone(),
                date: entry.date.clone(),
                title_font: body_font(style, FaceStyle::Bold, ENTRY_TITLE_SIZE),
                date_font: body_font(style, FaceStyle::Regular, BODY_SIZE),
                title_color: style.text_color,
                date_color: style.muted_color,
            },
            &mut elements,
        );
    }
    if !entry.meta.is_empty() {
        push(
            Element::Text {
                text: entry.meta.join(", "),
                font: body_font(style, FaceStyle::Italic, BODY_SIZE),
                color: style.subtitle_color,
                align: Align::Left,
            },
            &mut elements,
        );
    }
    if let Some(detail) = &entry.detail {
        push(
            Element::Text {
                text: detail.clone(),
                font: body_font(style, FaceStyle::Regular, BODY_SIZE),
                color: style.text_color,
                align: Align::Left,
            },
            &mut elements,
        );
    }
    if let Some(link) = &entry.link {
        push(
            Element::Link {
                text: link.text.clone(),
                url: link.url.clone(),
                font: body_font(style, FaceStyle::Regular, BODY_SIZE),
                color: style.link_color,
            },
            &mut elements,
        );
    }
    if !entry.bullets.is_empty() {
        push(
            Element::Bullets {
                items: entry.bullets.clone(),
                font: body_font(style, FaceStyle::Regular, BODY_SIZE),
                marker_color: style.bullet_color,
                color: style.text_color,
            },
            &mut elements,
        );
    }

    Block {
        id: format!("{key}:{}", entry.id),
        kind: BlockKind::Entry {
            key: key.clone(),
            title: entry.title.clone(),
        },
        elements,
        space_before: entry_gap(first, spacing),
        accent_bar: None,
    }
}

fn skill_block(
    key: &SectionKey,
    line: &SkillLine,
    first: bool,
    style: &StyleSheet,
    spacing: &Spacing,
) -> Block {
    Block {
        id: format!("{key}:{}", line.id),
        kind: BlockKind::Entry {
            key: key.clone(),
            title: line.category.clone(),
        },
        elements: vec![Element::SkillRow {
            category: line.category.clone(),
            items: line.items.clone(),
            font: body_font(style, FaceStyle::Regular, BODY_SIZE),
            color: style.text_color,
        }],
        space_before: entry_gap(first, spacing) * 0.5,
        accent_bar: None,
    }
}

/// Headings and entry titles of `blocks`, skipping the header and untitled
/// paragraph blocks.
pub fn outline(blocks: &[Block]) -> Vec<OutlineItem> {
    blocks
        .iter()
        .filter_map(|b| match &b.kind {
            BlockKind::Header => None,
            BlockKind::SectionHeading { title, .. } => Some(OutlineItem::Heading(title.clone())),
            BlockKind::Entry {
                key: SectionKey::Summary,
                ..
            } => None,
            BlockKind::Entry { title, .. } => Some(OutlineItem::Entry(title.clone())),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

struct LayoutCtx<'m, M: ?Sized> {
    measurer: &'m M,
    left: f32,
    width: f32,
    out: LaidOutBlock,
}

impl<M: TextMeasurer + ?Sized> LayoutCtx<'_, M> {
    fn baseline(&self, font: FontSpec, top: f32) -> Result<f32> {
        let lh = self.measurer.line_height(font);
        Ok(top + (lh - font.size) / 2.0 + self.measurer.ascent(font)?)
    }

    fn text(&mut self, text: &str, font: FontSpec, color: Color, x: f32, baseline: f32) {
        self.out.primitives.push(Primitive::Text {
            x,
            baseline,
            text: text.to_string(),
            font,
            color,
        });
    }

    fn aligned_x(&self, align: Align, avail: f32, w: f32) -> f32 {
        match align {
            Align::Left => self.left,
            Align::Center => self.left + ((avail - w) / 2.0).max(0.0),
            Align::Right => self.left + (avail - w).max(0.0),
        }
    }

    fn paragraph(
        &mut self,
        text: &str,
        font: FontSpec,
        color: Color,
        align: Align,
        y: f32,
    ) -> Result<f32> {
        let lh = self.measurer.line_height(font);
        let mut y = y;
        for line in self.measurer.wrap(text, font, self.width)? {
            let w = self.measurer.text_width(&line, font)?;
            let x = self.aligned_x(align, self.width, w);
            let baseline = self.baseline(font, y)?;
            self.text(&line, font, color, x, baseline);
            y += lh;
        }
        Ok(y)
    }

    fn element(&mut self, element: &Element, y: f32) -> Result<f32> {
        match element {
            Element::Text {
                text,
                font,
                color,
                align,
            } => self.paragraph(text, *font, *color, *align, y),
            Element::TitleDate {
                title,
                date,
                title_font,
                date_font,
                title_color,
                date_color,
            } => {
                let date_w = match date {
                    Some(d) => self.measurer.text_width(d, *date_font)?,
                    None => 0.0,
                };
                let avail = if date.is_some() {
                    self.width - date_w - DATE_GUTTER
                } else {
                    self.width
                };
                let lh = self.measurer.line_height(*title_font);
                let baseline = self.baseline(*title_font, y)?;
                let lines = self.measurer.wrap(title, *title_font, avail.max(1.0))?;
                for (i, line) in lines.iter().enumerate() {
                    self.text(line, *title_font, *title_color, self.left, baseline + i as f32 * lh);
                }
                if let Some(d) = date {
                    let x = self.left + self.width - date_w;
                    self.text(d, *date_font, *date_color, x, baseline);
                }
                Ok(y + lines.len().max(1) as f32 * lh)
            }
            Element::Bullets {
                items,
                font,
                marker_color,
                color,
            } => {
                let lh = self.measurer.line_height(*font);
                let text_width = self.width - BULLET_TEXT_INDENT;
                let mut y = y;
                for item in items {
                    let baseline = self.baseline(*font, y)?;
                    self.text(
                        "\u{2022}",
                        *font,
                        *marker_color,
                        self.left + BULLET_MARKER_INDENT,
                        baseline,
                    );
                    for line in self.measurer.wrap(item, *font, text_width)? {
                        let baseline = self.baseline(*font, y)?;
                        self.text(&line, *font, *color, self.left + BULLET_TEXT_INDENT, baseline);
                        y += lh;
                    }
                }
                Ok(y)
            }
            Element::SkillRow {
                category,
                items,
                font,
                color,
            } => {
                let bold = FontSpec::new(font.variant, FaceStyle::Bold, font.size);
                let lh = self.measurer.line_height(*font);
                let mut top = y;
                let mut hang = 0.0;
                if !category.is_empty() {
                    let prefix = format!("{category}: ");
                    let pw = self.measurer.text_width(&prefix, bold)?;
                    let baseline = self.baseline(bold, top)?;
                    self.text(&prefix, bold, *color, self.left, baseline);
                    if pw < self.width * 0.4 {
                        hang = pw;
                    } else if !items.is_empty() {
                        top += lh;
                    }
                }
                let lines = self.measurer.wrap(items, *font, self.width - hang)?;
                for (i, line) in lines.iter().enumerate() {
                    let baseline = self.baseline(*font, top + i as f32 * lh)?;
                    self.text(line, *font, *color, self.left + hang, baseline);
                }
                Ok(top + lines.len().max(1) as f32 * lh)
            }
            Element::Contact {
                items,
                font,
                color,
                link_color,
                align,
            } => self.contact(items, *font, *color, *link_color, *align, y),
            Element::Link {
                text,
                url,
                font,
                color,
            } => {
                let lh = self.measurer.line_height(*font);
                let mut y = y;
                for line in self.measurer.wrap(text, *font, self.width)? {
                    let w = self.measurer.text_width(&line, *font)?;
                    let baseline = self.baseline(*font, y)?;
                    self.text(&line, *font, *color, self.left, baseline);
                    self.out.links.push(LinkRegion {
                        x: self.left,
                        y,
                        width: w,
                        height: lh,
                        url: url.clone(),
                    });
                    y += lh;
                }
                Ok(y)
            }
            Element::Rule { color, thickness } => {
                self.out.primitives.push(Primitive::Rect {
                    x: self.left,
                    y,
                    width: self.width,
                    height: *thickness,
                    color: *color,
                });
                Ok(y + thickness)
            }
            Element::Spacer(h) => Ok(y + h),
        }
    }

    /// Contact items flow inline, separated by bullets, wrapping between
    /// items. Each item gets its own link region.
    fn contact(
        &mut self,
        items: &[ContactItem],
        font: FontSpec,
        color: Color,
        link_color: Color,
        align: Align,
        y: f32,
    ) -> Result<f32> {
        let sep_w = self.measurer.text_width(CONTACT_SEPARATOR, font)?;
        let widths = items
            .iter()
            .map(|item| self.measurer.text_width(&item.text, font))
            .collect::<Result<Vec<f32>>>()?;

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

        let lh = self.measurer.line_height(font);
        let mut y = y;
        for (line, line_w) in lines {
            let baseline = self.baseline(font, y)?;
            let mut x = self.aligned_x(align, self.width, line_w);
            for (n, &i) in line.iter().enumerate() {
                if n > 0 {
                    self.text(CONTACT_SEPARATOR, font, color, x, baseline);
                    x += sep_w;
                }
                let item = &items[i];
                self.text(&item.text, font, link_color, x, baseline);
                self.out.links.push(LinkRegion {
                    x,
                    y,
                    width: widths[i],
                    height: lh,
                    url: item.url.clone(),
                });
                x += widths[i];
            }
            y += lh;
        }
        Ok(y)
    }
}

/// Lays out `block` in a column of `width` points. Coordinates are relative
/// to the block's top-left corner, y growing downwards.
pub fn layout_block<M: TextMeasurer + ?Sized>(
    block: &Block,
    measurer: &M,
    width: f32,
) -> Result<LaidOutBlock> {
    let indent = if block.accent_bar.is_some() {
        HEADER_BAR_INDENT
    } else {
        0.0
    };
    let mut ctx = LayoutCtx {
        measurer,
        left: indent,
        width: width - indent,
        out: LaidOutBlock::default(),
    };

    let top = block.space_before;
    let mut y = top;
    for element in &block.elements {
        y = ctx.element(element, y)?;
    }
    if let Some(color) = block.accent_bar {
        ctx.out.primitives.insert(
            0,
            Primitive::Rect {
                x: 0.0,
                y: top,
                width: HEADER_BAR_WIDTH,
                height: y - top,
                color,
            },
        );
    }

    if !y.is_finite() || y < 0.0 {
        return Err(Error::Measurement(format!(
            "block '{}' measured a height of {y}",
            block.id
        )));
    }
    let mut out = ctx.out;
    out.height = y;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::StandardMetrics;
    use crate::model::{Experience, PersonalInfo};
    use crate::style::StyleSheet;

    fn record() -> ResumeRecord {
        ResumeRecord {
            personal_info: PersonalInfo {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                github: "https://github.com/ada".into(),
                ..Default::default()
            },
            experience: vec![Experience {
                id: "e1".into(),
                company: "Analytical Engines".into(),
                job_title: "Programmer".into(),
                start_date: "1842-07".into(),
                bullets: vec!["Wrote the first program".into(), "  ".into()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn header_links_every_contact_item() {
        let style = StyleSheet::default();
        let blocks = generate_blocks(&record(), &style);
        let header = layout_block(&blocks[0], &StandardMetrics, 495.0).unwrap();
        let urls: Vec<&str> = header.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["mailto:ada@example.com", "https://github.com/ada"]);
    }

    #[test]
    fn entry_block_carries_only_non_blank_bullets() {
        let style = StyleSheet::default();
        let blocks = generate_blocks(&record(), &style);
        let entry = blocks
            .iter()
            .find(|b| b.id == "experience:e1")
            .expect("experience block");
        let bullets = entry.elements.iter().find_map(|e| match e {
            Element::Bullets { items, .. } => Some(items.clone()),
            _ => None,
        });
        assert_eq!(bullets, Some(vec!["Wrote the first program".to_string()]));
    }

    #[test]
    fn accent_bar_spans_the_header() {
        let style = StyleSheet::for_template(crate::model::TemplateId::Modern);
        let blocks = generate_blocks(&record(), &style);
        let header = layout_block(&blocks[0], &StandardMetrics, 495.0).unwrap();
        match &header.primitives[0] {
            Primitive::Rect { height, .. } => assert!((*height - header.height).abs() < 1e-3),
            other => panic!("expected accent bar, got {other:?}"),
        }
    }
}
