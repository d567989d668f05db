//! Template id → visual parameters. Pure and deterministic; unknown ids get
//! the default template's style.

use crate::fonts::{FaceStyle, FontVariant};
use crate::model::TemplateId;

/// RGB, 0–255 per channel.
pub type Color = [u8; 3];

pub const BLACK: Color = [0, 0, 0];
const GRAY_900: Color = [17, 24, 39];
const GRAY_800: Color = [31, 41, 55];
const GRAY_700: Color = [55, 65, 81];
const GRAY_600: Color = [75, 85, 99];
const GRAY_500: Color = [107, 114, 128];
const GRAY_400: Color = [156, 163, 175];
const GRAY_200: Color = [229, 231, 235];
const BLUE_600: Color = [37, 99, 235];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeadingCase {
    Upper,
    AsIs,
}

impl HeadingCase {
    pub fn apply(self, text: &str) -> String {
        match self {
            HeadingCase::Upper => text.to_uppercase(),
            HeadingCase::AsIs => text.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeadingRule {
    Rule { color: Color, thickness: f32 },
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    pub template: TemplateId,
    pub accent: Color,
    pub heading_case: HeadingCase,
    pub heading_rule: HeadingRule,
    pub body_font: FontVariant,
    pub section_spacing: f32,
    pub item_spacing: f32,
    pub bullet_color: Color,
    pub link_color: Color,

    pub name_size: f32,
    pub name_case: HeadingCase,
    pub title_size: f32,
    pub title_color: Color,
    pub title_face: FaceStyle,
    pub title_case: HeadingCase,
    pub header_align: Align,
    /// Vertical bar drawn left of the header block.
    pub header_bar: Option<Color>,
    pub heading_size: f32,
    pub heading_color: Color,
    pub subtitle_color: Color,
    pub text_color: Color,
    /// Dates and contact line.
    pub muted_color: Color,
}

impl Default for StyleSheet {
    fn default() -> Self {
        StyleSheet::for_template(TemplateId::default())
    }
}

pub fn resolve_style(template: &str) -> StyleSheet {
    StyleSheet::for_template(TemplateId::resolve(template))
}

impl StyleSheet {
    pub fn for_template(template: TemplateId) -> StyleSheet {
        match template {
            TemplateId::Harvard => StyleSheet {
                template,
                accent: BLACK,
                heading_case: HeadingCase::Upper,
                heading_rule: HeadingRule::Rule {
                    color: BLACK,
                    thickness: 0.75,
                },
                body_font: FontVariant::Serif,
                section_spacing: 1.0,
                item_spacing: 1.0,
                bullet_color: BLACK,
                link_color: BLACK,
                name_size: 20.0,
                name_case: HeadingCase::Upper,
                title_size: 11.0,
                title_color: BLACK,
                title_face: FaceStyle::Regular,
                title_case: HeadingCase::AsIs,
                header_align: Align::Center,
                header_bar: None,
                heading_size: 11.0,
                heading_color: BLACK,
                subtitle_color: BLACK,
                text_color: BLACK,
                muted_color: [64, 64, 64],
            },
            TemplateId::Classic => StyleSheet {
                template,
                accent: GRAY_800,
                heading_case: HeadingCase::AsIs,
                heading_rule: HeadingRule::Rule {
                    color: GRAY_400,
                    thickness: 0.75,
                },
                body_font: FontVariant::Sans,
                section_spacing: 1.0,
                item_spacing: 1.0,
                bullet_color: GRAY_400,
                link_color: GRAY_600,
                name_size: 22.0,
                name_case: HeadingCase::AsIs,
                title_size: 12.0,
                title_color: GRAY_600,
                title_face: FaceStyle::Italic,
                title_case: HeadingCase::AsIs,
                header_align: Align::Center,
                header_bar: None,
                heading_size: 13.0,
                heading_color: GRAY_800,
                subtitle_color: GRAY_600,
                text_color: GRAY_900,
                muted_color: GRAY_500,
            },
            TemplateId::Modern => StyleSheet {
                template,
                accent: BLUE_600,
                heading_case: HeadingCase::Upper,
                heading_rule: HeadingRule::Rule {
                    color: GRAY_200,
                    thickness: 1.0,
                },
                body_font: FontVariant::Sans,
                section_spacing: 1.2,
                item_spacing: 1.0,
                bullet_color: BLUE_600,
                link_color: BLUE_600,
                name_size: 24.0,
                name_case: HeadingCase::AsIs,
                title_size: 14.0,
                title_color: BLUE_600,
                title_face: FaceStyle::Bold,
                title_case: HeadingCase::AsIs,
                header_align: Align::Left,
                header_bar: Some(BLUE_600),
                heading_size: 12.0,
                heading_color: BLUE_600,
                subtitle_color: BLUE_600,
                text_color: GRAY_900,
                muted_color: GRAY_500,
            },
            TemplateId::Minimal => StyleSheet {
                template,
                accent: GRAY_700,
                heading_case: HeadingCase::Upper,
                heading_rule: HeadingRule::None,
                body_font: FontVariant::Sans,
                section_spacing: 0.9,
                item_spacing: 0.8,
                bullet_color: GRAY_400,
                link_color: GRAY_700,
                name_size: 20.0,
                name_case: HeadingCase::AsIs,
                title_size: 10.0,
                title_color: GRAY_500,
                title_face: FaceStyle::Regular,
                title_case: HeadingCase::Upper,
                header_align: Align::Left,
                header_bar: None,
                heading_size: 10.0,
                heading_color: GRAY_700,
                subtitle_color: GRAY_600,
                text_color: GRAY_900,
                muted_color: GRAY_500,
            },
        }
    }
}
