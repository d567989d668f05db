//! Off-screen text measurement. Layout only ever asks "how wide is this
//! string in this font", so the visual path can measure with the faces it
//! will rasterize with and tests can measure with fixed metric tables.

use crate::error::Result;
use crate::fonts::{FaceSet, FontSpec, StandardFont};

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.25;

pub trait TextMeasurer {
    fn text_width(&self, text: &str, font: FontSpec) -> Result<f32>;

    /// Distance from the top of the glyph box to the baseline.
    fn ascent(&self, font: FontSpec) -> Result<f32> {
        Ok(font.size * 0.8)
    }

    fn line_height(&self, font: FontSpec) -> f32 {
        font.size * LINE_HEIGHT
    }

    fn wrap(&self, text: &str, font: FontSpec, max_width: f32) -> Result<Vec<String>> {
        wrap_words(self, text, font, max_width)
    }
}

/// Greedy word wrap. Words wider than the line are broken between
/// characters. Whitespace-only text yields no lines.
pub fn wrap_words<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    font: FontSpec,
    max_width: f32,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{current} {word}");
            if measurer.text_width(&candidate, font)? <= max_width {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if measurer.text_width(word, font)? <= max_width {
            current = word.to_string();
            continue;
        }
        for ch in word.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);
            if !current.is_empty() && measurer.text_width(&candidate, font)? > max_width {
                lines.push(std::mem::replace(&mut current, ch.to_string()));
            } else {
                current = candidate;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}

/// AFM metrics of the standard Times and Helvetica fonts. Infallible and
/// independent of installed fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardMetrics;

impl StandardMetrics {
    pub fn width(&self, text: &str, font: FontSpec) -> f32 {
        let face = StandardFont::for_spec(font.variant, font.style);
        text.chars().map(|c| face.char_width_1000(c)).sum::<f32>() * font.size / 1000.0
    }
}

impl TextMeasurer for StandardMetrics {
    fn text_width(&self, text: &str, font: FontSpec) -> Result<f32> {
        Ok(self.width(text, font))
    }
}

impl TextMeasurer for FaceSet {
    fn text_width(&self, text: &str, font: FontSpec) -> Result<f32> {
        self.advance_width(text, font)
    }

    fn ascent(&self, font: FontSpec) -> Result<f32> {
        self.ascent_pt(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FaceStyle, FontVariant};

    fn helv(size: f32) -> FontSpec {
        FontSpec::new(FontVariant::Sans, FaceStyle::Regular, size)
    }

    #[test]
    fn width_scales_with_size() {
        let m = StandardMetrics;
        // "ab" = 556 + 556
        assert!((m.width("ab", helv(10.0)) - 11.12).abs() < 1e-4);
        assert!((m.width("ab", helv(20.0)) - 22.24).abs() < 1e-4);
    }

    #[test]
    fn wrap_breaks_between_words() {
        let m = StandardMetrics;
        // Each "aaaa" is 22.24pt at 10pt, a space 2.78pt.
        let lines = m.wrap("aaaa aaaa aaaa", helv(10.0), 50.0).unwrap();
        assert_eq!(lines, vec!["aaaa aaaa", "aaaa"]);
    }

    #[test]
    fn wrap_splits_overlong_word() {
        let m = StandardMetrics;
        let lines = m.wrap("aaaaaaaaaa", helv(10.0), 20.0).unwrap();
        assert_eq!(lines, vec!["aaa", "aaa", "aaa", "a"]);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(StandardMetrics.wrap("  \n ", helv(10.0), 100.0).unwrap().is_empty());
    }
}
