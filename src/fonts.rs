use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use memmap2::Mmap;
use rusttype::{Font, PositionedGlyph, Scale, point};
use ttf_parser::Face;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontVariant {
    Serif,
    Sans,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceStyle {
    Regular,
    Bold,
    Italic,
}

/// A font request: family variant, face style and size in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub variant: FontVariant,
    pub style: FaceStyle,
    pub size: f32,
}

impl FontSpec {
    pub fn new(variant: FontVariant, style: FaceStyle, size: f32) -> Self {
        FontSpec {
            variant,
            style,
            size,
        }
    }
}

// ---------------------------------------------------------------------------
// Standard 14 fonts (text export)
// ---------------------------------------------------------------------------

/// The six base fonts the text export draws with. They are never embedded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StandardFont {
    TimesRoman,
    TimesBold,
    TimesItalic,
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 6] = [
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
    ];

    pub fn for_spec(variant: FontVariant, style: FaceStyle) -> StandardFont {
        match (variant, style) {
            (FontVariant::Serif, FaceStyle::Regular) => StandardFont::TimesRoman,
            (FontVariant::Serif, FaceStyle::Bold) => StandardFont::TimesBold,
            (FontVariant::Serif, FaceStyle::Italic) => StandardFont::TimesItalic,
            (FontVariant::Sans, FaceStyle::Regular) => StandardFont::Helvetica,
            (FontVariant::Sans, FaceStyle::Bold) => StandardFont::HelveticaBold,
            (FontVariant::Sans, FaceStyle::Italic) => StandardFont::HelveticaOblique,
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "F1",
            StandardFont::TimesBold => "F2",
            StandardFont::TimesItalic => "F3",
            StandardFont::Helvetica => "F4",
            StandardFont::HelveticaBold => "F5",
            StandardFont::HelveticaOblique => "F6",
        }
    }

    fn width_table(self) -> &'static [u16; 95] {
        match self {
            // Italic faces are measured with their upright widths.
            StandardFont::TimesRoman | StandardFont::TimesItalic => &TIMES_ROMAN_WIDTHS,
            StandardFont::TimesBold => &TIMES_BOLD_WIDTHS,
            StandardFont::Helvetica | StandardFont::HelveticaOblique => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of `ch` in 1000-units of the em.
    pub fn char_width_1000(self, ch: char) -> f32 {
        let table = self.width_table();
        let w = match ch {
            ' '..='~' => table[(ch as usize) - 32],
            '\u{2022}' => 350,
            '\u{2013}' => table[(b'n' - 32) as usize],
            '\u{2014}' => 1000,
            '\u{00A0}' => table[0],
            // Everything else is measured as an average lowercase glyph.
            _ => table[(b'n' - 32) as usize],
        };
        w as f32
    }
}

/// Helvetica AFM advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

/// Map a single Unicode char to its WinAnsi byte, or `None` if unmappable.
fn char_to_winansi(c: char) -> Option<u8> {
    let b = match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(b)
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF `Str`
/// encoding. Characters outside the code page become `?`.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| char_to_winansi(c).unwrap_or(b'?'))
        .collect()
}

/// Characters of `s` that `to_winansi_bytes` replaces with `?`.
pub(crate) fn unencodable_chars(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().filter(|&c| char_to_winansi(c).is_none())
}

// ---------------------------------------------------------------------------
// System font index (visual export)
// ---------------------------------------------------------------------------

/// (lowercase family name, bold, italic) -> (file path, face index within TTC)
type FontLookup = HashMap<(String, bool, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

const SERIF_FAMILIES: [&str; 6] = [
    "times new roman",
    "liberation serif",
    "tinos",
    "dejavu serif",
    "noto serif",
    "freeserif",
];

const SANS_FAMILIES: [&str; 7] = [
    "helvetica",
    "arial",
    "liberation sans",
    "arimo",
    "dejavu sans",
    "noto sans",
    "freesans",
];

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn read_font_style(data: &[u8], face_index: u32) -> Option<(String, bool, bool)> {
    let face = Face::parse(data, face_index).ok()?;
    let family = font_family_name(&face)?;
    Some((family, face.is_bold(), face.is_italic()))
}

fn system_font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(&home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn is_font_collection(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttc"))
}

fn index_font_file(index: &mut FontLookup, path: &Path) {
    let Ok(file) = std::fs::File::open(path) else {
        return;
    };
    // SAFETY: the mapping is read-only and dropped before this function returns.
    let Ok(data) = (unsafe { Mmap::map(&file) }) else {
        return;
    };
    let face_count = if is_font_collection(path) {
        ttf_parser::fonts_in_collection(&data).unwrap_or(1)
    } else {
        1
    };
    for face_idx in 0..face_count {
        if let Some((family, bold, italic)) = read_font_style(&data, face_idx) {
            index
                .entry((family.to_lowercase(), bold, italic))
                .or_insert((path.to_path_buf(), face_idx));
        }
    }
}

fn scan_font_dirs(dirs: Vec<PathBuf>) -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut visited = std::collections::HashSet::new();
    let mut files_scanned = 0u32;

    let mut stack = dirs;
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_font_file(&path) {
                files_scanned += 1;
                index_font_file(&mut index, &path);
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} dirs, {} files parsed → {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        visited.len(),
        files_scanned,
        index.len(),
    );
    index
}

fn system_font_index() -> &'static FontLookup {
    FONT_INDEX.get_or_init(|| scan_font_dirs(system_font_directories()))
}

fn lookup(
    indexes: &[&FontLookup],
    family: &str,
    bold: bool,
    italic: bool,
) -> Option<(PathBuf, u32)> {
    indexes
        .iter()
        .find_map(|index| index.get(&(family.to_string(), bold, italic)))
        .cloned()
}

/// Finds a face for `variant`/`style` among the candidate families. An
/// exact style match in any candidate wins over the regular face of an
/// earlier one.
fn find_face_file(
    indexes: &[&FontLookup],
    variant: FontVariant,
    style: FaceStyle,
) -> Option<(PathBuf, u32)> {
    let families: &[&str] = match variant {
        FontVariant::Serif => &SERIF_FAMILIES,
        FontVariant::Sans => &SANS_FAMILIES,
    };
    let (bold, italic) = match style {
        FaceStyle::Regular => (false, false),
        FaceStyle::Bold => (true, false),
        FaceStyle::Italic => (false, true),
    };
    families
        .iter()
        .find_map(|f| lookup(indexes, f, bold, italic))
        .or_else(|| families.iter().find_map(|f| lookup(indexes, f, false, false)))
}

// ---------------------------------------------------------------------------
// Loaded faces
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct LoadedFace {
    font: Font<'static>,
    /// (ascender - descender) / units_per_em. rusttype scales to the
    /// ascender-descender height, not to the em.
    em_ratio: f32,
}

impl LoadedFace {
    fn load(path: &Path, face_index: u32) -> Result<LoadedFace> {
        let data = std::fs::read(path)?;
        let font = Font::try_from_vec_and_index(data, face_index).ok_or_else(|| {
            Error::Measurement(format!(
                "cannot parse font face {} of {}",
                face_index,
                path.display()
            ))
        })?;
        let upem = font.units_per_em();
        let vm = font.v_metrics_unscaled();
        let em_ratio = if upem > 0 && vm.ascent > vm.descent {
            (vm.ascent - vm.descent) / upem as f32
        } else {
            1.0
        };
        Ok(LoadedFace { font, em_ratio })
    }

    fn scale(&self, size: f32) -> Scale {
        Scale::uniform(size * self.em_ratio)
    }
}

/// System TrueType faces for both font variants in all three styles.
/// Positions and sizes are in points: a rusttype pixel is one point here,
/// and the rasterizer scales on top.
#[derive(Clone)]
pub struct FaceSet {
    faces: HashMap<(FontVariant, FaceStyle), LoadedFace>,
}

impl FaceSet {
    /// Resolves every (variant, style) against `extra_dirs` first, then the
    /// system font directories. A variant with no installed family borrows
    /// the other variant's faces.
    pub fn load(extra_dirs: &[PathBuf]) -> Result<FaceSet> {
        let extra = if extra_dirs.is_empty() {
            FontLookup::new()
        } else {
            scan_font_dirs(extra_dirs.to_vec())
        };
        let indexes = [&extra, system_font_index()];

        let mut by_file: HashMap<(PathBuf, u32), LoadedFace> = HashMap::new();
        let mut faces = HashMap::new();
        for variant in [FontVariant::Serif, FontVariant::Sans] {
            let other = match variant {
                FontVariant::Serif => FontVariant::Sans,
                FontVariant::Sans => FontVariant::Serif,
            };
            for style in [FaceStyle::Regular, FaceStyle::Bold, FaceStyle::Italic] {
                let Some(key) = find_face_file(&indexes, variant, style)
                    .or_else(|| find_face_file(&indexes, other, style))
                else {
                    return Err(Error::Measurement(format!(
                        "no usable system font face for {variant:?} {style:?}"
                    )));
                };
                log::debug!(
                    "font {variant:?} {style:?} -> {} [{}]",
                    key.0.display(),
                    key.1
                );
                let face = match by_file.get(&key) {
                    Some(face) => face.clone(),
                    None => {
                        let face = LoadedFace::load(&key.0, key.1)?;
                        by_file.insert(key, face.clone());
                        face
                    }
                };
                faces.insert((variant, style), face);
            }
        }
        Ok(FaceSet { faces })
    }

    fn face(&self, spec: FontSpec) -> Result<&LoadedFace> {
        self.faces.get(&(spec.variant, spec.style)).ok_or_else(|| {
            Error::Measurement(format!("face {:?} {:?} not loaded", spec.variant, spec.style))
        })
    }

    /// Glyphs of `text` laid out on a baseline at (`x`, `baseline`).
    pub(crate) fn layout(
        &self,
        text: &str,
        spec: FontSpec,
        x: f32,
        baseline: f32,
    ) -> Result<Vec<PositionedGlyph<'static>>> {
        let face = self.face(spec)?;
        Ok(face
            .font
            .layout(text, face.scale(spec.size), point(x, baseline))
            .collect())
    }

    pub(crate) fn advance_width(&self, text: &str, spec: FontSpec) -> Result<f32> {
        let face = self.face(spec)?;
        let scale = face.scale(spec.size);
        let width = face
            .font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        Ok(width)
    }

    pub(crate) fn ascent_pt(&self, spec: FontSpec) -> Result<f32> {
        let face = self.face(spec)?;
        Ok(face.font.v_metrics(face.scale(spec.size)).ascent)
    }
}
