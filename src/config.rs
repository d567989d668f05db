use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::raster::DEFAULT_SCALE;

pub const FONTS_ENV: &str = "RESUME_PDF_FONTS";
pub const SCALE_ENV: &str = "RESUME_PDF_SCALE";
pub const DUMP_PAGES_ENV: &str = "RESUME_PDF_DUMP_PAGES";

/// Rendering knobs for the visual export. The text export needs none.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Searched before the platform font directories.
    pub font_dirs: Vec<PathBuf>,
    /// Raster pixels per PDF point.
    pub scale: f32,
    /// When set, every page raster is also written here as PNG.
    pub dump_pages: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            font_dirs: Vec::new(),
            scale: DEFAULT_SCALE,
            dump_pages: None,
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by `RESUME_PDF_FONTS` (path list),
    /// `RESUME_PDF_SCALE` and `RESUME_PDF_DUMP_PAGES`.
    pub fn from_env() -> Self {
        let mut config = RenderConfig::default();

        if let Ok(val) = std::env::var(FONTS_ENV) {
            let sep = if cfg!(windows) { ';' } else { ':' };
            config.font_dirs = val
                .split(sep)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect();
        }

        if let Ok(val) = std::env::var(SCALE_ENV) {
            match parse_scale(&val) {
                Some(scale) => config.scale = scale,
                None => log::warn!("ignoring {SCALE_ENV}={val:?}, using {DEFAULT_SCALE}"),
            }
        }

        if let Ok(val) = std::env::var(DUMP_PAGES_ENV)
            && !val.trim().is_empty()
        {
            config.dump_pages = Some(PathBuf::from(val.trim()));
        }

        config
    }

    /// Rejects a scale the rasterizer cannot honour before any work is done.
    pub fn validate(&self) -> Result<()> {
        if valid_scale(self.scale) {
            Ok(())
        } else {
            Err(Error::Measurement(format!(
                "raster scale {} outside {MIN_SCALE}..={MAX_SCALE}",
                self.scale
            )))
        }
    }
}

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 8.0;

/// A usable scale is finite and within `MIN_SCALE..=MAX_SCALE`.
fn valid_scale(scale: f32) -> bool {
    scale.is_finite() && (MIN_SCALE..=MAX_SCALE).contains(&scale)
}

fn parse_scale(val: &str) -> Option<f32> {
    let scale: f32 = val.trim().parse().ok()?;
    valid_scale(scale).then_some(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_must_be_in_range() {
        assert_eq!(parse_scale(" 2 "), Some(2.0));
        assert_eq!(parse_scale("0"), None);
        assert_eq!(parse_scale("NaN"), None);
        assert_eq!(parse_scale("fast"), None);
    }

    #[test]
    fn validate_rejects_out_of_range_scales() {
        for scale in [0.0, -1.0, 100.0, f32::NAN, f32::INFINITY] {
            let config = RenderConfig {
                scale,
                ..RenderConfig::default()
            };
            assert!(matches!(config.validate(), Err(Error::Measurement(_))), "{scale}");
        }
        assert!(RenderConfig::default().validate().is_ok());
    }
}
