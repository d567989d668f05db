use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

const FALLBACK_STEM: &str = "resume";

/// A finished export: the suggested download name and the PDF bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Export {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Export {
    /// Writes the PDF into `dir` under its suggested name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        write_atomic(&path, &self.bytes)?;
        Ok(path)
    }
}

/// `resume_<id>.pdf` for a stored record, else `<name>.pdf`.
pub fn visual_filename(record_id: Option<&str>, name: &str) -> String {
    match record_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("resume_{}.pdf", file_stem(id)),
        None => format!("{}.pdf", file_stem(name)),
    }
}

pub fn text_filename(name: &str) -> String {
    format!("{}_text.pdf", file_stem(name))
}

/// Makes a display name safe as a file name on every platform.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim_matches('.').trim();
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// Writes through a temporary file in the destination directory and renames
/// it into place, so readers never see a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_download_conventions() {
        assert_eq!(visual_filename(Some("abc123"), "Ada"), "resume_abc123.pdf");
        assert_eq!(visual_filename(None, "Ada Lovelace"), "Ada Lovelace.pdf");
        assert_eq!(visual_filename(Some("  "), ""), "resume.pdf");
        assert_eq!(text_filename("Ada Lovelace"), "Ada Lovelace_text.pdf");
        assert_eq!(text_filename(""), "resume_text.pdf");
    }

    #[test]
    fn path_separators_are_replaced() {
        assert_eq!(text_filename("../etc/passwd"), "_etc_passwd_text.pdf");
    }
}
