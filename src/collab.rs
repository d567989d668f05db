//! Seams to the services around the renderer: where records are stored and
//! who rewrites bullets. Failures come back as `Error::Collaborator` and
//! never touch the caller's in-memory record.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::export::write_atomic;
use crate::model::{ResumeRecord, SectionKey};

/// Free enhancements per session before an upgrade is required.
pub const FREE_ENHANCEMENTS: u32 = 4;

/// Tags a failure with the collaborator `operation` unless it already is one.
pub(crate) fn collaborator_error(operation: &'static str) -> impl FnOnce(Error) -> Error {
    move |e| match e {
        e @ Error::Collaborator { .. } => e,
        e => Error::collaborator(operation, e.to_string()),
    }
}

pub trait Enhancer {
    /// Returns a rewritten version of `text`.
    fn enhance(&self, text: &str) -> Result<String>;
}

pub trait RecordStore {
    /// The stored record as persisted JSON, `None` when the user has none.
    fn get_record(&self, user_id: &str) -> Result<Option<Value>>;
    fn save_record(&self, user_id: &str, record: &ResumeRecord) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Stores raw JSON as-is, e.g. a record in an older shape.
    pub fn insert_raw(&self, user_id: &str, value: Value) -> Result<()> {
        self.lock()?.insert(user_id.to_string(), value);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.records
            .lock()
            .map_err(|_| Error::collaborator("record store", "store lock poisoned"))
    }
}

impl RecordStore for MemoryStore {
    fn get_record(&self, user_id: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(user_id).cloned())
    }

    fn save_record(&self, user_id: &str, record: &ResumeRecord) -> Result<()> {
        let value = serde_json::to_value(record)
            .map_err(|e| Error::collaborator("save record", e.to_string()))?;
        self.lock()?.insert(user_id.to_string(), value);
        Ok(())
    }
}

/// One `<user_id>.json` file per user under `root`.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStore { root: root.into() }
    }

    fn path_for(&self, user_id: &str) -> Result<PathBuf> {
        let valid = !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::collaborator(
                "record store",
                format!("invalid user id {user_id:?}"),
            ));
        }
        Ok(self.root.join(format!("{user_id}.json")))
    }
}

impl RecordStore for DirStore {
    fn get_record(&self, user_id: &str) -> Result<Option<Value>> {
        let path = self.path_for(user_id)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::collaborator("get record", e.to_string())),
        };
        let value = serde_json::from_str(&text)
            .map_err(|e| Error::collaborator("get record", format!("{}: {e}", path.display())))?;
        Ok(Some(value))
    }

    fn save_record(&self, user_id: &str, record: &ResumeRecord) -> Result<()> {
        let path = self.path_for(user_id)?;
        std::fs::create_dir_all(&self.root)
            .map_err(|e| Error::collaborator("save record", e.to_string()))?;
        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| Error::collaborator("save record", e.to_string()))?;
        write_atomic(&path, &json).map_err(|e| Error::collaborator("save record", e.to_string()))
    }
}

/// Remaining free enhancements. Only successful replacements are charged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnhanceBudget {
    remaining: u32,
}

impl Default for EnhanceBudget {
    fn default() -> Self {
        EnhanceBudget::new(FREE_ENHANCEMENTS)
    }
}

impl EnhanceBudget {
    pub fn new(free: u32) -> Self {
        EnhanceBudget { remaining: free }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// A bullet addressed by section, entry id and position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulletRef {
    pub section: SectionKey,
    pub entry_id: String,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnhanceOutcome {
    Replaced,
    /// Blank bullet, or the enhancer returned nothing usable.
    Unchanged,
    LimitReached,
    NotFound,
}

fn bullet_mut<'r>(record: &'r mut ResumeRecord, target: &BulletRef) -> Option<&'r mut String> {
    let id = target.entry_id.as_str();
    let bullets = match &target.section {
        SectionKey::Education => &mut record.education.iter_mut().find(|e| e.id == id)?.bullets,
        SectionKey::Experience => &mut record.experience.iter_mut().find(|e| e.id == id)?.bullets,
        SectionKey::Projects => &mut record.projects.iter_mut().find(|p| p.id == id)?.bullets,
        SectionKey::Leadership => {
            &mut record
                .leadership_roles
                .iter_mut()
                .find(|r| r.id == id)?
                .bullets
        }
        _ => return None,
    };
    bullets.get_mut(target.index)
}

/// Rewrites one bullet through `enhancer`. The bullet is replaced only when
/// the call succeeds with non-blank text, and only then is the budget
/// charged. On error the record is left as it was.
pub fn enhance_bullet<E: Enhancer + ?Sized>(
    enhancer: &E,
    budget: &mut EnhanceBudget,
    record: &mut ResumeRecord,
    target: &BulletRef,
) -> Result<EnhanceOutcome> {
    if budget.is_exhausted() {
        log::debug!("enhancement limit reached");
        return Ok(EnhanceOutcome::LimitReached);
    }
    let Some(bullet) = bullet_mut(record, target) else {
        return Ok(EnhanceOutcome::NotFound);
    };
    if bullet.trim().is_empty() {
        return Ok(EnhanceOutcome::Unchanged);
    }

    let enhanced = enhancer
        .enhance(bullet)
        .map_err(collaborator_error("enhance"))?;
    let enhanced = enhanced.trim();
    if enhanced.is_empty() {
        log::warn!("enhancer returned empty text; keeping the original bullet");
        return Ok(EnhanceOutcome::Unchanged);
    }

    *bullet = enhanced.to_string();
    budget.remaining -= 1;
    log::debug!("bullet enhanced, {} free enhancements left", budget.remaining);
    Ok(EnhanceOutcome::Replaced)
}
