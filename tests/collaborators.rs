mod common;

use std::cell::Cell;

use resume_pdf::collab::{
    BulletRef, DirStore, EnhanceBudget, EnhanceOutcome, Enhancer, FREE_ENHANCEMENTS, MemoryStore,
    RecordStore, enhance_bullet,
};
use resume_pdf::{Error, ResumeRecord, SectionKey, load_record};
use serde_json::json;

/// Upper-cases its input and counts calls.
#[derive(Default)]
struct Shouty {
    calls: Cell<usize>,
}

impl Enhancer for Shouty {
    fn enhance(&self, text: &str) -> resume_pdf::Result<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(text.to_uppercase())
    }
}

struct Failing;

impl Enhancer for Failing {
    fn enhance(&self, _: &str) -> resume_pdf::Result<String> {
        Err(Error::collaborator("enhance", "service unavailable"))
    }
}

struct Disconnected;

impl Enhancer for Disconnected {
    fn enhance(&self, _: &str) -> resume_pdf::Result<String> {
        Err(Error::Io(std::io::Error::other("connection reset")))
    }
}

/// A store whose backend is unreachable.
struct Offline;

impl RecordStore for Offline {
    fn get_record(&self, _: &str) -> resume_pdf::Result<Option<serde_json::Value>> {
        Err(Error::Io(std::io::Error::other("network unreachable")))
    }

    fn save_record(&self, _: &str, _: &ResumeRecord) -> resume_pdf::Result<()> {
        Err(Error::Io(std::io::Error::other("network unreachable")))
    }
}

struct Silent;

impl Enhancer for Silent {
    fn enhance(&self, _: &str) -> resume_pdf::Result<String> {
        Ok("   ".to_string())
    }
}

fn record() -> ResumeRecord {
    let mut record = ResumeRecord::default();
    record.experience = vec![common::experience("e1", "Engineer", &["shipped it", ""])];
    record
}

fn bullet(index: usize) -> BulletRef {
    BulletRef {
        section: SectionKey::Experience,
        entry_id: "e1".to_string(),
        index,
    }
}

#[test]
fn successful_enhancement_replaces_the_bullet() {
    let mut record = record();
    let mut budget = EnhanceBudget::default();
    let outcome = enhance_bullet(&Shouty::default(), &mut budget, &mut record, &bullet(0))
        .expect("enhance");
    assert_eq!(outcome, EnhanceOutcome::Replaced);
    assert_eq!(record.experience[0].bullets[0], "SHIPPED IT");
    assert_eq!(budget.remaining(), FREE_ENHANCEMENTS - 1);
}

#[test]
fn failure_leaves_the_record_unchanged() {
    let mut record = record();
    let before = record.clone();
    let mut budget = EnhanceBudget::default();
    let err = enhance_bullet(&Failing, &mut budget, &mut record, &bullet(0)).unwrap_err();
    assert!(matches!(err, Error::Collaborator { operation: "enhance", .. }));
    assert_eq!(record, before);
    assert_eq!(budget, EnhanceBudget::default());
}

#[test]
fn empty_response_keeps_the_original() {
    let mut record = record();
    let mut budget = EnhanceBudget::default();
    let outcome = enhance_bullet(&Silent, &mut budget, &mut record, &bullet(0)).expect("enhance");
    assert_eq!(outcome, EnhanceOutcome::Unchanged);
    assert_eq!(record.experience[0].bullets[0], "shipped it");
    assert_eq!(budget.remaining(), FREE_ENHANCEMENTS);
}

#[test]
fn blank_bullets_are_not_sent() {
    let enhancer = Shouty::default();
    let mut record = record();
    let mut budget = EnhanceBudget::default();
    let outcome = enhance_bullet(&enhancer, &mut budget, &mut record, &bullet(1)).expect("enhance");
    assert_eq!(outcome, EnhanceOutcome::Unchanged);
    assert_eq!(enhancer.calls.get(), 0);
}

#[test]
fn budget_stops_after_free_uses() {
    let enhancer = Shouty::default();
    let mut record = record();
    let mut budget = EnhanceBudget::default();
    for _ in 0..FREE_ENHANCEMENTS {
        let outcome =
            enhance_bullet(&enhancer, &mut budget, &mut record, &bullet(0)).expect("enhance");
        assert_eq!(outcome, EnhanceOutcome::Replaced);
    }
    assert!(budget.is_exhausted());

    let outcome = enhance_bullet(&enhancer, &mut budget, &mut record, &bullet(0)).expect("enhance");
    assert_eq!(outcome, EnhanceOutcome::LimitReached);
    assert_eq!(enhancer.calls.get(), FREE_ENHANCEMENTS as usize);
}

#[test]
fn unknown_targets_are_reported() {
    let mut record = record();
    let mut budget = EnhanceBudget::default();
    let missing = [
        BulletRef {
            entry_id: "nope".to_string(),
            ..bullet(0)
        },
        bullet(9),
        BulletRef {
            section: SectionKey::Summary,
            ..bullet(0)
        },
    ];
    for target in &missing {
        let outcome =
            enhance_bullet(&Shouty::default(), &mut budget, &mut record, target).expect("enhance");
        assert_eq!(outcome, EnhanceOutcome::NotFound, "{target:?}");
    }
}

#[test]
fn memory_store_round_trips_records() {
    let store = MemoryStore::new();
    assert_eq!(load_record(&store, "u1").expect("load"), ResumeRecord::default());

    let record = common::fixture("full");
    store.save_record("u1", &record).expect("save");
    assert_eq!(load_record(&store, "u1").expect("load"), record);
}

#[test]
fn stale_stored_records_are_normalized() {
    let store = MemoryStore::new();
    store
        .insert_raw("u2", json!({ "userInfo": { "name": "Grace" }, "sectionOrder": ["skills"] }))
        .expect("insert");
    let record = load_record(&store, "u2").expect("load");
    assert_eq!(record.personal_info.name, "Grace");
    assert_eq!(
        record.section_order,
        vec![SectionKey::Skills, SectionKey::Education]
    );
}

#[test]
fn dir_store_persists_json_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = DirStore::new(dir.path().join("records"));
    assert_eq!(store.get_record("u1").expect("get"), None);

    let record = common::fixture("full");
    store.save_record("u1", &record).expect("save");
    assert!(dir.path().join("records/u1.json").exists());
    assert_eq!(load_record(&store, "u1").expect("load"), record);
}

#[test]
fn dir_store_rejects_path_like_ids() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = DirStore::new(dir.path());
    let err = store.get_record("../secrets").unwrap_err();
    assert!(matches!(err, Error::Collaborator { .. }));
}

#[test]
fn corrupt_files_are_collaborator_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("u3.json"), "{ truncated").expect("write");
    let store = DirStore::new(dir.path());
    assert!(matches!(
        load_record(&store, "u3"),
        Err(Error::Collaborator { operation: "get record", .. })
    ));
}

#[test]
fn enhancer_io_failures_are_collaborator_errors() {
    let mut record = record();
    let before = record.clone();
    let mut budget = EnhanceBudget::default();
    let err = enhance_bullet(&Disconnected, &mut budget, &mut record, &bullet(0)).unwrap_err();
    match err {
        Error::Collaborator { operation, message } => {
            assert_eq!(operation, "enhance");
            assert!(message.contains("connection reset"), "{message}");
        }
        other => panic!("expected a collaborator error, got {other:?}"),
    }
    assert_eq!(record, before);
    assert_eq!(budget.remaining(), FREE_ENHANCEMENTS);
}

#[test]
fn store_failures_are_collaborator_errors() {
    assert!(matches!(
        load_record(&Offline, "u1"),
        Err(Error::Collaborator { operation: "get record", .. })
    ));
}
