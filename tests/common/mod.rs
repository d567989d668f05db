#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use resume_pdf::fonts::FaceSet;
use resume_pdf::model::{Education, Experience, LeadershipRole, Project, SkillGroup};
use resume_pdf::{RenderConfig, ResumeRecord, normalize_str};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A record fixture from tests/fixtures/records/<name>.json, normalized.
pub fn fixture(name: &str) -> ResumeRecord {
    let path = Path::new("tests/fixtures/records").join(format!("{name}.json"));
    let json = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    normalize_str(&json).expect("fixture is valid JSON")
}

/// Output directory: tests/output/<case>/
pub fn output_dir(case: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(case);
    fs::create_dir_all(&dir).expect("create output dir");
    dir
}

/// System faces for the visual export, or `None` (with a note) on machines
/// without any of the serif or sans families installed.
pub fn faces_or_skip(test: &str) -> Option<FaceSet> {
    match FaceSet::load(&RenderConfig::from_env().font_dirs) {
        Ok(faces) => Some(faces),
        Err(e) => {
            println!("{test}: SKIP ({e})");
            None
        }
    }
}

pub fn experience(id: &str, title: &str, bullets: &[&str]) -> Experience {
    Experience {
        id: id.to_string(),
        company: "Initech".to_string(),
        job_title: title.to_string(),
        location: "Austin, TX".to_string(),
        start_date: "2019-03".to_string(),
        end_date: "2021-11".to_string(),
        bullets: bullets.iter().map(|b| b.to_string()).collect(),
    }
}

/// A record with `jobs` experience entries of `bullets_per_job` long
/// bullets each, enough to span several pages for large counts.
pub fn long_record(jobs: usize, bullets_per_job: usize) -> ResumeRecord {
    let bullet = "Reworked the nightly reconciliation pipeline so that ledger \
                  differences are reported per account instead of per batch";
    let bullets: Vec<&str> = vec![bullet; bullets_per_job];

    let mut record = ResumeRecord::default();
    record.personal_info.name = "Peter Gibbons".to_string();
    record.personal_info.email = "peter@initech.example".to_string();
    record.summary = "Software engineer with a long history of TPS reports.".to_string();
    record.experience = (0..jobs)
        .map(|i| experience(&format!("job-{i}"), &format!("Engineer {i}"), &bullets))
        .collect();
    record.education = vec![Education {
        id: "edu-0".to_string(),
        school: "State University".to_string(),
        degree: "BSc Computer Science".to_string(),
        location: String::new(),
        start_date: "2011-09".to_string(),
        end_date: "2015-06".to_string(),
        bullets: Vec::new(),
    }];
    record.projects = vec![Project {
        id: "p-0".to_string(),
        name: "Penny Shaver".to_string(),
        description: "Rounding experiment".to_string(),
        start_date: String::new(),
        end_date: String::new(),
        url: "github.com/initech/penny".to_string(),
        bullets: Vec::new(),
    }];
    record.leadership_roles = vec![LeadershipRole {
        id: "l-0".to_string(),
        title: "Organizer".to_string(),
        organization: "Kung Fu Club".to_string(),
        start_date: "2016-01".to_string(),
        end_date: String::new(),
        description: String::new(),
        bullets: Vec::new(),
    }];
    record.skill_groups = vec![SkillGroup {
        category: "Languages".to_string(),
        items: "Rust, C, SQL".to_string(),
    }];
    record
}

/// Page count of a PDF, read back with lopdf.
pub fn pdf_page_count(bytes: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(bytes).expect("output parses as PDF");
    doc.get_pages().len()
}

/// Width and height of every page's MediaBox.
pub fn pdf_page_sizes(bytes: &[u8]) -> Vec<(f32, f32)> {
    let doc = lopdf::Document::load_mem(bytes).expect("output parses as PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).expect("page dictionary");
            let bbox = page
                .get(b"MediaBox")
                .and_then(|o| o.as_array())
                .expect("MediaBox");
            let n: Vec<f32> = bbox.iter().map(|v| v.as_float().expect("number")).collect();
            (n[2] - n[0], n[3] - n[1])
        })
        .collect()
}

pub fn contains_bytes(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w == needle.as_bytes())
}
