//! Merges a persisted, possibly stale or partial, résumé record into the full
//! schema. The persistence layer is not trusted: anything of the wrong JSON
//! type is replaced by its default instead of failing the render.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::model::{
    CustomItem, CustomSection, DEFAULT_SECTION_ORDER, Education, Experience, LeadershipRole,
    PersonalInfo, Project, ResumeRecord, SectionKey, SkillGroup, TemplateId,
};

/// Entries created before bullets existed get this many empty slots so the
/// form has something to edit. Empty bullets never render.
const PLACEHOLDER_BULLETS: usize = 3;

type Object = Map<String, Value>;

pub fn normalize(raw: &Value) -> ResumeRecord {
    let empty = Object::new();
    let obj = match raw {
        Value::Object(obj) => obj,
        Value::Null => &empty,
        other => {
            log::warn!("record root is {}, not an object; using an empty record", kind(other));
            &empty
        }
    };

    let personal_info = field(obj, &["userInfo", "personalInfo"])
        .and_then(Value::as_object)
        .map(personal_info)
        .unwrap_or_default();

    let education = objects(obj, &["education"])
        .enumerate()
        .map(|(i, e)| Education {
            id: id_or_positional(e, "education", i),
            school: string(e, "school"),
            degree: string(e, "degree"),
            location: string(e, "location"),
            start_date: string(e, "startDate"),
            end_date: string(e, "endDate"),
            bullets: bullets(e, true),
        })
        .collect();

    let experience = objects(obj, &["experience"])
        .enumerate()
        .map(|(i, e)| Experience {
            id: id_or_positional(e, "experience", i),
            company: string(e, "company"),
            job_title: string(e, "jobTitle"),
            location: string(e, "location"),
            start_date: string(e, "startDate"),
            end_date: string(e, "endDate"),
            bullets: bullets(e, true),
        })
        .collect();

    let projects = objects(obj, &["projects"])
        .enumerate()
        .map(|(i, p)| Project {
            id: id_or_positional(p, "project", i),
            name: string(p, "name"),
            description: string(p, "description"),
            start_date: string(p, "startDate"),
            end_date: string(p, "endDate"),
            url: string(p, "url"),
            bullets: bullets(p, false),
        })
        .collect();

    let leadership_roles = objects(obj, &["leadershipRoles"])
        .enumerate()
        .map(|(i, r)| LeadershipRole {
            id: id_or_positional(r, "leadership", i),
            title: string(r, "title"),
            organization: string(r, "organization"),
            start_date: string(r, "startDate"),
            end_date: string(r, "endDate"),
            description: string(r, "description"),
            bullets: bullets(r, true),
        })
        .collect();

    let custom_sections = custom_sections(obj);
    let section_order = section_order(obj, &custom_sections);

    let template = field(obj, &["templateSelected", "template"])
        .and_then(Value::as_str)
        .map(TemplateId::resolve)
        .unwrap_or_default();

    ResumeRecord {
        personal_info,
        summary: field(obj, &["summary"])
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        education,
        experience,
        projects,
        leadership_roles,
        skill_groups: skill_groups(obj),
        custom_sections,
        section_order,
        template,
        compact_mode: field(obj, &["isCompact", "compactMode"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

/// Parses JSON text and normalizes it. Only text that is not JSON at all is
/// an error.
pub fn normalize_str(json: &str) -> Result<ResumeRecord> {
    let raw: Value = serde_json::from_str(json)?;
    Ok(normalize(&raw))
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// First present, non-null value among `names` (persisted name first, then aliases).
fn field<'a>(obj: &'a Object, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|n| obj.get(*n))
        .find(|v| !v.is_null())
}

fn string(obj: &Object, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            log::debug!("field '{key}' is {}, not a string; using \"\"", kind(other));
            String::new()
        }
    }
}

fn objects<'a>(obj: &'a Object, names: &[&str]) -> impl Iterator<Item = &'a Object> + use<'a> {
    let items: &'a [Value] = match field(obj, names) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            log::debug!("field '{}' is {}, not an array", names[0], kind(other));
            &[]
        }
        None => &[],
    };
    items.iter().filter_map(Value::as_object)
}

fn id_or_positional(obj: &Object, prefix: &str, index: usize) -> String {
    let id = string(obj, "id");
    if id.is_empty() {
        format!("{prefix}-{index}")
    } else {
        id
    }
}

fn bullets(obj: &Object, placeholder_when_missing: bool) -> Vec<String> {
    match obj.get("bullets") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|b| b.as_str().unwrap_or_default().to_string())
            .collect(),
        _ if placeholder_when_missing => vec![String::new(); PLACEHOLDER_BULLETS],
        _ => Vec::new(),
    }
}

fn personal_info(obj: &Object) -> PersonalInfo {
    PersonalInfo {
        name: string(obj, "name"),
        title: string(obj, "title"),
        phone: string(obj, "phone"),
        email: string(obj, "email"),
        linked_in: string(obj, "linkedIn"),
        github: string(obj, "github"),
    }
}

fn skill_groups(obj: &Object) -> Vec<SkillGroup> {
    let Some(Value::Array(items)) = field(obj, &["skills", "skillGroups"]) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(g) => Some(SkillGroup {
                category: string(g, "category"),
                items: string(g, "items"),
            }),
            // Early records stored skills as a flat list of strings.
            Value::String(s) => Some(SkillGroup {
                category: String::new(),
                items: s.clone(),
            }),
            _ => None,
        })
        .collect()
}

fn custom_sections(obj: &Object) -> Vec<CustomSection> {
    let mut seen: HashSet<String> = HashSet::new();
    objects(obj, &["customSections"])
        .enumerate()
        .map(|(i, s)| {
            let mut id = id_or_positional(s, "custom", i);
            if !seen.insert(id.clone()) {
                let mut unique = format!("{id}-{i}");
                let mut n = 1;
                while !seen.insert(unique.clone()) {
                    unique = format!("{id}-{i}-{n}");
                    n += 1;
                }
                log::debug!("duplicate custom section id '{id}', renamed to '{unique}'");
                id = unique;
            }
            let items = objects(s, &["items"])
                .map(|item| CustomItem {
                    title: string(item, "title"),
                    date: string(item, "date"),
                    description: string(item, "description"),
                })
                .collect();
            CustomSection {
                id,
                title: string(s, "title"),
                items,
            }
        })
        .collect()
}

fn push_unique(order: &mut Vec<SectionKey>, key: SectionKey) {
    if !order.contains(&key) {
        order.push(key);
    }
}

fn section_order(obj: &Object, custom_sections: &[CustomSection]) -> Vec<SectionKey> {
    let mut order: Vec<SectionKey> = match field(obj, &["sectionOrder"]) {
        Some(Value::Array(raw)) => {
            let tags: Vec<&str> = raw.iter().filter_map(Value::as_str).collect();
            let explicit: HashSet<&str> = tags
                .iter()
                .filter_map(|t| t.strip_prefix("custom:"))
                .collect();

            let mut order = Vec::with_capacity(tags.len());
            for tag in tags {
                // The legacy bare `custom` tag stood for every custom section at once.
                if tag == "custom" {
                    for section in custom_sections {
                        if !explicit.contains(section.id.as_str()) {
                            push_unique(&mut order, SectionKey::Custom(section.id.clone()));
                        }
                    }
                    continue;
                }
                match tag.parse::<SectionKey>() {
                    Ok(SectionKey::Custom(id)) if custom_sections.iter().all(|s| s.id != id) => {
                        log::debug!("dropping reference to missing custom section '{id}'");
                    }
                    Ok(key) => push_unique(&mut order, key),
                    Err(e) => log::debug!("dropping {e} from sectionOrder"),
                }
            }
            order
        }
        _ => DEFAULT_SECTION_ORDER.to_vec(),
    };

    if !order.contains(&SectionKey::Education) {
        match order.iter().position(|k| *k == SectionKey::Summary) {
            Some(i) => order.insert(i + 1, SectionKey::Education),
            None => order.push(SectionKey::Education),
        }
    }

    for section in custom_sections {
        push_unique(&mut order, SectionKey::Custom(section.id.clone()));
    }

    order
}
