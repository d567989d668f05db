//! Field selection shared by both export paths: which sections appear, in
//! which order, and which fields of each entry are shown. Layout is left to
//! the callers, so the visual and the text export stay content-equivalent.

use chrono::NaiveDate;

use crate::model::{PersonalInfo, ResumeRecord, SectionKey};

#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub text: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContactItem {
    pub text: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub id: String,
    pub title: String,
    /// Organization, location, in display order. Never contains blanks.
    pub meta: Vec<String>,
    /// Right-aligned date text; `None` omits the date entirely.
    pub date: Option<String>,
    /// Degree or description line.
    pub detail: Option<String>,
    pub link: Option<Link>,
    /// Non-blank bullets with whitespace runs collapsed.
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkillLine {
    pub id: String,
    pub category: String,
    pub items: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SectionBody {
    Paragraph(String),
    Skills(Vec<SkillLine>),
    Entries(Vec<Entry>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionContent {
    pub key: SectionKey,
    pub heading: String,
    pub body: SectionBody,
}

/// Headings and entry titles in reading order. Both exports report one so
/// their content can be compared without parsing PDFs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutlineItem {
    Heading(String),
    Entry(String),
}

impl SectionContent {
    /// Titles of the entries, in order. Summary paragraphs have none.
    pub fn entry_titles(&self) -> Vec<&str> {
        match &self.body {
            SectionBody::Paragraph(_) => Vec::new(),
            SectionBody::Skills(lines) => lines.iter().map(|l| l.category.as_str()).collect(),
            SectionBody::Entries(entries) => entries.iter().map(|e| e.title.as_str()).collect(),
        }
    }
}

/// Formats one side of a date range: `""` is an ongoing end date,
/// `"YYYY-MM"` becomes `"Jun 2023"`, anything else is shown as typed.
pub fn format_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "Present".to_string();
    }
    match parse_year_month(raw.trim()) {
        Some(date) => date.format("%b %Y").to_string(),
        None => raw.to_string(),
    }
}

/// `"<start> - <end>"`, or `None` when there is no start date.
pub fn date_range(start: &str, end: &str) -> Option<String> {
    if start.trim().is_empty() {
        return None;
    }
    Some(format!("{} - {}", format_date(start), format_date(end)))
}

fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let (year, month) = s.split_once('-')?;
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if year.len() != 4 || !digits(year) || month.len() > 2 || !digits(month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_blank(s: &str) -> Option<String> {
    let collapsed = collapse_whitespace(s);
    (!collapsed.is_empty()).then_some(collapsed)
}

fn clean_bullets(bullets: &[String]) -> Vec<String> {
    bullets.iter().filter_map(|b| non_blank(b)).collect()
}

fn clean_meta<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    parts.into_iter().filter_map(non_blank).collect()
}

/// Absolute URL for a profile or project link typed without a scheme.
pub fn link_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("mailto:") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// Link text with the scheme and a leading `www.` removed.
pub fn display_url(raw: &str) -> String {
    let raw = raw.trim();
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw);
    rest.strip_prefix("www.").unwrap_or(rest).to_string()
}

/// Non-empty subset of {email, phone, LinkedIn, GitHub}, in that order.
pub fn contact_items(info: &PersonalInfo) -> Vec<ContactItem> {
    let mut items = Vec::with_capacity(4);
    if !info.email.trim().is_empty() {
        let email = info.email.trim();
        items.push(ContactItem {
            text: email.to_string(),
            url: format!("mailto:{email}"),
        });
    }
    if !info.phone.trim().is_empty() {
        let phone = info.phone.trim();
        let dial: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        items.push(ContactItem {
            text: phone.to_string(),
            url: format!("tel:{dial}"),
        });
    }
    for profile in [&info.linked_in, &info.github] {
        if !profile.trim().is_empty() {
            items.push(ContactItem {
                text: display_url(profile),
                url: link_url(profile),
            });
        }
    }
    items
}

/// Content for one section key, or `None` when the section has no backing
/// data (and so renders nothing, not even a heading).
pub fn section_content(record: &ResumeRecord, key: &SectionKey) -> Option<SectionContent> {
    let (heading, body) = match key {
        // Rendered as the header, never as a section.
        SectionKey::PersonalInfo => return None,
        SectionKey::Summary => {
            let text = non_blank(&record.summary)?;
            ("Summary".to_string(), SectionBody::Paragraph(text))
        }
        SectionKey::Skills => {
            if record.skill_groups.is_empty() {
                return None;
            }
            let lines = record
                .skill_groups
                .iter()
                .enumerate()
                .map(|(i, g)| SkillLine {
                    id: format!("skills-{i}"),
                    category: collapse_whitespace(&g.category),
                    items: collapse_whitespace(&g.items),
                })
                .collect();
            ("Skills".to_string(), SectionBody::Skills(lines))
        }
        SectionKey::Education => {
            if record.education.is_empty() {
                return None;
            }
            let entries = record
                .education
                .iter()
                .map(|e| Entry {
                    id: e.id.clone(),
                    title: collapse_whitespace(&e.school),
                    meta: clean_meta([e.location.as_str()]),
                    date: date_range(&e.start_date, &e.end_date),
                    detail: non_blank(&e.degree),
                    link: None,
                    bullets: clean_bullets(&e.bullets),
                })
                .collect();
            ("Education".to_string(), SectionBody::Entries(entries))
        }
        SectionKey::Experience => {
            if record.experience.is_empty() {
                return None;
            }
            let entries = record
                .experience
                .iter()
                .map(|e| Entry {
                    id: e.id.clone(),
                    title: collapse_whitespace(&e.job_title),
                    meta: clean_meta([e.company.as_str(), e.location.as_str()]),
                    date: date_range(&e.start_date, &e.end_date),
                    detail: None,
                    link: None,
                    bullets: clean_bullets(&e.bullets),
                })
                .collect();
            ("Experience".to_string(), SectionBody::Entries(entries))
        }
        SectionKey::Projects => {
            if record.projects.is_empty() {
                return None;
            }
            let entries = record
                .projects
                .iter()
                .map(|p| Entry {
                    id: p.id.clone(),
                    title: collapse_whitespace(&p.name),
                    meta: Vec::new(),
                    date: date_range(&p.start_date, &p.end_date),
                    detail: non_blank(&p.description),
                    link: (!p.url.trim().is_empty()).then(|| Link {
                        text: display_url(&p.url),
                        url: link_url(&p.url),
                    }),
                    bullets: clean_bullets(&p.bullets),
                })
                .collect();
            ("Projects".to_string(), SectionBody::Entries(entries))
        }
        SectionKey::Leadership => {
            if record.leadership_roles.is_empty() {
                return None;
            }
            let entries = record
                .leadership_roles
                .iter()
                .map(|r| Entry {
                    id: r.id.clone(),
                    title: collapse_whitespace(&r.title),
                    meta: clean_meta([r.organization.as_str()]),
                    date: date_range(&r.start_date, &r.end_date),
                    detail: non_blank(&r.description),
                    link: None,
                    bullets: clean_bullets(&r.bullets),
                })
                .collect();
            ("Leadership".to_string(), SectionBody::Entries(entries))
        }
        SectionKey::Custom(id) => {
            let section = record.custom_section(id)?;
            if section.items.is_empty() {
                return None;
            }
            let entries = section
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| Entry {
                    id: format!("{}-{i}", section.id),
                    title: collapse_whitespace(&item.title),
                    meta: Vec::new(),
                    date: non_blank(&item.date),
                    detail: non_blank(&item.description),
                    link: None,
                    bullets: Vec::new(),
                })
                .collect();
            (collapse_whitespace(&section.title), SectionBody::Entries(entries))
        }
    };
    Some(SectionContent {
        key: key.clone(),
        heading,
        body,
    })
}

/// All renderable sections in display order.
pub fn sections(record: &ResumeRecord) -> impl Iterator<Item = SectionContent> + '_ {
    record
        .section_order
        .iter()
        .filter_map(|key| section_content(record, key))
}
