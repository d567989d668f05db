use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub linked_in: String,
    pub github: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub job_title: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub url: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadershipRole {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub category: String,
    /// Free-text, usually a comma separated list.
    pub items: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomItem {
    pub title: String,
    /// Free-text label, rendered verbatim.
    pub date: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSection {
    pub id: String,
    pub title: String,
    pub items: Vec<CustomItem>,
}

/// One entry of the user-controlled display order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SectionKey {
    PersonalInfo,
    Summary,
    Skills,
    Education,
    Experience,
    Projects,
    Leadership,
    Custom(String),
}

pub const DEFAULT_SECTION_ORDER: [SectionKey; 7] = [
    SectionKey::PersonalInfo,
    SectionKey::Summary,
    SectionKey::Education,
    SectionKey::Experience,
    SectionKey::Projects,
    SectionKey::Skills,
    SectionKey::Leadership,
];

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKey::PersonalInfo => f.write_str("personalInfo"),
            SectionKey::Summary => f.write_str("summary"),
            SectionKey::Skills => f.write_str("skills"),
            SectionKey::Education => f.write_str("education"),
            SectionKey::Experience => f.write_str("experience"),
            SectionKey::Projects => f.write_str("projects"),
            SectionKey::Leadership => f.write_str("leadership"),
            SectionKey::Custom(id) => write!(f, "custom:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSectionKey(pub String);

impl fmt::Display for UnknownSectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown section key '{}'", self.0)
    }
}

impl std::error::Error for UnknownSectionKey {}

impl FromStr for SectionKey {
    type Err = UnknownSectionKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // `userInfo` is what older records persisted
            "personalInfo" | "userInfo" => Ok(SectionKey::PersonalInfo),
            "summary" => Ok(SectionKey::Summary),
            "skills" => Ok(SectionKey::Skills),
            "education" => Ok(SectionKey::Education),
            "experience" => Ok(SectionKey::Experience),
            "projects" => Ok(SectionKey::Projects),
            "leadership" => Ok(SectionKey::Leadership),
            _ => match s.strip_prefix("custom:") {
                Some(id) if !id.is_empty() => Ok(SectionKey::Custom(id.to_string())),
                _ => Err(UnknownSectionKey(s.to_string())),
            },
        }
    }
}

impl Serialize for SectionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SectionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TemplateId {
    #[default]
    Harvard,
    Classic,
    Modern,
    Minimal,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::Harvard,
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Minimal,
    ];

    pub fn from_name(name: &str) -> Option<TemplateId> {
        match name.trim().to_ascii_lowercase().as_str() {
            "harvard" => Some(TemplateId::Harvard),
            "classic" => Some(TemplateId::Classic),
            "modern" => Some(TemplateId::Modern),
            "minimal" => Some(TemplateId::Minimal),
            _ => None,
        }
    }

    /// Like `from_name`, but unknown names fall back to the default template.
    pub fn resolve(name: &str) -> TemplateId {
        TemplateId::from_name(name).unwrap_or_else(|| {
            log::debug!("unknown template '{name}', using {:?}", TemplateId::default());
            TemplateId::default()
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            TemplateId::Harvard => "harvard",
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Minimal => "minimal",
        }
    }
}

impl Serialize for TemplateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TemplateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TemplateId::resolve(&s))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeRecord {
    #[serde(rename = "userInfo")]
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub leadership_roles: Vec<LeadershipRole>,
    #[serde(rename = "skills")]
    pub skill_groups: Vec<SkillGroup>,
    pub custom_sections: Vec<CustomSection>,
    pub section_order: Vec<SectionKey>,
    #[serde(rename = "templateSelected")]
    pub template: TemplateId,
    #[serde(rename = "isCompact")]
    pub compact_mode: bool,
}

impl Default for ResumeRecord {
    fn default() -> Self {
        ResumeRecord {
            personal_info: PersonalInfo::default(),
            summary: String::new(),
            education: Vec::new(),
            experience: Vec::new(),
            projects: Vec::new(),
            leadership_roles: Vec::new(),
            skill_groups: Vec::new(),
            custom_sections: Vec::new(),
            section_order: DEFAULT_SECTION_ORDER.to_vec(),
            template: TemplateId::default(),
            compact_mode: false,
        }
    }
}

impl ResumeRecord {
    pub fn custom_section(&self, id: &str) -> Option<&CustomSection> {
        self.custom_sections.iter().find(|s| s.id == id)
    }
}
