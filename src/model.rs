//! Resume document data model.
//!
//! Every field is optional on input. A list entry whose JSON cannot be read
//! at all is dropped on its own so that its siblings still load.

use crate::error::DocumentError;
use crate::style::{Color, StyleConfig};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A complete resume: identity, presentation metadata and content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "or_default")]
    pub metadata: Metadata,
    #[serde(deserialize_with = "or_default")]
    pub basics: Basics,
    #[serde(deserialize_with = "entries")]
    pub work: Vec<WorkEntry>,
    #[serde(deserialize_with = "entries")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "entries")]
    pub skills: Vec<SkillGroup>,
    #[serde(deserialize_with = "entries")]
    pub projects: Vec<ProjectEntry>,
    #[serde(deserialize_with = "entries")]
    pub certificates: Vec<CertificateEntry>,
    #[serde(deserialize_with = "entries")]
    pub languages: Vec<LanguageEntry>,
    #[serde(deserialize_with = "entries")]
    pub interests: Vec<InterestEntry>,
    #[serde(deserialize_with = "entries")]
    pub publications: Vec<PublicationEntry>,
    #[serde(deserialize_with = "entries")]
    pub awards: Vec<AwardEntry>,
    #[serde(deserialize_with = "entries")]
    pub references: Vec<ReferenceEntry>,
    #[serde(deserialize_with = "entries")]
    pub custom_sections: Vec<CustomSection>,
}

/// Presentation metadata stored alongside the content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    /// Template id; unknown ids render with the default template.
    #[serde(deserialize_with = "lenient_string")]
    pub template: String,
    /// Accent color chosen in the editor; overrides the style's accent.
    #[serde(deserialize_with = "lenient_option")]
    pub accent_color: Option<Color>,
    #[serde(deserialize_with = "or_default")]
    pub style: StyleConfig,
    #[serde(deserialize_with = "lenient_option")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Name, headline and contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Basics {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    /// Headline shown under the name, e.g. "Backend Engineer".
    #[serde(deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "or_default")]
    pub location: Location,
    /// Free-text summary; may contain inline markup.
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    /// Profile image as a `data:` URL or bare base64.
    #[serde(deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(deserialize_with = "entries")]
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub region: String,
    #[serde(deserialize_with = "lenient_string")]
    pub postal_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country_code: String,
}

impl Location {
    /// `City, Region, CC` with blank parts left out.
    pub fn display(&self) -> String {
        [&self.city, &self.region, &self.country_code]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub network: String,
    #[serde(deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// Company or organization.
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub position: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "string_list")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub institution: String,
    /// Field of study.
    #[serde(deserialize_with = "lenient_string")]
    pub area: String,
    /// Degree, e.g. "BSc".
    #[serde(deserialize_with = "lenient_string")]
    pub study_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub score: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "string_list")]
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillGroup {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub level: String,
    #[serde(deserialize_with = "string_list")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "string_list")]
    pub highlights: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificateEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub issuer: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub language: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fluency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterestEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "string_list")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublicationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub publisher: String,
    #[serde(deserialize_with = "lenient_string")]
    pub release_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwardEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub awarder: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    /// The reference text itself.
    #[serde(deserialize_with = "lenient_string")]
    pub reference: String,
}

/// A user-defined section with its own title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomSection {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "entries")]
    pub items: Vec<CustomItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomItem {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subtitle: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "string_list")]
    pub highlights: Vec<String>,
}

/// The kinds of content section a document can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Summary,
    Work,
    Education,
    Skills,
    Projects,
    Certificates,
    Languages,
    Interests,
    Publications,
    Awards,
    References,
    Custom,
}

impl SectionKind {
    /// Order used when a style carries no section order.
    pub const CANONICAL: [SectionKind; 12] = [
        SectionKind::Summary,
        SectionKind::Work,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Projects,
        SectionKind::Certificates,
        SectionKind::Languages,
        SectionKind::Interests,
        SectionKind::Publications,
        SectionKind::Awards,
        SectionKind::References,
        SectionKind::Custom,
    ];

    /// Identifier written into saved section orders.
    pub fn identifier(&self) -> &'static str {
        match self {
            SectionKind::Summary => "summary",
            SectionKind::Work => "work",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Projects => "projects",
            SectionKind::Certificates => "certificates",
            SectionKind::Languages => "languages",
            SectionKind::Interests => "interests",
            SectionKind::Publications => "publications",
            SectionKind::Awards => "awards",
            SectionKind::References => "references",
            SectionKind::Custom => "custom",
        }
    }

    /// Convert a stored identifier into a kind.
    ///
    /// Accepts the legacy spellings older documents were saved with. Returns
    /// `None` for anything else; callers skip such identifiers.
    pub fn from_identifier(id: &str) -> Option<SectionKind> {
        let id = id.trim().to_ascii_lowercase();
        let kind = match id.as_str() {
            "summary" | "profile" | "basics" | "about" => SectionKind::Summary,
            "work" | "experience" => SectionKind::Work,
            "education" => SectionKind::Education,
            "skills" => SectionKind::Skills,
            "projects" => SectionKind::Projects,
            "certificates" | "certifications" => SectionKind::Certificates,
            "languages" => SectionKind::Languages,
            "interests" | "hobbies" => SectionKind::Interests,
            "publications" => SectionKind::Publications,
            "awards" => SectionKind::Awards,
            "references" => SectionKind::References,
            "custom" | "customsections" | "custom-sections" => SectionKind::Custom,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether the backing collection of this kind is empty in `document`.
    ///
    /// The summary counts as empty when its text is blank.
    pub fn is_empty_in(&self, document: &ResumeDocument) -> bool {
        match self {
            SectionKind::Summary => document.basics.summary.trim().is_empty(),
            SectionKind::Work => document.work.is_empty(),
            SectionKind::Education => document.education.is_empty(),
            SectionKind::Skills => document.skills.is_empty(),
            SectionKind::Projects => document.projects.is_empty(),
            SectionKind::Certificates => document.certificates.is_empty(),
            SectionKind::Languages => document.languages.is_empty(),
            SectionKind::Interests => document.interests.is_empty(),
            SectionKind::Publications => document.publications.is_empty(),
            SectionKind::Awards => document.awards.is_empty(),
            SectionKind::References => document.references.is_empty(),
            SectionKind::Custom => document.custom_sections.iter().all(|s| s.items.is_empty()),
        }
    }
}

impl ResumeDocument {
    /// A new, empty document.
    pub fn new(id: impl Into<String>, title: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: Metadata {
                title: title.into(),
                template: template.into(),
                ..Metadata::default()
            },
            ..Self::default()
        }
    }

    /// A copy under a new id, titled as a copy.
    ///
    /// Entry ids are kept; they only need to be unique within one document.
    pub fn duplicate(&self, new_id: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.id = new_id.into();
        copy.metadata.title = if self.metadata.title.trim().is_empty() {
            "Copy".to_string()
        } else {
            format!("{} (Copy)", self.metadata.title)
        };
        copy
    }

    pub fn from_json(input: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Deserialize a list, dropping entries that cannot be read.
fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        if !value.is_null() {
            log::warn!("expected a list of entries, found {value}; treating as empty");
        }
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("dropping unreadable entry {index}: {e}");
                None
            }
        })
        .collect())
}

/// A nested record; a value of the wrong shape reads as the default.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        log::warn!("ignoring unreadable record: {e}");
        T::default()
    }))
}

/// Accept strings, numbers and booleans for a text field; anything else,
/// `null` included, reads as empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// A list of strings; non-string items are skipped, a bare string becomes one item.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        serde_json::Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_identifier() {
        assert_eq!(SectionKind::from_identifier("work"), Some(SectionKind::Work));
        assert_eq!(SectionKind::from_identifier(" Experience "), Some(SectionKind::Work));
        assert_eq!(
            SectionKind::from_identifier("certifications"),
            Some(SectionKind::Certificates)
        );
        assert_eq!(SectionKind::from_identifier("basics"), Some(SectionKind::Summary));
        assert_eq!(SectionKind::from_identifier("unknownid"), None);
        assert_eq!(SectionKind::from_identifier(""), None);
    }

    #[test]
    fn test_identifiers_round_trip() {
        for kind in SectionKind::CANONICAL {
            assert_eq!(SectionKind::from_identifier(kind.identifier()), Some(kind));
        }
    }

    #[test]
    fn test_parse_minimal_document() {
        let doc = ResumeDocument::from_json(r#"{"basics": {"name": "Ada"}}"#).unwrap();
        assert_eq!(doc.basics.name, "Ada");
        assert!(doc.work.is_empty());
        assert_eq!(doc.metadata.style, StyleConfig::default());
    }

    #[test]
    fn test_malformed_entry_does_not_poison_siblings() {
        let json = r#"{
            "work": [
                {"id": "w1", "name": "Acme", "position": "Engineer"},
                "not an entry",
                {"id": "w3", "name": "Initech", "startDate": 2019, "highlights": ["a", 3, null]}
            ],
            "skills": {"oops": true}
        }"#;
        let doc = ResumeDocument::from_json(json).unwrap();
        assert_eq!(doc.work.len(), 2);
        assert_eq!(doc.work[1].start_date, "2019");
        assert_eq!(doc.work[1].highlights, vec!["a", "3"]);
        assert!(doc.skills.is_empty());
    }

    #[test]
    fn test_null_field_keeps_entry() {
        let json = r#"{
            "work": [{"name": null, "position": "Engineer", "highlights": ["Shipped"]}],
            "basics": {"name": "Ada", "phone": null, "location": {"city": null, "region": "Surrey"}},
            "metadata": {"title": null, "template": "modern"}
        }"#;
        let doc = ResumeDocument::from_json(json).unwrap();
        assert_eq!(doc.work.len(), 1);
        assert_eq!(doc.work[0].name, "");
        assert_eq!(doc.work[0].position, "Engineer");
        assert_eq!(doc.work[0].highlights, vec!["Shipped"]);
        assert_eq!(doc.basics.name, "Ada");
        assert_eq!(doc.basics.phone, "");
        assert_eq!(doc.basics.location.region, "Surrey");
        assert_eq!(doc.metadata.title, "");
        assert_eq!(doc.metadata.template, "modern");
    }

    #[test]
    fn test_numeric_field_reads_as_text() {
        let json = r#"{
            "awards": [{"title": 2019, "awarder": "ACM"}],
            "basics": {"name": "Ada", "phone": 5550100, "profiles": [{"network": "X", "username": 42}]}
        }"#;
        let doc = ResumeDocument::from_json(json).unwrap();
        assert_eq!(doc.awards.len(), 1);
        assert_eq!(doc.awards[0].title, "2019");
        assert_eq!(doc.awards[0].awarder, "ACM");
        assert_eq!(doc.basics.phone, "5550100");
        assert_eq!(doc.basics.profiles[0].username, "42");
    }

    #[test]
    fn test_misshapen_record_reads_as_default() {
        let json = r#"{
            "basics": "Ada Lovelace",
            "metadata": {"template": "sidebar", "style": [1, 2]},
            "languages": [{"language": "French", "fluency": null}]
        }"#;
        let doc = ResumeDocument::from_json(json).unwrap();
        assert_eq!(doc.basics, Basics::default());
        assert_eq!(doc.metadata.template, "sidebar");
        assert_eq!(doc.metadata.style, StyleConfig::default());
        assert_eq!(doc.languages[0].language, "French");
    }

    #[test]
    fn test_metadata_parsing() {
        let json = r##"{
            "metadata": {
                "title": "Main",
                "template": "modern",
                "accentColor": "#336699",
                "lastModified": "2024-03-01T12:00:00Z",
                "style": {"columns": 1}
            }
        }"##;
        let doc = ResumeDocument::from_json(json).unwrap();
        assert_eq!(doc.metadata.accent_color, Some(Color::rgb(0x33, 0x66, 0x99)));
        assert!(doc.metadata.last_modified.is_some());
        assert_eq!(doc.metadata.style.columns, Some(1));
    }

    #[test]
    fn test_bad_accent_is_ignored() {
        let doc =
            ResumeDocument::from_json(r#"{"metadata": {"accentColor": "blue"}}"#).unwrap();
        assert_eq!(doc.metadata.accent_color, None);
    }

    #[test]
    fn test_duplicate() {
        let mut doc = ResumeDocument::new("a", "Main", "classic");
        doc.work.push(WorkEntry {
            id: "w1".into(),
            ..WorkEntry::default()
        });
        let copy = doc.duplicate("b");
        assert_eq!(copy.id, "b");
        assert_eq!(copy.metadata.title, "Main (Copy)");
        assert_eq!(copy.work, doc.work);
    }

    #[test]
    fn test_location_display() {
        let location = Location {
            city: "Berlin".into(),
            country_code: "DE".into(),
            ..Location::default()
        };
        assert_eq!(location.display(), "Berlin, DE");
    }
}
