use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::rich_text::RichText;

/// Opaque identifier assigned by the backend. Never changes once a document is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeId(String);

impl ResumeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradeType {
    #[default]
    #[serde(rename = "CGPA")]
    Cgpa,
    #[serde(rename = "GPA")]
    Gpa,
    Percentage,
}

impl GradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeType::Cgpa => "CGPA",
            GradeType::Gpa => "GPA",
            GradeType::Percentage => "Percentage",
        }
    }
}

impl FromStr for GradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CGPA" => Ok(GradeType::Cgpa),
            "GPA" => Ok(GradeType::Gpa),
            "Percentage" => Ok(GradeType::Percentage),
            other => Err(format!(
                "'{other}' is not one of CGPA, GPA, Percentage"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationRecord {
    pub university_name: String,
    pub degree: String,
    pub major: String,
    pub grade: String,
    pub grade_type: GradeType,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceRecord {
    pub title: String,
    pub company_name: String,
    pub city: String,
    pub state: String,
    pub start_date: String,
    pub end_date: String,
    /// Older documents store this as `""` / `"true"`; both are accepted.
    #[serde(deserialize_with = "flag_from_any")]
    pub currently_working: bool,
    pub work_summary: RichText,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRecord {
    pub project_name: String,
    pub tech_stack: String,
    pub project_summary: RichText,
}

/// The canonical document being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(rename = "_id")]
    pub id: ResumeId,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub personal: PersonalDetails,
    #[serde(default)]
    pub theme_color: String,
    #[serde(default)]
    pub education: Vec<EducationRecord>,
    #[serde(default)]
    pub experience: Vec<ExperienceRecord>,
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResumeDocument {
    pub fn new(id: ResumeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            personal: PersonalDetails::default(),
            theme_color: String::new(),
            education: Vec::new(),
            experience: Vec::new(),
            projects: Vec::new(),
            updated_at: None,
        }
    }
}

/// One row of the owner's resume listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    #[serde(rename = "_id")]
    pub id: ResumeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub theme_color: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&ResumeDocument> for ResumeSummary {
    fn from(doc: &ResumeDocument) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            theme_color: doc.theme_color.clone(),
            updated_at: doc.updated_at,
        }
    }
}

/// Initial fields sent on document creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResume {
    pub title: String,
    pub theme_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// An independently saved subset of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKey {
    Personal,
    Education,
    Experience,
    Projects,
    ThemeColor,
}

impl SectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Personal => "personal",
            SectionKey::Education => "education",
            SectionKey::Experience => "experience",
            SectionKey::Projects => "projects",
            SectionKey::ThemeColor => "themeColor",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section slice extracted for persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionPayload {
    Personal(PersonalDetails),
    Education(Vec<EducationRecord>),
    Experience(Vec<ExperienceRecord>),
    Projects(Vec<ProjectRecord>),
    ThemeColor(String),
}

impl SectionPayload {
    pub fn key(&self) -> SectionKey {
        match self {
            SectionPayload::Personal(_) => SectionKey::Personal,
            SectionPayload::Education(_) => SectionKey::Education,
            SectionPayload::Experience(_) => SectionKey::Experience,
            SectionPayload::Projects(_) => SectionKey::Projects,
            SectionPayload::ThemeColor(_) => SectionKey::ThemeColor,
        }
    }

    /// The fields this payload writes, as they appear inside the `data` envelope.
    /// Personal details are flattened; every other section nests under its key.
    pub fn to_fields(&self) -> Result<Value, serde_json::Error> {
        Ok(match self {
            SectionPayload::Personal(details) => serde_json::to_value(details)?,
            SectionPayload::Education(list) => json!({ "education": list }),
            SectionPayload::Experience(list) => json!({ "experience": list }),
            SectionPayload::Projects(list) => json!({ "projects": list }),
            SectionPayload::ThemeColor(color) => json!({ "themeColor": color }),
        })
    }

    /// Writes this slice into `doc`, leaving every other section untouched.
    pub fn apply_to(&self, doc: &mut ResumeDocument) {
        match self {
            SectionPayload::Personal(details) => doc.personal = details.clone(),
            SectionPayload::Education(list) => doc.education = list.clone(),
            SectionPayload::Experience(list) => doc.experience = list.clone(),
            SectionPayload::Projects(list) => doc.projects = list.clone(),
            SectionPayload::ThemeColor(color) => doc.theme_color = color.clone(),
        }
    }
}

fn flag_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => parse_flag(&s).map_err(serde::de::Error::custom),
    }
}

/// Parses the textual forms a checkbox value takes on the wire.
pub fn parse_flag(s: &str) -> Result<bool, String> {
    match s.trim() {
        "" | "false" => Ok(false),
        "true" | "on" => Ok(true),
        other => Err(format!("'{other}' is not a boolean flag")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_uses_camel_case_wire_names() {
        let mut doc = ResumeDocument::new(ResumeId::new("r1"), "Backend");
        doc.personal.first_name = "Ada".to_string();
        doc.education.push(EducationRecord {
            university_name: "A".to_string(),
            ..Default::default()
        });

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_id"], "r1");
        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["education"][0]["universityName"], "A");
        assert_eq!(value["education"][0]["gradeType"], "CGPA");
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn test_legacy_string_flag_is_accepted() {
        let record: ExperienceRecord =
            serde_json::from_value(json!({ "title": "Eng", "currentlyWorking": "" })).unwrap();
        assert!(!record.currently_working);

        let record: ExperienceRecord =
            serde_json::from_value(json!({ "currentlyWorking": true })).unwrap();
        assert!(record.currently_working);
    }

    #[test]
    fn test_sparse_document_fills_defaults() {
        let doc: ResumeDocument =
            serde_json::from_value(json!({ "_id": "x", "title": "T" })).unwrap();
        assert!(doc.education.is_empty());
        assert_eq!(doc.personal, PersonalDetails::default());
        assert_eq!(doc.theme_color, "");
    }

    #[test]
    fn test_payload_fields_nest_under_section_key() {
        let payload = SectionPayload::ThemeColor("#3366FF".to_string());
        assert_eq!(
            payload.to_fields().unwrap(),
            json!({ "themeColor": "#3366FF" })
        );

        let payload = SectionPayload::Personal(PersonalDetails {
            email: "a@b.c".to_string(),
            ..Default::default()
        });
        assert_eq!(payload.to_fields().unwrap()["email"], "a@b.c");
        assert_eq!(payload.key(), SectionKey::Personal);
    }

    #[test]
    fn test_grade_type_parsing() {
        assert_eq!("GPA".parse::<GradeType>().unwrap(), GradeType::Gpa);
        assert!("gpa".parse::<GradeType>().is_err());
    }
}
