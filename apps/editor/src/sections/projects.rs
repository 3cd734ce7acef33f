use crate::errors::EditorError;
use crate::models::resume::{ProjectRecord, ResumeDocument, SectionKey, SectionPayload};
use crate::rich_text::RichText;
use crate::sections::{FieldName, FieldValue, ListSection};

pub struct Projects;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    ProjectName,
    TechStack,
    ProjectSummary,
}

impl FieldName for ProjectField {
    const ALL: &'static [Self] = &[
        ProjectField::ProjectName,
        ProjectField::TechStack,
        ProjectField::ProjectSummary,
    ];

    fn name(self) -> &'static str {
        match self {
            ProjectField::ProjectName => "projectName",
            ProjectField::TechStack => "techStack",
            ProjectField::ProjectSummary => "projectSummary",
        }
    }
}

impl ListSection for Projects {
    type Record = ProjectRecord;
    type Field = ProjectField;

    const KEY: SectionKey = SectionKey::Projects;

    fn records(doc: &ResumeDocument) -> &[ProjectRecord] {
        &doc.projects
    }

    fn store_records(doc: &mut ResumeDocument, records: Vec<ProjectRecord>) {
        doc.projects = records;
    }

    fn with_field(
        record: &ProjectRecord,
        field: ProjectField,
        value: FieldValue,
    ) -> Result<ProjectRecord, EditorError> {
        let name = field.name();
        let mut next = record.clone();
        match field {
            ProjectField::ProjectName => next.project_name = value.into_text(name)?,
            ProjectField::TechStack => next.tech_stack = value.into_text(name)?,
            ProjectField::ProjectSummary => next.project_summary = value.into_rich(name)?,
        }
        Ok(next)
    }

    fn payload(records: Vec<ProjectRecord>) -> SectionPayload {
        SectionPayload::Projects(records)
    }

    fn rich_value(record: &ProjectRecord, field: ProjectField) -> Option<&RichText> {
        match field {
            ProjectField::ProjectSummary => Some(&record.project_summary),
            _ => None,
        }
    }
}
