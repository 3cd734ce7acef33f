use crate::errors::EditorError;
use crate::models::resume::{ExperienceRecord, ResumeDocument, SectionKey, SectionPayload};
use crate::rich_text::RichText;
use crate::sections::{FieldName, FieldValue, ListSection};

pub struct Experience;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Title,
    CompanyName,
    City,
    State,
    StartDate,
    EndDate,
    CurrentlyWorking,
    WorkSummary,
}

impl FieldName for ExperienceField {
    const ALL: &'static [Self] = &[
        ExperienceField::Title,
        ExperienceField::CompanyName,
        ExperienceField::City,
        ExperienceField::State,
        ExperienceField::StartDate,
        ExperienceField::EndDate,
        ExperienceField::CurrentlyWorking,
        ExperienceField::WorkSummary,
    ];

    fn name(self) -> &'static str {
        match self {
            ExperienceField::Title => "title",
            ExperienceField::CompanyName => "companyName",
            ExperienceField::City => "city",
            ExperienceField::State => "state",
            ExperienceField::StartDate => "startDate",
            ExperienceField::EndDate => "endDate",
            ExperienceField::CurrentlyWorking => "currentlyWorking",
            ExperienceField::WorkSummary => "workSummary",
        }
    }
}

impl ListSection for Experience {
    type Record = ExperienceRecord;
    type Field = ExperienceField;

    const KEY: SectionKey = SectionKey::Experience;

    fn records(doc: &ResumeDocument) -> &[ExperienceRecord] {
        &doc.experience
    }

    fn store_records(doc: &mut ResumeDocument, records: Vec<ExperienceRecord>) {
        doc.experience = records;
    }

    fn with_field(
        record: &ExperienceRecord,
        field: ExperienceField,
        value: FieldValue,
    ) -> Result<ExperienceRecord, EditorError> {
        let name = field.name();
        let mut next = record.clone();
        match field {
            ExperienceField::Title => next.title = value.into_text(name)?,
            ExperienceField::CompanyName => next.company_name = value.into_text(name)?,
            ExperienceField::City => next.city = value.into_text(name)?,
            ExperienceField::State => next.state = value.into_text(name)?,
            ExperienceField::StartDate => next.start_date = value.into_text(name)?,
            ExperienceField::EndDate => next.end_date = value.into_text(name)?,
            ExperienceField::CurrentlyWorking => next.currently_working = value.into_flag(name)?,
            ExperienceField::WorkSummary => next.work_summary = value.into_rich(name)?,
        }
        Ok(next)
    }

    fn payload(records: Vec<ExperienceRecord>) -> SectionPayload {
        SectionPayload::Experience(records)
    }

    fn rich_value(record: &ExperienceRecord, field: ExperienceField) -> Option<&RichText> {
        match field {
            ExperienceField::WorkSummary => Some(&record.work_summary),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currently_working_takes_flag_or_text() {
        let record = ExperienceRecord::default();
        let next =
            Experience::with_field(&record, ExperienceField::CurrentlyWorking, true.into()).unwrap();
        assert!(next.currently_working);

        let next =
            Experience::with_field(&next, ExperienceField::CurrentlyWorking, "false".into()).unwrap();
        assert!(!next.currently_working);
    }

    #[test]
    fn test_text_field_leaves_others_untouched() {
        let record = ExperienceRecord {
            title: "Eng".to_string(),
            work_summary: RichText::new("<p>s</p>"),
            ..Default::default()
        };
        let next = Experience::with_field(&record, ExperienceField::City, "Pune".into()).unwrap();
        assert_eq!(next.city, "Pune");
        assert_eq!(next.title, record.title);
        assert_eq!(next.work_summary, record.work_summary);
        assert_eq!(record.city, "");
    }
}
