use crate::errors::EditorError;
use crate::models::resume::{EducationRecord, GradeType, ResumeDocument, SectionKey, SectionPayload};
use crate::sections::{invalid, FieldName, FieldValue, ListSection};

pub struct Education;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    UniversityName,
    Degree,
    Major,
    Grade,
    GradeType,
    StartDate,
    EndDate,
    Description,
}

impl FieldName for EducationField {
    const ALL: &'static [Self] = &[
        EducationField::UniversityName,
        EducationField::Degree,
        EducationField::Major,
        EducationField::Grade,
        EducationField::GradeType,
        EducationField::StartDate,
        EducationField::EndDate,
        EducationField::Description,
    ];

    fn name(self) -> &'static str {
        match self {
            EducationField::UniversityName => "universityName",
            EducationField::Degree => "degree",
            EducationField::Major => "major",
            EducationField::Grade => "grade",
            EducationField::GradeType => "gradeType",
            EducationField::StartDate => "startDate",
            EducationField::EndDate => "endDate",
            EducationField::Description => "description",
        }
    }
}

impl ListSection for Education {
    type Record = EducationRecord;
    type Field = EducationField;

    const KEY: SectionKey = SectionKey::Education;

    fn records(doc: &ResumeDocument) -> &[EducationRecord] {
        &doc.education
    }

    fn store_records(doc: &mut ResumeDocument, records: Vec<EducationRecord>) {
        doc.education = records;
    }

    fn with_field(
        record: &EducationRecord,
        field: EducationField,
        value: FieldValue,
    ) -> Result<EducationRecord, EditorError> {
        let name = field.name();
        let mut next = record.clone();
        match field {
            EducationField::UniversityName => next.university_name = value.into_text(name)?,
            EducationField::Degree => next.degree = value.into_text(name)?,
            EducationField::Major => next.major = value.into_text(name)?,
            EducationField::Grade => next.grade = value.into_text(name)?,
            EducationField::GradeType => {
                next.grade_type = value
                    .into_text(name)?
                    .parse::<GradeType>()
                    .map_err(|reason| invalid(name, reason))?
            }
            EducationField::StartDate => next.start_date = value.into_text(name)?,
            EducationField::EndDate => next.end_date = value.into_text(name)?,
            EducationField::Description => next.description = value.into_text(name)?,
        }
        Ok(next)
    }

    fn payload(records: Vec<EducationRecord>) -> SectionPayload {
        SectionPayload::Education(records)
    }

    /// A fresh document starts with one empty entry to fill in.
    fn seed() -> Vec<EducationRecord> {
        vec![EducationRecord::default()]
    }

    fn validate(records: &[EducationRecord]) -> Result<(), EditorError> {
        if records.is_empty() {
            return Err(EditorError::Validation(
                "Please add at least one education".to_string(),
            ));
        }
        Ok(())
    }
}
