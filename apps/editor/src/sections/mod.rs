//! Section buffers.
//!
//! Each section owns a local copy of its slice of the document, pushes it into the
//! shared store on every edit, and persists it only on an explicit save. The list
//! sections share one generic controller; personal details and the theme colour
//! have their own small controllers built on the same save cycle.

use std::fmt::Debug;

use crate::errors::EditorError;
use crate::models::resume::{parse_flag, ResumeDocument, SectionKey, SectionPayload};
use crate::rich_text::RichText;

pub mod controller;
pub mod education;
pub mod experience;
pub mod personal;
pub mod projects;
pub mod save_cycle;
pub mod theme;

pub use controller::SectionController;
pub use save_cycle::{SaveReport, SaveState};

/// A value coming from an input widget.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Rich(RichText),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<RichText> for FieldValue {
    fn from(value: RichText) -> Self {
        FieldValue::Rich(value)
    }
}

impl FieldValue {
    pub fn into_text(self, field: &'static str) -> Result<String, EditorError> {
        match self {
            FieldValue::Text(s) => Ok(s),
            other => Err(invalid(field, format!("expected text, got {other:?}"))),
        }
    }

    pub fn into_flag(self, field: &'static str) -> Result<bool, EditorError> {
        match self {
            FieldValue::Flag(b) => Ok(b),
            FieldValue::Text(s) => parse_flag(&s).map_err(|reason| invalid(field, reason)),
            other => Err(invalid(field, format!("expected a flag, got {other:?}"))),
        }
    }

    /// Rich fields also take plain text; the widget may hand back either.
    pub fn into_rich(self, field: &'static str) -> Result<RichText, EditorError> {
        match self {
            FieldValue::Rich(r) => Ok(r),
            FieldValue::Text(s) => Ok(RichText::from(s)),
            other => Err(invalid(field, format!("expected rich content, got {other:?}"))),
        }
    }
}

pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> EditorError {
    EditorError::InvalidFieldValue {
        field,
        reason: reason.into(),
    }
}

/// Closed set of field names a section accepts.
pub trait FieldName: Copy + Debug + PartialEq + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Wire name, e.g. `universityName`.
    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// Schema of a list-shaped section.
pub trait ListSection: Send + Sync + 'static {
    type Record: Clone + Default + PartialEq + Debug + Send + Sync + 'static;
    type Field: FieldName;

    const KEY: SectionKey;

    fn records(doc: &ResumeDocument) -> &[Self::Record];

    fn store_records(doc: &mut ResumeDocument, records: Vec<Self::Record>);

    /// Returns a copy of `record` with only `field` replaced.
    fn with_field(
        record: &Self::Record,
        field: Self::Field,
        value: FieldValue,
    ) -> Result<Self::Record, EditorError>;

    fn payload(records: Vec<Self::Record>) -> SectionPayload;

    fn rich_value(_record: &Self::Record, _field: Self::Field) -> Option<&RichText> {
        None
    }

    /// Initial buffer when the loaded document has no records for this section.
    fn seed() -> Vec<Self::Record> {
        Vec::new()
    }

    /// Checked before any gateway call.
    fn validate(_records: &[Self::Record]) -> Result<(), EditorError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_accepts_text_forms() {
        assert!(FieldValue::from("true").into_flag("f").unwrap());
        assert!(!FieldValue::from("").into_flag("f").unwrap());
        assert!(FieldValue::from("maybe").into_flag("f").is_err());
    }

    #[test]
    fn test_text_field_rejects_flag() {
        let err = FieldValue::from(true).into_text("city").unwrap_err();
        assert!(matches!(err, EditorError::InvalidFieldValue { field: "city", .. }));
    }

    #[test]
    fn test_rich_accepts_plain_text() {
        let rich = FieldValue::from("<p>hi</p>").into_rich("summary").unwrap();
        assert_eq!(rich.as_str(), "<p>hi</p>");
    }
}
