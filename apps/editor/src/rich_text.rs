//! Rich content field adapter.
//!
//! The rich-text widget owns its own document model. The editor only hands it the
//! current value on attach and takes back whole values on every change; the value is
//! stored as-is and never inspected.

use serde::{Deserialize, Serialize};

use crate::errors::EditorError;
use crate::sections::controller::SectionController;
use crate::sections::{FieldName, ListSection};

/// Serialized output of a rich-text widget (usually HTML). Opaque to the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(String);

impl RichText {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for RichText {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RichText {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The widget side of the exchange.
pub trait RichContentWidget {
    /// Replaces whatever the widget is showing with `value`.
    fn set_value(&mut self, value: &RichText);
}

/// Connects one rich field of one record to a widget.
///
/// Records are addressed by position, so a binding must be rebuilt after the list
/// it points into is reordered or shortened.
pub struct RichTextBinding<'a, S: ListSection> {
    controller: &'a SectionController<S>,
    index: usize,
    field: S::Field,
}

impl<'a, S: ListSection> RichTextBinding<'a, S> {
    pub fn bind(
        controller: &'a SectionController<S>,
        index: usize,
        field: S::Field,
    ) -> Result<Self, EditorError> {
        let binding = Self {
            controller,
            index,
            field,
        };
        // Fails on a bad index or a field that is not rich.
        binding.initial_value()?;
        Ok(binding)
    }

    /// The value the widget should be initialised with.
    pub fn initial_value(&self) -> Result<RichText, EditorError> {
        let record = self.controller.record(self.index)?;
        S::rich_value(&record, self.field)
            .cloned()
            .ok_or_else(|| EditorError::InvalidFieldValue {
                field: self.field.name(),
                reason: "field does not hold rich content".to_string(),
            })
    }

    pub fn attach(&self, widget: &mut dyn RichContentWidget) -> Result<(), EditorError> {
        let value = self.initial_value()?;
        widget.set_value(&value);
        Ok(())
    }

    /// Full-value change notification from the widget.
    pub fn on_change(&self, value: RichText) -> Result<(), EditorError> {
        self.controller.update_field(self.index, self.field, value)
    }
}
