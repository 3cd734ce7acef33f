use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::resume::{ResumeId, SectionKey};
use crate::navigation::WizardStep;

/// Editor-level error type.
/// Every fallible operation on the store, the controllers and the session returns
/// `Result<T, EditorError>`.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A local precondition failed. No gateway call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The persistence gateway reported a failure. Local buffers are untouched.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// A save for this section is already in flight.
    #[error("A save is already in flight for section '{0}'")]
    Busy(SectionKey),

    #[error("Index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown field '{field}' for section '{section}'")]
    UnknownField { section: SectionKey, field: String },

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidFieldValue { field: &'static str, reason: String },

    #[error("No document is loaded")]
    NotLoaded,

    #[error("Document identity cannot change (loaded {loaded}, attempted {attempted})")]
    IdentityChanged {
        loaded: ResumeId,
        attempted: ResumeId,
    },

    #[error("Navigation is locked on step '{0}'")]
    NavigationLocked(WizardStep),
}

impl EditorError {
    /// Human-readable reason surfaced to the user after a failed action.
    pub fn reason(&self) -> String {
        match self {
            EditorError::Gateway(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}
