//! Resume list flows outside the editor: create, list and delete.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::EditorError;
use crate::gateway::ResumeGateway;
use crate::models::resume::{NewResume, ResumeId, ResumeSummary};

/// Theme colour every new resume starts with.
pub const NEW_RESUME_THEME_COLOR: &str = "#000000";

pub struct Dashboard {
    gateway: Arc<dyn ResumeGateway>,
    owner: String,
}

/// Result of a delete. The list is refreshed whether or not the delete went
/// through, so the caller always gets both outcomes.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub deleted: Result<(), EditorError>,
    pub resumes: Result<Vec<ResumeSummary>, EditorError>,
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn ResumeGateway>, owner: impl Into<String>) -> Self {
        Self {
            gateway,
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Creates an empty resume and returns its id. Leading whitespace is dropped
    /// from the title; a blank title never reaches the backend.
    pub async fn create_resume(&self, title: &str) -> Result<ResumeId, EditorError> {
        let title = title.trim_start();
        if title.is_empty() {
            return Err(EditorError::Validation(
                "Please add a title to your resume".to_string(),
            ));
        }

        let id = self
            .gateway
            .create(&NewResume {
                title: title.to_string(),
                theme_color: NEW_RESUME_THEME_COLOR.to_string(),
                owner: Some(self.owner.clone()).filter(|o| !o.is_empty()),
            })
            .await?;
        info!("Created resume {id} for {}", self.owner);
        Ok(id)
    }

    pub async fn list_resumes(&self) -> Result<Vec<ResumeSummary>, EditorError> {
        Ok(self.gateway.list_by_owner(&self.owner).await?)
    }

    pub async fn delete_resume(&self, id: &ResumeId) -> DeleteOutcome {
        let deleted = match self.gateway.delete(id).await {
            Ok(()) => {
                info!("Deleted resume {id}");
                Ok(())
            }
            Err(e) => {
                warn!("Deleting resume {id} failed: {e}");
                Err(EditorError::Gateway(e))
            }
        };
        let resumes = self.list_resumes().await;
        DeleteOutcome { deleted, resumes }
    }
}
