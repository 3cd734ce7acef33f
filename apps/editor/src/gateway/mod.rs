//! Persistence gateway: the only way the editor reaches durable storage.
//!
//! The editor never retries, batches or authenticates on its own; whatever sits
//! behind this trait owns transport. `Arc<dyn ResumeGateway>` is shared by every
//! controller of a session.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::resume::{NewResume, ResumeDocument, ResumeId, ResumeSummary, SectionPayload};

pub mod http;
pub mod memory;

pub use http::HttpGateway;
pub use memory::InMemoryGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Resume {0} not found")]
    NotFound(ResumeId),

    #[error("Rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait ResumeGateway: Send + Sync {
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<ResumeSummary>, GatewayError>;

    async fn create(&self, initial: &NewResume) -> Result<ResumeId, GatewayError>;

    async fn fetch_one(&self, id: &ResumeId) -> Result<ResumeDocument, GatewayError>;

    /// Persists one section slice. Returns the fields the backend accepted.
    async fn update(&self, id: &ResumeId, payload: &SectionPayload) -> Result<Value, GatewayError>;

    async fn delete(&self, id: &ResumeId) -> Result<(), GatewayError>;
}
