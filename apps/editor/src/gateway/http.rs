use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::gateway::{GatewayError, ResumeGateway};
use crate::models::resume::{NewResume, ResumeDocument, ResumeId, ResumeSummary, SectionPayload};

/// Gateway over the resume backend's REST API.
///
/// Every call is a single request: no retries, no backoff. A failed save is
/// repeated only when the user asks for it.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct DataBody<'a, T: Serialize> {
    data: &'a T,
}

#[derive(Debug, Deserialize)]
struct Created {
    resume: CreatedResume,
}

#[derive(Debug, Deserialize)]
struct CreatedResume {
    #[serde(rename = "_id")]
    id: ResumeId,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_url.clone(),
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!("{method} {url}");
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the raw body of a 2xx response.
    async fn send(&self, request: RequestBuilder, id: Option<&ResumeId>) -> Result<String, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(GatewayError::NotFound(id.clone()));
            }
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|e| e.error.map(|d| d.message).or(e.message))
                .unwrap_or(body);
            warn!("Resume API returned {status}: {message}");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<&ResumeId>,
    ) -> Result<T, GatewayError> {
        let body = self.send(request, id).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ResumeGateway for HttpGateway {
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<ResumeSummary>, GatewayError> {
        let request = self.request(Method::GET, "resumes").query(&[("owner", owner)]);
        self.send_json(request, None).await
    }

    async fn create(&self, initial: &NewResume) -> Result<ResumeId, GatewayError> {
        let request = self
            .request(Method::POST, "resumes")
            .json(&DataBody { data: initial });
        let created: Created = self.send_json(request, None).await?;
        Ok(created.resume.id)
    }

    async fn fetch_one(&self, id: &ResumeId) -> Result<ResumeDocument, GatewayError> {
        let request = self.request(Method::GET, &format!("resumes/{id}"));
        self.send_json(request, Some(id)).await
    }

    async fn update(&self, id: &ResumeId, payload: &SectionPayload) -> Result<Value, GatewayError> {
        let fields = payload.to_fields()?;
        let request = self
            .request(Method::PUT, &format!("resumes/{id}"))
            .json(&DataBody { data: &fields });
        let body = self.send(request, Some(id)).await?;

        // Some deployments answer 204; treat that as "everything was accepted".
        if body.trim().is_empty() {
            return Ok(fields);
        }
        let envelope: Envelope<Value> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    async fn delete(&self, id: &ResumeId) -> Result<(), GatewayError> {
        let request = self.request(Method::DELETE, &format!("resumes/{id}"));
        self.send(request, Some(id)).await.map(|_| ())
    }
}
