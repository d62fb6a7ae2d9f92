use reqwest::multipart::Form;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::FormError;
use crate::models::{ContactResponse, FileDescriptor, Submission, UploadGrant, UploadUrlResponse};

/// HTTP client for the two server endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    secret: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: None,
        }
    }

    /// Sends `secret` with each submission, for deployments that set
    /// `CONTACT_SHARED_SECRET`.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn request_grants(
        &self,
        files: &[FileDescriptor],
    ) -> Result<Vec<UploadGrant>, FormError> {
        let response = self
            .http
            .post(format!("{}/upload-url", self.base_url))
            .json(&json!({ "files": files }))
            .send()
            .await?;

        let body: UploadUrlResponse = Self::parse(response).await?;
        if body.results.len() != files.len() {
            return Err(FormError::GrantMismatch {
                expected: files.len(),
                received: body.results.len(),
            });
        }
        Ok(body.results)
    }

    /// Returns the submission id assigned by the server.
    pub async fn submit(&self, submission: &Submission) -> Result<String, FormError> {
        let mut form = Form::new()
            .text("name", submission.name.clone())
            .text("email", submission.email.clone())
            .text("hotel", submission.hotel.clone())
            .text(
                "photoCount",
                submission
                    .photo_count
                    .map(|count| count.to_string())
                    .unwrap_or_default(),
            )
            .text("message", submission.message.clone());
        for url in &submission.file_urls {
            form = form.text("fileUrls", url.clone());
        }
        if let Some(secret) = &self.secret {
            form = form.text("secret", secret.clone());
        }

        let response = self
            .http
            .post(format!("{}/contact", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let body: ContactResponse = Self::parse(response).await?;
        Ok(body.submission_id)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, FormError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("error")?.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("Request failed with status {}.", status));
        Err(FormError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
