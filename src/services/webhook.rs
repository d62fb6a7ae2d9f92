use reqwest::multipart::Form;

use crate::models::WebhookPayload;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook responded {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Forwards submissions to the workflow-automation webhook as multipart
/// text fields.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    url: String,
    secret: Option<String>,
}

impl Client {
    pub fn new(http: reqwest::Client, url: &str, secret: Option<&str>) -> Client {
        Client {
            http,
            url: url.to_string(),
            secret: secret.map(str::to_string),
        }
    }

    /// One POST per submission. Never retried.
    #[tracing::instrument(skip_all, fields(submission_id = %payload.submission_id))]
    pub async fn forward(&self, payload: &WebhookPayload) -> Result<(), WebhookError> {
        let response = self
            .http
            .post(&self.url)
            .multipart(self.form(payload))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Rejected { status, body });
        }

        tracing::debug!(%status, "webhook accepted submission");
        Ok(())
    }

    fn form(&self, payload: &WebhookPayload) -> Form {
        let submission = &payload.submission;
        let filenames = serde_json::Value::from(payload.filenames()).to_string();

        let mut form = Form::new()
            .text("submissionId", payload.submission_id.clone())
            .text("timestamp", payload.timestamp_iso())
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
            .text("message", submission.message.clone())
            .text("fileCount", payload.file_count().to_string())
            .text("filenames", filenames);

        for url in &submission.file_urls {
            form = form.text("fileUrls", url.clone());
        }

        if let Some(secret) = &self.secret {
            form = form.text("secret", secret.clone());
        }

        form
    }
}
