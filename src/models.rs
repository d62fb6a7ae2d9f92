use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// One file the client intends to upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileDescriptor {
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }
}

/// Body of `POST /upload-url`. Older clients request a single URL with
/// `{filename, contentType}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UploadUrlRequest {
    #[serde(rename_all = "camelCase")]
    Batch {
        files: Vec<FileDescriptor>,
        put_expires_in: Option<u64>,
        get_expires_in: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    Single {
        filename: String,
        content_type: Option<String>,
    },
}

impl UploadUrlRequest {
    /// Returns the descriptors plus the put/get expiry overrides.
    pub fn into_parts(self) -> (Vec<FileDescriptor>, Option<u64>, Option<u64>) {
        match self {
            UploadUrlRequest::Batch {
                files,
                put_expires_in,
                get_expires_in,
            } => (files, put_expires_in, get_expires_in),
            UploadUrlRequest::Single {
                filename,
                content_type,
            } => (
                vec![FileDescriptor {
                    name: filename,
                    content_type,
                    size: None,
                }],
                None,
                None,
            ),
        }
    }
}

/// Capability to write one object, and optionally read it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadGrant {
    pub key: String,
    pub put_url: String,
    pub get_url: Option<String>,
    pub public_url: String,
}

impl UploadGrant {
    /// The URL handed to the webhook once the object exists.
    pub fn file_reference(&self) -> &str {
        self.get_url.as_deref().unwrap_or(&self.public_url)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    pub ok: bool,
    pub results: Vec<UploadGrant>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub ok: bool,
    pub submission_id: String,
}

/// A validated contact request, ready to be forwarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub hotel: String,
    pub photo_count: Option<u32>,
    pub message: String,
    pub file_urls: Vec<String>,
}

/// What the automation webhook receives for one submission.
#[derive(Debug, Clone)]
pub struct WebhookPayload {
    pub submission_id: String,
    pub timestamp: DateTime<Utc>,
    pub submission: Submission,
}

impl WebhookPayload {
    pub fn new(submission: Submission) -> Self {
        WebhookPayload {
            submission_id: Ulid::new().to_string(),
            timestamp: Utc::now(),
            submission,
        }
    }

    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn file_count(&self) -> usize {
        self.submission.file_urls.len()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.submission
            .file_urls
            .iter()
            .map(|url| filename_from_url(url))
            .collect()
    }
}

/// Last path segment of a URL, ignoring any query string or fragment.
pub fn filename_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(url)
        .to_string()
}
