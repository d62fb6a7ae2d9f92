use futures_util::future::try_join_all;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Body;
use tokio_util::io::ReaderStream;

use super::pending_file::PendingFile;
use super::FormError;
use crate::models::{UploadGrant, FALLBACK_CONTENT_TYPE};

/// PUTs every file to its grant's write URL concurrently and returns the
/// file references in file order. Fails as a whole if any transfer fails.
pub async fn upload_all(
    http: &reqwest::Client,
    files: &[PendingFile],
    grants: &[UploadGrant],
) -> Result<Vec<String>, FormError> {
    if files.len() != grants.len() {
        return Err(FormError::GrantMismatch {
            expected: files.len(),
            received: grants.len(),
        });
    }

    let transfers = files
        .iter()
        .zip(grants)
        .map(|(file, grant)| upload_one(http, file, grant));
    let references = try_join_all(transfers).await?;

    tracing::debug!(file_count = references.len(), "uploaded batch");
    Ok(references)
}

#[tracing::instrument(skip_all, fields(file = %file.display_name, key = %grant.key))]
async fn upload_one(
    http: &reqwest::Client,
    file: &PendingFile,
    grant: &UploadGrant,
) -> Result<String, FormError> {
    let failed = |reason: String| FormError::Upload {
        file: file.display_name.clone(),
        reason,
    };

    let handle = tokio::fs::File::open(&file.path)
        .await
        .map_err(|e| failed(e.to_string()))?;
    let content_type = if file.mime_type.is_empty() {
        FALLBACK_CONTENT_TYPE
    } else {
        file.mime_type.as_str()
    };

    let response = http
        .put(&grant.put_url)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, file.byte_size)
        .body(Body::wrap_stream(ReaderStream::new(handle)))
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, "storage rejected upload");
        return Err(failed(format!("storage responded {}", status)));
    }

    Ok(grant.file_reference().to_string())
}
