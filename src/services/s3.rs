use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;

use crate::config::StorageSettings;
use crate::models::UploadGrant;

#[derive(Debug, thiserror::Error)]
#[error("failed to presign {operation} for {key}: {reason}")]
pub struct PresignError {
    operation: &'static str,
    key: String,
    reason: String,
}

/// Mints presigned URLs for one bucket. Presigning is local: no request is
/// made to S3 and no object exists until the client uploads it.
#[derive(Debug, Clone)]
pub struct Client {
    s3: S3Client,
    bucket: String,
    region: String,
    public_base_url: Option<String>,
    private_objects: bool,
}

impl Client {
    pub fn new(settings: &StorageSettings) -> Client {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            None,
            None,
            "environment",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .build();

        Client {
            s3: S3Client::from_conf(config),
            bucket: settings.bucket.clone(),
            region: settings.region.clone(),
            public_base_url: settings
                .public_base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            private_objects: settings.private_objects,
        }
    }

    #[tracing::instrument(skip(self), fields(s3.bucket = %self.bucket))]
    pub async fn issue_grant(
        &self,
        key: &str,
        content_type: &str,
        put_expires_in: Duration,
        get_expires_in: Duration,
    ) -> Result<UploadGrant, PresignError> {
        let put_url = self
            .s3
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presigning("PutObject", key, put_expires_in)?)
            .await
            .map_err(|e| PresignError {
                operation: "PutObject",
                key: key.to_string(),
                reason: e.to_string(),
            })?
            .uri()
            .to_string();

        let get_url = if self.private_objects {
            let url = self
                .s3
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .presigned(Self::presigning("GetObject", key, get_expires_in)?)
                .await
                .map_err(|e| PresignError {
                    operation: "GetObject",
                    key: key.to_string(),
                    reason: e.to_string(),
                })?
                .uri()
                .to_string();
            Some(url)
        } else {
            None
        };

        tracing::debug!("issued upload grant");

        Ok(UploadGrant {
            key: key.to_string(),
            put_url,
            get_url,
            public_url: self.public_url(key),
        })
    }

    /// Permanent URL of an object, valid only if the bucket or CDN serves it
    /// publicly.
    pub fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }

    fn presigning(
        operation: &'static str,
        key: &str,
        expires_in: Duration,
    ) -> Result<PresigningConfig, PresignError> {
        PresigningConfig::expires_in(expires_in).map_err(|e| PresignError {
            operation,
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}
