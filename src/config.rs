use dotenv::dotenv;
use std::env;
use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_MAX_FILES: usize = 20;
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

const PUT_EXPIRY_BOUNDS: (u64, u64) = (60, 60 * 60);
// S3 refuses presigned URLs valid for longer than seven days.
const GET_EXPIRY_BOUNDS: (u64, u64) = (60, 7 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    pub service_host: String,
    pub service_port: u16,
    pub cors_domains: Vec<String>,
    pub is_development: bool,

    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub contact_secret: Option<String>,

    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub s3_public_base_url: Option<String>,
    pub s3_private_objects: bool,
    pub s3_key_prefix: String,

    pub put_expires_secs: u64,
    pub get_expires_secs: u64,

    pub max_files: usize,
    pub max_file_bytes: u64,
}

/// Everything needed to mint presigned URLs. Only exists when storage is
/// fully configured.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub public_base_url: Option<String>,
    pub private_objects: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service_host: "127.0.0.1".to_string(),
            service_port: 8080,
            cors_domains: Vec::new(),
            is_development: false,

            webhook_url: None,
            webhook_secret: None,
            contact_secret: None,

            s3_bucket: None,
            s3_region: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            s3_public_base_url: None,
            s3_private_objects: true,
            s3_key_prefix: "uploads".to_string(),

            put_expires_secs: 5 * 60,
            get_expires_secs: 60 * 60,

            max_files: DEFAULT_MAX_FILES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let defaults = Config::default();

        Ok(Config {
            service_host: Self::get_env("SERVICE_HOST", &defaults.service_host),
            service_port: Self::get_env_parsed("SERVICE_PORT", defaults.service_port)?,
            cors_domains: Self::get_env_list("CORS_DOMAINS", ""),
            is_development: Self::get_env_parsed("IS_DEVELOPMENT", false)?,

            webhook_url: Self::get_env_opt("MAKE_WEBHOOK_URL"),
            webhook_secret: Self::get_env_opt("MAKE_WEBHOOK_SECRET"),
            contact_secret: Self::get_env_opt("CONTACT_SHARED_SECRET"),

            s3_bucket: Self::get_env_opt("S3_BUCKET"),
            s3_region: Self::get_env_opt("S3_REGION"),
            aws_access_key_id: Self::get_env_opt("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: Self::get_env_opt("AWS_SECRET_ACCESS_KEY"),
            s3_public_base_url: Self::get_env_opt("S3_PUBLIC_BASE_URL"),
            s3_private_objects: Self::get_env_parsed(
                "S3_PRIVATE_OBJECTS",
                defaults.s3_private_objects,
            )?,
            s3_key_prefix: Self::get_env("S3_KEY_PREFIX", &defaults.s3_key_prefix),

            put_expires_secs: Self::get_env_parsed(
                "UPLOAD_PUT_EXPIRES_SECS",
                defaults.put_expires_secs,
            )?,
            get_expires_secs: Self::get_env_parsed(
                "UPLOAD_GET_EXPIRES_SECS",
                defaults.get_expires_secs,
            )?,

            max_files: Self::get_env_parsed("MAX_FILES", defaults.max_files)?,
            max_file_bytes: Self::get_env_parsed("MAX_FILE_BYTES", defaults.max_file_bytes)?,
        })
    }

    pub fn storage(&self) -> Result<StorageSettings, ConfigError> {
        fn required(value: &Option<String>, key: &'static str) -> Result<String, ConfigError> {
            value.clone().ok_or(ConfigError::Missing(key))
        }

        Ok(StorageSettings {
            bucket: required(&self.s3_bucket, "S3_BUCKET")?,
            region: required(&self.s3_region, "S3_REGION")?,
            access_key_id: required(&self.aws_access_key_id, "AWS_ACCESS_KEY_ID")?,
            secret_access_key: required(&self.aws_secret_access_key, "AWS_SECRET_ACCESS_KEY")?,
            public_base_url: self.s3_public_base_url.clone(),
            private_objects: self.s3_private_objects,
        })
    }

    /// Expiry for write URLs, honoring a caller override within bounds.
    pub fn put_expiry(&self, requested: Option<u64>) -> Duration {
        Self::clamp_expiry(requested.unwrap_or(self.put_expires_secs), PUT_EXPIRY_BOUNDS)
    }

    /// Expiry for read URLs, honoring a caller override within bounds.
    pub fn get_expiry(&self, requested: Option<u64>) -> Duration {
        Self::clamp_expiry(requested.unwrap_or(self.get_expires_secs), GET_EXPIRY_BOUNDS)
    }

    fn clamp_expiry(secs: u64, (min, max): (u64, u64)) -> Duration {
        Duration::from_secs(secs.clamp(min, max))
    }

    fn get_env(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    fn get_env_opt(key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn get_env_list(key: &str, default: &str) -> Vec<String> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn get_env_parsed<T: std::str::FromStr>(
        key: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
            _ => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_requires_bucket_first() {
        let config = Config::default();
        match config.storage() {
            Err(ConfigError::Missing(key)) => assert_eq!(key, "S3_BUCKET"),
            other => panic!("expected missing bucket, got {:?}", other),
        }
    }

    #[test]
    fn storage_requires_credentials() {
        let config = Config {
            s3_bucket: Some("reels".to_string()),
            s3_region: Some("eu-west-1".to_string()),
            ..Config::default()
        };
        match config.storage() {
            Err(ConfigError::Missing(key)) => assert_eq!(key, "AWS_ACCESS_KEY_ID"),
            other => panic!("expected missing credentials, got {:?}", other),
        }
    }

    #[test]
    fn expiry_overrides_are_clamped() {
        let config = Config::default();
        assert_eq!(config.put_expiry(None), Duration::from_secs(300));
        assert_eq!(config.put_expiry(Some(1)), Duration::from_secs(60));
        assert_eq!(config.put_expiry(Some(86_400)), Duration::from_secs(3600));
        assert_eq!(config.get_expiry(None), Duration::from_secs(3600));
        assert_eq!(
            config.get_expiry(Some(30 * 24 * 60 * 60)),
            Duration::from_secs(604_800)
        );
    }
}
