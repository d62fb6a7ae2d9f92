pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::config::Config;
use crate::errors::{AppError, ValidationError};
use crate::services::{s3, webhook};

/// Shared per-process state. Storage and webhook clients are absent when
/// their configuration is missing; the handlers report that per request.
pub struct AppState {
    pub config: Config,
    pub storage: Option<s3::Client>,
    pub webhook: Option<webhook::Client>,
}

impl AppState {
    pub fn new(config: Config) -> AppState {
        let storage = match config.storage() {
            Ok(settings) => Some(s3::Client::new(&settings)),
            Err(e) => {
                tracing::warn!(error = %e, "storage not configured, /upload-url will fail");
                None
            }
        };

        let webhook = match config.webhook_url.as_deref() {
            Some(url) => Some(webhook::Client::new(
                reqwest::Client::new(),
                url,
                config.webhook_secret.as_deref(),
            )),
            None => {
                tracing::warn!("MAKE_WEBHOOK_URL not configured, /contact will fail");
                None
            }
        };

        AppState {
            config,
            storage,
            webhook,
        }
    }
}

/// Registers the API routes and the extractor error handlers that keep
/// malformed bodies on the `{ok, error}` response shape.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::from(ValidationError::MalformedRequest(err.to_string())).into()
    }))
    .app_data(MultipartFormConfig::default().error_handler(|err, _req| {
        AppError::from(ValidationError::MalformedRequest(err.to_string())).into()
    }))
    .route(
        "/upload-url",
        web::post().to(handlers::upload_url::create_upload_urls),
    )
    .route("/contact", web::post().to(handlers::contact::submit_contact));
}
