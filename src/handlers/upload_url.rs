use actix_web::{web, HttpResponse};
use futures_util::future::try_join_all;

use crate::errors::{AppError, ConfigError};
use crate::models::{UploadUrlRequest, UploadUrlResponse};
use crate::utils::object_key::generate_object_key;
use crate::utils::validation::validate_descriptors;
use crate::AppState;

/// `POST /upload-url`: one presigned write URL (and optional read URL) per
/// requested file, in request order.
pub async fn create_upload_urls(
    state: web::Data<AppState>,
    web::Json(request): web::Json<UploadUrlRequest>,
) -> Result<HttpResponse, AppError> {
    let config = &state.config;
    let storage = match &state.storage {
        Some(storage) => storage,
        // Re-derive the precise cause for the operator log.
        None => {
            return Err(AppError::NotConfigured(
                config
                    .storage()
                    .err()
                    .unwrap_or(ConfigError::Missing("S3_BUCKET")),
            ))
        }
    };

    let (files, put_expires_in, get_expires_in) = request.into_parts();
    validate_descriptors(&files, config.max_files, config.max_file_bytes)?;

    let put_ttl = config.put_expiry(put_expires_in);
    let get_ttl = config.get_expiry(get_expires_in);

    let results = try_join_all(files.iter().map(|file| {
        let key = generate_object_key(&config.s3_key_prefix, &file.name);
        async move {
            storage
                .issue_grant(&key, file.content_type(), put_ttl, get_ttl)
                .await
        }
    }))
    .await
    .map_err(|e| AppError::Storage(e.to_string()))?;

    tracing::info!(file_count = results.len(), "issued upload urls");

    Ok(HttpResponse::Ok().json(UploadUrlResponse { ok: true, results }))
}
