use actix_multipart::form::{text::Text, MultipartForm};
use actix_web::{web, HttpResponse};
use subtle::ConstantTimeEq;

use crate::errors::{AppError, ConfigError};
use crate::models::{ContactResponse, WebhookPayload};
use crate::utils::validation::{validate_contact, validate_file_urls, ContactFields};
use crate::AppState;

// Every field is optional at the extractor level so that missing values get
// our own validation message instead of a generic multipart error.
#[derive(MultipartForm)]
pub struct ContactForm {
    name: Option<Text<String>>,
    email: Option<Text<String>>,
    hotel: Option<Text<String>>,
    #[multipart(rename = "photoCount")]
    photo_count: Option<Text<String>>,
    message: Option<Text<String>>,
    #[multipart(rename = "fileUrls")]
    file_urls: Vec<Text<String>>,
    secret: Option<Text<String>>,
}

fn text(field: Option<Text<String>>) -> String {
    field.map(Text::into_inner).unwrap_or_default()
}

fn secret_matches(expected: &str, provided: Option<&str>) -> bool {
    provided
        .map(|provided| bool::from(provided.as_bytes().ct_eq(expected.as_bytes())))
        .unwrap_or(false)
}

/// `POST /contact`: validates the prospect's fields and file references and
/// relays them to the automation webhook.
pub async fn submit_contact(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ContactForm>,
) -> Result<HttpResponse, AppError> {
    let config = &state.config;

    if let Some(expected) = &config.contact_secret {
        let provided = form.secret.as_ref().map(|s| s.as_str());
        if !secret_matches(expected, provided) {
            return Err(AppError::Unauthorized);
        }
    }

    let fields = ContactFields {
        name: text(form.name),
        email: text(form.email),
        hotel: text(form.hotel),
        photo_count: text(form.photo_count),
        message: text(form.message),
    };
    let mut submission = validate_contact(&fields)?;

    let file_urls: Vec<String> = form
        .file_urls
        .into_iter()
        .map(|url| url.into_inner().trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();
    validate_file_urls(&file_urls, config.max_files)?;
    submission.file_urls = file_urls;

    let webhook = state
        .webhook
        .as_ref()
        .ok_or(AppError::NotConfigured(ConfigError::Missing("MAKE_WEBHOOK_URL")))?;

    let payload = WebhookPayload::new(submission);
    tracing::info!(
        submission_id = %payload.submission_id,
        hotel = %payload.submission.hotel,
        file_count = payload.file_count(),
        "contact submission received"
    );

    webhook
        .forward(&payload)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(HttpResponse::Ok().json(ContactResponse {
        ok: true,
        submission_id: payload.submission_id,
    }))
}
