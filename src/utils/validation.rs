use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ValidationError;
use crate::models::{FileDescriptor, Submission};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

/// Raw contact fields as typed by the prospect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub hotel: String,
    pub photo_count: String,
    pub message: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Checks required fields, then the email pattern, then the photo count.
/// Returns the trimmed values.
pub fn validate_contact(fields: &ContactFields) -> Result<Submission, ValidationError> {
    let name = fields.name.trim();
    let email = fields.email.trim();
    let hotel = fields.hotel.trim();

    let missing: Vec<&'static str> = [("name", name), ("email", email), ("hotel", hotel)]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    let photo_count = match fields.photo_count.trim() {
        "" => None,
        raw => Some(
            raw.parse::<u32>()
                .map_err(|_| ValidationError::InvalidPhotoCount)?,
        ),
    };

    Ok(Submission {
        name: name.to_string(),
        email: email.to_string(),
        hotel: hotel.to_string(),
        photo_count,
        message: fields.message.trim().to_string(),
        file_urls: Vec::new(),
    })
}

/// File references must be absolute http(s) URLs, at most `max_files` of them.
pub fn validate_file_urls(urls: &[String], max_files: usize) -> Result<(), ValidationError> {
    if urls.len() > max_files {
        return Err(ValidationError::TooManyFiles { max: max_files });
    }

    for url in urls {
        match reqwest::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(ValidationError::InvalidFileUrl(url.clone())),
        }
    }

    Ok(())
}

/// Batch limits applied before any upload URL is minted.
pub fn validate_descriptors(
    files: &[FileDescriptor],
    max_files: usize,
    max_file_bytes: u64,
) -> Result<(), ValidationError> {
    if files.is_empty() {
        return Err(ValidationError::NoFiles);
    }
    if files.len() > max_files {
        return Err(ValidationError::TooManyFiles { max: max_files });
    }

    for file in files {
        if let Some(content_type) = file.content_type.as_deref().filter(|t| !t.is_empty()) {
            check_image_type(&file.name, content_type)?;
        }
        if let Some(size) = file.size {
            check_size(&file.name, size, max_file_bytes)?;
        }
    }

    Ok(())
}

pub fn check_image_type(name: &str, mime_type: &str) -> Result<(), ValidationError> {
    if mime_type.starts_with("image/") {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedType {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}

pub fn check_size(name: &str, size: u64, max_bytes: u64) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::EmptyFile(name.to_string()));
    }
    if size > max_bytes {
        return Err(ValidationError::FileTooLarge {
            name: name.to_string(),
            max_bytes,
        });
    }
    Ok(())
}
