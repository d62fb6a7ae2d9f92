//! Client half of the intake workflow: the form state machine, the
//! pending-file list, and the direct-to-storage uploader.

pub mod api;
pub mod form;
pub mod pending_file;
pub mod uploader;

pub use api::ApiClient;
pub use form::{FormController, FormState};
pub use pending_file::{PendingFile, PendingFiles};

use crate::errors::ValidationError;

/// Errors surfaced to the prospect. The `Display` text is what the form
/// shows.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("A submission is already in progress or complete.")]
    NotEditing,

    #[error("Could not reach the server. Please try again.")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Uploading \"{file}\" failed ({reason}). Please try again.")]
    Upload { file: String, reason: String },

    #[error("Could not read \"{file}\" ({reason}). Please select it again.")]
    Unreadable { file: String, reason: String },

    #[error("Submission was interrupted. Please try again.")]
    Interrupted,

    #[error("Expected {expected} upload URLs but received {received}.")]
    GrantMismatch { expected: usize, received: usize },
}
