use super::api::ApiClient;
use super::pending_file::{PendingFile, PendingFiles};
use super::uploader::upload_all;
use super::FormError;
use crate::errors::ValidationError;
use crate::utils::validation::{validate_contact, ContactFields};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Initial state, and where every failed attempt lands.
    Editing { error: Option<String> },
    Submitting,
    Submitted { submission_id: String },
}

/// Owns everything the contact form holds between keystrokes and drives
/// grant → upload → submit when the prospect hits send.
#[derive(Debug)]
pub struct FormController {
    api: ApiClient,
    pub fields: ContactFields,
    files: PendingFiles,
    state: FormState,
}

impl FormController {
    pub fn new(api: ApiClient) -> Self {
        Self::with_files(api, PendingFiles::default())
    }

    pub fn with_files(api: ApiClient, files: PendingFiles) -> Self {
        FormController {
            api,
            fields: ContactFields::default(),
            files,
            state: FormState::Editing { error: None },
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn files(&self) -> &PendingFiles {
        &self.files
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, FormState::Editing { .. })
    }

    pub fn add_file(&mut self, file: PendingFile) -> Result<bool, ValidationError> {
        self.files.add(file)
    }

    pub fn remove_file(&mut self, index: usize) -> Option<PendingFile> {
        self.files.remove(index)
    }

    /// Runs one submission attempt. On failure the form returns to editing
    /// with the error message and keeps the typed fields and selected files.
    /// Dropping the future mid-attempt also returns the form to editing.
    pub async fn submit(&mut self) -> Result<String, FormError> {
        if !self.can_submit() {
            return Err(FormError::NotEditing);
        }

        let FormController {
            api,
            fields,
            files,
            state,
        } = self;
        let guard = SubmittingGuard::enter(state);

        match attempt(api, fields, files).await {
            Ok(submission_id) => {
                tracing::info!(%submission_id, "submission accepted");
                files.clear();
                guard.finish(FormState::Submitted {
                    submission_id: submission_id.clone(),
                });
                Ok(submission_id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "submission failed");
                guard.finish(FormState::Editing {
                    error: Some(e.to_string()),
                });
                Err(e)
            }
        }
    }
}

/// Holds the form in `Submitting` and puts it back into `Editing` if the
/// attempt is dropped before it finishes.
struct SubmittingGuard<'a> {
    state: &'a mut FormState,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(state: &'a mut FormState) -> Self {
        *state = FormState::Submitting;
        SubmittingGuard { state }
    }

    fn finish(self, outcome: FormState) {
        *self.state = outcome;
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if *self.state == FormState::Submitting {
            tracing::warn!("submission dropped before completion");
            *self.state = FormState::Editing {
                error: Some(FormError::Interrupted.to_string()),
            };
        }
    }
}

async fn attempt(
    api: &ApiClient,
    fields: &ContactFields,
    files: &PendingFiles,
) -> Result<String, FormError> {
    let mut submission = validate_contact(fields)?;

    if !files.is_empty() {
        let files = files.snapshot().await?;

        let descriptors: Vec<_> = files.iter().map(PendingFile::descriptor).collect();
        let grants = api.request_grants(&descriptors).await?;
        submission.file_urls = upload_all(api.http(), &files, &grants).await?;
    }

    api.submit(&submission).await
}
