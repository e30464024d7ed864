use chrono::{DateTime, Utc};

use crate::report::CsvAttachment;

/// Body shape used when forwarding a CSV file to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadFormat {
    /// `multipart/form-data` with a `file` part.
    #[default]
    Multipart,
    /// JSON `{ filename, csvData, timestamp }`.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub filename: String,
    pub content: String,
    /// Overrides the configured upload webhook when set.
    pub webhook_url: Option<String>,
    pub format: UploadFormat,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadFileError {
    #[error("{0} is not a .csv file")]
    NotCsv(String),
    #[error("{0} is empty")]
    Empty(String),
}

/// Checks a selected file before it is accepted by the uploader or the form.
pub fn validate_csv_file(file: &CsvAttachment) -> Result<(), UploadFileError> {
    let is_csv = file
        .filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(UploadFileError::NotCsv(file.filename.clone()));
    }
    if file.content.trim().is_empty() {
        return Err(UploadFileError::Empty(file.filename.clone()));
    }
    Ok(())
}
