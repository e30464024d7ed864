use chrono::{DateTime, NaiveDate, Utc};

use crate::{DateInputMode, DateLabel, DocumentFilter, Notice, ReportId, Tab, UploadFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub tab: Tab,
    pub notice: Option<Notice>,
    pub form: FormView,
    pub reports: Vec<ReportRowView>,
    pub documents: DocumentsView,
    pub upload: UploadView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub location: String,
    pub email: String,
    pub date_mode: DateInputMode,
    /// `None` until a date is picked.
    pub date_label: Option<DateLabel>,
    pub csv_filename: Option<String>,
    pub submitting: bool,
    /// Submit control is disabled while a request is in flight.
    pub can_submit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRowView {
    pub id: ReportId,
    pub location: String,
    pub email: String,
    pub date_label: DateLabel,
    pub generated_at: DateTime<Utc>,
    pub report_url: String,
    pub download_url: String,
    pub filename: String,
    pub downloading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentsView {
    pub loading: bool,
    /// Rows loaded before filtering.
    pub total: usize,
    pub filter: DocumentFilter,
    pub rows: Vec<DocumentRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRowView {
    pub id: i64,
    pub location: String,
    pub date: Option<NaiveDate>,
    pub doc_type: String,
    pub source: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub filename: Option<String>,
    pub webhook_url: Option<String>,
    pub format: UploadFormat,
    pub busy: bool,
}
