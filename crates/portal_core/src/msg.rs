use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::{
    CsvAttachment, DateInputMode, DateSelection, Document, DocumentFilter, DownloadMethod,
    ReportId, Tab, UploadFormat,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User switched the visible tab.
    TabSelected(Tab),
    /// User edited the location field.
    LocationChanged(String),
    /// User edited the email field.
    EmailChanged(String),
    /// User switched between single date, range and canned options.
    DateModeChanged(DateInputMode),
    /// User picked a date, a range or a canned option.
    DateSelected(DateSelection),
    DateCleared,
    /// User attached a CSV file to the report request.
    CsvAttached(CsvAttachment),
    CsvDetached,
    /// User pressed Submit. `at` doubles as the report identifier.
    SubmitClicked { at: DateTime<Utc> },
    /// The webhook answered with a JSON body (not yet validated).
    SubmissionReplied {
        reply: Value,
        received_at: DateTime<Utc>,
    },
    /// Transport, status or parse failure of the webhook call.
    SubmissionFailed { reason: String },
    DownloadClicked {
        report_id: ReportId,
        method: DownloadMethod,
    },
    DownloadFinished {
        report_id: ReportId,
        result: Result<PathBuf, String>,
    },
    /// User asked for the latest documents.
    DocumentsRequested,
    DocumentsLoaded(Vec<Document>),
    DocumentsFailed { reason: String },
    FilterChanged(DocumentFilter),
    ExportClicked { today: NaiveDate },
    ExportFinished { result: Result<PathBuf, String> },
    UploadFileSelected(CsvAttachment),
    UploadWebhookChanged(Option<String>),
    UploadFormatChanged(UploadFormat),
    UploadClicked { at: DateTime<Utc> },
    UploadFinished { result: Result<(), String> },
    NoticeDismissed,
    /// Render tick to coalesce rendering.
    Tick,
}
