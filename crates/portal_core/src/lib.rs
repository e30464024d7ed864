//! Portal core: pure state machine, date handling and view-model helpers.
mod date_format;
mod documents;
mod download;
mod effect;
mod msg;
mod report;
mod selection;
mod state;
mod update;
mod upload;
mod view_model;

pub use date_format::{
    filename_date_token, format_report_date, report_filename, sanitize_location, DateLabel,
    UNKNOWN_DATE_TOKEN,
};
pub use documents::{
    apply_filter, documents_to_csv, export_filename, extract_content_date, sort_documents,
    Document, DocumentFilter, DocumentMetadata, CSV_HEADER, DEFAULT_DOCUMENT_LIMIT,
};
pub use download::{download_url_for, resolve_download_url, DownloadMethod};
pub use effect::Effect;
pub use msg::Msg;
pub use report::{
    report_from_reply, CsvAttachment, FormData, FormError, GeneratedReport, ReplyError, ReportId,
    ReportRequest,
};
pub use selection::{
    parse_loose_date, strip_ordinal_suffixes, DateInputMode, DatePreset, DateSelection,
    ReportDate,
};
pub use state::{AppState, Notice, Severity, SubmissionState, Tab};
pub use update::{update, SUBMISSION_FAILED_NOTICE};
pub use upload::{validate_csv_file, UploadFileError, UploadFormat, UploadRequest};
pub use view_model::{
    AppViewModel, DocumentRowView, DocumentsView, FormView, ReportRowView, UploadView,
};
