//! Portal engine: webhook calls, downloads, document queries and uploads.
mod documents;
mod download;
mod engine;
mod fetch;
mod persist;
mod types;
mod upload;
mod webhook;

pub use documents::{DocumentSource, DocumentsSettings, RestDocumentSource};
pub use download::ReportDownloader;
pub use engine::{EngineConfig, EngineHandle};
pub use fetch::{ChannelEventSink, EventSink, FetchSettings};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{DocumentRecord, EngineEvent, FailureKind, FetchError, ReportId, UploadReceipt};
pub use upload::{CsvUpload, CsvUploader, UploadBody};
pub use webhook::{
    CsvPayload, DateParams, ReportQuery, ReportWebhook, ReqwestWebhook, WebhookMode,
    WebhookSettings,
};
