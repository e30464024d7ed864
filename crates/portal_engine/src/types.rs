use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

/// Identifier the caller attaches to a download so completions can be matched.
pub type ReportId = i64;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The report webhook answered with a JSON body.
    ReportReplied { result: Result<Value, FetchError> },
    DownloadProgress { report_id: ReportId, bytes: u64 },
    DownloadCompleted {
        report_id: ReportId,
        result: Result<PathBuf, FetchError>,
    },
    DocumentsFetched {
        result: Result<Vec<DocumentRecord>, FetchError>,
    },
    UploadCompleted {
        result: Result<UploadReceipt, FetchError>,
    },
}

/// One row of the hosted documents table, as sent over the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub status: u16,
    /// Parsed reply when the webhook answered with JSON.
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    NotConfigured,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    InvalidJson,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::NotConfigured => write!(f, "endpoint not configured"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::InvalidJson => write!(f, "response is not valid json"),
            FailureKind::Io => write!(f, "file error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
