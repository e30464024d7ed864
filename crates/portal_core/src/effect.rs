use crate::{ReportId, ReportRequest, UploadRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the report webhook once.
    SubmitReport { request: ReportRequest },
    /// Fetch an already resolved report link and save it under `filename`.
    DownloadReport {
        report_id: ReportId,
        url: String,
        filename: String,
    },
    FetchDocuments { limit: usize },
    ExportDocuments { filename: String, csv: String },
    UploadCsv { request: UploadRequest },
}
