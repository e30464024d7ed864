use std::path::PathBuf;

use portal_logging::portal_info;

use crate::fetch::{build_client, ensure_success, map_reqwest_error, parse_url, read_body};
use crate::persist::AtomicFileWriter;
use crate::{EngineEvent, EventSink, FailureKind, FetchError, FetchSettings, ReportId};

/// Fetches a report and saves it under the download directory.
///
/// The body is held in memory only for the duration of the call and reaches
/// disk through a temp file that is renamed into place.
#[derive(Debug, Clone)]
pub struct ReportDownloader {
    fetch: FetchSettings,
    output_dir: PathBuf,
}

impl ReportDownloader {
    pub fn new(fetch: FetchSettings, output_dir: PathBuf) -> Self {
        Self { fetch, output_dir }
    }

    pub async fn download(
        &self,
        report_id: ReportId,
        url: &str,
        filename: &str,
        sink: &dyn EventSink,
    ) -> Result<PathBuf, FetchError> {
        let parsed = parse_url(url)?;
        let client = build_client(&self.fetch)?;
        let response = client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(&response)?;

        let bytes = read_body(response, self.fetch.max_bytes, |bytes| {
            sink.emit(EngineEvent::DownloadProgress { report_id, bytes });
        })
        .await?;

        let writer = AtomicFileWriter::new(self.output_dir.clone());
        let path = writer
            .write_bytes(filename, &bytes)
            .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;
        portal_info!(
            "Saved report {} ({} bytes) to {:?}",
            report_id,
            bytes.len(),
            path
        );
        Ok(path)
    }
}
