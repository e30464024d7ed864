use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use portal_logging::{portal_debug, portal_warn};

use crate::documents::{DocumentSource, DocumentsSettings, RestDocumentSource};
use crate::download::ReportDownloader;
use crate::fetch::{EventSink, FetchSettings};
use crate::upload::{CsvUpload, CsvUploader, UploadBody};
use crate::webhook::{ReportQuery, ReportWebhook, ReqwestWebhook, WebhookSettings};
use crate::{EngineEvent, FailureKind, FetchError, ReportId};

/// Everything the engine needs to reach its three endpoints and the disk.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub webhook: WebhookSettings,
    pub documents: Option<DocumentsSettings>,
    pub upload_url: Option<String>,
    pub fetch: FetchSettings,
    pub output_dir: PathBuf,
}

enum EngineCommand {
    SubmitReport {
        query: ReportQuery,
    },
    Download {
        report_id: ReportId,
        url: String,
        filename: String,
    },
    FetchDocuments {
        limit: usize,
    },
    Upload {
        upload: CsvUpload,
        url_override: Option<String>,
        body: UploadBody,
    },
}

struct Services {
    webhook: Box<dyn ReportWebhook>,
    documents: Option<Box<dyn DocumentSource>>,
    uploader: CsvUploader,
    downloader: ReportDownloader,
}

impl Services {
    fn from_config(config: EngineConfig) -> Self {
        Self {
            webhook: Box::new(ReqwestWebhook::new(config.webhook)),
            documents: config
                .documents
                .map(|settings| Box::new(RestDocumentSource::new(settings)) as Box<dyn DocumentSource>),
            uploader: CsvUploader::new(config.upload_url, config.fetch.clone()),
            downloader: ReportDownloader::new(config.fetch, config.output_dir),
        }
    }
}

/// Owns the IO thread. Commands go in through the handle, results come back
/// through the sink as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let services = Arc::new(Services::from_config(config));
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("portal-engine".into())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let services = services.clone();
                    let sink = sink.clone();
                    runtime.spawn(async move {
                        handle_command(services.as_ref(), command, sink.as_ref()).await;
                    });
                }
                portal_debug!("Engine command channel closed");
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn submit_report(&self, query: ReportQuery) {
        self.send(EngineCommand::SubmitReport { query });
    }

    pub fn download(&self, report_id: ReportId, url: impl Into<String>, filename: impl Into<String>) {
        self.send(EngineCommand::Download {
            report_id,
            url: url.into(),
            filename: filename.into(),
        });
    }

    pub fn fetch_documents(&self, limit: usize) {
        self.send(EngineCommand::FetchDocuments { limit });
    }

    pub fn upload(&self, upload: CsvUpload, url_override: Option<String>, body: UploadBody) {
        self.send(EngineCommand::Upload {
            upload,
            url_override,
            body,
        });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            portal_warn!("Engine thread is gone; command dropped");
        }
    }
}

async fn handle_command(services: &Services, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::SubmitReport { query } => {
            let result = services.webhook.submit(&query).await;
            sink.emit(EngineEvent::ReportReplied { result });
        }
        EngineCommand::Download {
            report_id,
            url,
            filename,
        } => {
            let result = services
                .downloader
                .download(report_id, &url, &filename, sink)
                .await;
            sink.emit(EngineEvent::DownloadCompleted { report_id, result });
        }
        EngineCommand::FetchDocuments { limit } => {
            let result = match &services.documents {
                Some(source) => source.fetch_latest(limit).await,
                None => Err(FetchError::new(
                    FailureKind::NotConfigured,
                    "documents source is not configured",
                )),
            };
            sink.emit(EngineEvent::DocumentsFetched { result });
        }
        EngineCommand::Upload {
            upload,
            url_override,
            body,
        } => {
            let result = services
                .uploader
                .upload(&upload, url_override.as_deref(), body)
                .await;
            sink.emit(EngineEvent::UploadCompleted { result });
        }
    }
}
