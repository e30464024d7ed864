use std::sync::{mpsc, Arc};

use anyhow::Context;
use chrono::Utc;
use portal_core::{
    DateSelection, Document, DocumentMetadata, Effect, Msg, ReportRequest, UploadFormat,
    UploadRequest,
};
use portal_engine::{
    AtomicFileWriter, CsvPayload, CsvUpload, DateParams, DocumentRecord, EngineEvent,
    EngineHandle, EventSink, ReportQuery, UploadBody,
};
use portal_logging::{mask_email, portal_debug, portal_info, portal_warn};

use super::app::AppEvent;
use super::config::PortalConfig;

/// Runs the effects returned by `update` and feeds results back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    exports: AtomicFileWriter,
    app_tx: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(config: &PortalConfig, app_tx: mpsc::Sender<AppEvent>) -> anyhow::Result<Self> {
        let sink = Arc::new(MsgSink {
            app_tx: app_tx.clone(),
        });
        let engine =
            EngineHandle::new(config.engine_config(), sink).context("starting engine runtime")?;
        Ok(Self {
            engine,
            exports: AtomicFileWriter::new(config.output_dir.clone()),
            app_tx,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitReport { request } => {
                    portal_info!(
                        "SubmitReport location={} email={}",
                        request.location,
                        mask_email(&request.email)
                    );
                    self.engine.submit_report(to_query(&request));
                }
                Effect::DownloadReport {
                    report_id,
                    url,
                    filename,
                } => {
                    portal_info!("DownloadReport id={} file={}", report_id, filename);
                    self.engine.download(report_id, url, filename);
                }
                Effect::FetchDocuments { limit } => {
                    self.engine.fetch_documents(limit);
                }
                Effect::ExportDocuments { filename, csv } => {
                    // Small and local; written inline rather than on the engine thread.
                    let result = self
                        .exports
                        .write(&filename, &csv)
                        .map_err(|err| err.to_string());
                    self.send(Msg::ExportFinished { result });
                }
                Effect::UploadCsv { request } => {
                    let (upload, url_override, body) = to_upload(request);
                    self.engine.upload(upload, url_override, body);
                }
            }
        }
    }

    fn send(&self, msg: Msg) {
        let _ = self.app_tx.send(AppEvent::Msg(msg));
    }
}

struct MsgSink {
    app_tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        if let Some(msg) = event_to_msg(event) {
            let _ = self.app_tx.send(AppEvent::Msg(msg));
        }
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::ReportReplied { result } => match result {
            Ok(reply) => Msg::SubmissionReplied {
                reply,
                received_at: Utc::now(),
            },
            Err(err) => Msg::SubmissionFailed {
                reason: err.to_string(),
            },
        },
        EngineEvent::DownloadProgress { report_id, bytes } => {
            portal_debug!("Report {} download at {} bytes", report_id, bytes);
            return None;
        }
        EngineEvent::DownloadCompleted { report_id, result } => Msg::DownloadFinished {
            report_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::DocumentsFetched { result } => match result {
            Ok(rows) => Msg::DocumentsLoaded(rows.into_iter().map(to_document).collect()),
            Err(err) => Msg::DocumentsFailed {
                reason: err.to_string(),
            },
        },
        EngineEvent::UploadCompleted { result } => Msg::UploadFinished {
            result: match result {
                Ok(receipt) => {
                    portal_info!("Upload accepted with status {}", receipt.status);
                    Ok(())
                }
                Err(err) => {
                    portal_warn!("Upload failed: {}", err);
                    Err(err.to_string())
                }
            },
        },
    };
    Some(msg)
}

pub(crate) fn to_query(request: &ReportRequest) -> ReportQuery {
    let date = match request.date {
        DateSelection::Single(day) => DateParams::Single(day.format("%Y-%m-%d").to_string()),
        DateSelection::Range { from, to } => DateParams::Range {
            from: from.format("%Y-%m-%d").to_string(),
            to: to.format("%Y-%m-%d").to_string(),
        },
        DateSelection::Preset(preset) => DateParams::Option(preset.label().to_string()),
    };
    ReportQuery {
        location: request.location.clone(),
        date,
        email: request.email.clone(),
        csv: request.csv.as_ref().map(|file| CsvPayload {
            filename: file.filename.clone(),
            content: file.content.clone(),
        }),
    }
}

pub(crate) fn to_document(record: DocumentRecord) -> Document {
    Document {
        id: record.id,
        content: record.content.unwrap_or_default(),
        metadata: record.metadata.as_ref().and_then(DocumentMetadata::from_value),
    }
}

fn to_upload(request: UploadRequest) -> (CsvUpload, Option<String>, UploadBody) {
    let body = match request.format {
        UploadFormat::Multipart => UploadBody::Multipart,
        UploadFormat::Json => UploadBody::Json,
    };
    let upload = CsvUpload {
        filename: request.filename,
        content: request.content,
        timestamp: request.timestamp.to_rfc3339(),
    };
    (upload, request.webhook_url, body)
}
