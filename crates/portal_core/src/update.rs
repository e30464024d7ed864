use portal_logging::{mask_email, portal_info, portal_warn};

use crate::date_format::report_filename;
use crate::documents::export_filename;
use crate::download::download_url_for;
use crate::report::report_from_reply;
use crate::upload::validate_csv_file;
use crate::{
    AppState, DownloadMethod, Effect, Msg, Severity, SubmissionState, UploadRequest,
};

/// Shown for every transport, status and data-shape failure of a submission.
pub const SUBMISSION_FAILED_NOTICE: &str =
    "Failed to generate the security report. Please try again or contact support.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TabSelected(tab) => {
            state.set_tab(tab);
            state.mark_dirty();
            Vec::new()
        }
        Msg::LocationChanged(text) => {
            state.form_mut().location = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::EmailChanged(text) => {
            state.form_mut().email = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::DateModeChanged(mode) => {
            let form = state.form_mut();
            if form.date.is_some_and(|selection| selection.mode() != mode) {
                form.date = None;
            }
            form.date_mode = mode;
            state.mark_dirty();
            Vec::new()
        }
        Msg::DateSelected(selection) => {
            let form = state.form_mut();
            form.date_mode = selection.mode();
            form.date = Some(selection);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DateCleared => {
            state.form_mut().date = None;
            state.mark_dirty();
            Vec::new()
        }
        Msg::CsvAttached(file) => {
            match validate_csv_file(&file) {
                Ok(()) => state.form_mut().csv = Some(file),
                Err(err) => state.set_notice(Severity::Error, err.to_string()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::CsvDetached => {
            state.form_mut().csv = None;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked { at } => submit(&mut state, at.timestamp_millis()),
        Msg::SubmissionReplied { reply, received_at } => {
            let Some((id, request)) = state.finish_submission() else {
                portal_warn!("Ignoring webhook reply with no submission in flight");
                return (state, Vec::new());
            };
            match report_from_reply(&reply, &request, id, received_at) {
                Ok(report) => {
                    portal_info!(
                        "Report {} generated for location={} email={}",
                        report.id,
                        report.location,
                        mask_email(&report.email)
                    );
                    let text = format!("Security report generated for {}.", report.location);
                    state.prepend_report(report);
                    state.reset_form();
                    state.set_notice(Severity::Success, text);
                }
                Err(err) => {
                    portal_warn!("Webhook reply for report {} rejected: {}", id, err);
                    state.set_notice(Severity::Error, SUBMISSION_FAILED_NOTICE);
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmissionFailed { reason } => {
            if let Some((id, _)) = state.finish_submission() {
                portal_warn!("Report {} submission failed: {}", id, reason);
                state.set_notice(Severity::Error, SUBMISSION_FAILED_NOTICE);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DownloadClicked { report_id, method } => {
            let target = state.find_report(report_id).map(|report| {
                (
                    download_url_for(&report.report_url),
                    report_filename(&report.date, &report.location),
                )
            });
            let Some((url, filename)) = target else {
                state.set_notice(Severity::Error, format!("No report with id {report_id}."));
                state.mark_dirty();
                return (state, Vec::new());
            };
            match method {
                DownloadMethod::Link => {
                    state.set_notice(Severity::Info, format!("Download {filename} from {url}"));
                    state.mark_dirty();
                    Vec::new()
                }
                DownloadMethod::Fetch => {
                    if !state.start_download(report_id) {
                        return (state, Vec::new());
                    }
                    state.set_notice(Severity::Info, format!("Downloading {filename}..."));
                    state.mark_dirty();
                    vec![Effect::DownloadReport {
                        report_id,
                        url,
                        filename,
                    }]
                }
            }
        }
        Msg::DownloadFinished { report_id, result } => {
            if state.finish_download(report_id) {
                match result {
                    Ok(path) => state.set_notice(
                        Severity::Success,
                        format!("Saved report to {}", path.display()),
                    ),
                    Err(reason) => {
                        portal_warn!("Download of report {} failed: {}", report_id, reason);
                        state.set_notice(
                            Severity::Error,
                            format!("Download failed: {reason}"),
                        );
                    }
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DocumentsRequested => {
            if state.documents_loading() {
                return (state, Vec::new());
            }
            state.set_documents_loading(true);
            state.mark_dirty();
            vec![Effect::FetchDocuments {
                limit: state.document_limit(),
            }]
        }
        Msg::DocumentsLoaded(documents) => {
            state.set_documents_loading(false);
            let count = documents.len();
            state.set_documents(documents);
            state.set_notice(Severity::Info, format!("Loaded {count} documents."));
            state.mark_dirty();
            Vec::new()
        }
        Msg::DocumentsFailed { reason } => {
            portal_warn!("Loading documents failed: {}", reason);
            state.set_documents_loading(false);
            state.set_notice(Severity::Error, "Could not load documents.");
            state.mark_dirty();
            Vec::new()
        }
        Msg::FilterChanged(filter) => {
            state.set_filter(filter);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportClicked { today } => {
            if state.exporting() {
                return (state, Vec::new());
            }
            if state.visible_count() == 0 {
                state.set_notice(Severity::Error, "No documents to export.");
                state.mark_dirty();
                return (state, Vec::new());
            }
            state.set_exporting(true);
            state.mark_dirty();
            vec![Effect::ExportDocuments {
                filename: export_filename(today),
                csv: state.visible_csv(),
            }]
        }
        Msg::ExportFinished { result } => {
            state.set_exporting(false);
            match result {
                Ok(path) => state.set_notice(
                    Severity::Success,
                    format!("Exported documents to {}", path.display()),
                ),
                Err(reason) => {
                    state.set_notice(Severity::Error, format!("Export failed: {reason}"))
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::UploadFileSelected(file) => {
            match validate_csv_file(&file) {
                Ok(()) => {
                    state.set_notice(Severity::Info, format!("Selected {}", file.filename));
                    state.upload_mut().file = Some(file);
                }
                Err(err) => state.set_notice(Severity::Error, err.to_string()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::UploadWebhookChanged(url) => {
            state.upload_mut().webhook_url = url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty());
            state.mark_dirty();
            Vec::new()
        }
        Msg::UploadFormatChanged(format) => {
            state.upload_mut().format = format;
            state.mark_dirty();
            Vec::new()
        }
        Msg::UploadClicked { at } => {
            if state.upload().busy {
                return (state, Vec::new());
            }
            let Some(file) = state.upload().file.clone() else {
                state.set_notice(Severity::Error, "Please select a CSV file first.");
                state.mark_dirty();
                return (state, Vec::new());
            };
            let upload = state.upload_mut();
            upload.busy = true;
            let request = UploadRequest {
                filename: file.filename,
                content: file.content,
                webhook_url: upload.webhook_url.clone(),
                format: upload.format,
                timestamp: at,
            };
            state.set_notice(Severity::Info, format!("Uploading {}...", request.filename));
            state.mark_dirty();
            vec![Effect::UploadCsv { request }]
        }
        Msg::UploadFinished { result } => {
            if !state.upload().busy {
                return (state, Vec::new());
            }
            let upload = state.upload_mut();
            upload.busy = false;
            match result {
                Ok(()) => {
                    let name = upload.file.take().map(|f| f.filename).unwrap_or_default();
                    state.set_notice(Severity::Success, format!("Uploaded {name}."));
                }
                Err(reason) => {
                    portal_warn!("CSV upload failed: {}", reason);
                    state.set_notice(Severity::Error, format!("Upload failed: {reason}"));
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.clear_notice();
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState, id: i64) -> Vec<Effect> {
    // The submit control is disabled while busy; late clicks are dropped.
    if state.submission() == SubmissionState::Submitting {
        return Vec::new();
    }
    match state.form().to_request() {
        Ok(request) => {
            portal_info!(
                "Submitting report {} location={} email={}",
                id,
                request.location,
                mask_email(&request.email)
            );
            state.begin_submission(id, request.clone());
            state.set_notice(Severity::Info, "Generating security report...");
            state.mark_dirty();
            vec![Effect::SubmitReport { request }]
        }
        Err(err) => {
            state.set_notice(Severity::Error, err.to_string());
            state.mark_dirty();
            Vec::new()
        }
    }
}
