use std::collections::BTreeSet;

use crate::date_format::{format_report_date, report_filename};
use crate::documents::{documents_to_csv, matching_indices, sort_documents, DEFAULT_DOCUMENT_LIMIT};
use crate::download::download_url_for;
use crate::view_model::{
    AppViewModel, DocumentRowView, DocumentsView, FormView, ReportRowView, UploadView,
};
use crate::{
    CsvAttachment, Document, DocumentFilter, FormData, GeneratedReport, ReportDate, ReportId,
    ReportRequest, UploadFormat,
};

/// Top-level sections of the page shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Request,
    Reports,
    Documents,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// One user-visible status message; the latest replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct UploadForm {
    pub(crate) file: Option<CsvAttachment>,
    pub(crate) webhook_url: Option<String>,
    pub(crate) format: UploadFormat,
    pub(crate) busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    tab: Tab,
    form: FormData,
    submission: SubmissionState,
    pending: Option<(ReportId, ReportRequest)>,
    /// Newest first.
    reports: Vec<GeneratedReport>,
    downloading: BTreeSet<ReportId>,
    notice: Option<Notice>,
    documents: Vec<Document>,
    documents_loading: bool,
    document_limit: usize,
    filter: DocumentFilter,
    /// Indices into `documents` that pass `filter`.
    visible: Vec<usize>,
    exporting: bool,
    upload: UploadForm,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            form: FormData::default(),
            submission: SubmissionState::default(),
            pending: None,
            reports: Vec::new(),
            downloading: BTreeSet::new(),
            notice: None,
            documents: Vec::new(),
            documents_loading: false,
            document_limit: DEFAULT_DOCUMENT_LIMIT,
            filter: DocumentFilter::default(),
            visible: Vec::new(),
            exporting: false,
            upload: UploadForm::default(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose document fetches request `limit` rows.
    pub fn with_document_limit(limit: usize) -> Self {
        Self {
            document_limit: limit.max(1),
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let date_label = self
            .form
            .date
            .map(|selection| format_report_date(&ReportDate::from(selection)));
        let submitting = self.submission == SubmissionState::Submitting;
        AppViewModel {
            tab: self.tab,
            notice: self.notice.clone(),
            form: FormView {
                location: self.form.location.clone(),
                email: self.form.email.clone(),
                date_mode: self.form.date_mode,
                date_label,
                csv_filename: self.form.csv.as_ref().map(|csv| csv.filename.clone()),
                submitting,
                can_submit: !submitting,
            },
            reports: self
                .reports
                .iter()
                .map(|report| ReportRowView {
                    id: report.id,
                    location: report.location.clone(),
                    email: report.email.clone(),
                    date_label: format_report_date(&report.date),
                    generated_at: report.generated_at,
                    report_url: report.report_url.clone(),
                    download_url: download_url_for(&report.report_url),
                    filename: report_filename(&report.date, &report.location),
                    downloading: self.downloading.contains(&report.id),
                })
                .collect(),
            documents: DocumentsView {
                loading: self.documents_loading,
                total: self.documents.len(),
                filter: self.filter.clone(),
                rows: self
                    .visible_documents()
                    .map(|doc| DocumentRowView {
                        id: doc.id,
                        location: doc.location().to_string(),
                        date: doc.content_date(),
                        doc_type: doc.doc_type().to_string(),
                        source: doc.source().to_string(),
                        content: doc.content.clone(),
                    })
                    .collect(),
            },
            upload: UploadView {
                filename: self.upload.file.as_ref().map(|f| f.filename.clone()),
                webhook_url: self.upload.webhook_url.clone(),
                format: self.upload.format,
                busy: self.upload.busy,
            },
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    pub fn reports(&self) -> &[GeneratedReport] {
        &self.reports
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub(crate) fn form(&self) -> &FormData {
        &self.form
    }

    pub(crate) fn form_mut(&mut self) -> &mut FormData {
        &mut self.form
    }

    /// Clears the entered values but keeps the chosen date mode.
    pub(crate) fn reset_form(&mut self) {
        self.form = FormData {
            date_mode: self.form.date_mode,
            ..FormData::default()
        };
    }

    pub(crate) fn set_notice(&mut self, severity: Severity, text: impl Into<String>) {
        self.notice = Some(Notice {
            severity,
            text: text.into(),
        });
    }

    pub(crate) fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub(crate) fn begin_submission(&mut self, id: ReportId, request: ReportRequest) {
        self.submission = SubmissionState::Submitting;
        self.pending = Some((id, request));
    }

    /// Returns to `Idle` and hands back the request that was in flight.
    pub(crate) fn finish_submission(&mut self) -> Option<(ReportId, ReportRequest)> {
        self.submission = SubmissionState::Idle;
        self.pending.take()
    }

    pub(crate) fn prepend_report(&mut self, report: GeneratedReport) {
        self.reports.insert(0, report);
    }

    pub(crate) fn find_report(&self, id: ReportId) -> Option<&GeneratedReport> {
        self.reports.iter().find(|report| report.id == id)
    }

    /// Returns false when a download for `id` is already running.
    pub(crate) fn start_download(&mut self, id: ReportId) -> bool {
        self.downloading.insert(id)
    }

    pub(crate) fn finish_download(&mut self, id: ReportId) -> bool {
        self.downloading.remove(&id)
    }

    pub(crate) fn documents_loading(&self) -> bool {
        self.documents_loading
    }

    pub(crate) fn set_documents_loading(&mut self, loading: bool) {
        self.documents_loading = loading;
    }

    pub(crate) fn document_limit(&self) -> usize {
        self.document_limit
    }

    pub(crate) fn set_documents(&mut self, mut documents: Vec<Document>) {
        sort_documents(&mut documents);
        self.documents = documents;
        self.refilter();
    }

    pub(crate) fn set_filter(&mut self, filter: DocumentFilter) {
        self.filter = filter;
        self.refilter();
    }

    pub(crate) fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub(crate) fn visible_csv(&self) -> String {
        documents_to_csv(self.visible_documents())
    }

    pub(crate) fn exporting(&self) -> bool {
        self.exporting
    }

    pub(crate) fn set_exporting(&mut self, exporting: bool) {
        self.exporting = exporting;
    }

    pub(crate) fn upload(&self) -> &UploadForm {
        &self.upload
    }

    pub(crate) fn upload_mut(&mut self) -> &mut UploadForm {
        &mut self.upload
    }

    fn refilter(&mut self) {
        self.visible = matching_indices(&self.documents, &self.filter);
    }

    fn visible_documents(&self) -> impl Iterator<Item = &Document> {
        self.visible.iter().map(|&index| &self.documents[index])
    }
}
